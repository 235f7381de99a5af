//! Display refresh task
//!
//! Owns the HT16K33 driver. Each tick signal refreshes the display if its
//! period has elapsed; enable requests suspend or resume it.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;

use lumiseg_core::DeviceConfig;
use lumiseg_drivers::ht16k33::{SevenSegment4, SevenSegmentDisplay, TickOutcome};
use lumiseg_hal::HalI2c;

use crate::channels::{SharedReading, DISPLAY_ENABLE, LIGHT_LEVEL};
use crate::render::UptimeClock;
use crate::tasks::tick::TICK_SIGNAL;

/// Bus type of the display
pub type DisplayBus = HalI2c<I2c<'static, I2C0, Blocking>>;

type Display = SevenSegmentDisplay<DisplayBus, &'static SharedReading, UptimeClock>;

/// Display task - initializes the display and refreshes it on ticks
#[embassy_executor::task]
pub async fn display_task(bus: DisplayBus, config: DeviceConfig) {
    info!("Display task started");

    let mut display: Display =
        SevenSegmentDisplay::with_sensor(bus, SevenSegment4, config, &LIGHT_LEVEL)
            .with_renderer(UptimeClock);

    if let Err(e) = display.init() {
        error!("Display init failed: {}", e);
        return;
    }
    info!("Display running");

    let mut streak: u32 = 0;

    loop {
        match select(TICK_SIGNAL.wait(), DISPLAY_ENABLE.wait()).await {
            Either::First(now_ms) => {
                if !display.is_due(now_ms) {
                    continue;
                }

                match display.tick(now_ms).outcome {
                    TickOutcome::BusError(_) => streak = streak.saturating_add(1),
                    TickOutcome::Sent if streak > 0 => {
                        info!("Display bus recovered after {} failed refreshes", streak);
                        streak = 0;
                    }
                    _ => {}
                }
            }
            Either::Second(true) => {
                display.resume();
            }
            Either::Second(false) => {
                display.suspend();
            }
        }
    }
}
