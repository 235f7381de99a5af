//! Display on/off button
//!
//! Each press toggles the display between running and suspended.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use crate::channels::DISPLAY_ENABLE;

const DEBOUNCE_MS: u64 = 30;

/// Button task - active-low push button with pull-up
#[embassy_executor::task]
pub async fn button_task(mut button: Input<'static>) {
    info!("Button task started");

    let mut enabled = true;

    loop {
        button.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
        if button.is_high() {
            continue;
        }

        enabled = !enabled;
        info!("Display {}", if enabled { "on" } else { "off" });
        DISPLAY_ENABLE.signal(enabled);

        button.wait_for_high().await;
    }
}
