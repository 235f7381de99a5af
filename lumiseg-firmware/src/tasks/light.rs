//! Ambient light sampling task

use defmt::*;
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_time::{Duration, Ticker};

use lumiseg_drivers::sensor::{AdcLightSensor, AdcReader};

use crate::channels::LIGHT_LEVEL;

/// Sampling period
const SAMPLE_INTERVAL_MS: u64 = 250;

/// Conversions averaged per sample
const OVERSAMPLE: u8 = 8;

/// RP2040 ADC channel in blocking mode
pub struct RpAdc {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl RpAdc {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for RpAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}

/// Light task - samples the sensor and publishes the percentage
#[embassy_executor::task]
pub async fn light_task(adc: RpAdc) {
    info!("Light task started");

    let mut sensor = AdcLightSensor::new(adc).with_oversample(OVERSAMPLE);
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let mut failures: u32 = 0;

    loop {
        match sensor.sample() {
            Some(level) => {
                failures = 0;
                LIGHT_LEVEL.publish(Some(level));
            }
            None => {
                failures = failures.saturating_add(1);
                if failures == 1 {
                    warn!("Light sensor read failed");
                }
            }
        }

        ticker.next().await;
    }
}
