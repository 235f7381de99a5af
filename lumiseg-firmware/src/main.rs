//! Lumiseg - HT16K33 segment display firmware
//!
//! Main firmware binary for RP2040 boards driving an HT16K33 4-digit
//! 7-segment backpack. The display shows the uptime; its brightness is
//! either fixed or follows an ambient light sensor through the
//! calibration curve in display.toml.
//!
//! Wiring (Raspberry Pi Pico):
//! - I2C0 SDA = GPIO4, SCL = GPIO5 (backpack)
//! - ADC0 = GPIO26 (light sensor divider)
//! - GPIO15 = display on/off button to GND

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use {defmt_rtt as _, panic_probe as _};

use lumiseg_hal::HalI2c;

mod channels;
mod config;
mod render;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lumiseg firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // HT16K33 runs up to 400 kHz
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = lumiseg_hal::I2cConfig::FAST.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    info!("I2C0 initialized");

    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let light_channel = Channel::new_pin(p.PIN_26, Pull::None);
    info!("ADC initialized");

    let button = Input::new(p.PIN_15, Pull::Up);

    spawner.spawn(tasks::tick_task()).unwrap();
    spawner
        .spawn(tasks::light_task(tasks::RpAdc::new(adc, light_channel)))
        .unwrap();
    spawner
        .spawn(tasks::display_task(HalI2c::new(i2c), config))
        .unwrap();
    spawner.spawn(tasks::button_task(button)).unwrap();

    info!("All tasks spawned");
}
