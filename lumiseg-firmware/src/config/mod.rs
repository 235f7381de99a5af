//! Configuration loading
//!
//! display.toml is compiled into the firmware and validated by build.rs.
//! At boot it is read by a small no_std parser and validated again by
//! lumiseg-core; any failure falls back to the built-in defaults so the
//! display still comes up.

pub mod toml;

use defmt::*;

use lumiseg_core::DeviceConfig;

pub use toml::{parse_settings, ParseError};

/// Embedded configuration (edit display.toml and rebuild to customize)
const EMBEDDED_CONFIG: &str = include_str!("../../display.toml");

/// Load and validate the embedded configuration
pub fn load_config() -> DeviceConfig {
    let settings = match parse_settings(EMBEDDED_CONFIG) {
        Ok(settings) => settings,
        Err(e) => {
            error!("display.toml parse error: {}, using defaults", e);
            return DeviceConfig::default();
        }
    };

    match DeviceConfig::from_settings(&settings) {
        Ok(config) => {
            info!(
                "Display config: addr={=u8:#x}, interval={}ms, derived={}",
                config.address,
                config.update_interval_ms,
                config.is_derived()
            );
            config
        }
        Err(e) => {
            error!("display.toml rejected: {}, using defaults", e);
            DeviceConfig::default()
        }
    }
}
