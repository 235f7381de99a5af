//! Device configuration
//!
//! [`DisplaySettings`] is what the host hands over (parsed from the
//! firmware's `display.toml`, or built in code). [`DeviceConfig::from_settings`]
//! turns it into the immutable [`DeviceConfig`] the driver runs on, rejecting
//! combinations that make no sense before anything reaches the bus.

use core::fmt;

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calibration::{
    CalibrationError, CalibrationPoint, CalibrationTable, MAX_CALIBRATION_POINTS,
};
use crate::intensity::{DerivedIntensity, IntensityCode, IntensityMode};

/// Default 7-bit bus address (all address jumpers open)
pub const DEFAULT_ADDRESS: u8 = 0x70;

/// Default refresh period
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 1000;

/// Blink rate of the whole display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BlinkRate {
    /// Steady display
    #[default]
    Off,
    /// 2 Hz
    Hz2,
    /// 1 Hz
    Hz1,
    /// 0.5 Hz
    HalfHz,
}

impl BlinkRate {
    /// Two-bit blink field of the display setup command
    pub const fn bits(self) -> u8 {
        match self {
            BlinkRate::Off => 0b00,
            BlinkRate::Hz2 => 0b01,
            BlinkRate::Hz1 => 0b10,
            BlinkRate::HalfHz => 0b11,
        }
    }
}

/// Configuration errors, all fatal at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Both a fixed intensity and an intensity map were given
    ConflictingIntensity,
    /// Fixed or fallback intensity outside 1..=16
    IntensityOutOfRange,
    /// Address does not fit in 7 bits
    InvalidAddress,
    /// Refresh period of zero
    ZeroInterval,
    /// Hysteresis negative or not finite
    InvalidHysteresis,
    /// Fallback or hysteresis given without an intensity map
    DerivedSettingWithoutMap,
    /// Derived intensity configured but no sensor supplied
    MissingSensor,
    /// Intensity map rejected
    Calibration(CalibrationError),
}

impl From<CalibrationError> for ConfigError {
    fn from(e: CalibrationError) -> Self {
        ConfigError::Calibration(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConflictingIntensity => {
                f.write_str("do not specify intensity when using intensity_map")
            }
            ConfigError::IntensityOutOfRange => f.write_str("intensity must be within 1..=16"),
            ConfigError::InvalidAddress => f.write_str("address must be a 7-bit value"),
            ConfigError::ZeroInterval => f.write_str("update interval must be non-zero"),
            ConfigError::InvalidHysteresis => {
                f.write_str("hysteresis must be finite and not negative")
            }
            ConfigError::DerivedSettingWithoutMap => {
                f.write_str("fallback_intensity and hysteresis require intensity_map")
            }
            ConfigError::MissingSensor => f.write_str("intensity_map requires a sensor"),
            ConfigError::Calibration(e) => write!(f, "intensity_map: {}", e),
        }
    }
}

/// Raw display settings as supplied by the host
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplaySettings {
    /// 7-bit bus address
    pub address: u8,
    /// Fixed intensity (1..=16); defaults to 7 when no map is given
    pub intensity: Option<u8>,
    /// Display mounted upside down
    pub inverted: bool,
    /// Refresh period in milliseconds
    pub update_interval_ms: u32,
    /// Blink rate
    pub blink: BlinkRate,
    /// Sensor value to intensity pairs, any order
    pub intensity_map: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>,
    /// Intensity until the sensor reports (1..=16)
    pub fallback_intensity: Option<u8>,
    /// Switching margin in intensity levels
    pub hysteresis: Option<f32>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            intensity: None,
            inverted: false,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            blink: BlinkRate::Off,
            intensity_map: Vec::new(),
            fallback_intensity: None,
            hysteresis: None,
        }
    }
}

/// Validated, immutable device configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Refresh period in milliseconds
    pub update_interval_ms: u32,
    /// Reverse digit order before sending
    pub inverted: bool,
    /// Blink rate
    pub blink: BlinkRate,
    /// Brightness source
    pub intensity: IntensityMode,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            inverted: false,
            blink: BlinkRate::Off,
            intensity: IntensityMode::default(),
        }
    }
}

impl DeviceConfig {
    /// Default configuration with the given brightness source
    pub fn with_intensity(intensity: IntensityMode) -> Self {
        Self {
            intensity,
            ..Self::default()
        }
    }

    /// Validate host settings
    pub fn from_settings(settings: &DisplaySettings) -> Result<Self, ConfigError> {
        if settings.address > 0x7F {
            return Err(ConfigError::InvalidAddress);
        }
        if settings.update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let intensity = if settings.intensity_map.is_empty() {
            if settings.fallback_intensity.is_some() || settings.hysteresis.is_some() {
                return Err(ConfigError::DerivedSettingWithoutMap);
            }
            let code = match settings.intensity {
                Some(raw) => parse_code(raw)?,
                None => IntensityCode::DEFAULT,
            };
            IntensityMode::Fixed(code)
        } else {
            if settings.intensity.is_some() {
                return Err(ConfigError::ConflictingIntensity);
            }
            let table = CalibrationTable::build(&settings.intensity_map)?;
            let mut derived = DerivedIntensity::new(table);
            if let Some(raw) = settings.fallback_intensity {
                derived = derived.with_fallback(parse_code(raw)?);
            }
            if let Some(h) = settings.hysteresis {
                if !h.is_finite() || h < 0.0 {
                    return Err(ConfigError::InvalidHysteresis);
                }
                derived = derived.with_hysteresis(h);
            }
            IntensityMode::Derived(derived)
        };

        Ok(Self {
            address: settings.address,
            update_interval_ms: settings.update_interval_ms,
            inverted: settings.inverted,
            blink: settings.blink,
            intensity,
        })
    }

    /// Check if brightness follows a sensor
    pub fn is_derived(&self) -> bool {
        matches!(self.intensity, IntensityMode::Derived(_))
    }
}

fn parse_code(raw: u8) -> Result<IntensityCode, ConfigError> {
    IntensityCode::new(raw).ok_or(ConfigError::IntensityOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_map(points: &[(f32, f32)]) -> DisplaySettings {
        let mut settings = DisplaySettings::default();
        for &(s, i) in points {
            settings
                .intensity_map
                .push(CalibrationPoint::new(s, i))
                .unwrap();
        }
        settings
    }

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::from_settings(&DisplaySettings::default()).unwrap();
        assert_eq!(config.address, 0x70);
        assert_eq!(config.update_interval_ms, 1000);
        assert!(!config.inverted);
        assert_eq!(config.blink, BlinkRate::Off);
        assert_eq!(config.intensity, IntensityMode::Fixed(IntensityCode::DEFAULT));
        assert_eq!(config, DeviceConfig::default());
    }

    #[test]
    fn test_fixed_intensity() {
        let settings = DisplaySettings {
            intensity: Some(12),
            ..Default::default()
        };
        let config = DeviceConfig::from_settings(&settings).unwrap();
        assert_eq!(
            config.intensity,
            IntensityMode::Fixed(IntensityCode::new(12).unwrap())
        );
        assert!(!config.is_derived());
    }

    #[test]
    fn test_intensity_out_of_range() {
        for raw in [0u8, 17, 255] {
            let settings = DisplaySettings {
                intensity: Some(raw),
                ..Default::default()
            };
            assert_eq!(
                DeviceConfig::from_settings(&settings),
                Err(ConfigError::IntensityOutOfRange)
            );
        }
    }

    #[test]
    fn test_intensity_and_map_conflict() {
        let mut settings = with_map(&[(0.0, 1.0), (100.0, 16.0)]);
        settings.intensity = Some(7);
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::ConflictingIntensity)
        );
    }

    #[test]
    fn test_map_builds_derived_mode() {
        let mut settings = with_map(&[(100.0, 16.0), (0.0, 1.0)]);
        settings.fallback_intensity = Some(4);
        settings.hysteresis = Some(0.3);
        let config = DeviceConfig::from_settings(&settings).unwrap();
        match config.intensity {
            IntensityMode::Derived(derived) => {
                assert_eq!(derived.table.min_sensor(), 0.0);
                assert_eq!(derived.fallback.get(), 4);
                assert_eq!(derived.hysteresis, 0.3);
            }
            other => panic!("unexpected mode {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_map_rejected() {
        let settings = with_map(&[(10.0, 3.0)]);
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::Calibration(CalibrationError::InsufficientPoints))
        );

        let settings = with_map(&[(10.0, 3.0), (10.0, 5.0)]);
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::Calibration(CalibrationError::DuplicateKey))
        );
    }

    #[test]
    fn test_derived_settings_need_map() {
        let settings = DisplaySettings {
            fallback_intensity: Some(3),
            ..Default::default()
        };
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::DerivedSettingWithoutMap)
        );
    }

    #[test]
    fn test_bad_hysteresis() {
        let mut settings = with_map(&[(0.0, 1.0), (1.0, 2.0)]);
        settings.hysteresis = Some(-1.0);
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::InvalidHysteresis)
        );
    }

    #[test]
    fn test_address_and_interval_checks() {
        let settings = DisplaySettings {
            address: 0x80,
            ..Default::default()
        };
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::InvalidAddress)
        );

        let settings = DisplaySettings {
            update_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            DeviceConfig::from_settings(&settings),
            Err(ConfigError::ZeroInterval)
        );
    }

    #[test]
    fn test_blink_bits() {
        assert_eq!(BlinkRate::Off.bits(), 0);
        assert_eq!(BlinkRate::Hz2.bits(), 1);
        assert_eq!(BlinkRate::Hz1.bits(), 2);
        assert_eq!(BlinkRate::HalfHz.bits(), 3);
    }
}
