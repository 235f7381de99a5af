//! Board-agnostic core logic for the Lumiseg display firmware
//!
//! This crate contains everything that does not touch the bus:
//!
//! - Calibration table (sensor value to intensity curve)
//! - Intensity codes, modes and the per-tick resolver
//! - Device configuration and its validation
//! - Refresh state machine
//! - Display buffer plus the sensor and render traits

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod calibration;
pub mod config;
pub mod intensity;
pub mod render;
pub mod sensor;
pub mod state;

pub use buffer::DisplayBuffer;
pub use calibration::{CalibrationError, CalibrationPoint, CalibrationTable};
pub use config::{BlinkRate, ConfigError, DeviceConfig, DisplaySettings};
pub use intensity::{
    DerivedIntensity, IntensityCode, IntensityMode, IntensityResolver, Resolution,
    ResolutionOrigin, SensorUnavailable,
};
pub use render::{NoRender, Render};
pub use sensor::{AmbientSensor, NoSensor};
pub use state::{Event, FaultKind, State};
