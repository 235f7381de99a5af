//! Ambient sensor implementations

pub mod light;

pub use light::{AdcLightSensor, AdcReader, LightScale};
