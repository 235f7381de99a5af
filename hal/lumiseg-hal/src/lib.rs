//! Lumiseg Hardware Abstraction Layer
//!
//! This crate defines the bus abstraction the display driver talks to.
//! Chip-specific HALs either implement [`I2cBus`] directly or go through
//! the [`HalI2c`] adapter for any `embedded-hal` 1.0 I2C master.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (lumiseg-firmware, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumiseg-drivers (HT16K33 refresh)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lumiseg-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  embassy-rp / any embedded-hal I2C      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - I2C master writes

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "embedded-hal")]
pub mod embedded;
pub mod i2c;

// Re-export key items at crate root for convenience
#[cfg(feature = "embedded-hal")]
pub use embedded::HalI2c;
pub use i2c::{I2cBus, I2cConfig, I2cError};
