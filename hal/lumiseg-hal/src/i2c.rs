//! I2C bus abstractions
//!
//! Provides the write-only I2C master trait the display driver needs,
//! plus a chip-independent error type every bus error is folded into.

use core::fmt;

/// Error from I2C operations
///
/// Chip-specific errors are mapped into this set so the driver can record
/// and log them without knowing the HAL in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// Bus error (misplaced START/STOP)
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received (device absent or busy)
    Nack,
    /// Overrun / underrun
    Overrun,
    /// Other error
    Other,
}

impl fmt::Display for I2cError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            I2cError::Bus => "bus error",
            I2cError::ArbitrationLost => "arbitration lost",
            I2cError::Nack => "no acknowledge",
            I2cError::Overrun => "overrun",
            I2cError::Other => "other bus error",
        };
        f.write_str(msg)
    }
}

/// I2C bus master
///
/// One call to [`I2cBus::write`] is one bus transaction: START, address,
/// the given bytes, STOP. Implementations are expected to bound the
/// transaction with their own timeout.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: Into<I2cError>;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write (first byte is the command or register)
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;
}

impl<T: I2cBus + ?Sized> I2cBus for &mut T {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        T::write(self, address, data)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz, the HT16K33 maximum)
    pub const FAST: Self = Self { frequency: 400_000 };
}
