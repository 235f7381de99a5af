//! `embedded-hal` 1.0 adapter
//!
//! Wraps any blocking `embedded_hal::i2c::I2c` master so it can be used as
//! an [`I2cBus`]. Used by the firmware with the embassy-rp I2C peripheral.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::i2c::{I2cBus, I2cError};

/// Map an `embedded-hal` error kind into the bus error taxonomy
pub fn map_error_kind(kind: ErrorKind) -> I2cError {
    match kind {
        ErrorKind::Bus => I2cError::Bus,
        ErrorKind::ArbitrationLoss => I2cError::ArbitrationLost,
        ErrorKind::NoAcknowledge(_) => I2cError::Nack,
        ErrorKind::Overrun => I2cError::Overrun,
        _ => I2cError::Other,
    }
}

/// [`I2cBus`] implementation over an `embedded-hal` I2C master
pub struct HalI2c<T> {
    inner: T,
}

impl<T> HalI2c<T> {
    /// Wrap an I2C master
    pub const fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Give back the wrapped master
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: I2c> I2cBus for HalI2c<T> {
    type Error = I2cError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        self.inner
            .write(address, data)
            .map_err(|e| map_error_kind(e.kind()))
    }
}
