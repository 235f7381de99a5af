//! Inter-task communication
//!
//! The light task publishes into a lock-free [`SharedReading`] so the
//! display task can read it from inside a synchronous tick without ever
//! waiting. Control requests travel over embassy-sync signals.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

use lumiseg_core::AmbientSensor;

/// Quiet NaN bit pattern, stored while there is no reading
const NO_VALUE: u32 = 0x7FC0_0000;

/// Latest sensor value as f32 bits
pub struct SharedReading(AtomicU32);

impl SharedReading {
    /// Empty reading
    pub const fn new() -> Self {
        Self(AtomicU32::new(NO_VALUE))
    }

    /// Replace the reading; `None` (or NaN) clears it
    pub fn publish(&self, value: Option<f32>) {
        let bits = value.map_or(NO_VALUE, f32::to_bits);
        self.0.store(bits, Ordering::Relaxed);
    }

    /// Latest reading, if any
    pub fn get(&self) -> Option<f32> {
        let value = f32::from_bits(self.0.load(Ordering::Relaxed));
        (!value.is_nan()).then_some(value)
    }
}

impl Default for SharedReading {
    fn default() -> Self {
        Self::new()
    }
}

impl AmbientSensor for &SharedReading {
    fn current_value(&mut self) -> Option<f32> {
        self.get()
    }
}

/// Ambient light in percent of full scale (updated by the light task)
pub static LIGHT_LEVEL: SharedReading = SharedReading::new();

/// Display enable requests (true = resume, false = suspend)
pub static DISPLAY_ENABLE: Signal<CriticalSectionRawMutex, bool> = Signal::new();
