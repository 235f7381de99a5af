//! Ambient sensor trait

/// Source of the value that drives derived brightness
///
/// Called synchronously from the refresh tick, so implementations must
/// return immediately: hand back a cached reading, or `None` if no reading
/// has arrived yet or the sensor is currently unusable.
pub trait AmbientSensor {
    /// Latest sensor value, if any
    fn current_value(&mut self) -> Option<f32>;
}

impl<T: AmbientSensor + ?Sized> AmbientSensor for &mut T {
    fn current_value(&mut self) -> Option<f32> {
        T::current_value(self)
    }
}

/// Placeholder sensor for devices with fixed brightness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NoSensor;

impl AmbientSensor for NoSensor {
    fn current_value(&mut self) -> Option<f32> {
        None
    }
}
