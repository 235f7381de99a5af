//! Display intensity: codes, modes and the per-tick resolver
//!
//! The HT16K33 accepts 16 brightness levels. Lumiseg counts them 1..=16
//! (the wire nibble is `code - 1`). Brightness is either fixed for the
//! lifetime of the device or derived every tick from a sensor through a
//! [`CalibrationTable`].

use core::fmt;

use crate::calibration::CalibrationTable;
use crate::sensor::AmbientSensor;

/// Brightness level accepted by the controller, always within 1..=16
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntensityCode(u8);

impl IntensityCode {
    /// Dimmest level
    pub const MIN: Self = Self(1);

    /// Brightest level
    pub const MAX: Self = Self(16);

    /// Level used when nothing is configured
    pub const DEFAULT: Self = Self(7);

    /// Create a code, `None` outside 1..=16
    pub const fn new(code: u8) -> Option<Self> {
        if code >= Self::MIN.0 && code <= Self::MAX.0 {
            Some(Self(code))
        } else {
            None
        }
    }

    /// Nearest code for a (possibly fractional, possibly out of range) level
    ///
    /// Clamps to 1..=16, then rounds half up. The level must be finite.
    pub fn from_level(level: f32) -> Self {
        let clamped = level.clamp(Self::MIN.0 as f32, Self::MAX.0 as f32);
        // Positive after the clamp, so truncation is floor
        Self((clamped + 0.5) as u8)
    }

    /// Code as 1..=16
    pub const fn get(self) -> u8 {
        self.0
    }

    /// 4-bit dimming value sent to the controller (0..=15)
    pub const fn duty_nibble(self) -> u8 {
        self.0 - 1
    }
}

impl Default for IntensityCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for IntensityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/16", self.0)
    }
}

/// Sensor-derived brightness settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DerivedIntensity {
    /// Sensor value to intensity level curve
    pub table: CalibrationTable,
    /// Code used until the sensor delivers its first reading
    pub fallback: IntensityCode,
    /// Extra margin (in intensity levels) before switching to another code
    pub hysteresis: f32,
}

impl DerivedIntensity {
    /// Derived intensity with the default fallback and no hysteresis
    pub fn new(table: CalibrationTable) -> Self {
        Self {
            table,
            fallback: IntensityCode::MIN,
            hysteresis: 0.0,
        }
    }

    /// Override the fallback code
    pub fn with_fallback(mut self, fallback: IntensityCode) -> Self {
        self.fallback = fallback;
        self
    }

    /// Override the switching hysteresis
    pub fn with_hysteresis(mut self, hysteresis: f32) -> Self {
        self.hysteresis = hysteresis;
        self
    }

    /// Intensity level for a sensor reading, before rounding
    pub fn level(&self, sensor_value: f32) -> f32 {
        self.table.interpolate(sensor_value)
    }
}

/// How the brightness of a device is chosen
///
/// Exactly one mode is active per device and it never changes at runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntensityMode {
    /// Constant brightness
    Fixed(IntensityCode),
    /// Brightness follows a sensor through a calibration curve
    Derived(DerivedIntensity),
}

impl Default for IntensityMode {
    fn default() -> Self {
        IntensityMode::Fixed(IntensityCode::DEFAULT)
    }
}

/// The sensor has no usable value right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorUnavailable;

impl fmt::Display for SensorUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sensor has no value")
    }
}

/// Resolve a mode to a code without any memory of previous ticks
///
/// `Fixed` never fails. `Derived` fails when the sensor returns nothing or
/// a non-finite value.
pub fn try_resolve<S>(mode: &IntensityMode, sensor: &mut S) -> Result<IntensityCode, SensorUnavailable>
where
    S: AmbientSensor + ?Sized,
{
    match mode {
        IntensityMode::Fixed(code) => Ok(*code),
        IntensityMode::Derived(derived) => {
            let value = read_finite(sensor)?;
            Ok(IntensityCode::from_level(derived.level(value)))
        }
    }
}

fn read_finite<S: AmbientSensor + ?Sized>(sensor: &mut S) -> Result<f32, SensorUnavailable> {
    match sensor.current_value() {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(SensorUnavailable),
    }
}

/// Where a resolved code came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResolutionOrigin {
    /// Fixed mode
    Fixed,
    /// Fresh sensor reading
    Sensor,
    /// Sensor unavailable, previous good code kept
    Held,
    /// Sensor never reported, configured fallback used
    Fallback,
}

/// Outcome of one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    /// Code to display
    pub code: IntensityCode,
    /// How it was obtained
    pub origin: ResolutionOrigin,
}

/// Stateful resolver used once per refresh tick
///
/// Remembers the last code derived from a real reading, so a sensor that
/// drops out keeps the display at its last brightness instead of failing
/// the tick.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IntensityResolver {
    last_good: Option<IntensityCode>,
}

impl IntensityResolver {
    /// Create a resolver with no history
    pub const fn new() -> Self {
        Self { last_good: None }
    }

    /// Last code derived from a real reading
    pub fn last_good(&self) -> Option<IntensityCode> {
        self.last_good
    }

    /// Resolve the code for this tick; never fails
    pub fn resolve<S>(&mut self, mode: &IntensityMode, sensor: &mut S) -> Resolution
    where
        S: AmbientSensor + ?Sized,
    {
        let derived = match mode {
            IntensityMode::Fixed(code) => {
                return Resolution {
                    code: *code,
                    origin: ResolutionOrigin::Fixed,
                }
            }
            IntensityMode::Derived(derived) => derived,
        };

        let value = match read_finite(sensor) {
            Ok(v) => v,
            Err(SensorUnavailable) => {
                return match self.last_good {
                    Some(code) => Resolution {
                        code,
                        origin: ResolutionOrigin::Held,
                    },
                    None => Resolution {
                        code: derived.fallback,
                        origin: ResolutionOrigin::Fallback,
                    },
                };
            }
        };

        let level = derived.level(value);
        let candidate = IntensityCode::from_level(level);
        let code = match self.last_good {
            Some(held) if held != candidate && !beyond_margin(level, held, derived.hysteresis) => {
                held
            }
            _ => candidate,
        };

        self.last_good = Some(code);
        Resolution {
            code,
            origin: ResolutionOrigin::Sensor,
        }
    }
}

/// True when `level` is far enough from `held` to justify switching
fn beyond_margin(level: f32, held: IntensityCode, hysteresis: f32) -> bool {
    let distance = level - held.get() as f32;
    let distance = if distance < 0.0 { -distance } else { distance };
    distance >= 0.5 + hysteresis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CalibrationPoint;
    use proptest::prelude::*;

    struct Fake(Option<f32>);

    impl AmbientSensor for Fake {
        fn current_value(&mut self) -> Option<f32> {
            self.0
        }
    }

    fn linear_mode() -> IntensityMode {
        let table = CalibrationTable::build(&[
            CalibrationPoint::new(0.0, 1.0),
            CalibrationPoint::new(100.0, 16.0),
        ])
        .unwrap();
        IntensityMode::Derived(DerivedIntensity::new(table))
    }

    #[test]
    fn test_code_range() {
        assert_eq!(IntensityCode::new(0), None);
        assert_eq!(IntensityCode::new(17), None);
        assert_eq!(IntensityCode::new(1), Some(IntensityCode::MIN));
        assert_eq!(IntensityCode::new(16), Some(IntensityCode::MAX));
        assert_eq!(IntensityCode::MAX.duty_nibble(), 0x0F);
        assert_eq!(IntensityCode::MIN.duty_nibble(), 0x00);
    }

    #[test]
    fn test_from_level_rounds_half_up() {
        assert_eq!(IntensityCode::from_level(8.5).get(), 9);
        assert_eq!(IntensityCode::from_level(8.49).get(), 8);
        assert_eq!(IntensityCode::from_level(1.5).get(), 2);
        assert_eq!(IntensityCode::from_level(15.5).get(), 16);
    }

    #[test]
    fn test_from_level_clamps() {
        assert_eq!(IntensityCode::from_level(-40.0), IntensityCode::MIN);
        assert_eq!(IntensityCode::from_level(0.2), IntensityCode::MIN);
        assert_eq!(IntensityCode::from_level(99.0), IntensityCode::MAX);
    }

    #[test]
    fn test_fixed_ignores_sensor() {
        let mode = IntensityMode::Fixed(IntensityCode::new(7).unwrap());
        assert_eq!(try_resolve(&mode, &mut Fake(None)).unwrap().get(), 7);

        let mut resolver = IntensityResolver::new();
        let r = resolver.resolve(&mode, &mut Fake(Some(1000.0)));
        assert_eq!(r.code.get(), 7);
        assert_eq!(r.origin, ResolutionOrigin::Fixed);
    }

    #[test]
    fn test_derived_midpoint_rounds_to_nine() {
        let mode = linear_mode();
        assert_eq!(try_resolve(&mode, &mut Fake(Some(50.0))).unwrap().get(), 9);
    }

    #[test]
    fn test_try_resolve_reports_unavailable() {
        let mode = linear_mode();
        assert_eq!(try_resolve(&mode, &mut Fake(None)), Err(SensorUnavailable));
        assert_eq!(
            try_resolve(&mode, &mut Fake(Some(f32::NAN))),
            Err(SensorUnavailable)
        );
    }

    #[test]
    fn test_first_tick_without_value_uses_fallback() {
        let mode = linear_mode();
        let mut resolver = IntensityResolver::new();
        let r = resolver.resolve(&mode, &mut Fake(None));
        assert_eq!(r.code, IntensityCode::MIN);
        assert_eq!(r.origin, ResolutionOrigin::Fallback);
        assert_eq!(resolver.last_good(), None);
    }

    #[test]
    fn test_configured_fallback() {
        let table = CalibrationTable::build(&[
            CalibrationPoint::new(0.0, 1.0),
            CalibrationPoint::new(100.0, 16.0),
        ])
        .unwrap();
        let mode = IntensityMode::Derived(
            DerivedIntensity::new(table).with_fallback(IntensityCode::new(5).unwrap()),
        );
        let r = IntensityResolver::new().resolve(&mode, &mut Fake(None));
        assert_eq!(r.code.get(), 5);
    }

    #[test]
    fn test_dropout_holds_last_good() {
        let mode = linear_mode();
        let mut resolver = IntensityResolver::new();
        assert_eq!(resolver.resolve(&mode, &mut Fake(Some(100.0))).code.get(), 16);

        let r = resolver.resolve(&mode, &mut Fake(None));
        assert_eq!(r.code.get(), 16);
        assert_eq!(r.origin, ResolutionOrigin::Held);

        let r = resolver.resolve(&mode, &mut Fake(Some(f32::INFINITY)));
        assert_eq!(r.origin, ResolutionOrigin::Held);
    }

    #[test]
    fn test_hysteresis_delays_switch() {
        let table = CalibrationTable::build(&[
            CalibrationPoint::new(0.0, 0.0),
            CalibrationPoint::new(16.0, 16.0),
        ])
        .unwrap();
        let mode = IntensityMode::Derived(DerivedIntensity::new(table).with_hysteresis(0.25));
        let mut resolver = IntensityResolver::new();

        assert_eq!(resolver.resolve(&mode, &mut Fake(Some(8.0))).code.get(), 8);
        // 8.6 rounds to 9 but sits inside the 0.75 margin
        assert_eq!(resolver.resolve(&mode, &mut Fake(Some(8.6))).code.get(), 8);
        // 8.8 clears it
        assert_eq!(resolver.resolve(&mode, &mut Fake(Some(8.8))).code.get(), 9);
    }

    #[test]
    fn test_zero_hysteresis_matches_rounding() {
        let mode = linear_mode();
        let mut resolver = IntensityResolver::new();
        for value in [0.0, 50.0, 49.0, 10.0, 100.0, 33.3] {
            let expected = try_resolve(&mode, &mut Fake(Some(value))).unwrap();
            assert_eq!(resolver.resolve(&mode, &mut Fake(Some(value))).code, expected);
        }
    }

    proptest! {
        #[test]
        fn prop_resolved_code_in_range(value in proptest::num::f32::ANY) {
            let mode = linear_mode();
            let mut resolver = IntensityResolver::new();
            let code = resolver.resolve(&mode, &mut Fake(Some(value))).code.get();
            prop_assert!((1..=16).contains(&code));
        }

        #[test]
        fn prop_from_level_in_range(level in -1e6f32..1e6) {
            let code = IntensityCode::from_level(level).get();
            prop_assert!((1..=16).contains(&code));
        }
    }
}
