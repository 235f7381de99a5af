//! Calibration table
//!
//! Maps a raw sensor value (ambient light, usually) onto a display
//! intensity level. Points are supplied unordered, sorted once at build
//! time, and never change afterwards. Queries outside the table range are
//! clamped to the nearest end point.

use core::fmt;

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of calibration points per table
pub const MAX_CALIBRATION_POINTS: usize = 32;

/// One calibration pair: at `sensor`, the display should be at `intensity`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationPoint {
    /// Sensor reading (table key)
    pub sensor: f32,
    /// Target intensity level (may be fractional)
    pub intensity: f32,
}

impl CalibrationPoint {
    /// Create a new calibration point
    pub const fn new(sensor: f32, intensity: f32) -> Self {
        Self { sensor, intensity }
    }
}

/// Errors from building a calibration table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// No points supplied
    Empty,
    /// A single point cannot be interpolated
    InsufficientPoints,
    /// Two points share the same sensor value
    DuplicateKey,
    /// Keys not strictly increasing (strict constructor only)
    Unsorted,
    /// NaN or infinite coordinate
    NonFinite,
    /// More than [`MAX_CALIBRATION_POINTS`] points
    TooManyPoints,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CalibrationError::Empty => "calibration table is empty",
            CalibrationError::InsufficientPoints => "calibration table needs at least 2 points",
            CalibrationError::DuplicateKey => "duplicate sensor value in calibration table",
            CalibrationError::Unsorted => "calibration sensor values must be strictly increasing",
            CalibrationError::NonFinite => "calibration values must be finite",
            CalibrationError::TooManyPoints => "too many calibration points",
        };
        f.write_str(msg)
    }
}

/// Sorted, validated calibration curve
///
/// Invariant: at least two points, keys strictly increasing, all values
/// finite.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationTable {
    points: Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>,
}

impl CalibrationTable {
    /// Build a table from points in any order
    ///
    /// Points are sorted by sensor value before validation.
    pub fn build(points: &[CalibrationPoint]) -> Result<Self, CalibrationError> {
        let mut sorted = collect(points)?;
        sorted.sort_unstable_by(|a, b| a.sensor.total_cmp(&b.sensor));

        if sorted.windows(2).any(|w| w[0].sensor == w[1].sensor) {
            return Err(CalibrationError::DuplicateKey);
        }

        Ok(Self { points: sorted })
    }

    /// Build a table from points already in ascending sensor order
    ///
    /// Fails with [`CalibrationError::Unsorted`] instead of reordering.
    pub fn from_sorted(points: &[CalibrationPoint]) -> Result<Self, CalibrationError> {
        let points = collect(points)?;

        for w in points.windows(2) {
            if w[0].sensor == w[1].sensor {
                return Err(CalibrationError::DuplicateKey);
            }
            if w[0].sensor > w[1].sensor {
                return Err(CalibrationError::Unsorted);
            }
        }

        Ok(Self { points })
    }

    /// Points in ascending sensor order
    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a built table holds at least two points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Smallest sensor key
    pub fn min_sensor(&self) -> f32 {
        self.first().sensor
    }

    /// Largest sensor key
    pub fn max_sensor(&self) -> f32 {
        self.last().sensor
    }

    /// Intensity level for a sensor value
    ///
    /// Flat outside the table range, linear between the bracketing points.
    /// A NaN query maps to the intensity at the smallest key.
    pub fn interpolate(&self, x: f32) -> f32 {
        let first = self.first();
        let last = self.last();

        if x.is_nan() || x <= first.sensor {
            return first.intensity;
        }
        if x >= last.sensor {
            return last.intensity;
        }

        // First index whose key is >= x; in 1..len because of the clamps above
        let upper = self.points.partition_point(|p| p.sensor < x);
        let (Some(&p0), Some(&p1)) = (
            upper.checked_sub(1).and_then(|i| self.points.get(i)),
            self.points.get(upper),
        ) else {
            return first.intensity;
        };

        if x == p1.sensor {
            return p1.intensity;
        }

        let t = (x - p0.sensor) / (p1.sensor - p0.sensor);
        p0.intensity + (p1.intensity - p0.intensity) * t
    }

    fn first(&self) -> &CalibrationPoint {
        // Non-empty by construction
        &self.points[0]
    }

    fn last(&self) -> &CalibrationPoint {
        &self.points[self.points.len() - 1]
    }
}

/// Copy points into fixed storage, checking count and finiteness
fn collect(
    points: &[CalibrationPoint],
) -> Result<Vec<CalibrationPoint, MAX_CALIBRATION_POINTS>, CalibrationError> {
    match points.len() {
        0 => return Err(CalibrationError::Empty),
        1 => return Err(CalibrationError::InsufficientPoints),
        _ => {}
    }

    if points
        .iter()
        .any(|p| !p.sensor.is_finite() || !p.intensity.is_finite())
    {
        return Err(CalibrationError::NonFinite);
    }

    Vec::from_slice(points).map_err(|_| CalibrationError::TooManyPoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(points: &[(f32, f32)]) -> CalibrationTable {
        let pts: std::vec::Vec<_> = points
            .iter()
            .map(|&(s, i)| CalibrationPoint::new(s, i))
            .collect();
        CalibrationTable::build(&pts).unwrap()
    }

    #[test]
    fn test_build_sorts_points() {
        let t = table(&[(100.0, 16.0), (0.0, 1.0), (50.0, 4.0)]);
        let keys: std::vec::Vec<f32> = t.points().iter().map(|p| p.sensor).collect();
        assert_eq!(keys, [0.0, 50.0, 100.0]);
        assert_eq!(t.min_sensor(), 0.0);
        assert_eq!(t.max_sensor(), 100.0);
    }

    #[test]
    fn test_build_rejects_empty_and_single() {
        assert_eq!(CalibrationTable::build(&[]), Err(CalibrationError::Empty));
        assert_eq!(
            CalibrationTable::build(&[CalibrationPoint::new(1.0, 1.0)]),
            Err(CalibrationError::InsufficientPoints)
        );
    }

    #[test]
    fn test_build_rejects_duplicate_keys() {
        let pts = [
            CalibrationPoint::new(10.0, 1.0),
            CalibrationPoint::new(20.0, 5.0),
            CalibrationPoint::new(10.0, 3.0),
        ];
        assert_eq!(
            CalibrationTable::build(&pts),
            Err(CalibrationError::DuplicateKey)
        );
    }

    #[test]
    fn test_build_rejects_non_finite() {
        let pts = [
            CalibrationPoint::new(f32::NAN, 1.0),
            CalibrationPoint::new(20.0, 5.0),
        ];
        assert_eq!(CalibrationTable::build(&pts), Err(CalibrationError::NonFinite));

        let pts = [
            CalibrationPoint::new(0.0, 1.0),
            CalibrationPoint::new(20.0, f32::INFINITY),
        ];
        assert_eq!(CalibrationTable::build(&pts), Err(CalibrationError::NonFinite));
    }

    #[test]
    fn test_build_rejects_too_many_points() {
        let pts: std::vec::Vec<_> = (0..=MAX_CALIBRATION_POINTS)
            .map(|i| CalibrationPoint::new(i as f32, 1.0))
            .collect();
        assert_eq!(
            CalibrationTable::build(&pts),
            Err(CalibrationError::TooManyPoints)
        );
    }

    #[test]
    fn test_from_sorted_rejects_unsorted() {
        let pts = [
            CalibrationPoint::new(50.0, 8.0),
            CalibrationPoint::new(10.0, 2.0),
        ];
        assert_eq!(
            CalibrationTable::from_sorted(&pts),
            Err(CalibrationError::Unsorted)
        );
        assert!(CalibrationTable::build(&pts).is_ok());
    }

    #[test]
    fn test_interpolate_midpoint() {
        let t = table(&[(0.0, 1.0), (100.0, 16.0)]);
        assert_eq!(t.interpolate(50.0), 8.5);
        assert_eq!(t.interpolate(20.0), 4.0);
    }

    #[test]
    fn test_interpolate_clamps_outside_range() {
        let t = table(&[(10.0, 2.0), (20.0, 12.0)]);
        assert_eq!(t.interpolate(-1000.0), 2.0);
        assert_eq!(t.interpolate(10.0), 2.0);
        assert_eq!(t.interpolate(20.0), 12.0);
        assert_eq!(t.interpolate(1e9), 12.0);
    }

    #[test]
    fn test_interpolate_multi_segment() {
        let t = table(&[(0.0, 1.0), (10.0, 3.0), (110.0, 13.0)]);
        assert_eq!(t.interpolate(5.0), 2.0);
        assert_eq!(t.interpolate(60.0), 8.0);
    }

    #[test]
    fn test_decreasing_curve() {
        // Brighter room, dimmer display is allowed too
        let t = table(&[(0.0, 16.0), (100.0, 1.0)]);
        assert_eq!(t.interpolate(50.0), 8.5);
        assert_eq!(t.interpolate(200.0), 1.0);
    }

    fn sorted_points() -> impl Strategy<Value = std::vec::Vec<CalibrationPoint>> {
        prop::collection::btree_set(-10_000i32..10_000, 2..MAX_CALIBRATION_POINTS)
            .prop_flat_map(|keys| {
                let n = keys.len();
                (
                    Just(keys),
                    prop::collection::vec(1.0f32..16.0, n),
                )
            })
            .prop_map(|(keys, values)| {
                keys.into_iter()
                    .zip(values)
                    .map(|(k, v)| CalibrationPoint::new(k as f32, v))
                    .collect()
            })
    }

    #[test]
    fn test_nan_query_uses_lowest_key() {
        let t = table(&[(0.0, 1.0), (100.0, 16.0)]);
        assert_eq!(t.interpolate(f32::NAN), 1.0);
        assert_eq!(t.interpolate(f32::INFINITY), 16.0);
        assert_eq!(t.interpolate(f32::NEG_INFINITY), 1.0);
    }

    proptest! {
        #[test]
        fn prop_non_finite_query_stays_in_range(points in sorted_points()) {
            let t = CalibrationTable::build(&points).unwrap();
            let lo = points.iter().map(|p| p.intensity).fold(f32::INFINITY, f32::min);
            let hi = points.iter().map(|p| p.intensity).fold(f32::NEG_INFINITY, f32::max);
            for x in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
                let y = t.interpolate(x);
                prop_assert!(y >= lo && y <= hi);
            }
        }

        #[test]
        fn prop_exact_keys_return_their_value(points in sorted_points()) {
            let t = CalibrationTable::build(&points).unwrap();
            for p in &points {
                prop_assert_eq!(t.interpolate(p.sensor), p.intensity);
            }
        }

        #[test]
        fn prop_flat_outside_range(points in sorted_points(), below in 1.0f32..1e6, above in 1.0f32..1e6) {
            let t = CalibrationTable::build(&points).unwrap();
            let first = points[0];
            let last = points[points.len() - 1];
            prop_assert_eq!(t.interpolate(first.sensor - below), first.intensity);
            prop_assert_eq!(t.interpolate(last.sensor + above), last.intensity);
        }

        #[test]
        fn prop_no_overshoot_between_neighbours(points in sorted_points(), frac in 0.0f32..1.0) {
            let t = CalibrationTable::build(&points).unwrap();
            for w in points.windows(2) {
                let x = w[0].sensor + (w[1].sensor - w[0].sensor) * frac;
                let y = t.interpolate(x);
                let lo = w[0].intensity.min(w[1].intensity);
                let hi = w[0].intensity.max(w[1].intensity);
                prop_assert!(y >= lo - 1e-4 && y <= hi + 1e-4);
            }
        }

        #[test]
        fn prop_monotonic_for_monotonic_points(
            keys in prop::collection::btree_set(-1000i32..1000, 2..16),
            a in -2000.0f32..2000.0,
            b in -2000.0f32..2000.0,
        ) {
            // Intensity rises with the key
            let points: std::vec::Vec<_> = keys
                .iter()
                .enumerate()
                .map(|(i, &k)| CalibrationPoint::new(k as f32, 1.0 + i as f32))
                .collect();
            let t = CalibrationTable::build(&points).unwrap();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(t.interpolate(lo) <= t.interpolate(hi) + 1e-4);
        }
    }
}
