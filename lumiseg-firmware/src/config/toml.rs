//! Minimal TOML reader for display.toml
//!
//! Handles only the subset the display configuration uses. Syntax is
//! already checked by build.rs with the full `toml` crate, so this parser
//! only has to extract values without allocating.
//!
//! Supported:
//! - Root-level `key = value` pairs (integer incl. `0x` hex, float,
//!   boolean, quoted string)
//! - `[[intensity_map]]` array-of-tables entries with `sensor`/`intensity`
//! - Comments (# ...)

use lumiseg_core::config::BlinkRate;
use lumiseg_core::{CalibrationPoint, DisplaySettings};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// More map entries than the calibration table holds
    TooManyItems,
    /// Map entry without both `sensor` and `intensity`
    IncompleteEntry,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Root,
    IntensityMap,
}

/// Map entry under construction
#[derive(Debug, Default, Clone, Copy)]
struct PendingPoint {
    sensor: Option<f32>,
    intensity: Option<f32>,
}

/// Parse display.toml into raw settings
///
/// Keys not listed here are ignored.
pub fn parse_settings(input: &str) -> Result<DisplaySettings, ParseError> {
    let mut settings = DisplaySettings::default();
    let mut section = Section::Root;
    let mut pending: Option<PendingPoint> = None;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            flush_point(&mut pending, &mut settings)?;
            section = parse_section_header(line)?;
            if section == Section::IntensityMap {
                pending = Some(PendingPoint::default());
            }
            continue;
        }

        let Some((key, value)) = parse_key_value(line) else {
            continue;
        };

        match section {
            Section::Root => apply_root(&mut settings, key, value)?,
            Section::IntensityMap => {
                let point = pending.as_mut().ok_or(ParseError::InvalidSection)?;
                match key {
                    "sensor" => point.sensor = Some(parse_float(value)?),
                    "intensity" => point.intensity = Some(parse_float(value)?),
                    _ => {}
                }
            }
        }
    }

    flush_point(&mut pending, &mut settings)?;
    Ok(settings)
}

fn apply_root(settings: &mut DisplaySettings, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "address" => settings.address = parse_int(value)?,
        "intensity" => settings.intensity = Some(parse_int(value)?),
        "inverted" => settings.inverted = parse_bool(value)?,
        "update_interval_ms" => settings.update_interval_ms = parse_int(value)?,
        "blink" => settings.blink = parse_blink(value)?,
        "fallback_intensity" => settings.fallback_intensity = Some(parse_int(value)?),
        "hysteresis" => settings.hysteresis = Some(parse_float(value)?),
        _ => {} // Ignore unknown keys
    }
    Ok(())
}

fn flush_point(
    pending: &mut Option<PendingPoint>,
    settings: &mut DisplaySettings,
) -> Result<(), ParseError> {
    let Some(point) = pending.take() else {
        return Ok(());
    };
    match (point.sensor, point.intensity) {
        (Some(sensor), Some(intensity)) => settings
            .intensity_map
            .push(CalibrationPoint::new(sensor, intensity))
            .map_err(|_| ParseError::TooManyItems),
        _ => Err(ParseError::IncompleteEntry),
    }
}

fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let name = line
        .strip_prefix("[[")
        .and_then(|rest| rest.strip_suffix("]]"))
        .map(str::trim);

    match name {
        Some("intensity_map") => Ok(Section::IntensityMap),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments outside strings
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let value = strip_underscores(value);
    let raw = match value.as_str().strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.as_str().parse(),
    }
    .map_err(|_| ParseError::InvalidValue)?;
    T::try_from(raw).map_err(|_| ParseError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_blink(value: &str) -> Result<BlinkRate, ParseError> {
    match parse_string(value) {
        "off" => Ok(BlinkRate::Off),
        "hz2" => Ok(BlinkRate::Hz2),
        "hz1" => Ok(BlinkRate::Hz1),
        "half_hz" => Ok(BlinkRate::HalfHz),
        _ => Err(ParseError::InvalidValue),
    }
}

/// TOML allows `1_000`; copy without separators
fn strip_underscores(value: &str) -> heapless::String<16> {
    let mut out = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        // Overlong numbers fail to parse later
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# comment
address = 0x71
update_interval_ms = 2_000
inverted = true   # mounted upside down
blink = "hz1"
fallback_intensity = 4
hysteresis = 0.25

[[intensity_map]]
sensor = 0.0
intensity = 1

[[intensity_map]]
sensor = 100
intensity = 16.0
"#;

    #[test]
    fn test_parse_sample() {
        let settings = parse_settings(SAMPLE).unwrap();
        assert_eq!(settings.address, 0x71);
        assert_eq!(settings.update_interval_ms, 2000);
        assert!(settings.inverted);
        assert_eq!(settings.blink, BlinkRate::Hz1);
        assert_eq!(settings.fallback_intensity, Some(4));
        assert_eq!(settings.hysteresis, Some(0.25));
        assert_eq!(settings.intensity, None);
        assert_eq!(settings.intensity_map.len(), 2);
        assert_eq!(settings.intensity_map[1], CalibrationPoint::new(100.0, 16.0));
    }

    #[test]
    fn test_defaults_when_empty() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings, DisplaySettings::default());
    }

    #[test]
    fn test_incomplete_map_entry() {
        let input = "[[intensity_map]]\nsensor = 1.0\n";
        assert_eq!(parse_settings(input), Err(ParseError::IncompleteEntry));
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(parse_settings("[display]\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(parse_settings("address = 0x1FF"), Err(ParseError::InvalidValue));
        assert_eq!(parse_settings("inverted = yes"), Err(ParseError::InvalidValue));
        assert_eq!(parse_settings("blink = \"fast\""), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_parse_key_value_strips_comment() {
        assert_eq!(parse_key_value("a = 1 # x"), Some(("a", "1")));
        assert_eq!(parse_key_value("s = \"#1\""), Some(("s", "\"#1\"")));
        assert_eq!(parse_key_value("novalue ="), None);
    }
}
