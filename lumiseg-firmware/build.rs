//! Build script for lumiseg-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const BLINK_RATES: [&str; 4] = ["off", "hz2", "hz1", "half_hz"];
const MAX_MAP_ENTRIES: usize = 32;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}

/// Validate display.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: display.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a display.toml configuration file.        ║\n\
            ║  Please create one in the lumiseg-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read display.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            report(
                "Invalid TOML syntax in display.toml",
                &format_error_lines(&e.to_string()),
            );
        }
    };

    let mut errors = Vec::new();
    validate_device(&config, &mut errors);
    validate_intensity(&config, &mut errors);

    if !errors.is_empty() {
        report(
            "Invalid display configuration",
            &errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }

    println!("cargo:warning=display.toml validated successfully");
}

fn report(title: &str, body: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Address, interval, flags
fn validate_device(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("address") {
        Some(toml::Value::Integer(addr)) if !(0..=0x7F).contains(addr) => {
            errors.push("address must be a 7-bit value (0-127)".into());
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("address must be an integer".into()),
    }

    match config.get("update_interval_ms") {
        Some(toml::Value::Integer(ms)) if *ms <= 0 || *ms > u32::MAX as i64 => {
            errors.push("update_interval_ms must be a positive 32-bit value".into());
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push("update_interval_ms must be an integer".into()),
    }

    if let Some(v) = config.get("inverted") {
        if !v.is_bool() {
            errors.push("inverted must be true or false".into());
        }
    }

    if let Some(v) = config.get("blink") {
        match v.as_str() {
            Some(rate) if BLINK_RATES.contains(&rate) => {}
            _ => errors.push("blink must be 'off', 'hz2', 'hz1' or 'half_hz'".into()),
        }
    }
}

/// Fixed intensity or intensity map, never both
fn validate_intensity(config: &toml::Value, errors: &mut Vec<String>) {
    let check_code = |key: &str, errors: &mut Vec<String>| match config.get(key) {
        Some(toml::Value::Integer(code)) if !(1..=16).contains(code) => {
            errors.push(format!("{} must be 1-16", key));
        }
        Some(toml::Value::Integer(_)) | None => {}
        Some(_) => errors.push(format!("{} must be an integer", key)),
    };
    check_code("intensity", errors);
    check_code("fallback_intensity", errors);

    if let Some(h) = config.get("hysteresis") {
        match as_number(h) {
            Some(h) if h.is_finite() && h >= 0.0 => {}
            _ => errors.push("hysteresis must be a non-negative number".into()),
        }
    }

    let map = match config.get("intensity_map") {
        Some(toml::Value::Array(entries)) => entries,
        Some(_) => {
            errors.push("intensity_map must be an array of tables ([[intensity_map]])".into());
            return;
        }
        None => {
            for key in ["fallback_intensity", "hysteresis"] {
                if config.get(key).is_some() {
                    errors.push(format!("{} needs [[intensity_map]] entries", key));
                }
            }
            return;
        }
    };

    if config.get("intensity").is_some() {
        errors.push("set either intensity or [[intensity_map]], not both".into());
    }
    if map.len() < 2 {
        errors.push("[[intensity_map]] needs at least 2 entries".into());
    }
    if map.len() > MAX_MAP_ENTRIES {
        errors.push(format!("[[intensity_map]] allows at most {} entries", MAX_MAP_ENTRIES));
    }

    let mut keys = Vec::new();
    for (i, entry) in map.iter().enumerate() {
        let sensor = entry.get("sensor").and_then(as_number);
        let intensity = entry.get("intensity").and_then(as_number);
        match (sensor, intensity) {
            (Some(s), Some(v)) if s.is_finite() && v.is_finite() => {
                if keys.contains(&s) {
                    errors.push(format!("intensity_map entry {} repeats sensor {}", i, s));
                }
                keys.push(s);
            }
            _ => errors.push(format!(
                "intensity_map entry {} needs numeric 'sensor' and 'intensity'",
                i
            )),
        }
    }
}
