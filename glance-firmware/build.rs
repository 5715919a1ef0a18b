//! Build script for glance-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates glance.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Apps the firmware knows by name
const KNOWN_APPS: &[&str] = &["clock", "fortune", "derek", "play", "Eight Clap", "babyshark"];

/// Roster capacity of the firmware
const MAX_ROSTER: usize = 8;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate glance.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=glance.toml");

    let config_path = Path::new("glance.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: glance.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a glance.toml configuration file.         ║\n\
            ║  Please create one in the glance-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read glance.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in glance.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_scheduler(&config, &mut errors);
    validate_display(&config, &mut errors);
    validate_clock(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in glance.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=glance.toml validated successfully");
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

/// Only the sections the firmware parser understands may appear
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        if !["scheduler", "display", "clock"].contains(&name.as_str()) {
            errors.push(format!("Unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("'{}' must be a [section]", name));
        }
    }
}

/// Check that `key` in `section`, if present, is a positive integer below `max`
fn check_int(config: &toml::Value, section: &str, key: &str, max: i64, errors: &mut Vec<String>) {
    match config.get(section).and_then(|s| s.get(key)) {
        None => {}
        Some(toml::Value::Integer(n)) if *n > 0 && *n <= max => {}
        Some(_) => errors.push(format!("[{}] {} must be 1-{}", section, key, max)),
    }
}

/// Validate the roster and deadlines
fn validate_scheduler(config: &toml::Value, errors: &mut Vec<String>) {
    check_int(config, "scheduler", "roster_deadline_s", 24 * 60 * 60, errors);
    check_int(config, "scheduler", "priority_deadline_s", 24 * 60 * 60, errors);

    let roster = match config.get("scheduler").and_then(|s| s.get("roster")) {
        None => return,
        Some(toml::Value::Array(roster)) => roster,
        Some(_) => {
            errors.push("[scheduler] roster must be an array of app names".to_string());
            return;
        }
    };

    if roster.len() > MAX_ROSTER {
        errors.push(format!("[scheduler] roster holds at most {} apps", MAX_ROSTER));
    }
    for app in roster {
        match app.as_str() {
            Some(name) if KNOWN_APPS.contains(&name) => {}
            Some(name) => errors.push(format!("[scheduler] unknown app '{}'", name)),
            None => errors.push("[scheduler] roster entries must be strings".to_string()),
        }
    }
}

/// Validate the display link
fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    check_int(config, "display", "baud", 921_600, errors);
}

/// Validate the clock offset
fn validate_clock(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("clock").and_then(|c| c.get("offset_s")) {
        None => {}
        Some(toml::Value::Integer(n)) if (0..24 * 60 * 60).contains(n) => {}
        Some(_) => errors.push("[clock] offset_s must be 0-86399".to_string()),
    }
}
