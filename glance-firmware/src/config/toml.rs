//! Minimal TOML parser for `glance.toml`
//!
//! Handles only the subset the firmware needs. It does NOT support the
//! full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, array of strings)
//! - [section] headers
//! - Comments (# ...)
//!
//! Unknown keys are ignored; unknown sections are an error.

use embassy_time::Duration;

use super::{AppName, FirmwareConfig, MAX_ROSTER};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Parse error
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Invalid value type or out of range
    InvalidValue,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Scheduler,
    Display,
    Clock,
}

/// Parse TOML configuration into a [`FirmwareConfig`]
///
/// Keys that are absent keep their defaults.
pub fn parse_config(input: &str) -> Result<FirmwareConfig, ParseError> {
    let mut config = FirmwareConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "scheduler" => Ok(Section::Scheduler),
        "display" => Ok(Section::Display),
        "clock" => Ok(Section::Clock),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, ParseError> {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a non-zero number of seconds
fn parse_secs(value: &str) -> Result<Duration, ParseError> {
    match parse_int::<u64>(value)? {
        0 => Err(ParseError::InvalidValue),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// Parse an array of app names like `["clock", "fortune"]`
fn parse_roster(value: &str) -> Result<heapless::Vec<AppName, MAX_ROSTER>, ParseError> {
    let value = value.trim();
    if !value.starts_with('[') || !value.ends_with(']') {
        return Err(ParseError::InvalidValue);
    }
    let inner = value[1..value.len() - 1].trim();

    let mut roster = heapless::Vec::new();
    if inner.is_empty() {
        return Ok(roster);
    }
    // Trailing comma is allowed
    let inner = inner.strip_suffix(',').unwrap_or(inner);
    for item in inner.split(',') {
        let name = parse_string(item)?;
        let name = AppName::try_from(name).map_err(|_| ParseError::InvalidValue)?;
        roster.push(name).map_err(|_| ParseError::TooManyItems)?;
    }
    Ok(roster)
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut FirmwareConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Scheduler => match key {
            "roster" => config.roster = parse_roster(value)?,
            "roster_deadline_s" => config.scheduler.roster_deadline = parse_secs(value)?,
            "priority_deadline_s" => config.scheduler.priority_deadline = parse_secs(value)?,
            _ => {} // Ignore unknown keys
        },
        Section::Display => match key {
            "baud" | "baud_rate" => {
                config.baud = match parse_int::<u32>(value)? {
                    0 => return Err(ParseError::InvalidValue),
                    baud => baud,
                }
            }
            _ => {}
        },
        Section::Clock => match key {
            "offset_s" => {
                let offset: u64 = parse_int(value)?;
                if offset >= SECS_PER_DAY {
                    return Err(ParseError::InvalidValue);
                }
                config.clock_offset_s = offset;
            }
            _ => {}
        },
        Section::Root => {
            // No root-level keys
        }
    }

    Ok(())
}
