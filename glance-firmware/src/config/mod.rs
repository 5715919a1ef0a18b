//! Firmware configuration
//!
//! Settings come from `glance.toml`, compiled into the image and parsed
//! at boot by a small no_std parser. The build script validates the same
//! file so a bad config fails the build rather than the boot.

pub mod toml;

use glance_core::config::SchedulerConfig;
use glance_drivers::ld220;
use heapless::{String, Vec};

pub use toml::{parse_config, ParseError};

/// Maximum apps in the roster
pub const MAX_ROSTER: usize = 8;

/// Maximum length of an app name in the roster
pub const MAX_APP_NAME: usize = 16;

/// App name as written in the roster
pub type AppName = String<MAX_APP_NAME>;

/// Everything the firmware reads from `glance.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareConfig {
    /// App names in rotation order
    pub roster: Vec<AppName, MAX_ROSTER>,
    /// Activity deadlines
    pub scheduler: SchedulerConfig,
    /// Pole display serial speed
    pub baud: u32,
    /// Seconds past midnight at boot
    pub clock_offset_s: u64,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        let mut roster = Vec::new();
        for name in ["clock", "fortune", "derek"] {
            let _ = roster.push(AppName::try_from(name).unwrap_or_default());
        }
        Self {
            roster,
            scheduler: SchedulerConfig::default(),
            baud: ld220::BAUDRATE,
            clock_offset_s: 0,
        }
    }
}
