//! Scheduler configuration
//!
//! Deadlines bounding how long an activity may hold the display. The
//! firmware fills these from `glance.toml`; tests shorten them.

use embassy_time::Duration;

/// Default occupancy of a roster turn
pub const DEFAULT_ROSTER_DEADLINE: Duration = Duration::from_secs(2 * 60);

/// Default occupancy of a priority (intent) run
pub const DEFAULT_PRIORITY_DEADLINE: Duration = Duration::from_secs(5 * 60);

/// Timing limits for the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerConfig {
    /// Deadline for an activity started from the roster
    pub roster_deadline: Duration,
    /// Deadline for an activity submitted as an intent
    pub priority_deadline: Duration,
}

impl SchedulerConfig {
    /// Config with both deadlines given in seconds
    pub const fn from_secs(roster_s: u64, priority_s: u64) -> Self {
        Self {
            roster_deadline: Duration::from_secs(roster_s),
            priority_deadline: Duration::from_secs(priority_s),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            roster_deadline: DEFAULT_ROSTER_DEADLINE,
            priority_deadline: DEFAULT_PRIORITY_DEADLINE,
        }
    }
}
