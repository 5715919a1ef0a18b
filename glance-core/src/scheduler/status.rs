//! Status feed
//!
//! The scheduler announces every activity it starts. Publishing never
//! blocks: a newer status replaces one nobody has read yet.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use heapless::String;

/// Maximum length of an activity id
pub const MAX_ID_LEN: usize = 32;

/// Activity identifier, `"<app>-<counter>"`
pub type ActivityId = String<MAX_ID_LEN>;

/// What is on the display right now
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// App name
    pub name: &'static str,
    /// Activity id
    pub id: ActivityId,
    /// When the scheduler will take the display back
    pub deadline: Instant,
}

/// Latest-value status channel
pub struct StatusFeed {
    latest: Signal<CriticalSectionRawMutex, Status>,
}

impl StatusFeed {
    pub const fn new() -> Self {
        Self {
            latest: Signal::new(),
        }
    }

    /// Replace the unread status, if any
    pub fn publish(&self, status: Status) {
        self.latest.signal(status);
    }

    /// Receive-only handle for observers
    pub fn receiver(&self) -> StatusReceiver<'_> {
        StatusReceiver { feed: self }
    }
}

impl Default for StatusFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Observing end of a [`StatusFeed`]
#[derive(Clone, Copy)]
pub struct StatusReceiver<'a> {
    feed: &'a StatusFeed,
}

impl StatusReceiver<'_> {
    /// Wait for the next status
    pub async fn next(&self) -> Status {
        self.feed.latest.wait().await
    }

    /// Take the unread status, if any
    pub fn try_next(&self) -> Option<Status> {
        self.feed.latest.try_take()
    }
}
