//! Intent handoff
//!
//! Any task may ask for the display out of turn by submitting an
//! [`Intent`]. The handoff holds at most one intent; `submit` returns only
//! once the scheduler has taken it, and concurrent submitters queue behind
//! one another.
//!
//! Each submission carries a ticket, and a submitter is released only by
//! the take of its own ticket. A submitter dropped after sending leaves its
//! intent in the slot; the scheduler still runs it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use super::app::BoxedActivity;

/// Request to run an activity next, ahead of the roster
pub struct Intent {
    /// Name of the requesting app
    pub name: &'static str,
    /// Activity to run
    pub activity: BoxedActivity,
}

impl Intent {
    pub fn new(name: &'static str, activity: BoxedActivity) -> Self {
        Self { name, activity }
    }
}

/// Intent tagged with its submission
struct Ticketed {
    ticket: u32,
    intent: Intent,
}

/// Single-slot rendezvous between submitters and the scheduler
pub struct IntentHandoff {
    slot: Channel<CriticalSectionRawMutex, Ticketed, 1>,
    /// Ticket of the intent taken last
    taken: Signal<CriticalSectionRawMutex, u32>,
    /// Submission turn, holding the last ticket issued
    submitters: Mutex<CriticalSectionRawMutex, u32>,
}

impl IntentHandoff {
    pub const fn new() -> Self {
        Self {
            slot: Channel::new(),
            taken: Signal::new(),
            submitters: Mutex::new(0),
        }
    }

    /// Hand `intent` to the scheduler, waiting until it has been taken
    pub async fn submit(&self, intent: Intent) {
        let mut turn = self.submitters.lock().await;
        *turn = turn.wrapping_add(1);
        let ticket = *turn;
        debug!("Submitting intent {}", intent.name);
        self.slot.send(Ticketed { ticket, intent }).await;
        while self.taken.wait().await != ticket {}
    }

    /// Take an intent if one is waiting
    pub fn try_take(&self) -> Option<Intent> {
        let entry = self.slot.try_receive().ok()?;
        Some(self.release(entry))
    }

    /// Wait for the next intent
    pub async fn take(&self) -> Intent {
        let entry = self.slot.receive().await;
        self.release(entry)
    }

    fn release(&self, entry: Ticketed) -> Intent {
        self.taken.signal(entry.ticket);
        entry.intent
    }

    /// Send-only handle for apps and input tasks
    pub fn sender(&self) -> IntentSender<'_> {
        IntentSender { handoff: self }
    }
}

impl Default for IntentHandoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Submitting end of an [`IntentHandoff`]
#[derive(Clone, Copy)]
pub struct IntentSender<'a> {
    handoff: &'a IntentHandoff,
}

impl IntentSender<'_> {
    /// See [`IntentHandoff::submit`]
    pub async fn submit(&self, intent: Intent) {
        self.handoff.submit(intent).await
    }
}
