//! Display scheduler
//!
//! Time-slices the display between a fixed roster of apps, with intents
//! for out-of-turn requests and a status feed for observers.

pub mod app;
pub mod executor;
pub mod intent;
pub mod roster;
pub mod status;

pub use app::{Activity, ActivityError, App, AppError, BoxedActivity};
pub use executor::{Ending, Pending, Scheduler};
pub use intent::{Intent, IntentHandoff, IntentSender};
pub use roster::Roster;
pub use status::{ActivityId, Status, StatusFeed, StatusReceiver, MAX_ID_LEN};
