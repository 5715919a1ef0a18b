//! App and activity contracts
//!
//! An [`App`] is a named, long-lived factory. Each time the scheduler gives
//! it a turn it produces a fresh [`Activity`], which draws on the display
//! until it finishes or its token is cancelled.

use alloc::boxed::Box;
use async_trait::async_trait;

use crate::cancel::CancelToken;
use crate::display::{Display, DisplayError};

/// Boxed activity as handed from an app to the scheduler
pub type BoxedActivity = Box<dyn Activity + Send>;

/// Errors returned by an app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppError {
    /// The app only runs when requested and no request is armed
    NoIntentArmed,
    /// The app has nothing to show right now
    Unavailable,
}

/// Errors returned by a running activity
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivityError {
    /// A display operation failed
    Display(DisplayError),
    /// The activity gave up on its own
    Aborted(&'static str),
}

impl From<DisplayError> for ActivityError {
    fn from(e: DisplayError) -> Self {
        ActivityError::Display(e)
    }
}

/// One run of an app's visual routine
///
/// `run` must return promptly once `cancel` fires. Writes made after the
/// scheduler has revoked the surface fail with [`DisplayError::NotPermitted`].
#[async_trait(?Send)]
pub trait Activity {
    /// Draw on `surface` until done or cancelled
    async fn run(
        &mut self,
        cancel: CancelToken<'_>,
        surface: &dyn Display,
    ) -> Result<(), ActivityError>;
}

/// A named source of activities
pub trait App {
    /// Name, unique within the roster
    fn name(&self) -> &'static str;

    /// Produce a new activity identified by `id`
    fn activate(&self, id: &str) -> Result<BoxedActivity, AppError>;

    /// Ask the app to stop a previously issued activity
    ///
    /// Called after the scheduler cuts a run short. Apps without background
    /// work keep the default.
    fn stop(&self, id: &str) -> Result<(), AppError> {
        let _ = id;
        Ok(())
    }
}
