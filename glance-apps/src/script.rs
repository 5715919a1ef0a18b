//! Scripted display routines
//!
//! A script is a list of sections, each a table of [`Step`]s. Playback
//! checks the cancel token before every step and wakes early from pauses
//! when it fires.

use alloc::boxed::Box;
use async_trait::async_trait;
use embassy_futures::select::{select, Either};
use embassy_time::Timer;

use glance_core::cancel::CancelToken;
use glance_core::display::{CursorPosition, Display, DisplayError, DisplayExt};
use glance_core::scheduler::{Activity, ActivityError, App, AppError, BoxedActivity, Intent};

/// One display operation or pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    Reset,
    Clear,
    ClearLine,
    Write(&'static str),
    Move(CursorPosition),
    /// Absolute position, 1-based column and row
    MoveTo(u8, u8),
    /// Wait, in milliseconds
    Pause(u64),
}

impl Step {
    /// Apply a display step; pauses are a no-op here
    pub fn apply(&self, surface: &dyn Display) -> Result<(), DisplayError> {
        match *self {
            Step::Reset => surface.reset(),
            Step::Clear => surface.clear(),
            Step::ClearLine => surface.clear_line(),
            Step::Write(text) => surface.print(text),
            Step::Move(position) => surface.move_cursor(position),
            Step::MoveTo(col, row) => surface.move_cursor_to(col, row),
            Step::Pause(_) => Ok(()),
        }
    }
}

/// Whether playback ran to the end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    Continue,
    Cancelled,
}

/// Sleep for `ms`, returning early if `cancel` fires
pub async fn pause(ms: u64, cancel: CancelToken<'_>) -> Flow {
    match select(Timer::after_millis(ms), cancel.cancelled()).await {
        Either::First(()) => Flow::Continue,
        Either::Second(()) => Flow::Cancelled,
    }
}

/// Play `steps` on `surface`
pub async fn play(
    steps: &[Step],
    cancel: CancelToken<'_>,
    surface: &dyn Display,
) -> Result<Flow, ActivityError> {
    for step in steps {
        if cancel.is_cancelled() {
            return Ok(Flow::Cancelled);
        }
        if let Step::Pause(ms) = *step {
            if pause(ms, cancel).await == Flow::Cancelled {
                return Ok(Flow::Cancelled);
            }
        } else {
            step.apply(surface)?;
        }
    }
    Ok(Flow::Continue)
}

/// Activity that plays a fixed script once
pub struct ScriptActivity {
    sections: &'static [&'static [Step]],
}

#[async_trait(?Send)]
impl Activity for ScriptActivity {
    async fn run(
        &mut self,
        cancel: CancelToken<'_>,
        surface: &dyn Display,
    ) -> Result<(), ActivityError> {
        for section in self.sections {
            if play(section, cancel, surface).await? == Flow::Cancelled {
                break;
            }
        }
        Ok(())
    }
}

/// App whose every activity plays the same script
pub struct ScriptApp {
    name: &'static str,
    sections: &'static [&'static [Step]],
}

impl ScriptApp {
    pub const fn new(name: &'static str, sections: &'static [&'static [Step]]) -> Self {
        Self { name, sections }
    }

    fn activity(&self) -> BoxedActivity {
        Box::new(ScriptActivity {
            sections: self.sections,
        })
    }

    /// Intent that plays this script out of turn
    pub fn intent(&self) -> Intent {
        Intent::new(self.name, self.activity())
    }

    /// Steps of every section, in order
    pub fn steps(&self) -> impl Iterator<Item = &'static Step> {
        self.sections.iter().flat_map(|section| section.iter())
    }
}

impl App for ScriptApp {
    fn name(&self) -> &'static str {
        self.name
    }

    fn activate(&self, id: &str) -> Result<BoxedActivity, AppError> {
        trace!("Script {} activated as {}", self.name, id);
        Ok(self.activity())
    }
}

/// Apply every display step of `app` without pausing
#[cfg(test)]
pub(crate) fn render(app: &ScriptApp, surface: &dyn Display) -> Result<(), DisplayError> {
    app.steps().try_for_each(|step| step.apply(surface))
}
