//! Fortunes, word wrapped to the display
//!
//! Shows two lines at a time, pausing after each screenful, and keeps
//! cycling through the list until the scheduler takes the display back.

use alloc::boxed::Box;
use alloc::vec::Vec;

use async_trait::async_trait;
use heapless::String;
use portable_atomic::{AtomicUsize, Ordering};

use glance_core::cancel::CancelToken;
use glance_core::display::{CursorPosition, Display, DisplayExt, SCREEN_COLS};
use glance_core::scheduler::{Activity, ActivityError, App, AppError, BoxedActivity};

use crate::script::{pause, Flow};

pub const NAME: &str = "fortune";

/// Pause after a full screen, in milliseconds
const SCREEN_PAUSE_MS: u64 = 3000;

/// Pause between fortunes, in milliseconds
const FORTUNE_PAUSE_MS: u64 = 2000;

/// One display row of wrapped text
pub type Line = String<SCREEN_COLS>;

/// Built-in fortunes
pub const FORTUNES: &[&str] = &[
    "A journey of a thousand miles begins with a single step.",
    "You will be hungry again in one hour.",
    "Never test the depth of the water with both feet.",
    "The early bird gets the worm, but the second mouse gets the cheese.",
    "Do not mistake temptation for opportunity.",
    "Today is a good day to\nclean the coffee machine.",
    "If at first you don't succeed, skydiving is not for you.",
    "A closed mouth gathers no feet.",
    "Your code will compile on the first try. Eventually.",
    "He who laughs last didn't get the joke.",
    "Help! I am being held prisoner in a pole display.",
    "Look both ways before crossing a one-way street.",
];

/// Split `text` into display rows
///
/// Each input line is wrapped on its own. Runs of whitespace collapse to a
/// single space and words longer than a row are broken across rows.
pub fn wordwrap(text: &str) -> Vec<Line> {
    text.split('\n').flat_map(wrap_one).collect()
}

fn wrap_one(text: &str) -> Vec<Line> {
    let mut out = Vec::new();
    if text.is_empty() {
        return out;
    }
    let mut line = Line::new();
    for word in text.split_whitespace() {
        let sep = if line.is_empty() { 0 } else { 1 };
        if !line.is_empty() && line.len() + sep + word.len() > SCREEN_COLS {
            out.push(core::mem::take(&mut line));
        }
        let mut word = word;
        while word.len() > SCREEN_COLS {
            let cut = floor_char_boundary(word, SCREEN_COLS);
            out.push(to_line(&word[..cut]));
            word = &word[cut..];
        }
        if !line.is_empty() {
            let _ = line.push(' ');
        }
        let _ = line.push_str(word);
    }
    out.push(line);
    out
}

fn to_line(text: &str) -> Line {
    let mut line = Line::new();
    let _ = line.push_str(text);
    line
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut end = max.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    // A single char wider than a row cannot happen at 20 bytes
    end.max(1)
}

struct FortuneActivity {
    fortunes: &'static [&'static str],
    next: usize,
}

impl FortuneActivity {
    /// Show one fortune, two rows per screen
    async fn show(
        &self,
        text: &str,
        cancel: CancelToken<'_>,
        surface: &dyn Display,
    ) -> Result<Flow, ActivityError> {
        surface.reset()?;
        let lines = wordwrap(text);
        for (i, line) in lines.iter().enumerate() {
            let top = i % 2 == 0;
            if top {
                surface.clear()?;
            } else {
                surface.clear_line()?;
            }
            surface.print(line)?;
            if top {
                surface.move_cursor(CursorPosition::BottomLeft)?;
            } else {
                surface.move_cursor(CursorPosition::TopLeft)?;
                if pause(SCREEN_PAUSE_MS, cancel).await == Flow::Cancelled {
                    return Ok(Flow::Cancelled);
                }
            }
        }
        // The last screen had only its top row and no pause yet
        if lines.len() % 2 == 1 && pause(SCREEN_PAUSE_MS, cancel).await == Flow::Cancelled {
            return Ok(Flow::Cancelled);
        }
        Ok(pause(FORTUNE_PAUSE_MS, cancel).await)
    }
}

#[async_trait(?Send)]
impl Activity for FortuneActivity {
    async fn run(
        &mut self,
        cancel: CancelToken<'_>,
        surface: &dyn Display,
    ) -> Result<(), ActivityError> {
        while !cancel.is_cancelled() {
            let text = self.fortunes[self.next % self.fortunes.len()];
            self.next = self.next.wrapping_add(1);
            if self.show(text, cancel, surface).await? == Flow::Cancelled {
                break;
            }
        }
        Ok(())
    }
}

/// The fortune app
///
/// Successive activities start where the previous one would have
/// continued, so the same fortune is not shown twice in a row.
pub struct Fortune {
    fortunes: &'static [&'static str],
    next: AtomicUsize,
}

impl Fortune {
    pub const fn new(fortunes: &'static [&'static str]) -> Self {
        Self {
            fortunes,
            next: AtomicUsize::new(0),
        }
    }
}

impl Default for Fortune {
    fn default() -> Self {
        Self::new(FORTUNES)
    }
}

impl App for Fortune {
    fn name(&self) -> &'static str {
        NAME
    }

    fn activate(&self, id: &str) -> Result<BoxedActivity, AppError> {
        if self.fortunes.is_empty() {
            warn!("No fortunes for {}", id);
            return Err(AppError::Unavailable);
        }
        let next = self.next.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(FortuneActivity {
            fortunes: self.fortunes,
            next,
        }))
    }
}
