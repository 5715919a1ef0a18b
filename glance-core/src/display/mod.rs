//! Character display surface
//!
//! Everything that can show text to the user implements [`Display`]: the
//! serial pole display, the in-memory [`TextScreen`], the fan-out
//! [`Chain`] and the scheduler's per-activity [`Gate`].
//!
//! Methods take `&self`. A sink shared between tasks is expected to
//! synchronize internally, so a single instance can sit behind any number
//! of gates and chains.

pub mod chain;
pub mod gate;
pub mod screen;

use alloc::vec::Vec;

pub use chain::Chain;
pub use gate::{Gate, GateGuard};
pub use screen::{TextScreen, SCREEN_COLS, SCREEN_ROWS};

/// Relative cursor movements understood by every display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CursorPosition {
    /// Leave the cursor where it is
    #[default]
    Unchanged,
    /// First column of the first row
    TopLeft,
    /// First column of the last row
    BottomLeft,
    /// One column left
    Left,
    /// One column right
    Right,
    /// One row up
    Up,
    /// One row down
    Down,
}

/// Errors reported by display operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// The surface is gated off for the caller
    NotPermitted,
    /// Column or row outside the display
    InvalidPosition,
    /// Communication error with the display hardware
    Communication,
    /// The display has been closed
    Closed,
    /// One or more sinks of a fan-out failed
    Joined(JoinedError),
}

/// Failures collected from every sink of a fan-out
///
/// A joined error means at least one sink failed, not that all of them did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoinedError {
    errors: Vec<DisplayError>,
    written: usize,
}

impl JoinedError {
    /// Join a set of failures, flattening nested joins
    ///
    /// Returns `None` when there is nothing to report.
    pub fn join(errors: impl IntoIterator<Item = DisplayError>) -> Option<Self> {
        let mut joined = Self::default();
        for error in errors {
            joined.push(error);
        }
        if joined.errors.is_empty() {
            None
        } else {
            Some(joined)
        }
    }

    fn push(&mut self, error: DisplayError) {
        match error {
            DisplayError::Joined(inner) => self.errors.extend(inner.errors),
            other => self.errors.push(other),
        }
    }

    /// Record the byte count that the failed write still reported
    pub fn with_written(mut self, written: usize) -> Self {
        self.written = written;
        self
    }

    /// Individual sink failures, in sink order
    pub fn errors(&self) -> &[DisplayError] {
        &self.errors
    }

    /// Bytes reported as written by the fan-out (zero for non-write operations)
    pub fn written(&self) -> usize {
        self.written
    }
}

impl From<JoinedError> for DisplayError {
    fn from(e: JoinedError) -> Self {
        DisplayError::Joined(e)
    }
}

/// A two-line, fixed-width text surface
///
/// Columns and rows passed to [`Display::move_cursor_to`] are 1-based.
pub trait Display {
    /// Write raw bytes at the cursor, returning how many were accepted
    fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError>;

    /// Return the display to its power-on state (cleared, cursor home)
    fn reset(&self) -> Result<(), DisplayError>;

    /// Blank every cell
    fn clear(&self) -> Result<(), DisplayError>;

    /// Blank the cursor's row and return to its first column
    fn clear_line(&self) -> Result<(), DisplayError>;

    /// Move the cursor relative to its position or to a corner
    fn move_cursor(&self, position: CursorPosition) -> Result<(), DisplayError>;

    /// Move the cursor to an absolute, 1-based column and row
    fn move_cursor_to(&self, col: u8, row: u8) -> Result<(), DisplayError>;

    /// Release the display
    fn close(&self) -> Result<(), DisplayError>;
}

impl<T: Display + ?Sized> Display for &T {
    fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError> {
        (**self).write(bytes)
    }

    fn reset(&self) -> Result<(), DisplayError> {
        (**self).reset()
    }

    fn clear(&self) -> Result<(), DisplayError> {
        (**self).clear()
    }

    fn clear_line(&self) -> Result<(), DisplayError> {
        (**self).clear_line()
    }

    fn move_cursor(&self, position: CursorPosition) -> Result<(), DisplayError> {
        (**self).move_cursor(position)
    }

    fn move_cursor_to(&self, col: u8, row: u8) -> Result<(), DisplayError> {
        (**self).move_cursor_to(col, row)
    }

    fn close(&self) -> Result<(), DisplayError> {
        (**self).close()
    }
}

/// Helpers for drawing text
pub trait DisplayExt: Display {
    /// Write a string at the cursor
    fn print(&self, text: &str) -> Result<(), DisplayError> {
        self.write(text.as_bytes()).map(|_| ())
    }

    /// Replace the content of a row (1-based) with `text`
    fn print_line(&self, row: u8, text: &str) -> Result<(), DisplayError> {
        self.move_cursor_to(1, row)?;
        self.clear_line()?;
        self.print(text)
    }
}

// Blanket implementation for all Display types
impl<T: Display + ?Sized> DisplayExt for T {}
