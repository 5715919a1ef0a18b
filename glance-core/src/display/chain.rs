//! Fan-out of one logical display to several sinks
//!
//! Every operation is applied to every target, in order, regardless of
//! individual failures. Failures are joined into one [`JoinedError`]; a
//! successful result means every target succeeded.
//!
//! The chain adds no locking of its own. Targets synchronize internally.

use alloc::vec::Vec;

use super::{CursorPosition, Display, DisplayError, JoinedError};

/// Broadcasting display multiplexer
pub struct Chain<'a> {
    targets: Vec<&'a dyn Display>,
}

impl<'a> Chain<'a> {
    /// Create a chain over `targets`
    ///
    /// The target list is fixed from here on.
    pub fn new(targets: &[&'a dyn Display]) -> Self {
        Self {
            targets: targets.to_vec(),
        }
    }

    /// Number of targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check whether the chain has no targets
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn broadcast(
        &self,
        op: impl Fn(&dyn Display) -> Result<(), DisplayError>,
    ) -> Result<(), DisplayError> {
        let failures = self.targets.iter().filter_map(|target| op(*target).err());
        match JoinedError::join(failures) {
            Some(joined) => Err(joined.into()),
            None => Ok(()),
        }
    }
}

impl Display for Chain<'_> {
    /// Write to every target
    ///
    /// The full length of `bytes` is always reported as written; on partial
    /// failure the joined error carries that count.
    fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError> {
        let failures = self
            .targets
            .iter()
            .filter_map(|target| target.write(bytes).err());
        match JoinedError::join(failures) {
            Some(joined) => Err(joined.with_written(bytes.len()).into()),
            None => Ok(bytes.len()),
        }
    }

    fn reset(&self) -> Result<(), DisplayError> {
        self.broadcast(|d| d.reset())
    }

    fn clear(&self) -> Result<(), DisplayError> {
        self.broadcast(|d| d.clear())
    }

    fn clear_line(&self) -> Result<(), DisplayError> {
        self.broadcast(|d| d.clear_line())
    }

    fn move_cursor(&self, position: CursorPosition) -> Result<(), DisplayError> {
        self.broadcast(|d| d.move_cursor(position))
    }

    fn move_cursor_to(&self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.broadcast(|d| d.move_cursor_to(col, row))
    }

    fn close(&self) -> Result<(), DisplayError> {
        self.broadcast(|d| d.close())
    }
}
