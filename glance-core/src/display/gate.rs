//! Exclusive access gate
//!
//! A [`Gate`] sits in front of a shared display and forwards operations only
//! while it is enabled. The scheduler hands every activity its own gate and
//! disables it as soon as the activity's window closes, so an activity that
//! keeps running past cancellation cannot corrupt the shared surface.
//!
//! The enabled flag and the forwarded call are read under one lock: once
//! [`Gate::disable`] returns, nothing more reaches the target.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::{CursorPosition, Display, DisplayError};

/// Capability-gated proxy for a display
pub struct Gate<'a> {
    /// Display that receives forwarded operations
    target: &'a dyn Display,
    /// Whether operations are currently forwarded
    enabled: Mutex<CriticalSectionRawMutex, Cell<bool>>,
    /// Name used in diagnostics
    name: &'a str,
}

impl<'a> Gate<'a> {
    /// Create a disabled gate in front of `target`
    pub fn new(target: &'a dyn Display, name: &'a str) -> Self {
        Self {
            target,
            enabled: Mutex::new(Cell::new(false)),
            name,
        }
    }

    /// Start forwarding operations
    pub fn enable(&self) {
        self.enabled.lock(|enabled| enabled.set(true));
        debug!("Enabled {}", self.name);
    }

    /// Stop forwarding operations
    ///
    /// Calling this on a disabled gate is a no-op.
    pub fn disable(&self) {
        self.enabled.lock(|enabled| enabled.set(false));
        debug!("Disabled {}", self.name);
    }

    /// Enable the gate until the returned guard is dropped
    pub fn enable_scoped(&self) -> GateGuard<'_, 'a> {
        self.enable();
        GateGuard { gate: self }
    }

    /// Check whether operations are currently forwarded
    pub fn is_enabled(&self) -> bool {
        self.enabled.lock(Cell::get)
    }

    /// Diagnostic name of this gate
    pub fn name(&self) -> &str {
        self.name
    }

    fn forward<T>(
        &self,
        op: impl FnOnce(&dyn Display) -> Result<T, DisplayError>,
    ) -> Result<T, DisplayError> {
        self.enabled.lock(|enabled| {
            if enabled.get() {
                op(self.target)
            } else {
                Err(DisplayError::NotPermitted)
            }
        })
    }
}

impl Display for Gate<'_> {
    fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError> {
        self.forward(|d| d.write(bytes))
    }

    fn reset(&self) -> Result<(), DisplayError> {
        self.forward(|d| d.reset())
    }

    fn clear(&self) -> Result<(), DisplayError> {
        self.forward(|d| d.clear())
    }

    fn clear_line(&self) -> Result<(), DisplayError> {
        self.forward(|d| d.clear_line())
    }

    fn move_cursor(&self, position: CursorPosition) -> Result<(), DisplayError> {
        self.forward(|d| d.move_cursor(position))
    }

    fn move_cursor_to(&self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.forward(|d| d.move_cursor_to(col, row))
    }

    fn close(&self) -> Result<(), DisplayError> {
        self.forward(|d| d.close())
    }
}

/// Keeps a gate enabled while alive
///
/// Dropping the guard disables the gate, including when the future that
/// owns it is cancelled.
pub struct GateGuard<'g, 'a> {
    gate: &'g Gate<'a>,
}

impl Drop for GateGuard<'_, '_> {
    fn drop(&mut self) {
        self.gate.disable();
    }
}
