//! In-memory character screen
//!
//! A [`TextScreen`] behaves like a 20x2 character display without any
//! hardware behind it. It mirrors what the physical display shows (for the
//! debug log) and is the observation sink in tests.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::String;

use super::{CursorPosition, Display, DisplayError};

/// Number of character rows
pub const SCREEN_ROWS: usize = 2;

/// Number of character columns
pub const SCREEN_COLS: usize = 20;

/// Cell content and cursor, zero-based
struct Cells {
    buf: [[u8; SCREEN_COLS]; SCREEN_ROWS],
    row: usize,
    col: usize,
}

impl Cells {
    const fn blank() -> Self {
        Self {
            buf: [[b' '; SCREEN_COLS]; SCREEN_ROWS],
            row: 0,
            col: 0,
        }
    }

    fn put(&mut self, byte: u8) {
        if byte == b'\n' {
            self.row = (self.row + 1) % SCREEN_ROWS;
            return;
        }
        self.buf[self.row][self.col] = byte;
        self.col = (self.col + 1) % SCREEN_COLS;
        if self.col == 0 {
            self.row = (self.row + 1) % SCREEN_ROWS;
        }
    }

    fn clear(&mut self) {
        self.buf = [[b' '; SCREEN_COLS]; SCREEN_ROWS];
    }

    fn step(&mut self, position: CursorPosition) {
        match position {
            CursorPosition::Unchanged => {}
            CursorPosition::TopLeft => {
                self.row = 0;
                self.col = 0;
            }
            CursorPosition::BottomLeft => {
                self.row = SCREEN_ROWS - 1;
                self.col = 0;
            }
            CursorPosition::Left => self.col = self.col.saturating_sub(1),
            CursorPosition::Right => self.col = (self.col + 1).min(SCREEN_COLS - 1),
            CursorPosition::Up => self.row = self.row.saturating_sub(1),
            CursorPosition::Down => self.row = (self.row + 1).min(SCREEN_ROWS - 1),
        }
    }
}

/// Display that keeps its cells in memory
pub struct TextScreen {
    cells: Mutex<CriticalSectionRawMutex, RefCell<Cells>>,
}

impl TextScreen {
    /// Create a blank screen with the cursor at the top left
    pub const fn new() -> Self {
        Self {
            cells: Mutex::new(RefCell::new(Cells::blank())),
        }
    }

    /// Raw bytes of a row (0-based)
    pub fn row_bytes(&self, row: usize) -> Option<[u8; SCREEN_COLS]> {
        self.cells.lock(|cells| cells.borrow().buf.get(row).copied())
    }

    /// Text of a row (0-based), non-printable bytes shown as `?`
    pub fn line(&self, row: usize) -> String<SCREEN_COLS> {
        let mut line = String::new();
        if let Some(bytes) = self.row_bytes(row) {
            for b in bytes {
                let c = if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '?'
                };
                let _ = line.push(c);
            }
        }
        line
    }

    /// Cursor position as 1-based (column, row)
    pub fn cursor(&self) -> (u8, u8) {
        self.cells.lock(|cells| {
            let cells = cells.borrow();
            (cells.col as u8 + 1, cells.row as u8 + 1)
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut Cells) -> T) -> T {
        self.cells.lock(|cells| f(&mut cells.borrow_mut()))
    }
}

impl Default for TextScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for TextScreen {
    fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError> {
        self.with(|cells| bytes.iter().for_each(|&b| cells.put(b)));
        Ok(bytes.len())
    }

    fn reset(&self) -> Result<(), DisplayError> {
        self.with(|cells| *cells = Cells::blank());
        Ok(())
    }

    fn clear(&self) -> Result<(), DisplayError> {
        self.with(Cells::clear);
        Ok(())
    }

    fn clear_line(&self) -> Result<(), DisplayError> {
        self.with(|cells| {
            cells.buf[cells.row] = [b' '; SCREEN_COLS];
            cells.col = 0;
        });
        Ok(())
    }

    fn move_cursor(&self, position: CursorPosition) -> Result<(), DisplayError> {
        self.with(|cells| cells.step(position));
        Ok(())
    }

    fn move_cursor_to(&self, col: u8, row: u8) -> Result<(), DisplayError> {
        let (col, row) = (col as usize, row as usize);
        if col < 1 || col > SCREEN_COLS || row < 1 || row > SCREEN_ROWS {
            return Err(DisplayError::InvalidPosition);
        }
        self.with(|cells| {
            cells.col = col - 1;
            cells.row = row - 1;
        });
        Ok(())
    }

    fn close(&self) -> Result<(), DisplayError> {
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TextScreen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for row in 0..SCREEN_ROWS {
            if row > 0 {
                defmt::write!(f, " | ");
            }
            defmt::write!(f, "{}", self.line(row).as_str());
        }
        defmt::write!(f, "]");
    }
}
