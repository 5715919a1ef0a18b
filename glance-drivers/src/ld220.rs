//! HP LD220 customer pole display (serial)
//!
//! A 20x2 vacuum fluorescent display driven over a write-only serial link.
//!
//! # Serial Protocol
//!
//! 9600 baud, 8N1. Text bytes are shown at the cursor; control sequences:
//! - `ESC @` (1B 40): reset
//! - `FF` (0C): clear
//! - `CAN` (18): clear the cursor's line
//! - `US $ col row` (1F 24 c r): absolute cursor position, 1-based
//!
//! The character set is not UTF-8. `ú` is translated to the display's
//! own code; other bytes pass through unchanged.
//!
//! # Transmission
//!
//! [`Ld220`] never touches the UART. Each operation encodes its bytes into
//! a [`TxPipe`] as one unit; a transmit task drains the pipe to the serial
//! port with async writes.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::pipe::Pipe;
use glance_core::display::{CursorPosition, Display, DisplayError};
use glance_hal::UartConfig;

/// Byte queue between the driver and the transmit task
pub type TxPipe<const N: usize> = Pipe<CriticalSectionRawMutex, N>;

/// Serial speed of the display
pub const BAUDRATE: u32 = 9600;

/// Visible columns
pub const COLS: u8 = 20;

/// Visible rows
pub const ROWS: u8 = 2;

/// LD220 control codes
pub mod code {
    /// Reset to power-on state
    pub const RESET: &[u8] = &[0x1B, 0x40];
    /// Clear all cells
    pub const CLEAR: &[u8] = &[0x0C];
    /// Clear the current line
    pub const CLEAR_LINE: &[u8] = &[0x18];
    /// Cursor to top left
    pub const HOME: &[u8] = &[0x0B];
    /// Cursor to bottom left
    pub const BOTTOM_LEFT: &[u8] = &[0x1F, 0x42, 0x0D];
    /// Cursor one column right
    pub const RIGHT: &[u8] = &[0x09];
    /// Cursor one column left
    pub const LEFT: &[u8] = &[0x08];
    /// Cursor one row up
    pub const UP: &[u8] = &[0x1F, 0x0A];
    /// Cursor one row down
    pub const DOWN: &[u8] = &[0x0A];
    /// Prefix of the absolute cursor position sequence
    pub const MOVE_TO: [u8; 2] = [0x1F, 0x24];
}

/// `ú` in UTF-8
const UTF8_U_ACUTE: [u8; 2] = [0xC3, 0xBA];

/// `ú` in the display character set
const LD220_U_ACUTE: u8 = 0xA3;

/// UART settings for the display link at `baudrate`
pub const fn uart_config(baudrate: u32) -> UartConfig {
    UartConfig::with_baudrate(baudrate)
}

/// Control sequence for a relative cursor move, `None` for no-op
pub fn encode_move(position: CursorPosition) -> Option<&'static [u8]> {
    match position {
        CursorPosition::Unchanged => None,
        CursorPosition::TopLeft => Some(code::HOME),
        CursorPosition::BottomLeft => Some(code::BOTTOM_LEFT),
        CursorPosition::Right => Some(code::RIGHT),
        CursorPosition::Left => Some(code::LEFT),
        CursorPosition::Up => Some(code::UP),
        CursorPosition::Down => Some(code::DOWN),
    }
}

/// Control sequence for an absolute cursor position
pub fn encode_move_to(col: u8, row: u8) -> Result<[u8; 4], DisplayError> {
    if row == 0 || row > ROWS || col == 0 || col > COLS {
        return Err(DisplayError::InvalidPosition);
    }
    Ok([code::MOVE_TO[0], code::MOVE_TO[1], col, row])
}

/// Number of bytes `text` occupies once translated
fn encoded_len(text: &[u8]) -> usize {
    let mut len = text.len();
    let mut rest = text;
    while let Some(pos) = rest.windows(2).position(|w| w == UTF8_U_ACUTE) {
        len -= UTF8_U_ACUTE.len() - 1;
        rest = &rest[pos + UTF8_U_ACUTE.len()..];
    }
    len
}

/// Queue `text` with character set translation applied
///
/// The caller has checked that the pipe has room for all of it.
fn queue_text<const N: usize>(pipe: &TxPipe<N>, text: &[u8]) {
    let mut rest = text;
    while let Some(pos) = rest.windows(2).position(|w| w == UTF8_U_ACUTE) {
        queue(pipe, &rest[..pos]);
        queue(pipe, &[LD220_U_ACUTE]);
        rest = &rest[pos + UTF8_U_ACUTE.len()..];
    }
    queue(pipe, rest);
}

fn queue<const N: usize>(pipe: &TxPipe<N>, bytes: &[u8]) {
    let mut rest = bytes;
    while !rest.is_empty() {
        match pipe.try_write(rest) {
            Ok(n) => rest = &rest[n..],
            Err(_) => return,
        }
    }
}

/// LD220 driver feeding a transmit pipe
///
/// An operation whose encoded bytes do not fit in the pipe is rejected
/// whole with [`DisplayError::Communication`]; nothing partial is queued.
/// After [`Display::close`] every operation fails with
/// [`DisplayError::Closed`].
pub struct Ld220<'p, const N: usize> {
    pipe: &'p TxPipe<N>,
    closed: Mutex<CriticalSectionRawMutex, Cell<bool>>,
}

impl<'p, const N: usize> Ld220<'p, N> {
    /// Take over the display and reset it
    pub fn open(pipe: &'p TxPipe<N>) -> Result<Self, DisplayError> {
        let display = Self {
            pipe,
            closed: Mutex::new(Cell::new(false)),
        };
        display.reset()?;
        info!("LD220 opened");
        Ok(display)
    }

    /// Queue `len` bytes produced by `fill`, all or nothing
    fn enqueue(&self, len: usize, fill: impl FnOnce(&TxPipe<N>)) -> Result<(), DisplayError> {
        self.closed.lock(|closed| {
            if closed.get() {
                return Err(DisplayError::Closed);
            }
            if N - self.pipe.len() < len {
                warn!("LD220 transmit queue full, dropping {} bytes", len);
                return Err(DisplayError::Communication);
            }
            fill(self.pipe);
            Ok(())
        })
    }

    fn send(&self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.enqueue(bytes.len(), |pipe| queue(pipe, bytes))
    }
}

impl<const N: usize> Display for Ld220<'_, N> {
    fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError> {
        self.enqueue(encoded_len(bytes), |pipe| queue_text(pipe, bytes))?;
        Ok(bytes.len())
    }

    fn reset(&self) -> Result<(), DisplayError> {
        self.send(code::RESET)
    }

    fn clear(&self) -> Result<(), DisplayError> {
        self.send(code::CLEAR)
    }

    fn clear_line(&self) -> Result<(), DisplayError> {
        self.send(code::CLEAR_LINE)
    }

    fn move_cursor(&self, position: CursorPosition) -> Result<(), DisplayError> {
        match encode_move(position) {
            Some(bytes) => self.send(bytes),
            None => Ok(()),
        }
    }

    fn move_cursor_to(&self, col: u8, row: u8) -> Result<(), DisplayError> {
        let bytes = encode_move_to(col, row)?;
        self.send(&bytes)
    }

    /// Stop accepting operations
    ///
    /// Bytes already queued are still transmitted.
    fn close(&self) -> Result<(), DisplayError> {
        let was_closed = self.closed.lock(|closed| closed.replace(true));
        if was_closed {
            return Err(DisplayError::Closed);
        }
        debug!("LD220 closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    type TestPipe = TxPipe<64>;

    /// Everything queued so far
    fn drain<const N: usize>(pipe: &TxPipe<N>) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 16];
        while let Ok(n) = pipe.try_read(&mut buf) {
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    fn open(pipe: &TestPipe) -> Ld220<'_, 64> {
        let display = Ld220::open(pipe).unwrap();
        drain(pipe);
        display
    }

    #[test]
    fn test_open_resets() {
        let pipe = TestPipe::new();
        let _display = Ld220::open(&pipe).unwrap();
        assert_eq!(drain(&pipe), [0x1B, 0x40]);
    }

    #[test]
    fn test_open_fails_when_queue_full() {
        let pipe = TxPipe::<1>::new();
        assert!(matches!(
            Ld220::open(&pipe),
            Err(DisplayError::Communication)
        ));
        assert!(pipe.is_empty());
    }

    #[test]
    fn test_control_codes() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        display.clear().unwrap();
        display.clear_line().unwrap();
        display.reset().unwrap();
        assert_eq!(drain(&pipe), [0x0C, 0x18, 0x1B, 0x40]);
    }

    #[test]
    fn test_relative_moves() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        for position in [
            CursorPosition::Unchanged,
            CursorPosition::TopLeft,
            CursorPosition::BottomLeft,
            CursorPosition::Right,
            CursorPosition::Left,
            CursorPosition::Up,
            CursorPosition::Down,
        ] {
            display.move_cursor(position).unwrap();
        }
        assert_eq!(
            drain(&pipe),
            [0x0B, 0x1F, 0x42, 0x0D, 0x09, 0x08, 0x1F, 0x0A, 0x0A]
        );
    }

    #[test]
    fn test_move_to_validates() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        assert_eq!(display.move_cursor_to(0, 1), Err(DisplayError::InvalidPosition));
        assert_eq!(display.move_cursor_to(21, 1), Err(DisplayError::InvalidPosition));
        assert_eq!(display.move_cursor_to(1, 0), Err(DisplayError::InvalidPosition));
        assert_eq!(display.move_cursor_to(1, 3), Err(DisplayError::InvalidPosition));
        assert!(pipe.is_empty());

        display.move_cursor_to(20, 2).unwrap();
        assert_eq!(drain(&pipe), [0x1F, 0x24, 20, 2]);
    }

    #[test]
    fn test_text_translation() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        let text = "Menú ú";
        assert_eq!(encoded_len(text.as_bytes()), 6);
        assert_eq!(display.write(text.as_bytes()), Ok(text.len()));
        assert_eq!(drain(&pipe), [b'M', b'e', b'n', 0xA3, b' ', 0xA3]);
    }

    #[test]
    fn test_plain_text_passes_through() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        display.write(b"12:34\n").unwrap();
        assert_eq!(drain(&pipe), b"12:34\n");
    }

    #[test]
    fn test_full_queue_rejects_whole_write() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        display.write(&[b'x'; 60]).unwrap();

        assert_eq!(display.write(b"hello"), Err(DisplayError::Communication));
        assert_eq!(drain(&pipe), [b'x'; 60]);

        // Room again once the transmit side catches up
        assert_eq!(display.write(b"hello"), Ok(5));
        assert_eq!(drain(&pipe), b"hello");
    }

    #[test]
    fn test_translated_text_fits_exactly() {
        let pipe = TxPipe::<4>::new();
        let display = Ld220::open(&pipe).unwrap();
        drain(&pipe);

        // Five bytes on the wire
        assert_eq!(
            display.write("abúúú".as_bytes()),
            Err(DisplayError::Communication)
        );
        assert!(pipe.is_empty());

        // Seven UTF-8 bytes, four on the wire
        assert_eq!(display.write("aúúú".as_bytes()), Ok(7));
        assert_eq!(drain(&pipe), [b'a', 0xA3, 0xA3, 0xA3]);
    }

    #[test]
    fn test_uart_config_is_8n1() {
        let config = uart_config(BAUDRATE);
        assert_eq!(config, UartConfig::with_baudrate(9600));
        assert_eq!(config.parity, glance_hal::uart::Parity::None);
    }

    #[test]
    fn test_closed_display_rejects() {
        let pipe = TestPipe::new();
        let display = open(&pipe);
        display.write(b"bye").unwrap();
        display.close().unwrap();
        assert_eq!(display.clear(), Err(DisplayError::Closed));
        assert_eq!(display.write(b"x"), Err(DisplayError::Closed));
        assert_eq!(display.close(), Err(DisplayError::Closed));
        assert_eq!(drain(&pipe), b"bye");
    }
}
