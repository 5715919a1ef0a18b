//! Inter-task communication
//!
//! Statics shared by the scheduler, the button, the status logger and the
//! display transmitter.

use glance_core::display::TextScreen;
use glance_core::scheduler::{IntentHandoff, StatusFeed};
use glance_drivers::ld220::TxPipe;

/// Size of the display transmit queue
pub const DISPLAY_TX_QUEUE: usize = 256;

/// Intents for the scheduler (button presses, boot greeting)
pub static INTENTS: IntentHandoff = IntentHandoff::new();

/// Status of whatever the scheduler started last
pub static STATUS: StatusFeed = StatusFeed::new();

/// In-memory copy of the pole display, for the debug log
pub static MIRROR: TextScreen = TextScreen::new();

/// Encoded LD220 bytes waiting for the UART
pub static DISPLAY_TX: TxPipe<DISPLAY_TX_QUEUE> = TxPipe::new();
