//! Display self-test
//!
//! Exercises every cursor operation and the wrap-around behaviour.

use glance_core::display::CursorPosition::{BottomLeft, TopLeft};

use crate::script::{ScriptApp, Step, Step::*};

pub const NAME: &str = "play";

const CURSOR: &[Step] = &[
    Write("Hello, World!"),
    Pause(1000),
    Move(BottomLeft),
    Write("This is bottom"),
    Pause(1000),
    Move(TopLeft),
    ClearLine,
    Write("This is top"),
    Pause(1000),
    MoveTo(19, 1),
    Write("20"),
    MoveTo(19, 2),
    Write("25"),
    Pause(1000),
];

const WRAP: &[Step] = &[
    Reset,
    Write("01234567890123456789"),
    Write("98765432109876453120"),
    Pause(1000),
    Write("abcdefghijklmnopqrst"),
    Pause(4000),
    Reset,
    Write("One\nTwo\nThree"),
];

static SECTIONS: &[&[Step]] = &[CURSOR, WRAP];

/// The play app
pub const fn play() -> ScriptApp {
    ScriptApp::new(NAME, SECTIONS)
}
