//! Greets Derek, then second-guesses the spelling

use glance_core::display::CursorPosition::BottomLeft;

use crate::script::{ScriptApp, Step, Step::*};

pub const NAME: &str = "derek";

const GREETING: &[Step] = &[
    Reset,
    Write("Hello"),
    Pause(1000),
    Move(BottomLeft),
    Write("DEREK"),
    Pause(2000),
];

const SPELLED: &[Step] = &[
    Reset,
    Write("D "),
    Pause(250),
    Write("e "),
    Pause(250),
    Write("r "),
    Pause(250),
    Write("e "),
    Pause(250),
    Write("k "),
    Pause(1000),
    Move(BottomLeft),
    Write("or should I say..."),
    Pause(2000),
];

const PUNCHLINE: &[Step] = &[Reset, Write("D'Erik?!?!?!?!"), Pause(2000), Reset];

static SECTIONS: &[&[Step]] = &[GREETING, SPELLED, PUNCHLINE];

/// The derek app
pub const fn derek() -> ScriptApp {
    ScriptApp::new(NAME, SECTIONS)
}
