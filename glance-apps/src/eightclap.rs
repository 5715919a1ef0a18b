//! Counts to eight, then spells out a cheer between claps
//!
//! Runs in the roster like any script, and can also be sent as an intent
//! to take the display straight away.

use glance_core::display::CursorPosition::{BottomLeft, TopLeft};

use crate::script::{ScriptApp, Step, Step::*};

pub const NAME: &str = "Eight Clap";

const COUNT: &[Step] = &[
    Reset,
    Write("one "),
    Pause(250),
    Write("two "),
    Pause(250),
    Write("three "),
    Pause(250),
    Write("four "),
    Move(BottomLeft),
    Pause(250),
    Write("five "),
    Pause(250),
    Write("six "),
    Pause(250),
    Write("seven "),
    Pause(250),
    Write("eight"),
    Pause(250),
    Clear,
    Move(TopLeft),
];

const CLAP: &[Step] = &[
    Move(BottomLeft),
    ClearLine,
    Write("clap "),
    Pause(250),
    Move(BottomLeft),
    Write("     clap"),
    Pause(250),
    Move(BottomLeft),
    Write("          clap"),
    Pause(250),
    ClearLine,
];

const U: &[Step] = &[Write("U"), Pause(250)];
const C: &[Step] = &[MoveTo(6, 1), Write("C"), Pause(250)];
const L: &[Step] = &[MoveTo(11, 1), Write("L"), Pause(250)];
const A: &[Step] = &[MoveTo(16, 1), Write("A   !"), Pause(250)];

const FINALE: &[Step] = &[
    Move(TopLeft),
    Clear,
    Write("U    "),
    Pause(250),
    Write("C    "),
    Pause(250),
    Write("L    "),
    Pause(250),
    Write("A   !"),
    Pause(250),
    Move(BottomLeft),
    Write("FIGHT "),
    Pause(250),
    Write("FIGHT "),
    Pause(250),
    Write("FIGHT!"),
    Pause(250),
    Reset,
];

static SECTIONS: &[&[Step]] = &[COUNT, U, CLAP, C, CLAP, L, CLAP, A, CLAP, FINALE];

/// The eight-clap app
pub const fn eight_clap() -> ScriptApp {
    ScriptApp::new(NAME, SECTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::display::TextScreen;

    #[test]
    fn test_count_fills_both_rows() {
        let screen = TextScreen::new();
        for step in COUNT.iter().take_while(|s| **s != Clear) {
            step.apply(&screen).unwrap();
        }
        assert_eq!(screen.line(0).trim_end(), "one two three four");
        assert_eq!(screen.line(1).trim_end(), "five six seven eight");
    }

    #[test]
    fn test_cheer_spelled_across_top_row() {
        let screen = TextScreen::new();
        for section in &SECTIONS[..9] {
            for step in *section {
                step.apply(&screen).unwrap();
            }
        }
        assert_eq!(screen.line(0).as_str(), "U    C    L    A   !");
        assert_eq!(screen.line(1).trim_end(), "");
    }

    #[test]
    fn test_intent_is_named() {
        assert_eq!(eight_clap().intent().name, "Eight Clap");
    }
}
