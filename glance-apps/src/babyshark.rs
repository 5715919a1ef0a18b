//! Baby Shark, doo doo doo doo doo doo
//!
//! Never plays on its own turn. A request submits the song as an intent;
//! arming the app lets exactly one roster turn play it instead.

use alloc::boxed::Box;
use async_trait::async_trait;
use portable_atomic::{AtomicBool, Ordering};

use glance_core::cancel::CancelToken;
use glance_core::display::{CursorPosition::BottomLeft, Display};
use glance_core::scheduler::{
    Activity, ActivityError, App, AppError, BoxedActivity, Intent, IntentSender,
};

use crate::script::{pause, play, Flow, Step, Step::*};

pub const NAME: &str = "babyshark";

const VERSES: [(&str, &str, &str); 9] = [
    ("Ba", "by ", "SHARK!"),
    ("Mom", "my ", "SHARK!"),
    ("Dad", "dy ", "SHARK!"),
    ("Grand", "ma ", "SHARK!"),
    ("Grand", "pa ", "SHARK!"),
    ("Let's ", "go ", "hunt!"),
    ("Run ", "a", "way!"),
    ("Safe ", "at ", "last!"),
    ("It's ", "the ", "end!"),
];

const DODODODO: &[Step] = &[
    Move(BottomLeft),
    ClearLine,
    Write("do"),
    Pause(250),
    Write(" do"),
    Pause(250),
    ClearLine,
    Write("      do"),
    Pause(100),
    Write(" do"),
    Pause(250),
    ClearLine,
    Write("           do"),
    Pause(100),
    Write(" do"),
    Pause(250),
];

/// Rest after the last verse, in milliseconds
const OUTRO_MS: u64 = 5000;

fn topline(words: (&'static str, &'static str, &'static str), ms: u64) -> [Step; 7] {
    let (one, two, three) = words;
    [
        Reset,
        Write(one),
        Pause(ms),
        Write(two),
        Pause(ms),
        Write(three),
        Pause(ms),
    ]
}

async fn verse(
    words: (&'static str, &'static str, &'static str),
    cancel: CancelToken<'_>,
    surface: &dyn Display,
) -> Result<Flow, ActivityError> {
    let slow = topline(words, 500);
    let quick = topline(words, 250);
    let parts: [&[Step]; 10] = [
        &slow,
        DODODODO,
        &quick,
        &[Pause(250)],
        DODODODO,
        &quick,
        &[Pause(250)],
        DODODODO,
        &quick,
        &[Pause(1000)],
    ];
    for part in parts {
        if play(part, cancel, surface).await? == Flow::Cancelled {
            return Ok(Flow::Cancelled);
        }
    }
    Ok(Flow::Continue)
}

struct BabySharkActivity;

#[async_trait(?Send)]
impl Activity for BabySharkActivity {
    async fn run(
        &mut self,
        cancel: CancelToken<'_>,
        surface: &dyn Display,
    ) -> Result<(), ActivityError> {
        for words in VERSES {
            if verse(words, cancel, surface).await? == Flow::Cancelled {
                return Ok(());
            }
        }
        if pause(OUTRO_MS, cancel).await == Flow::Continue {
            surface.reset()?;
        }
        Ok(())
    }
}

/// The baby shark app
pub struct BabyShark {
    armed: AtomicBool,
}

impl BabyShark {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
        }
    }

    /// Let the next roster turn play the song
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Ask the scheduler to play the song now
    ///
    /// Returns once the scheduler has taken the request.
    pub async fn request(&self, intents: IntentSender<'_>) {
        info!("Baby shark requested");
        intents
            .submit(Intent::new(NAME, Box::new(BabySharkActivity)))
            .await;
    }
}

impl Default for BabyShark {
    fn default() -> Self {
        Self::new()
    }
}

impl App for BabyShark {
    fn name(&self) -> &'static str {
        NAME
    }

    fn activate(&self, id: &str) -> Result<BoxedActivity, AppError> {
        match self
            .armed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                debug!("Baby shark playing as {}", id);
                Ok(Box::new(BabySharkActivity))
            }
            Err(_) => Err(AppError::NoIntentArmed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_time::Timer;
    use glance_core::cancel::CancelSource;
    use glance_core::display::TextScreen;
    use glance_core::scheduler::IntentHandoff;

    #[test]
    fn test_not_armed_refuses() {
        let app = BabyShark::new();
        assert!(matches!(
            app.activate("babyshark-1"),
            Err(AppError::NoIntentArmed)
        ));
    }

    #[test]
    fn test_arm_allows_exactly_one_turn() {
        let app = BabyShark::new();
        app.arm();
        assert!(app.is_armed());
        assert!(app.activate("babyshark-1").is_ok());
        assert!(!app.is_armed());
        assert!(matches!(
            app.activate("babyshark-2"),
            Err(AppError::NoIntentArmed)
        ));
    }

    #[test]
    fn test_request_submits_intent() {
        let handoff = IntentHandoff::new();
        let app = BabyShark::new();

        let ((), intent) = block_on(join(app.request(handoff.sender()), handoff.take()));

        assert_eq!(intent.name, "babyshark");
        assert!(!app.is_armed());
    }

    #[test]
    fn test_topline_builds_the_verse() {
        let screen = TextScreen::new();
        for step in topline(VERSES[0], 0) {
            step.apply(&screen).unwrap();
        }
        assert_eq!(screen.line(0).trim_end(), "Baby SHARK!");
    }

    #[test]
    fn test_dodododo_ends_on_bottom_row() {
        let screen = TextScreen::new();
        for step in DODODODO {
            step.apply(&screen).unwrap();
        }
        assert_eq!(screen.line(0).trim_end(), "");
        assert_eq!(screen.line(1).trim_end(), "           do do");
    }

    #[test]
    fn test_cancel_stops_the_song() {
        let screen = TextScreen::new();
        let source = CancelSource::new();
        let mut activity = BabySharkActivity;

        let (result, ()) = block_on(join(
            activity.run(source.token(), &screen),
            async {
                Timer::after_millis(20).await;
                source.cancel();
            },
        ));

        assert_eq!(result, Ok(()));
        assert_eq!(screen.line(0).trim_end(), "Ba");
    }
}
