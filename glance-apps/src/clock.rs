//! 12-hour clock with a blinking colon
//!
//! The board has no RTC. Time of day is the uptime plus an offset from
//! configuration: the number of seconds past midnight at boot.

use alloc::boxed::Box;
use core::fmt::Write;

use async_trait::async_trait;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};
use heapless::String;

use glance_core::cancel::CancelToken;
use glance_core::display::{CursorPosition, Display, DisplayExt, SCREEN_COLS};
use glance_core::scheduler::{Activity, ActivityError, App, AppError, BoxedActivity};

pub const NAME: &str = "clock";

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Time of day as hours, minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    /// Seconds past midnight, wrapping at 24 hours
    pub const fn from_secs(secs: u64) -> Self {
        let secs = secs % SECS_PER_DAY;
        Self {
            hour: (secs / 3600) as u8,
            minute: (secs / 60 % 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    /// Render as `"    hh:mm:ss AM"`, the colons blank on odd seconds
    pub fn render(&self) -> String<SCREEN_COLS> {
        let colon = if self.second % 2 == 0 { ':' } else { ' ' };
        let hour12 = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        let meridiem = if self.hour < 12 { "AM" } else { "PM" };
        let mut out = String::new();
        // 15 characters, always fits
        let _ = write!(
            out,
            "    {:>2}{}{:02}{}{:02} {}",
            hour12, colon, self.minute, colon, self.second, meridiem
        );
        out
    }
}

struct ClockActivity {
    offset_s: u64,
}

impl ClockActivity {
    fn now(&self) -> TimeOfDay {
        TimeOfDay::from_secs(Instant::now().as_secs() + self.offset_s)
    }
}

#[async_trait(?Send)]
impl Activity for ClockActivity {
    async fn run(
        &mut self,
        cancel: CancelToken<'_>,
        surface: &dyn Display,
    ) -> Result<(), ActivityError> {
        loop {
            let next_second =
                Instant::from_secs(Instant::now().as_secs()) + Duration::from_secs(1);
            match select(Timer::at(next_second), cancel.cancelled()).await {
                Either::First(()) => {
                    surface.move_cursor(CursorPosition::TopLeft)?;
                    surface.print(&self.now().render())?;
                }
                Either::Second(()) => return Ok(()),
            }
        }
    }
}

/// The clock app
pub struct Clock {
    offset_s: u64,
}

impl Clock {
    /// Clock showing uptime plus `offset_s` seconds
    pub const fn new(offset_s: u64) -> Self {
        Self { offset_s }
    }
}

impl App for Clock {
    fn name(&self) -> &'static str {
        NAME
    }

    fn activate(&self, _id: &str) -> Result<BoxedActivity, AppError> {
        Ok(Box::new(ClockActivity {
            offset_s: self.offset_s,
        }))
    }
}
