//! Round-robin cursor over the app roster

use core::fmt::Write;

use super::app::App;
use super::status::ActivityId;

/// Position in the roster plus the activity id counter
pub struct Roster<'a> {
    apps: &'a [&'a dyn App],
    position: usize,
    counter: u32,
}

impl<'a> Roster<'a> {
    pub fn new(apps: &'a [&'a dyn App]) -> Self {
        Self {
            apps,
            position: 0,
            counter: 0,
        }
    }

    /// App whose turn it is, `None` for an empty roster
    pub fn current(&self) -> Option<&'a dyn App> {
        self.apps.get(self.position).copied()
    }

    /// Move to the next app, wrapping around
    pub fn advance(&mut self) {
        if !self.apps.is_empty() {
            self.position = (self.position + 1) % self.apps.len();
        }
    }

    /// Allocate a fresh activity id for `name`
    ///
    /// The counter is shared by every app, so ids strictly increase across
    /// the whole run. Names too long for an id are truncated.
    pub fn next_id(&mut self, name: &str) -> ActivityId {
        self.counter = self.counter.wrapping_add(1);
        let mut id = ActivityId::new();
        if write!(id, "{}-{}", name, self.counter).is_err() {
            id.clear();
            let mut suffix = heapless::String::<11>::new();
            let _ = write!(suffix, "-{}", self.counter);
            let keep = floor_char_boundary(name, id.capacity() - suffix.len());
            let _ = id.push_str(&name[..keep]);
            let _ = id.push_str(&suffix);
        }
        id
    }

    /// Ids handed out so far
    pub fn issued(&self) -> u32 {
        self.counter
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::app::{AppError, BoxedActivity};

    struct Named(&'static str);

    impl App for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn activate(&self, _id: &str) -> Result<BoxedActivity, AppError> {
            Err(AppError::Unavailable)
        }
    }

    #[test]
    fn test_empty_roster() {
        let mut roster = Roster::new(&[]);
        assert!(roster.current().is_none());
        roster.advance();
        assert!(roster.current().is_none());
    }

    #[test]
    fn test_advance_wraps() {
        let (a, b, c) = (Named("a"), Named("b"), Named("c"));
        let apps: [&dyn App; 3] = [&a, &b, &c];
        let mut roster = Roster::new(&apps);

        let mut order = heapless::Vec::<&str, 7>::new();
        for _ in 0..7 {
            let _ = order.push(roster.current().map(|app| app.name()).unwrap());
            roster.advance();
        }
        assert_eq!(order.as_slice(), &["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[test]
    fn test_ids_increase_across_apps() {
        let apps: [&dyn App; 0] = [];
        let mut roster = Roster::new(&apps);
        assert_eq!(roster.next_id("clock").as_str(), "clock-1");
        assert_eq!(roster.next_id("derek").as_str(), "derek-2");
        assert_eq!(roster.next_id("clock").as_str(), "clock-3");
        assert_eq!(roster.issued(), 3);
    }

    #[test]
    fn test_long_name_is_truncated() {
        let apps: [&dyn App; 0] = [];
        let mut roster = Roster::new(&apps);
        let id = roster.next_id("an-app-name-that-does-not-fit-in-an-id");
        assert_eq!(id.len(), id.capacity());
        assert!(id.ends_with("-1"));
    }
}
