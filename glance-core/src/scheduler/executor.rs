//! Scheduler loop
//!
//! Gives each roster app a turn on the display, bounded by a deadline, and
//! lets intents jump the queue. Every activity draws through its own
//! [`Gate`], enabled for exactly the activity's window.
//!
//! One pass of the loop:
//!
//! 1. Return if the scheduler token is cancelled.
//! 2. Run a pending priority intent under the priority deadline.
//! 3. If an intent is waiting, make it the pending priority and move on to
//!    the next app without activating the current one.
//! 4. Activate the current app and run it under the roster deadline, racing
//!    it against intent arrival.
//! 5. Advance the roster.

use embassy_futures::select::{select, select3, Either, Either3};
use embassy_futures::yield_now;
use embassy_time::{Instant, Timer};

use super::app::{Activity, ActivityError, App};
use super::intent::{Intent, IntentHandoff};
use super::roster::Roster;
use super::status::{ActivityId, Status, StatusFeed};
use crate::cancel::{CancelSource, CancelToken};
use crate::config::SchedulerConfig;
use crate::display::{Display, Gate};

/// Intent waiting for its run
pub enum Pending {
    /// Nothing queued
    Idle,
    /// Run this intent before the next roster turn
    Priority(Intent),
}

/// How an activity's window closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ending {
    /// The activity returned on its own
    Completed,
    /// The deadline passed first
    Deadline,
    /// The scheduler token fired
    Cancelled,
}

/// Round-robin display scheduler
pub struct Scheduler<'a> {
    display: &'a dyn Display,
    apps: &'a [&'a dyn App],
    intents: &'a IntentHandoff,
    status: &'a StatusFeed,
    config: SchedulerConfig,
}

impl<'a> Scheduler<'a> {
    /// Create a scheduler over a fixed roster
    pub fn new(
        display: &'a dyn Display,
        apps: &'a [&'a dyn App],
        intents: &'a IntentHandoff,
        status: &'a StatusFeed,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            display,
            apps,
            intents,
            status,
            config,
        }
    }

    /// Run until `cancel` fires
    ///
    /// Returns `Ok(())` on cancellation. An error from a roster activity
    /// stops the scheduler and is returned; errors from activation and from
    /// priority runs are logged and skipped.
    pub async fn run(&self, cancel: CancelToken<'_>) -> Result<(), ActivityError> {
        info!("Starting scheduler with {} apps", self.apps.len());
        let mut roster = Roster::new(self.apps);
        let mut pending = Pending::Idle;

        loop {
            if cancel.is_cancelled() {
                info!("Stopping scheduler with {} apps", self.apps.len());
                return Ok(());
            }

            if let Pending::Priority(intent) = core::mem::replace(&mut pending, Pending::Idle) {
                self.run_priority(intent, &mut roster, cancel).await;
                continue;
            }

            if let Some(intent) = self.intents.try_take() {
                info!("Got intent {}", intent.name);
                pending = Pending::Priority(intent);
                roster.advance();
                continue;
            }

            let Some(app) = roster.current() else {
                // Nothing to rotate through; only intents can use the display.
                match select(cancel.cancelled(), self.intents.take()).await {
                    Either::First(()) => continue,
                    Either::Second(intent) => {
                        info!("Got intent {}", intent.name);
                        pending = Pending::Priority(intent);
                        continue;
                    }
                }
            };

            if let Some(intent) = self.roster_turn(app, &mut roster, cancel).await? {
                pending = Pending::Priority(intent);
            }
            roster.advance();
        }
    }

    /// One roster turn; returns the intent that preempted it, if any
    async fn roster_turn(
        &self,
        app: &dyn App,
        roster: &mut Roster<'_>,
        cancel: CancelToken<'_>,
    ) -> Result<Option<Intent>, ActivityError> {
        let id = roster.next_id(app.name());
        info!("Starting app {}", app.name());
        let mut activity = match app.activate(&id) {
            Ok(activity) => activity,
            Err(e) => {
                warn!("Error activating app {}: {}", app.name(), e);
                yield_now().await;
                return Ok(None);
            }
        };

        let deadline = Instant::now() + self.config.roster_deadline;
        let run = self.run_activity(app.name(), &id, activity.as_mut(), cancel, deadline);
        match select(run, self.intents.take()).await {
            Either::First(Ok(Ending::Completed)) | Either::First(Ok(Ending::Cancelled)) => Ok(None),
            Either::First(Ok(Ending::Deadline)) => {
                self.stop(app, &id);
                Ok(None)
            }
            Either::First(Err(e)) => {
                error!("App {} failed: {}", app.name(), e);
                Err(e)
            }
            Either::Second(intent) => {
                info!("Got intent {}, preempting {}", intent.name, id.as_str());
                self.stop(app, &id);
                Ok(Some(intent))
            }
        }
    }

    /// Run an intent's activity; its failures never stop the scheduler
    async fn run_priority(&self, intent: Intent, roster: &mut Roster<'_>, cancel: CancelToken<'_>) {
        let Intent { name, mut activity } = intent;
        let id = roster.next_id(name);
        let deadline = Instant::now() + self.config.priority_deadline;
        if let Err(e) = self
            .run_activity(name, &id, activity.as_mut(), cancel, deadline)
            .await
        {
            warn!("Priority activity {} failed: {}", id.as_str(), e);
        }
    }

    fn stop(&self, app: &dyn App, id: &str) {
        if let Err(e) = app.stop(id) {
            warn!("Error stopping {}: {}", id, e);
        }
    }

    /// Give `activity` the display until it returns, `deadline` passes or
    /// `cancel` fires
    ///
    /// The gate is disabled on every exit path, including when this future
    /// is dropped.
    async fn run_activity(
        &self,
        name: &'static str,
        id: &ActivityId,
        activity: &mut dyn Activity,
        cancel: CancelToken<'_>,
        deadline: Instant,
    ) -> Result<Ending, ActivityError> {
        debug!("Starting activity {}", id.as_str());
        let gate = Gate::new(self.display, id.as_str());
        let _enabled = gate.enable_scoped();
        if let Err(e) = gate.reset() {
            warn!("Error resetting display {}: {}", id.as_str(), e);
            return Err(e.into());
        }

        self.status.publish(Status {
            name,
            id: id.clone(),
            deadline,
        });

        let window = CancelSource::new();
        let token = cancel.child(&window);
        let ending = match select3(
            activity.run(token, &gate),
            token.cancelled(),
            Timer::at(deadline),
        )
        .await
        {
            Either3::First(Ok(())) => Ending::Completed,
            Either3::First(Err(e)) => {
                warn!("Error running activity {}: {}", id.as_str(), e);
                return Err(e);
            }
            Either3::Second(()) => Ending::Cancelled,
            Either3::Third(()) => Ending::Deadline,
        };
        window.cancel();

        match ending {
            Ending::Completed => debug!("Activity {} done", id.as_str()),
            Ending::Cancelled => debug!("Activity {} cancelled", id.as_str()),
            Ending::Deadline => debug!("Activity {} hit its deadline", id.as_str()),
        }
        Ok(ending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{CursorPosition, DisplayError, DisplayExt};
    use crate::scheduler::app::{AppError, BoxedActivity};
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;
    use async_trait::async_trait;
    use core::cell::RefCell;
    use embassy_futures::block_on;
    use embassy_futures::join::{join, join3};
    use embassy_time::Duration;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Reset,
        Write(String),
    }

    /// Display recording resets and writes
    #[derive(Default)]
    struct Trace {
        ops: RefCell<Vec<Op>>,
    }

    impl Trace {
        fn writes(&self) -> Vec<String> {
            self.ops
                .borrow()
                .iter()
                .filter_map(|op| match op {
                    Op::Write(s) => Some(s.clone()),
                    Op::Reset => None,
                })
                .collect()
        }
    }

    impl Display for Trace {
        fn write(&self, bytes: &[u8]) -> Result<usize, DisplayError> {
            let text = String::from_utf8_lossy(bytes).into_owned();
            self.ops.borrow_mut().push(Op::Write(text));
            Ok(bytes.len())
        }
        fn reset(&self) -> Result<(), DisplayError> {
            self.ops.borrow_mut().push(Op::Reset);
            Ok(())
        }
        fn clear(&self) -> Result<(), DisplayError> {
            Ok(())
        }
        fn clear_line(&self) -> Result<(), DisplayError> {
            Ok(())
        }
        fn move_cursor(&self, _position: CursorPosition) -> Result<(), DisplayError> {
            Ok(())
        }
        fn move_cursor_to(&self, _col: u8, _row: u8) -> Result<(), DisplayError> {
            Ok(())
        }
        fn close(&self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    #[derive(Clone, Copy)]
    enum Behaviour {
        /// Write, pause briefly, return
        Finish,
        /// Write, return when cancelled
        Hold,
        /// Write, never return
        Ignore,
        /// Return an error straight away
        Fail,
    }

    struct Scripted {
        text: &'static str,
        behaviour: Behaviour,
    }

    #[async_trait(?Send)]
    impl Activity for Scripted {
        async fn run(
            &mut self,
            cancel: CancelToken<'_>,
            surface: &dyn Display,
        ) -> Result<(), ActivityError> {
            if let Behaviour::Fail = self.behaviour {
                return Err(ActivityError::Aborted("boom"));
            }
            surface.print(self.text)?;
            match self.behaviour {
                Behaviour::Finish => Timer::after_millis(1).await,
                Behaviour::Hold => cancel.cancelled().await,
                Behaviour::Ignore => core::future::pending::<()>().await,
                Behaviour::Fail => {}
            }
            Ok(())
        }
    }

    type Log = RefCell<Vec<ActivityId>>;

    struct TestApp<'l> {
        name: &'static str,
        behaviour: Behaviour,
        unavailable: bool,
        activations: &'l Log,
        stops: RefCell<Vec<String>>,
    }

    impl<'l> TestApp<'l> {
        fn new(name: &'static str, behaviour: Behaviour, activations: &'l Log) -> Self {
            Self {
                name,
                behaviour,
                unavailable: false,
                activations,
                stops: RefCell::new(Vec::new()),
            }
        }
    }

    impl App for TestApp<'_> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn activate(&self, id: &str) -> Result<BoxedActivity, AppError> {
            self.activations
                .borrow_mut()
                .push(ActivityId::try_from(id).unwrap());
            if self.unavailable {
                return Err(AppError::Unavailable);
            }
            Ok(Box::new(Scripted {
                text: self.name,
                behaviour: self.behaviour,
            }))
        }

        fn stop(&self, id: &str) -> Result<(), AppError> {
            self.stops.borrow_mut().push(String::from(id));
            Ok(())
        }
    }

    fn intent(name: &'static str, behaviour: Behaviour) -> Intent {
        Intent::new(
            name,
            Box::new(Scripted {
                text: name,
                behaviour,
            }),
        )
    }

    fn fast() -> SchedulerConfig {
        SchedulerConfig {
            roster_deadline: Duration::from_millis(20),
            priority_deadline: Duration::from_millis(50),
        }
    }

    async fn until(cond: impl Fn() -> bool) {
        while !cond() {
            Timer::after_millis(1).await;
        }
    }

    fn ids(log: &Log) -> Vec<String> {
        log.borrow().iter().map(|id| String::from(id.as_str())).collect()
    }

    #[test]
    fn test_cancelled_before_start_returns_ok() {
        let trace = Trace::default();
        let log = Log::default();
        let app = TestApp::new("a", Behaviour::Finish, &log);
        let apps: [&dyn App; 1] = [&app];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        stop.cancel();
        assert_eq!(block_on(scheduler.run(stop.token())), Ok(()));
        assert!(log.borrow().is_empty());
        assert!(trace.ops.borrow().is_empty());
    }

    #[test]
    fn test_round_robin_with_increasing_ids() {
        let trace = Trace::default();
        let log = Log::default();
        let a = TestApp::new("a", Behaviour::Finish, &log);
        let b = TestApp::new("b", Behaviour::Finish, &log);
        let c = TestApp::new("c", Behaviour::Finish, &log);
        let apps: [&dyn App; 3] = [&a, &b, &c];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let (result, ()) = block_on(join(scheduler.run(stop.token()), async {
            until(|| log.borrow().len() >= 7).await;
            stop.cancel();
        }));

        assert_eq!(result, Ok(()));
        assert_eq!(
            &ids(&log)[..7],
            &["a-1", "b-2", "c-3", "a-4", "b-5", "c-6", "a-7"]
        );
        let ops = trace.ops.borrow();
        assert_eq!(
            &ops[..4],
            &[
                Op::Reset,
                Op::Write("a".into()),
                Op::Reset,
                Op::Write("b".into())
            ]
        );
    }

    #[test]
    fn test_status_published_per_activity() {
        let trace = Trace::default();
        let log = Log::default();
        let app = TestApp::new("clock", Behaviour::Hold, &log);
        let apps: [&dyn App; 1] = [&app];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let started = Instant::now();
        let (result, seen) = block_on(join(scheduler.run(stop.token()), async {
            let seen = status.receiver().next().await;
            stop.cancel();
            seen
        }));

        assert_eq!(result, Ok(()));
        assert_eq!(seen.name, "clock");
        assert_eq!(seen.id.as_str(), "clock-1");
        assert!(seen.deadline >= started + fast().roster_deadline);
    }

    #[test]
    fn test_status_id_matches_activation_id() {
        let trace = Trace::default();
        let log = Log::default();
        let app = TestApp::new("a-rather-long-application-name-indeed", Behaviour::Hold, &log);
        let apps: [&dyn App; 1] = [&app];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let (result, seen) = block_on(join(scheduler.run(stop.token()), async {
            let seen = status.receiver().next().await;
            stop.cancel();
            seen
        }));

        assert_eq!(result, Ok(()));
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(seen.id, log.borrow()[0]);
        assert!(seen.id.ends_with("-1"));
    }

    #[test]
    fn test_activation_error_skips_turn() {
        let trace = Trace::default();
        let log = Log::default();
        let mut broken = TestApp::new("broken", Behaviour::Finish, &log);
        broken.unavailable = true;
        let ok = TestApp::new("ok", Behaviour::Finish, &log);
        let apps: [&dyn App; 2] = [&broken, &ok];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let (result, ()) = block_on(join(scheduler.run(stop.token()), async {
            until(|| log.borrow().len() >= 4).await;
            stop.cancel();
        }));

        assert_eq!(result, Ok(()));
        assert_eq!(&ids(&log)[..4], &["broken-1", "ok-2", "broken-3", "ok-4"]);
        assert!(trace.writes().iter().all(|w| w == "ok"));
    }

    #[test]
    fn test_deadline_abandons_activity() {
        let trace = Trace::default();
        let log = Log::default();
        let stubborn = TestApp::new("stubborn", Behaviour::Ignore, &log);
        let quick = TestApp::new("quick", Behaviour::Finish, &log);
        let apps: [&dyn App; 2] = [&stubborn, &quick];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let started = Instant::now();
        let (result, ()) = block_on(join(scheduler.run(stop.token()), async {
            until(|| log.borrow().len() >= 2).await;
            stop.cancel();
        }));

        assert_eq!(result, Ok(()));
        assert!(started.elapsed() >= fast().roster_deadline);
        assert_eq!(&ids(&log)[..2], &["stubborn-1", "quick-2"]);
        assert_eq!(stubborn.stops.borrow().as_slice(), &["stubborn-1"]);
        assert!(quick.stops.borrow().is_empty());
    }

    #[test]
    fn test_activity_error_is_fatal() {
        let trace = Trace::default();
        let log = Log::default();
        let ok = TestApp::new("ok", Behaviour::Finish, &log);
        let bad = TestApp::new("bad", Behaviour::Fail, &log);
        let apps: [&dyn App; 2] = [&ok, &bad];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let result = block_on(scheduler.run(stop.token()));

        assert_eq!(result, Err(ActivityError::Aborted("boom")));
        assert_eq!(ids(&log), ["ok-1", "bad-2"]);
    }

    #[test]
    fn test_priority_error_is_absorbed() {
        let trace = Trace::default();
        let log = Log::default();
        let app = TestApp::new("a", Behaviour::Finish, &log);
        let apps: [&dyn App; 1] = [&app];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let (result, ()) = block_on(join(scheduler.run(stop.token()), async {
            intents.submit(intent("urgent", Behaviour::Fail)).await;
            until(|| log.borrow().len() >= 3).await;
            stop.cancel();
        }));

        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_intent_preempts_running_app() {
        let trace = Trace::default();
        let log = Log::default();
        let long = TestApp::new("long", Behaviour::Hold, &log);
        let apps: [&dyn App; 1] = [&long];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let config = SchedulerConfig {
            roster_deadline: Duration::from_secs(60),
            priority_deadline: Duration::from_secs(300),
        };
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, config);

        let stop = CancelSource::new();
        let started = Instant::now();
        let (result, (), urgent) = block_on(join3(
            scheduler.run(stop.token()),
            async {
                until(|| !log.borrow().is_empty()).await;
                intents.submit(intent("urgent", Behaviour::Hold)).await;
            },
            async {
                loop {
                    let seen = status.receiver().next().await;
                    if seen.name == "urgent" {
                        stop.cancel();
                        break seen;
                    }
                }
            },
        ));

        assert_eq!(result, Ok(()));
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(urgent.id.as_str(), "urgent-2");
        assert!(urgent.deadline >= started + Duration::from_secs(300));
        assert_eq!(long.stops.borrow().as_slice(), &["long-1"]);
        assert_eq!(trace.writes(), ["long", "urgent"]);
    }

    #[test]
    fn test_waiting_intent_skips_current_app() {
        let trace = Trace::default();
        let log = Log::default();
        let a = TestApp::new("a", Behaviour::Finish, &log);
        let b = TestApp::new("b", Behaviour::Finish, &log);
        let apps: [&dyn App; 2] = [&a, &b];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let ((), result) = block_on(join(
            intents.submit(intent("urgent", Behaviour::Finish)),
            async {
                let (result, ()) = join(scheduler.run(stop.token()), async {
                    until(|| !log.borrow().is_empty()).await;
                    stop.cancel();
                })
                .await;
                result
            },
        ));

        assert_eq!(result, Ok(()));
        assert_eq!(ids(&log)[0], "b-2");
        assert_eq!(&trace.writes()[..2], &["urgent", "b"]);
    }

    #[test]
    fn test_run_activity_resets_before_handing_over() {
        let trace = Trace::default();
        let log = Log::default();
        let app = TestApp::new("a", Behaviour::Finish, &log);
        let apps: [&dyn App; 1] = [&app];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let mut activity = Scripted {
            text: "x",
            behaviour: Behaviour::Finish,
        };
        let id = ActivityId::try_from("a-1").unwrap();
        let deadline = Instant::now() + Duration::from_secs(1);
        let ending = block_on(scheduler.run_activity("a", &id, &mut activity, stop.token(), deadline));

        assert_eq!(ending, Ok(Ending::Completed));
        assert_eq!(&*trace.ops.borrow(), &[Op::Reset, Op::Write("x".into())]);
    }

    #[test]
    fn test_empty_roster_serves_intents() {
        let trace = Trace::default();
        let apps: [&dyn App; 0] = [];
        let (intents, status) = (IntentHandoff::new(), StatusFeed::new());
        let scheduler = Scheduler::new(&trace, &apps, &intents, &status, fast());

        let stop = CancelSource::new();
        let (result, ()) = block_on(join(scheduler.run(stop.token()), async {
            intents.submit(intent("urgent", Behaviour::Finish)).await;
            until(|| trace.writes().len() == 1).await;
            stop.cancel();
        }));

        assert_eq!(result, Ok(()));
        assert_eq!(trace.writes(), ["urgent"]);
    }
}
