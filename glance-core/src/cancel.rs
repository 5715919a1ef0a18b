//! Cooperative cancellation
//!
//! A [`CancelSource`] owns the cancelled flag; [`CancelToken`]s observe it.
//! Tokens form a chain: a token derived with [`CancelToken::child`] reports
//! cancelled as soon as its own source or any ancestor's source fires.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Tasks that may wait on one source at the same time
const MAX_WAITERS: usize = 4;

struct State {
    cancelled: bool,
    waiters: MultiWakerRegistration<MAX_WAITERS>,
}

/// Owner side of a cancellation flag
pub struct CancelSource {
    state: Mutex<CriticalSectionRawMutex, RefCell<State>>,
}

impl CancelSource {
    /// Create a source that has not fired
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                cancelled: false,
                waiters: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Fire the source and wake everything waiting on it
    ///
    /// Firing twice is harmless.
    pub fn cancel(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.cancelled = true;
            state.waiters.wake();
        });
    }

    /// Check whether the source has fired
    pub fn is_cancelled(&self) -> bool {
        self.state.lock(|state| state.borrow().cancelled)
    }

    /// Root token observing this source
    pub fn token(&self) -> CancelToken<'_> {
        CancelToken {
            source: self,
            parent: None,
        }
    }

    fn poll_cancelled(&self, cx: &mut Context<'_>) -> bool {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if !state.cancelled {
                state.waiters.register(cx.waker());
            }
            state.cancelled
        })
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of a cancellation flag
#[derive(Clone, Copy)]
pub struct CancelToken<'a> {
    source: &'a CancelSource,
    parent: Option<&'a CancelToken<'a>>,
}

impl<'a> CancelToken<'a> {
    /// Derive a token that also fires when `source` does
    pub fn child<'b>(&'b self, source: &'b CancelSource) -> CancelToken<'b> {
        CancelToken {
            source,
            parent: Some(self),
        }
    }

    /// Check whether this token or any ancestor has fired
    pub fn is_cancelled(&self) -> bool {
        let mut token = Some(self);
        while let Some(t) = token {
            if t.source.is_cancelled() {
                return true;
            }
            token = t.parent;
        }
        false
    }

    /// Wait until this token or any ancestor fires
    pub async fn cancelled(&self) {
        poll_fn(|cx| {
            let mut token = Some(self);
            while let Some(t) = token {
                if t.source.poll_cancelled(cx) {
                    return Poll::Ready(());
                }
                token = t.parent;
            }
            Poll::Pending
        })
        .await
    }
}
