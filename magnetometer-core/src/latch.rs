//! Single-use completion latch
//!
//! A one-shot request has two ways to finish: a sample arrives (on the
//! sensor dispatch thread) or the deadline passes (on the waiting thread).
//! Both go through one `Latch`, and whichever flips it first wins. The
//! loser is a no-op: a late sample after a timeout is dropped, and a
//! timeout never fires once a sample has been accepted.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug)]
enum LatchState<T> {
    Pending,
    Completed(T),
    Closed,
}

/// Completion latch carrying one value
#[derive(Debug)]
pub struct Latch<T> {
    state: Mutex<LatchState<T>>,
    ready: Condvar,
}

impl<T> Latch<T> {
    /// Open latch
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LatchState::Pending),
            ready: Condvar::new(),
        }
    }

    /// Offer a value; only the first offer on an open latch is accepted
    ///
    /// Returns `false` if the latch was already completed or closed.
    pub fn complete(&self, value: T) -> bool {
        let mut state = self.lock();
        if !matches!(*state, LatchState::Pending) {
            return false;
        }
        *state = LatchState::Completed(value);
        drop(state);
        self.ready.notify_all();
        true
    }

    /// True once a value was accepted or the latch was closed
    pub fn is_done(&self) -> bool {
        !matches!(*self.lock(), LatchState::Pending)
    }

    /// Block until a value arrives or `timeout` elapses
    ///
    /// Closes the latch either way, so exactly one caller observes the
    /// value and any later `complete` is rejected.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        let guard = self.lock();
        let (mut state, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |s| matches!(s, LatchState::Pending))
            .unwrap_or_else(PoisonError::into_inner);

        match std::mem::replace(&mut *state, LatchState::Closed) {
            LatchState::Completed(value) => Some(value),
            LatchState::Pending | LatchState::Closed => None,
        }
    }

    // Every transition leaves the state valid, so a poisoned lock is safe to reuse
    fn lock(&self) -> MutexGuard<'_, LatchState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Latch<T> {
    fn default() -> Self {
        Self::new()
    }
}
