use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Whether a recomputation of an entry's value is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshState {
  Idle,
  Refreshing,
}

/// A per-entry exclusion flag guarding value recomputation.
///
/// It has its own lock so that refresh attempts on different keys never
/// contend with each other or with the cache's ordering lock. It never blocks
/// readers of the entry's current value.
#[derive(Debug)]
pub(crate) struct RefreshLock {
  state: Mutex<RefreshState>,
}

impl RefreshLock {
  pub(crate) fn new() -> Self {
    Self {
      state: Mutex::new(RefreshState::Idle),
    }
  }

  /// Attempts the `Idle -> Refreshing` transition.
  ///
  /// Returns `true` only for the caller that performed the transition.
  pub(crate) fn try_begin(&self) -> bool {
    let mut state = self.state.lock();
    match *state {
      RefreshState::Idle => {
        *state = RefreshState::Refreshing;
        true
      }
      RefreshState::Refreshing => false,
    }
  }

  /// Unconditionally resets the flag to `Idle`.
  ///
  /// Returns the state that was replaced, so callers can notice an `end`
  /// without a matching `begin`.
  pub(crate) fn end(&self) -> RefreshState {
    std::mem::replace(&mut *self.state.lock(), RefreshState::Idle)
  }

  pub(crate) fn is_refreshing(&self) -> bool {
    *self.state.lock() == RefreshState::Refreshing
  }
}

/// An RAII guard proving that its holder won the refresh race for a key.
///
/// Dropping the guard ends the refresh, so the flag is released on every exit
/// path, including early returns and unwinding out of a failed recomputation.
#[must_use = "dropping the guard immediately ends the refresh"]
pub struct RefreshGuard {
  lock: Arc<RefreshLock>,
}

impl RefreshGuard {
  /// Returns a guard if the `Idle -> Refreshing` transition succeeded.
  pub(crate) fn acquire(lock: Arc<RefreshLock>) -> Option<Self> {
    if lock.try_begin() {
      Some(Self { lock })
    } else {
      None
    }
  }
}

impl fmt::Debug for RefreshGuard {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RefreshGuard").finish_non_exhaustive()
  }
}

impl Drop for RefreshGuard {
  fn drop(&mut self) {
    self.lock.end();
  }
}
