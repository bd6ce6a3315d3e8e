//! Shared countdown-session state.
//!
//! One [`Session`] is shared by the control thread, the countdown clock,
//! and the alarm scheduler. The state is two atomics, with a strict write
//! discipline instead of a lock: `remaining` is decremented only by the
//! clock loop, and `running` is cleared only by the control thread. A stop
//! clears `running` first and then zeroes `remaining`, and the clock's
//! decrement saturates at zero, so the two writers cannot race the counter
//! below zero.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::events::Progress;

/// Shared state of one countdown session.
///
/// Cloning is cheap and every clone observes the same session.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    total_seconds: u64,
    remaining: AtomicU64,
    running: AtomicBool,
}

impl Session {
    /// Starts a session of `total_seconds`, already marked running.
    pub(crate) fn begin(total_seconds: u64) -> Self {
        Session {
            inner: Arc::new(Inner {
                total_seconds,
                remaining: AtomicU64::new(total_seconds),
                running: AtomicBool::new(true),
            }),
        }
    }

    /// The duration this session started from.
    pub fn total_seconds(&self) -> u64 {
        self.inner.total_seconds
    }

    /// Whole seconds left on the countdown.
    pub fn remaining_seconds(&self) -> u64 {
        self.inner.remaining.load(Ordering::Acquire)
    }

    /// Whether the session has been stopped.
    ///
    /// Stays true after a natural completion; completion is the pair
    /// `running && remaining == 0`.
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Running with time still left: the continue condition for both
    /// background loops.
    pub fn is_active(&self) -> bool {
        self.is_running() && self.remaining_seconds() > 0
    }

    /// Control-thread cancel: clears the running flag, then zeroes the
    /// countdown so observers see the stop immediately.
    pub(crate) fn cancel(&self) {
        self.inner.running.store(false, Ordering::Release);
        self.inner.remaining.store(0, Ordering::Release);
    }

    /// Clock-thread tick: takes one second off the countdown.
    ///
    /// Returns the new remaining value, or `None` when the counter was
    /// already at zero (a cancel drained it under the clock's feet).
    pub(crate) fn decrement(&self) -> Option<u64> {
        self.inner
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |r| r.checked_sub(1))
            .ok()
            .map(|previous| previous - 1)
    }

    /// Snapshot for the presentation boundary.
    pub fn progress(&self) -> Progress {
        self.progress_at(self.remaining_seconds())
    }

    /// Snapshot at an explicit remaining value, used by the clock so the
    /// emitted event matches the decrement it just performed.
    pub(crate) fn progress_at(&self, remaining_seconds: u64) -> Progress {
        let total = self.inner.total_seconds.max(1);
        let elapsed = total - remaining_seconds.min(total);
        Progress {
            elapsed_fraction: elapsed as f64 / total as f64,
            remaining_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_starts_running_with_full_time() {
        let session = Session::begin(90);
        assert_eq!(session.total_seconds(), 90);
        assert_eq!(session.remaining_seconds(), 90);
        assert!(session.is_running());
        assert!(session.is_active());
    }

    #[test]
    fn test_decrement_counts_down_to_zero() {
        let session = Session::begin(2);
        assert_eq!(session.decrement(), Some(1));
        assert_eq!(session.decrement(), Some(0));
        assert!(!session.is_active());
        assert!(session.is_running());
    }

    #[test]
    fn test_decrement_saturates_once_drained() {
        let session = Session::begin(1);
        assert_eq!(session.decrement(), Some(0));
        assert_eq!(session.decrement(), None);
        assert_eq!(session.remaining_seconds(), 0);
    }

    #[test]
    fn test_cancel_stops_and_zeroes() {
        let session = Session::begin(300);
        session.cancel();
        assert!(!session.is_running());
        assert!(!session.is_active());
        assert_eq!(session.remaining_seconds(), 0);
        // The clock cannot resurrect a cancelled session.
        assert_eq!(session.decrement(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let session = Session::begin(10);
        let observer = session.clone();
        session.decrement();
        assert_eq!(observer.remaining_seconds(), 9);
    }

    #[test]
    fn test_progress_fraction_spans_the_session() {
        let session = Session::begin(4);
        assert_eq!(session.progress().elapsed_fraction, 0.0);
        session.decrement();
        assert_eq!(session.progress().elapsed_fraction, 0.25);
        session.decrement();
        session.decrement();
        session.decrement();
        let progress = session.progress();
        assert_eq!(progress.elapsed_fraction, 1.0);
        assert_eq!(progress.remaining_seconds, 0);
    }

    #[test]
    fn test_progress_formats_hms() {
        let session = Session::begin(1500);
        assert_eq!(session.progress().remaining_hms(), "00:25:00");
    }
}
