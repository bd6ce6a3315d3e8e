//! The randomized reminder cadence.
//!
//! While a session runs, the scheduler rings the selected alarm once up
//! front and then at uniformly random intervals drawn from a fixed window.
//! Long waits are sliced into short polls of the shared session so a stop
//! interrupts the cadence within one poll rather than one interval.

use std::ops::Range;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::Alarm;
use crate::session::Session;
use crate::timer::TimerConfig;

/// The standard reminder window: three to five minutes, in seconds.
pub const DEFAULT_ALARM_INTERVAL: Range<f64> = 180.0..300.0;

/// Draws alarm intervals uniformly from a window.
///
/// Generic over the RNG so tests can seed the cadence; the default draws
/// from OS entropy.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use tocsin::scheduler::IntervalPicker;
///
/// let mut picker = IntervalPicker::with_rng(180.0..300.0, StdRng::seed_from_u64(7));
/// let interval = picker.pick();
/// assert!(interval.as_secs_f64() >= 180.0);
/// assert!(interval.as_secs_f64() < 300.0);
/// ```
#[derive(Debug, Clone)]
pub struct IntervalPicker<R: Rng = StdRng> {
    range: Range<f64>,
    rng: R,
}

impl IntervalPicker<StdRng> {
    /// A picker over the standard three-to-five-minute window.
    pub fn new() -> Self {
        Self::with_range(DEFAULT_ALARM_INTERVAL)
    }

    /// A picker over a custom window, in seconds.
    ///
    /// # Panics
    ///
    /// Panics when the window is empty or starts below zero.
    pub fn with_range(range: Range<f64>) -> Self {
        Self::with_rng(range, StdRng::from_entropy())
    }
}

impl Default for IntervalPicker<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> IntervalPicker<R> {
    /// A picker with caller-provided randomness.
    ///
    /// # Panics
    ///
    /// Panics when the window is empty or starts below zero.
    pub fn with_rng(range: Range<f64>, rng: R) -> Self {
        assert!(!range.is_empty(), "interval window must be non-empty");
        assert!(range.start >= 0.0, "interval window must be non-negative");
        IntervalPicker { range, rng }
    }

    /// Draws the next wait uniformly from the window.
    pub fn pick(&mut self) -> Duration {
        Duration::from_secs_f64(self.rng.gen_range(self.range.clone()))
    }
}

/// Background loop ringing the alarm at random intervals.
pub struct AlarmScheduler<R: Rng = StdRng> {
    session: Session,
    alarm: Alarm,
    picker: IntervalPicker<R>,
    poll: Duration,
}

impl AlarmScheduler<StdRng> {
    pub(crate) fn new(session: Session, alarm: Alarm, config: &TimerConfig) -> Self {
        Self::with_picker(
            session,
            alarm,
            IntervalPicker::with_range(config.alarm_interval.clone()),
            config.tick,
        )
    }
}

impl<R: Rng> AlarmScheduler<R> {
    /// A scheduler with an explicit picker and poll granularity.
    pub fn with_picker(
        session: Session,
        alarm: Alarm,
        picker: IntervalPicker<R>,
        poll: Duration,
    ) -> Self {
        AlarmScheduler {
            session,
            alarm,
            picker,
            poll,
        }
    }

    /// Runs the cadence on the current thread until the session ends.
    pub fn run(mut self) {
        if !self.session.is_active() {
            return;
        }
        // The first ring marks the session start.
        if !self.alarm.ring() {
            tracing::warn!("session-start alarm produced no audio");
        }

        loop {
            let interval = self.picker.pick();
            tracing::debug!(
                seconds = interval.as_secs_f64(),
                "next random alarm scheduled"
            );
            if !self.wait(interval) {
                tracing::debug!("alarm cadence observed session end");
                return;
            }
            self.alarm.ring();
        }
    }

    /// Sleeps `interval` in poll-sized slices.
    ///
    /// Returns false as soon as the session goes inactive, true when the
    /// full interval elapsed with the session still active.
    fn wait(&self, interval: Duration) -> bool {
        let deadline = Instant::now() + interval;
        loop {
            if !self.session.is_active() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(self.poll.min(deadline - now));
        }
    }
}

impl<R: Rng + Send + 'static> AlarmScheduler<R> {
    /// Moves the cadence onto its own thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }
}
