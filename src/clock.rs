//! The once-per-tick countdown loop.
//!
//! Owns the write side of the session's remaining-time counter: nothing
//! else decrements it. Each tick sleeps, re-checks the running flag,
//! decrements, and pushes a progress snapshot; when the counter reaches
//! zero naturally the completion alarms play and a final
//! [`TimerEvent::SessionComplete`] is emitted. A stop observed at any
//! point makes the loop exit without completing.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::audio::Alarm;
use crate::events::TimerEvent;
use crate::session::Session;
use crate::timer::TimerConfig;

pub struct CountdownClock {
    session: Session,
    alarm: Alarm,
    events: Sender<TimerEvent>,
    tick: Duration,
    completion_plays: u32,
    completion_spacing: Duration,
}

impl CountdownClock {
    pub(crate) fn new(
        session: Session,
        alarm: Alarm,
        events: Sender<TimerEvent>,
        config: &TimerConfig,
    ) -> Self {
        CountdownClock {
            session,
            alarm,
            events,
            tick: config.tick,
            completion_plays: config.completion_plays,
            completion_spacing: config.completion_spacing,
        }
    }

    /// Moves the loop onto its own thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    /// Runs the countdown to completion or stop on the current thread.
    pub fn run(self) {
        // Push the starting snapshot so a UI shows the full duration
        // before the first tick lands.
        let initial = self.session.progress();
        let _ = self.events.send(TimerEvent::Progress(initial));

        loop {
            thread::sleep(self.tick);
            if !self.session.is_running() {
                tracing::debug!("countdown observed a stop");
                return;
            }
            let Some(remaining) = self.session.decrement() else {
                // A cancel drained the counter while we slept.
                return;
            };
            let snapshot = self.session.progress_at(remaining);
            let _ = self.events.send(TimerEvent::Progress(snapshot));

            if remaining == 0 {
                // A stop can race the final tick; completion only counts
                // if the session is still marked running.
                if self.session.is_running() {
                    self.complete();
                }
                return;
            }
        }
    }

    /// Plays the completion alarms and announces the finish.
    fn complete(&self) {
        tracing::info!(
            total_seconds = self.session.total_seconds(),
            "focus session complete"
        );
        for play in 0..self.completion_plays {
            if !self.alarm.ring() {
                tracing::warn!(play, "completion alarm produced no audio");
            }
            thread::sleep(self.completion_spacing);
        }
        let _ = self.events.send(TimerEvent::SessionComplete);
    }
}
