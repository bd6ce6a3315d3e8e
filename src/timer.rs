//! The session controller.
//!
//! [`FocusTimer`] is the single entry point a UI talks to: it owns the
//! sound bank, the playback chain, the preset selection, and the lifecycle
//! of the two background loops. Commands are synchronous and cheap except
//! [`FocusTimer::stop_session`], which joins the workers so that no event
//! or alarm can trail out after it returns.

use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::audio::{Alarm, AudioOutput, AudioStatus};
use crate::bank::SoundBank;
use crate::clock::CountdownClock;
use crate::error::Error;
use crate::events::TimerEvent;
use crate::presets::PresetId;
use crate::scheduler::{AlarmScheduler, DEFAULT_ALARM_INTERVAL};
use crate::session::Session;

/// Cadence knobs for the background loops.
///
/// The defaults are the production values; tests shrink the durations to
/// run sessions in milliseconds.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Countdown tick length, and the polling granularity of both loops.
    pub tick: Duration,
    /// Window the random reminder interval is drawn from, in seconds.
    pub alarm_interval: Range<f64>,
    /// How many times the alarm rings when the countdown completes.
    pub completion_plays: u32,
    /// Pause between completion rings.
    pub completion_spacing: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            tick: Duration::from_secs(1),
            alarm_interval: DEFAULT_ALARM_INTERVAL,
            completion_plays: 3,
            completion_spacing: Duration::from_millis(500),
        }
    }
}

/// Lifecycle phase of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session has been started yet.
    Idle,
    /// A session is counting down.
    Running,
    /// The last session ran out naturally.
    Completed,
    /// The last session was stopped early.
    Stopped,
}

/// The focus-timer core.
///
/// # Examples
///
/// ```no_run
/// use tocsin::{FocusTimer, PresetId, TimerConfig, TimerEvent};
///
/// let (timer, events) = FocusTimer::new(TimerConfig::default());
/// timer.select_preset(PresetId::Beacon);
/// timer.start_session(25 * 60)?;
///
/// for event in events {
///     match event {
///         TimerEvent::Progress(p) => println!("{}", p.remaining_hms()),
///         TimerEvent::SessionComplete => break,
///         _ => {}
///     }
/// }
/// # Ok::<(), tocsin::Error>(())
/// ```
pub struct FocusTimer {
    config: TimerConfig,
    bank: Arc<SoundBank>,
    alarm: Alarm,
    events: Sender<TimerEvent>,
    state: Mutex<TimerState>,
}

struct TimerState {
    session: Option<Session>,
    workers: Vec<JoinHandle<()>>,
}

impl FocusTimer {
    /// Builds the timer with the standard bank and playback chain.
    ///
    /// Returns the controller and the receiving end of its event channel.
    pub fn new(config: TimerConfig) -> (Self, Receiver<TimerEvent>) {
        let bank = Arc::new(SoundBank::build());
        let output = AudioOutput::new(bank.clone());
        Self::with_output(bank, output, config)
    }

    /// Builds the timer around a caller-provided bank and playback chain.
    pub fn with_output(
        bank: Arc<SoundBank>,
        output: AudioOutput,
        config: TimerConfig,
    ) -> (Self, Receiver<TimerEvent>) {
        let (events, receiver) = mpsc::channel();
        let timer = FocusTimer {
            config,
            bank,
            alarm: Alarm::new(Arc::new(output)),
            events,
            state: Mutex::new(TimerState {
                session: None,
                workers: Vec::new(),
            }),
        };
        (timer, receiver)
    }

    /// Starts a countdown of `total_seconds`.
    ///
    /// Spawns the countdown clock and the alarm scheduler; the scheduler
    /// rings once right away to mark the start. Rejects a zero duration
    /// and rejects starting while a session is already counting down.
    pub fn start_session(&self, total_seconds: u64) -> Result<(), Error> {
        if total_seconds == 0 {
            return Err(Error::InvalidDuration {
                seconds: total_seconds,
            });
        }

        let mut state = self.state.lock().unwrap();
        if state.session.as_ref().is_some_and(Session::is_active) {
            return Err(Error::SessionActive);
        }
        // Workers of a completed or stopped session may still be winding
        // down; collect them before starting the next pair.
        Self::join_workers(&mut state.workers);

        let session = Session::begin(total_seconds);
        tracing::info!(total_seconds, "focus session started");

        let clock = CountdownClock::new(
            session.clone(),
            self.alarm.clone(),
            self.events.clone(),
            &self.config,
        );
        let scheduler = AlarmScheduler::new(session.clone(), self.alarm.clone(), &self.config);
        state.workers.push(clock.spawn());
        state.workers.push(scheduler.spawn());
        state.session = Some(session);
        Ok(())
    }

    /// Stops the current session, if one is counting down.
    ///
    /// Idempotent: stopping an idle, completed, or already stopped timer
    /// does nothing. Blocks until both background loops have exited, so no
    /// progress event or alarm follows the return.
    pub fn stop_session(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some(session) = &state.session {
            if session.is_active() {
                tracing::info!(
                    remaining_seconds = session.remaining_seconds(),
                    "focus session stopped"
                );
                session.cancel();
            }
        }
        Self::join_workers(&mut state.workers);
    }

    /// The countdown's current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        let state = self.state.lock().unwrap();
        match &state.session {
            None => SessionPhase::Idle,
            Some(session) if !session.is_running() => SessionPhase::Stopped,
            Some(session) if session.remaining_seconds() == 0 => SessionPhase::Completed,
            Some(_) => SessionPhase::Running,
        }
    }

    /// Changes which preset the alarms play, effective immediately.
    pub fn select_preset(&self, id: PresetId) {
        self.alarm.select(id);
        tracing::debug!(preset = %id, "alarm preset selected");
        let _ = self.events.send(TimerEvent::PresetChanged(id));
    }

    /// String-boundary preset selection.
    ///
    /// Unrecognized names select the default beep rather than failing, so
    /// a stale name stored in a UI's settings can never brick the alarm.
    /// Returns what was actually selected.
    pub fn select_preset_named(&self, name: &str) -> PresetId {
        let id = name.parse().unwrap_or_default();
        self.select_preset(id);
        id
    }

    /// The preset an alarm would play right now.
    pub fn selected_preset(&self) -> PresetId {
        self.alarm.selected()
    }

    /// Rings the selected preset once, immediately.
    ///
    /// Returns whether any playback stage produced sound.
    pub fn test_selected_preset(&self) -> bool {
        self.alarm.ring()
    }

    /// Advisory health of the playback chain.
    pub fn audio_status(&self) -> AudioStatus {
        self.alarm.output().status()
    }

    /// The bank of rendered presets.
    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }

    fn join_workers(workers: &mut Vec<JoinHandle<()>>) {
        for handle in workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("background worker panicked");
            }
        }
    }
}

impl Drop for FocusTimer {
    fn drop(&mut self) {
        self.stop_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> TimerConfig {
        TimerConfig {
            tick: Duration::from_millis(10),
            // Far beyond any test's runtime, so only the start ring fires.
            alarm_interval: 3600.0..3601.0,
            completion_plays: 3,
            completion_spacing: Duration::from_millis(2),
        }
    }

    fn quiet_timer() -> (FocusTimer, Receiver<TimerEvent>) {
        let bank = Arc::new(SoundBank::build());
        let output = AudioOutput::with_stages(bank.clone(), Vec::new());
        FocusTimer::with_output(bank, output, fast_config())
    }

    #[test]
    fn test_zero_duration_is_rejected_without_side_effects() {
        let (timer, events) = quiet_timer();
        assert_eq!(
            timer.start_session(0),
            Err(Error::InvalidDuration { seconds: 0 })
        );
        assert_eq!(timer.phase(), SessionPhase::Idle);
        assert!(events.try_iter().next().is_none());
    }

    #[test]
    fn test_double_start_is_rejected() {
        let (timer, _events) = quiet_timer();
        timer.start_session(600).unwrap();
        assert_eq!(timer.start_session(5), Err(Error::SessionActive));
        timer.stop_session();
    }

    #[test]
    fn test_phase_follows_the_lifecycle() {
        let (timer, events) = quiet_timer();
        assert_eq!(timer.phase(), SessionPhase::Idle);

        timer.start_session(600).unwrap();
        assert_eq!(timer.phase(), SessionPhase::Running);

        timer.stop_session();
        assert_eq!(timer.phase(), SessionPhase::Stopped);

        // A fresh session replaces the stopped one and can complete.
        timer.start_session(1).unwrap();
        loop {
            match events.recv_timeout(Duration::from_secs(5)).unwrap() {
                TimerEvent::SessionComplete => break,
                _ => continue,
            }
        }
        timer.stop_session();
        assert_eq!(timer.phase(), SessionPhase::Completed);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (timer, _events) = quiet_timer();
        timer.stop_session();
        assert_eq!(timer.phase(), SessionPhase::Idle);

        timer.start_session(600).unwrap();
        timer.stop_session();
        timer.stop_session();
        assert_eq!(timer.phase(), SessionPhase::Stopped);
    }

    #[test]
    fn test_stop_after_completion_preserves_the_completed_phase() {
        let (timer, events) = quiet_timer();
        timer.start_session(1).unwrap();
        loop {
            if let TimerEvent::SessionComplete =
                events.recv_timeout(Duration::from_secs(5)).unwrap()
            {
                break;
            }
        }
        timer.stop_session();
        assert_eq!(timer.phase(), SessionPhase::Completed);
    }

    #[test]
    fn test_selection_defaults_and_round_trips() {
        let (timer, events) = quiet_timer();
        assert_eq!(timer.selected_preset(), PresetId::DefaultBeep);

        timer.select_preset(PresetId::Sencha);
        assert_eq!(timer.selected_preset(), PresetId::Sencha);
        assert_eq!(
            events.try_iter().last(),
            Some(TimerEvent::PresetChanged(PresetId::Sencha))
        );
    }

    #[test]
    fn test_unknown_preset_name_selects_the_default() {
        let (timer, _events) = quiet_timer();
        timer.select_preset(PresetId::Radar);

        let selected = timer.select_preset_named("Klaxon");
        assert_eq!(selected, PresetId::DefaultBeep);
        assert_eq!(timer.selected_preset(), PresetId::DefaultBeep);

        assert_eq!(timer.select_preset_named("Hillside"), PresetId::Hillside);
    }

    #[test]
    fn test_empty_chain_reports_not_working_but_still_runs() {
        let (timer, _events) = quiet_timer();
        assert_eq!(timer.audio_status(), AudioStatus::NotWorking);
        assert!(!timer.test_selected_preset());

        timer.start_session(600).unwrap();
        assert_eq!(timer.phase(), SessionPhase::Running);
        timer.stop_session();
    }

    #[test]
    fn test_bank_is_shared_with_the_controller() {
        let (timer, _events) = quiet_timer();
        assert_eq!(timer.bank().available_count(), 8);
    }
}
