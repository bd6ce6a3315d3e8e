//! Best-effort alarm playback.
//!
//! Playback is an ordered chain of [`PlaybackStage`]s tried front to back
//! until one succeeds. The standard chain is:
//!
//! 1. rendered samples through the in-process engine,
//! 2. rendered samples (or a stock alert sound) through an external player,
//! 3. a freshly rendered minimal beep through the engine,
//! 4. the terminal bell.
//!
//! [`AudioOutput::play`] never returns an error and never panics; a fully
//! failed chain is logged and reported as `false` so a dead audio host can
//! never end a focus session.

mod engine;
mod system;

pub use engine::AudioEngine;
pub use system::SystemPlayer;

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use crate::bank::{SoundBank, SoundPreset};
use crate::error::PlaybackError;
use crate::presets::{PresetId, SAMPLE_RATE};
use crate::synth;

/// Advisory health of the playback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStatus {
    /// The primary stage can produce sound.
    Working,
    /// Only a fallback stage can produce sound.
    WorkingFallback,
    /// No stage reports itself able to produce sound.
    NotWorking,
}

impl AudioStatus {
    /// Short status line for a UI footer.
    pub fn label(&self) -> &'static str {
        match self {
            AudioStatus::Working => "Audio: Working",
            AudioStatus::WorkingFallback => "Audio: Working (System)",
            AudioStatus::NotWorking => "Audio: Not Working",
        }
    }
}

/// What a stage is asked to play.
#[derive(Debug, Clone, Copy)]
pub struct PlayRequest<'a> {
    /// The preset the user selected.
    pub id: PresetId,
    /// Its rendered samples; `None` when synthesis failed and the stage
    /// must substitute something audible.
    pub preset: Option<&'a SoundPreset>,
}

/// One playback strategy in the fallback chain.
pub trait PlaybackStage: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this stage believes it can currently produce sound.
    ///
    /// Used for the advisory [`AudioOutput::status`] probe only; a stage
    /// may still be tried when this returns false.
    fn available(&self) -> bool;

    /// Attempts to make the alarm audible, blocking until done.
    fn play(&self, request: &PlayRequest<'_>) -> Result<(), PlaybackError>;
}

/// Fallback-chain audio output over a shared [`SoundBank`].
pub struct AudioOutput {
    bank: Arc<SoundBank>,
    stages: Vec<Box<dyn PlaybackStage>>,
}

impl AudioOutput {
    /// The standard four-stage chain.
    pub fn new(bank: Arc<SoundBank>) -> Self {
        let stages: Vec<Box<dyn PlaybackStage>> = vec![
            Box::new(EngineStage {
                engine: AudioEngine,
            }),
            Box::new(SystemStage {
                player: SystemPlayer::new(),
            }),
            Box::new(FallbackBeepStage {
                engine: AudioEngine,
            }),
            Box::new(TerminalBellStage),
        ];
        Self::with_stages(bank, stages)
    }

    /// A custom chain, tried in the given order.
    pub fn with_stages(bank: Arc<SoundBank>, stages: Vec<Box<dyn PlaybackStage>>) -> Self {
        AudioOutput { bank, stages }
    }

    /// Plays `id` through the chain.
    ///
    /// Returns whether any stage succeeded. Failures are logged per stage
    /// and never propagate to the caller.
    pub fn play(&self, id: PresetId) -> bool {
        let preset = self.bank.get(id);
        let request = PlayRequest {
            id,
            preset: preset.as_deref(),
        };

        for stage in &self.stages {
            match stage.play(&request) {
                Ok(()) => {
                    tracing::debug!(stage = stage.name(), preset = %id, "alarm played");
                    return true;
                }
                Err(error) => {
                    tracing::warn!(
                        stage = stage.name(),
                        preset = %id,
                        %error,
                        "playback stage failed, trying the next one"
                    );
                }
            }
        }
        tracing::error!(preset = %id, "every playback stage failed");
        false
    }

    /// Probes the chain without playing anything.
    ///
    /// `Working` means the first stage believes it can produce sound,
    /// `WorkingFallback` that only a later stage does.
    pub fn status(&self) -> AudioStatus {
        for (index, stage) in self.stages.iter().enumerate() {
            if stage.available() {
                return if index == 0 {
                    AudioStatus::Working
                } else {
                    AudioStatus::WorkingFallback
                };
            }
        }
        AudioStatus::NotWorking
    }

    /// The bank this output plays from.
    pub fn bank(&self) -> &SoundBank {
        &self.bank
    }
}

/// Handle that rings the currently selected preset.
///
/// Clones share one selection and one output, so the countdown clock, the
/// alarm scheduler, and the control thread all ring the same sound and see
/// a selection change immediately.
#[derive(Clone)]
pub struct Alarm {
    output: Arc<AudioOutput>,
    selected: Arc<Mutex<PresetId>>,
}

impl Alarm {
    /// Wraps `output` with the default beep selected.
    pub fn new(output: Arc<AudioOutput>) -> Self {
        Alarm {
            output,
            selected: Arc::new(Mutex::new(PresetId::default())),
        }
    }

    /// Changes which preset subsequent rings play.
    pub fn select(&self, id: PresetId) {
        *self.selected.lock().unwrap() = id;
    }

    /// The preset a ring would play right now.
    pub fn selected(&self) -> PresetId {
        *self.selected.lock().unwrap()
    }

    /// Plays the selected preset through the fallback chain.
    pub fn ring(&self) -> bool {
        self.output.play(self.selected())
    }

    /// The underlying chain, for status probes.
    pub fn output(&self) -> &AudioOutput {
        &self.output
    }
}

/// Stage 1: rendered samples through the in-process engine.
struct EngineStage {
    engine: AudioEngine,
}

impl PlaybackStage for EngineStage {
    fn name(&self) -> &'static str {
        "engine"
    }

    fn available(&self) -> bool {
        self.engine.probe()
    }

    fn play(&self, request: &PlayRequest<'_>) -> Result<(), PlaybackError> {
        let preset = request
            .preset
            .ok_or(PlaybackError::Unavailable("preset has no rendering"))?;
        self.engine.play(preset.samples(), preset.sample_rate())
    }
}

/// Stage 2: the external system player.
struct SystemStage {
    player: SystemPlayer,
}

impl PlaybackStage for SystemStage {
    fn name(&self) -> &'static str {
        "system"
    }

    fn available(&self) -> bool {
        self.player.probe()
    }

    fn play(&self, request: &PlayRequest<'_>) -> Result<(), PlaybackError> {
        self.player.play(request.preset, request.id)
    }
}

/// Stage 3: a minimal beep rendered on the spot and pushed through the
/// engine, for when the selected preset has no rendering but a device
/// exists.
struct FallbackBeepStage {
    engine: AudioEngine,
}

impl PlaybackStage for FallbackBeepStage {
    fn name(&self) -> &'static str {
        "fallback-beep"
    }

    fn available(&self) -> bool {
        self.engine.probe()
    }

    fn play(&self, _request: &PlayRequest<'_>) -> Result<(), PlaybackError> {
        let samples = synth::synthesize(&PresetId::DefaultBeep.tone(), SAMPLE_RATE)?;
        self.engine.play(&samples, SAMPLE_RATE)
    }
}

/// Stage 4: the terminal bell.
///
/// Reports itself unavailable to the status probe: BEL reaching a speaker
/// depends entirely on the terminal, so it is a last resort rather than
/// working audio.
struct TerminalBellStage;

impl PlaybackStage for TerminalBellStage {
    fn name(&self) -> &'static str {
        "terminal-bell"
    }

    fn available(&self) -> bool {
        false
    }

    fn play(&self, _request: &PlayRequest<'_>) -> Result<(), PlaybackError> {
        let mut stdout = io::stdout();
        stdout.write_all(b"\x07")?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingStage {
        plays: AtomicUsize,
        saw_missing_preset: AtomicUsize,
        outcome: Result<(), &'static str>,
        availability: bool,
    }

    impl RecordingStage {
        fn succeeding() -> Self {
            RecordingStage {
                plays: AtomicUsize::new(0),
                saw_missing_preset: AtomicUsize::new(0),
                outcome: Ok(()),
                availability: true,
            }
        }

        fn failing() -> Self {
            RecordingStage {
                outcome: Err("simulated failure"),
                ..Self::succeeding()
            }
        }

        fn unavailable() -> Self {
            RecordingStage {
                availability: false,
                ..Self::succeeding()
            }
        }
    }

    impl PlaybackStage for Arc<RecordingStage> {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn available(&self) -> bool {
            self.availability
        }

        fn play(&self, request: &PlayRequest<'_>) -> Result<(), PlaybackError> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            if request.preset.is_none() {
                self.saw_missing_preset.fetch_add(1, Ordering::SeqCst);
            }
            self.outcome.map_err(PlaybackError::Unavailable)
        }
    }

    fn output_with(stages: Vec<Arc<RecordingStage>>) -> AudioOutput {
        let bank = Arc::new(SoundBank::build());
        let boxed = stages
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn PlaybackStage>)
            .collect();
        AudioOutput::with_stages(bank, boxed)
    }

    #[test]
    fn test_first_successful_stage_stops_the_chain() {
        let first = Arc::new(RecordingStage::succeeding());
        let second = Arc::new(RecordingStage::succeeding());
        let output = output_with(vec![first.clone(), second.clone()]);

        assert!(output.play(PresetId::Radar));
        assert_eq!(first.plays.load(Ordering::SeqCst), 1);
        assert_eq!(second.plays.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_fall_through_to_later_stages() {
        let first = Arc::new(RecordingStage::failing());
        let second = Arc::new(RecordingStage::failing());
        let third = Arc::new(RecordingStage::succeeding());
        let output = output_with(vec![first.clone(), second.clone(), third.clone()]);

        assert!(output.play(PresetId::Beacon));
        assert_eq!(first.plays.load(Ordering::SeqCst), 1);
        assert_eq!(second.plays.load(Ordering::SeqCst), 1);
        assert_eq!(third.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_total_failure_returns_false_without_panicking() {
        let only = Arc::new(RecordingStage::failing());
        let output = output_with(vec![only.clone()]);

        assert!(!output.play(PresetId::Sencha));
        assert_eq!(only.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_chain_plays_nothing() {
        let bank = Arc::new(SoundBank::build());
        let output = AudioOutput::with_stages(bank, Vec::new());
        assert!(!output.play(PresetId::DefaultBeep));
        assert_eq!(output.status(), AudioStatus::NotWorking);
    }

    #[test]
    fn test_status_reflects_which_stage_is_available() {
        let output = output_with(vec![
            Arc::new(RecordingStage::succeeding()),
            Arc::new(RecordingStage::succeeding()),
        ]);
        assert_eq!(output.status(), AudioStatus::Working);

        let output = output_with(vec![
            Arc::new(RecordingStage::unavailable()),
            Arc::new(RecordingStage::succeeding()),
        ]);
        assert_eq!(output.status(), AudioStatus::WorkingFallback);

        let output = output_with(vec![
            Arc::new(RecordingStage::unavailable()),
            Arc::new(RecordingStage::unavailable()),
        ]);
        assert_eq!(output.status(), AudioStatus::NotWorking);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(AudioStatus::Working.label(), "Audio: Working");
        assert_eq!(
            AudioStatus::WorkingFallback.label(),
            "Audio: Working (System)"
        );
        assert_eq!(AudioStatus::NotWorking.label(), "Audio: Not Working");
    }

    #[test]
    fn test_stages_see_a_missing_rendering() {
        let mut bank = SoundBank::build();
        bank.remove_for_tests(PresetId::Radar);

        let stage = Arc::new(RecordingStage::succeeding());
        let output =
            AudioOutput::with_stages(Arc::new(bank), vec![Box::new(stage.clone())]);

        assert!(output.play(PresetId::Radar));
        assert_eq!(stage.saw_missing_preset.load(Ordering::SeqCst), 1);

        // A healthy preset still arrives with its rendering.
        assert!(output.play(PresetId::Beacon));
        assert_eq!(stage.saw_missing_preset.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_alarm_rings_the_selected_preset() {
        let stage = Arc::new(RecordingStage::succeeding());
        let output = output_with(vec![stage.clone()]);
        let alarm = Alarm::new(Arc::new(output));

        assert_eq!(alarm.selected(), PresetId::DefaultBeep);
        alarm.select(PresetId::Playtime);
        assert_eq!(alarm.selected(), PresetId::Playtime);

        assert!(alarm.ring());
        assert_eq!(stage.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_alarm_clones_share_the_selection() {
        let stage = Arc::new(RecordingStage::succeeding());
        let output = output_with(vec![stage]);
        let alarm = Alarm::new(Arc::new(output));
        let observer = alarm.clone();

        alarm.select(PresetId::Hillside);
        assert_eq!(observer.selected(), PresetId::Hillside);
    }
}
