//! Tocsin - a focus-session countdown with synthesized alarm tones.
//!
//! This crate is the headless core of a focus timer: a bank of eight
//! procedurally rendered alarm presets, a background countdown clock, a
//! randomized reminder cadence, and a best-effort playback chain that
//! degrades all the way to the terminal bell. A front end embeds
//! [`FocusTimer`] and renders the [`TimerEvent`]s it emits.
//!
//! ```no_run
//! use tocsin::{FocusTimer, PresetId, TimerConfig, TimerEvent};
//!
//! let (timer, events) = FocusTimer::new(TimerConfig::default());
//! timer.select_preset(PresetId::Radar);
//! timer.start_session(25 * 60)?;
//!
//! for event in events {
//!     match event {
//!         TimerEvent::Progress(progress) => println!("{}", progress.remaining_hms()),
//!         TimerEvent::SessionComplete => break,
//!         TimerEvent::PresetChanged(_) => {}
//!     }
//! }
//! # Ok::<(), tocsin::Error>(())
//! ```

pub mod audio;
pub mod bank;
pub mod clock;
pub mod error;
pub mod events;
pub mod presets;
pub mod scheduler;
pub mod session;
pub mod synth;
pub mod timer;

// Re-export the embedding surface at the crate root
pub use audio::{
    Alarm, AudioEngine, AudioOutput, AudioStatus, PlayRequest, PlaybackStage, SystemPlayer,
};
pub use bank::{SoundBank, SoundPreset};
pub use clock::CountdownClock;
pub use error::{Error, PlaybackError, SynthesisError};
pub use events::{format_hms, Progress, TimerEvent};
pub use presets::{PresetId, UnknownPreset, SAMPLE_RATE};
pub use scheduler::{AlarmScheduler, IntervalPicker, DEFAULT_ALARM_INTERVAL};
pub use session::Session;
pub use synth::{synthesize, Partial, ToneSpec, PEAK_CEILING};
pub use timer::{FocusTimer, SessionPhase, TimerConfig};
