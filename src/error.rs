//! Crate-wide error types.
//!
//! The three failure families deliberately do not mix: invalid control input
//! is rejected before a session starts, synthesis failures are isolated per
//! preset by the sound bank, and playback failures stay inside the audio
//! stage chain. None of them can end a running session; only an explicit
//! stop or the countdown reaching zero does that.

use thiserror::Error;

/// Errors returned by the control boundary ([`crate::FocusTimer`]).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The requested session duration was zero.
    ///
    /// Durations are whole seconds and must be positive. The session stays
    /// in whatever phase it was in when this is returned.
    #[error("session duration must be positive, got {seconds}s")]
    InvalidDuration {
        /// The rejected duration.
        seconds: u64,
    },

    /// `start_session` was called while a session is counting down.
    ///
    /// Exactly one session is active at a time; stop the current one first.
    #[error("a focus session is already running")]
    SessionActive,
}

/// Failures inside the tone-rendering pipeline.
///
/// Always scoped to a single preset: [`crate::SoundBank`] logs the failure,
/// marks that preset unavailable, and keeps the remaining presets usable.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisError {
    /// The tone description renders to zero samples.
    #[error("tone renders to an empty signal")]
    EmptySignal,

    /// A rendered sample was NaN or infinite.
    #[error("non-finite sample at index {index}")]
    NonFinite {
        /// Index of the first offending sample.
        index: usize,
    },

    /// Every sample is zero, so the signal cannot be normalized.
    #[error("signal is silent and cannot be normalized")]
    SilentSignal,
}

/// Failure of a single playback stage.
///
/// Stage errors never escape [`crate::AudioOutput::play`]; they are logged
/// and the next stage in the chain is tried.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The stage cannot run on this host at all (no output device, no
    /// player binary on `PATH`, no mapped sound for this platform).
    #[error("{0}")]
    Unavailable(&'static str),

    /// Opening or driving the audio stream failed.
    #[error("audio stream: {0}")]
    Stream(String),

    /// Spawning or waiting on the external player failed.
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),

    /// The external player ran but reported failure.
    #[error("player exited with {0}")]
    PlayerStatus(std::process::ExitStatus),

    /// Writing the temporary WAV file failed.
    #[error("wav encoding: {0}")]
    Encode(#[from] hound::Error),

    /// Rendering the emergency fallback beep failed.
    #[error("fallback synthesis: {0}")]
    Synthesis(#[from] SynthesisError),
}
