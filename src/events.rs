//! Events pushed across the presentation boundary.
//!
//! The core never draws anything. A UI layer receives [`TimerEvent`]s over
//! the channel handed out by [`crate::FocusTimer::new`] and renders them
//! however it likes; dropping the receiver silently discards events rather
//! than disturbing the countdown.

use crate::presets::PresetId;

/// One presentation-boundary notification.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent {
    /// The countdown advanced by one tick.
    Progress(Progress),
    /// The countdown reached zero and the completion alarms have played.
    SessionComplete,
    /// The selected alarm preset changed.
    PresetChanged(PresetId),
}

/// Snapshot of countdown progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Completed fraction of the session, `0.0..=1.0`.
    pub elapsed_fraction: f64,
    /// Whole seconds left.
    pub remaining_seconds: u64,
}

impl Progress {
    /// The remaining time as `HH:MM:SS`.
    pub fn remaining_hms(&self) -> String {
        format_hms(self.remaining_seconds)
    }
}

/// Formats whole seconds as zero-padded `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use tocsin::events::format_hms;
///
/// assert_eq!(format_hms(0), "00:00:00");
/// assert_eq!(format_hms(1500), "00:25:00");
/// assert_eq!(format_hms(3661), "01:01:01");
/// ```
pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
