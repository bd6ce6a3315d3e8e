//! The built-in alarm preset catalog.
//!
//! Eight tones, each a fixed [`ToneSpec`] parameterization. The catalog is
//! the single source of truth for preset identity: ids map to display names,
//! file slugs, and tone descriptions, and [`crate::SoundBank`] renders them
//! in [`PresetId::ALL`] order.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::synth::{Fade, Partial, ToneSpec};

/// Sample rate every preset is rendered at, in Hz.
pub const SAMPLE_RATE: u32 = 44_100;

/// Identifier for one of the eight built-in alarm tones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetId {
    /// Plain 800 Hz beep.
    DefaultBeep,
    /// Rising swept beep with a trailing echo.
    Radar,
    /// Slow 2 Hz pulse over a warm harmonic bed.
    Beacon,
    /// Hard-attack attention tone with a fast shimmer.
    Bulletin,
    /// Clean electronic tone with a frequency wobble.
    Signal,
    /// Low flute-like tone under a wide harmonic stack.
    Hillside,
    /// Bouncy tone that bends upward as it plays.
    Playtime,
    /// Long, calm low tone with a slow vibrato.
    Sencha,
}

impl PresetId {
    /// All presets in catalog order.
    pub const ALL: [PresetId; 8] = [
        PresetId::DefaultBeep,
        PresetId::Radar,
        PresetId::Beacon,
        PresetId::Bulletin,
        PresetId::Signal,
        PresetId::Hillside,
        PresetId::Playtime,
        PresetId::Sencha,
    ];

    /// Human-readable name, as shown in a sound picker.
    pub fn name(self) -> &'static str {
        match self {
            PresetId::DefaultBeep => "Default Beep",
            PresetId::Radar => "Radar",
            PresetId::Beacon => "Beacon",
            PresetId::Bulletin => "Bulletin",
            PresetId::Signal => "Signal",
            PresetId::Hillside => "Hillside",
            PresetId::Playtime => "Playtime",
            PresetId::Sencha => "Sencha",
        }
    }

    /// Filesystem-safe name, used for exported WAV files.
    pub fn slug(self) -> &'static str {
        match self {
            PresetId::DefaultBeep => "default_beep",
            PresetId::Radar => "radar",
            PresetId::Beacon => "beacon",
            PresetId::Bulletin => "bulletin",
            PresetId::Signal => "signal",
            PresetId::Hillside => "hillside",
            PresetId::Playtime => "playtime",
            PresetId::Sencha => "sencha",
        }
    }

    /// The tone description rendered for this preset.
    pub fn tone(self) -> ToneSpec {
        match self {
            PresetId::DefaultBeep => {
                ToneSpec::new(0.5).partial(Partial::sine(800.0, 1.0))
            }
            PresetId::Radar => ToneSpec::new(0.8)
                .partial(Partial::sine(800.0, 1.0).with_sweep(0.8, 1.2))
                .with_echo(0.1, 0.3),
            PresetId::Beacon => ToneSpec::new(1.2)
                .partial(Partial::sine(600.0, 1.0).with_tremolo(2.0, 0.7, 0.3))
                .partial(Partial::sine(900.0, 0.3))
                .partial(Partial::sine(1200.0, 0.2))
                .with_fades(0.2),
            PresetId::Bulletin => ToneSpec::new(1.0)
                .partial(Partial::sine(1000.0, 1.0).with_tremolo(8.0, 0.9, 0.1))
                .with_fade_in(Fade::to_silence(0.05))
                .with_fade_out(Fade::to_floor(0.1, 0.3)),
            PresetId::Signal => ToneSpec::new(0.6)
                .partial(Partial::sine(1200.0, 1.0).with_vibrato(4.0, 50.0))
                .partial(Partial::sine(2400.0, 0.2)),
            PresetId::Hillside => ToneSpec::new(1.5)
                .partial(Partial::sine(400.0, 1.0).with_vibrato(6.0, 20.0))
                .partial(Partial::sine(600.0, 0.4))
                .partial(Partial::sine(1000.0, 0.3))
                .partial(Partial::sine(1400.0, 0.2))
                .with_fades(0.3),
            PresetId::Playtime => ToneSpec::new(0.8)
                .partial(
                    Partial::sine(800.0, 1.0)
                        .with_bend(1.0, 1.1)
                        .with_tremolo(12.0, 0.8, 0.2),
                )
                .partial(Partial::sine(1000.0, 0.3))
                .partial(Partial::sine(1400.0, 0.2)),
            PresetId::Sencha => ToneSpec::new(2.0)
                .partial(Partial::sine(300.0, 1.0).with_vibrato(2.0, 10.0))
                .partial(Partial::sine(600.0, 0.2))
                .partial(Partial::sine(900.0, 0.1))
                .with_fades(0.4),
        }
    }
}

impl Default for PresetId {
    fn default() -> Self {
        PresetId::DefaultBeep
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unrecognized preset name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown sound preset: {0:?}")]
pub struct UnknownPreset(pub String);

impl FromStr for PresetId {
    type Err = UnknownPreset;

    /// Parses a display name back into its id.
    ///
    /// # Examples
    ///
    /// ```
    /// use tocsin::presets::PresetId;
    ///
    /// let id: PresetId = "Radar".parse().unwrap();
    /// assert_eq!(id, PresetId::Radar);
    /// assert!("Klaxon".parse::<PresetId>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_eight_distinct_presets() {
        assert_eq!(PresetId::ALL.len(), 8);
        for (index, id) in PresetId::ALL.into_iter().enumerate() {
            assert_eq!(id as usize, index);
        }
    }

    #[test]
    fn test_names_round_trip_through_from_str() {
        for id in PresetId::ALL {
            assert_eq!(id.name().parse::<PresetId>(), Ok(id));
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let error = "Klaxon".parse::<PresetId>().unwrap_err();
        assert_eq!(error, UnknownPreset("Klaxon".to_string()));
    }

    #[test]
    fn test_default_is_the_default_beep() {
        assert_eq!(PresetId::default(), PresetId::DefaultBeep);
    }

    #[test]
    fn test_slugs_are_filesystem_safe() {
        for id in PresetId::ALL {
            let slug = id.slug();
            assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c == '_'));
        }
    }

    #[test]
    fn test_tone_durations_match_the_catalog() {
        let durations: Vec<f64> = PresetId::ALL
            .into_iter()
            .map(|id| id.tone().duration)
            .collect();
        assert_eq!(durations, vec![0.5, 0.8, 1.2, 1.0, 0.6, 1.5, 0.8, 2.0]);
    }

    #[test]
    fn test_layered_tones_keep_their_harmonics() {
        assert_eq!(PresetId::Beacon.tone().partials.len(), 3);
        assert_eq!(PresetId::Hillside.tone().partials.len(), 4);
        assert_eq!(PresetId::Playtime.tone().partials.len(), 3);
        assert_eq!(PresetId::Sencha.tone().partials.len(), 3);
    }

    #[test]
    fn test_bulletin_tail_stops_above_silence() {
        let tone = PresetId::Bulletin.tone();
        assert_eq!(tone.fade_in.duration, 0.05);
        assert_eq!(tone.fade_out.floor, 0.3);
    }

    #[test]
    fn test_radar_carries_its_echo() {
        let tone = PresetId::Radar.tone();
        assert!(tone.echo.is_some());
        let sweep = tone.partials[0].sweep.unwrap();
        assert_eq!((sweep.start, sweep.end), (0.8, 1.2));
    }
}
