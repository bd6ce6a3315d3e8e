//! The eagerly-rendered catalog of alarm tones.
//!
//! Every preset is synthesized once at startup and held in memory; the
//! longest tone is two seconds of mono 16-bit audio, so the whole bank is
//! well under a megabyte. A preset whose synthesis fails is marked
//! unavailable and logged, and the rest of the bank is unaffected.

use std::sync::Arc;

use crate::presets::{PresetId, SAMPLE_RATE};
use crate::synth;

/// One rendered alarm tone.
#[derive(Debug, Clone)]
pub struct SoundPreset {
    id: PresetId,
    sample_rate: u32,
    samples: Vec<i16>,
}

impl SoundPreset {
    /// The preset this rendering belongs to.
    pub fn id(&self) -> PresetId {
        self.id
    }

    /// Sample rate of the rendering in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The rendered mono samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Playback length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// The fixed bank of eight presets.
///
/// # Examples
///
/// ```
/// use tocsin::{PresetId, SoundBank};
///
/// let bank = SoundBank::build();
/// assert_eq!(bank.available_count(), 8);
/// let beep = bank.get(PresetId::DefaultBeep).unwrap();
/// assert_eq!(beep.sample_rate(), 44_100);
/// ```
#[derive(Debug)]
pub struct SoundBank {
    presets: [Option<Arc<SoundPreset>>; 8],
}

impl SoundBank {
    /// Renders every preset in the catalog.
    ///
    /// Failures are isolated: a preset that does not render is logged and
    /// left unavailable, and building always succeeds.
    pub fn build() -> Self {
        let mut presets: [Option<Arc<SoundPreset>>; 8] = Default::default();
        for id in PresetId::ALL {
            match synth::synthesize(&id.tone(), SAMPLE_RATE) {
                Ok(samples) => {
                    tracing::debug!(
                        preset = %id,
                        samples = samples.len(),
                        "rendered alarm preset"
                    );
                    presets[id as usize] = Some(Arc::new(SoundPreset {
                        id,
                        sample_rate: SAMPLE_RATE,
                        samples,
                    }));
                }
                Err(error) => {
                    tracing::warn!(
                        preset = %id,
                        %error,
                        "preset failed to render and will rely on fallback playback"
                    );
                }
            }
        }
        SoundBank { presets }
    }

    /// Looks up a rendering; `None` when synthesis for it failed.
    pub fn get(&self, id: PresetId) -> Option<Arc<SoundPreset>> {
        self.presets[id as usize].clone()
    }

    /// Whether `id` rendered successfully.
    pub fn is_available(&self, id: PresetId) -> bool {
        self.presets[id as usize].is_some()
    }

    /// Number of presets that rendered successfully.
    pub fn available_count(&self) -> usize {
        self.presets.iter().filter(|p| p.is_some()).count()
    }
}

#[cfg(test)]
impl SoundBank {
    /// Drops a rendering so tests can exercise the unavailable-preset path.
    pub(crate) fn remove_for_tests(&mut self, id: PresetId) {
        self.presets[id as usize] = None;
    }
}
