//! Offline tone rendering.
//!
//! The pipeline is fixed: sum the partials into a float buffer, add the
//! echo, apply the edge fades, then normalize the peak to [`PEAK_CEILING`]
//! and quantize to `i16`. Fades run before normalization so a tone whose
//! amplitude peaks inside a fade window still normalizes on what remains
//! audible.

use std::f64::consts::PI;

use super::{Echo, Fade, Partial, ToneSpec, PEAK_CEILING};
use crate::error::SynthesisError;

/// Renders `spec` into normalized 16-bit PCM at `sample_rate` Hz.
///
/// # Arguments
///
/// * `spec` - The tone description to render.
/// * `sample_rate` - Output sample rate in Hz.
///
/// # Returns
///
/// Mono samples whose loudest value is exactly [`PEAK_CEILING`], or a
/// [`SynthesisError`] when the description renders to nothing usable.
///
/// # Examples
///
/// ```
/// use tocsin::synth::{synthesize, Partial, ToneSpec, PEAK_CEILING};
///
/// let spec = ToneSpec::new(0.5).partial(Partial::sine(800.0, 1.0));
/// let samples = synthesize(&spec, 44_100).unwrap();
/// let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
/// assert_eq!(f64::from(peak), PEAK_CEILING);
/// ```
pub fn synthesize(spec: &ToneSpec, sample_rate: u32) -> Result<Vec<i16>, SynthesisError> {
    let rate = f64::from(sample_rate);
    let count = (spec.duration * rate) as usize;
    if count == 0 {
        return Err(SynthesisError::EmptySignal);
    }

    let mut mix = vec![0.0f64; count];
    for partial in &spec.partials {
        accumulate(&mut mix, partial, rate);
    }

    if let Some(echo) = spec.echo {
        apply_echo(&mut mix, echo, rate);
    }

    apply_fade_in(&mut mix, spec.fade_in, rate);
    apply_fade_out(&mut mix, spec.fade_out, rate);

    quantize(&mix)
}

/// Adds one partial into the mix buffer.
fn accumulate(buffer: &mut [f64], partial: &Partial, rate: f64) {
    let count = buffer.len();
    for (index, sample) in buffer.iter_mut().enumerate() {
        let t = index as f64 / rate;

        let mut frequency = partial.frequency;
        if let Some(bend) = partial.bend {
            frequency *= ramp(bend.start, bend.end, count, index);
        }
        if let Some(vibrato) = partial.vibrato {
            frequency += vibrato.depth * (2.0 * PI * vibrato.rate * t).sin();
        }

        let mut value = partial.amplitude * (2.0 * PI * frequency * t).sin();
        if let Some(tremolo) = partial.tremolo {
            value *= tremolo.base + tremolo.depth * (2.0 * PI * tremolo.rate * t).sin();
        }
        if let Some(sweep) = partial.sweep {
            value *= ramp(sweep.start, sweep.end, count, index);
        }

        *sample += value;
    }
}

/// Adds a single delayed tap of the dry signal back onto the buffer.
///
/// Iterates back-to-front so each read sees the pristine value at
/// `index - delay`; a forward pass would feed echoed samples back into
/// later echoes.
fn apply_echo(buffer: &mut [f64], echo: Echo, rate: f64) {
    let delay = (echo.delay * rate) as usize;
    if delay == 0 || delay >= buffer.len() {
        return;
    }
    for index in (delay..buffer.len()).rev() {
        buffer[index] += buffer[index - delay] * echo.gain;
    }
}

fn apply_fade_in(buffer: &mut [f64], fade: Fade, rate: f64) {
    let span = ((fade.duration * rate) as usize).min(buffer.len());
    for index in 0..span {
        buffer[index] *= ramp(fade.floor, 1.0, span, index);
    }
}

fn apply_fade_out(buffer: &mut [f64], fade: Fade, rate: f64) {
    let count = buffer.len();
    let span = ((fade.duration * rate) as usize).min(count);
    for index in 0..span {
        buffer[count - span + index] *= ramp(1.0, fade.floor, span, index);
    }
}

/// Endpoint-inclusive linear ramp: `start` at index 0, `end` at the last
/// index of a `len`-sample window.
fn ramp(start: f64, end: f64, len: usize, index: usize) -> f64 {
    if len < 2 {
        return start;
    }
    start + (end - start) * index as f64 / (len - 1) as f64
}

/// Normalizes the peak to [`PEAK_CEILING`] and rounds to the nearest
/// 16-bit value.
fn quantize(buffer: &[f64]) -> Result<Vec<i16>, SynthesisError> {
    let mut peak = 0.0f64;
    for (index, sample) in buffer.iter().enumerate() {
        if !sample.is_finite() {
            return Err(SynthesisError::NonFinite { index });
        }
        peak = peak.max(sample.abs());
    }
    if peak == 0.0 {
        return Err(SynthesisError::SilentSignal);
    }

    let scale = PEAK_CEILING / peak;
    Ok(buffer
        .iter()
        .map(|sample| (sample * scale).round() as i16)
        .collect())
}
