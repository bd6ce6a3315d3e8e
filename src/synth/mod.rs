//! Procedural tone synthesis.
//!
//! A tone is described declaratively as a [`ToneSpec`]: a duration, a set of
//! sinusoidal [`Partial`]s with optional per-partial modulation, an optional
//! [`Echo`], and linear fade envelopes at both edges. [`synthesize`] renders
//! the description offline into normalized 16-bit PCM at a fixed sample
//! rate. Rendering is deterministic: the same spec always produces the same
//! samples.
//!
//! # Examples
//!
//! ```
//! use tocsin::synth::{synthesize, Partial, ToneSpec};
//!
//! let spec = ToneSpec::new(0.5).partial(Partial::sine(800.0, 1.0));
//! let samples = synthesize(&spec, 44_100).unwrap();
//! assert_eq!(samples.len(), 22_050);
//! ```

mod render;

pub use render::synthesize;

/// Peak sample magnitude after normalization.
///
/// Every rendered tone is scaled so its loudest sample lands exactly here,
/// half of the full 16-bit range. Keeping headroom below `i16::MAX` means
/// resampling and device-side conversion cannot clip.
pub const PEAK_CEILING: f64 = 16_383.0;

/// Periodic amplitude modulation applied to one partial.
///
/// The partial's sample value is multiplied by
/// `base + depth * sin(2π * rate * t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tremolo {
    /// Modulation rate in Hz.
    pub rate: f64,
    /// Constant term of the modulator.
    pub base: f64,
    /// Amplitude of the modulating sine.
    pub depth: f64,
}

/// Periodic frequency modulation (vibrato) applied to one partial.
///
/// The partial's instantaneous frequency becomes
/// `frequency + depth * sin(2π * rate * t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vibrato {
    /// Modulation rate in Hz.
    pub rate: f64,
    /// Peak frequency deviation in Hz.
    pub depth: f64,
}

/// Linear amplitude ramp across the whole tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    /// Gain at the first sample.
    pub start: f64,
    /// Gain at the last sample.
    pub end: f64,
}

/// Linear pitch bend across the whole tone.
///
/// The partial's base frequency is multiplied by a ramp from `start` to
/// `end`, so `Bend { start: 1.0, end: 1.1 }` rises by a tenth over the
/// tone's length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bend {
    /// Frequency multiplier at the first sample.
    pub start: f64,
    /// Frequency multiplier at the last sample.
    pub end: f64,
}

/// A delayed, attenuated copy of the mixed signal added back onto itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Echo {
    /// Delay before the copy starts, in seconds.
    pub delay: f64,
    /// Gain applied to the copy.
    pub gain: f64,
}

/// A linear fade at one edge of the tone.
///
/// The envelope ramps between 1.0 and `floor` over `duration` seconds. A
/// floor of zero fades fully to silence; a higher floor leaves a residual
/// level, which some tones use for a hard-stop tail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    /// Fade length in seconds.
    pub duration: f64,
    /// Envelope value at the outer edge of the tone.
    pub floor: f64,
}

impl Fade {
    /// A fade that reaches silence at the tone's edge.
    pub fn to_silence(duration: f64) -> Self {
        Fade {
            duration,
            floor: 0.0,
        }
    }

    /// A fade that stops at `floor` instead of reaching silence.
    pub fn to_floor(duration: f64, floor: f64) -> Self {
        Fade { duration, floor }
    }
}

/// One sinusoidal component of a tone.
///
/// A bare partial is a constant-amplitude sine wave. The `with_*` builders
/// attach modulation; each kind is optional and they combine freely.
///
/// # Examples
///
/// ```
/// use tocsin::synth::Partial;
///
/// // A 600 Hz fundamental pulsing at 2 Hz.
/// let partial = Partial::sine(600.0, 1.0).with_tremolo(2.0, 0.7, 0.3);
/// assert_eq!(partial.frequency, 600.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    /// Base frequency in Hz.
    pub frequency: f64,
    /// Linear amplitude relative to the other partials in the tone.
    pub amplitude: f64,
    /// Optional amplitude modulation.
    pub tremolo: Option<Tremolo>,
    /// Optional frequency modulation.
    pub vibrato: Option<Vibrato>,
    /// Optional linear amplitude ramp.
    pub sweep: Option<Sweep>,
    /// Optional linear pitch bend.
    pub bend: Option<Bend>,
}

impl Partial {
    /// Creates an unmodulated sine partial.
    pub fn sine(frequency: f64, amplitude: f64) -> Self {
        Partial {
            frequency,
            amplitude,
            tremolo: None,
            vibrato: None,
            sweep: None,
            bend: None,
        }
    }

    /// Adds amplitude modulation `base + depth * sin(2π * rate * t)`.
    pub fn with_tremolo(mut self, rate: f64, base: f64, depth: f64) -> Self {
        self.tremolo = Some(Tremolo { rate, base, depth });
        self
    }

    /// Adds frequency modulation of `depth` Hz at `rate` Hz.
    pub fn with_vibrato(mut self, rate: f64, depth: f64) -> Self {
        self.vibrato = Some(Vibrato { rate, depth });
        self
    }

    /// Adds a linear amplitude ramp from `start` to `end` gain.
    pub fn with_sweep(mut self, start: f64, end: f64) -> Self {
        self.sweep = Some(Sweep { start, end });
        self
    }

    /// Adds a linear pitch bend from `start` to `end` frequency multiplier.
    pub fn with_bend(mut self, start: f64, end: f64) -> Self {
        self.bend = Some(Bend { start, end });
        self
    }
}

/// Complete description of one finite tone.
///
/// Specs are cheap to build and clone; nothing is rendered until the spec
/// is handed to [`synthesize`]. New specs carry a 0.1 s fade to silence at
/// both edges, which every alarm tone wants as a baseline to avoid clicks.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSpec {
    /// Tone length in seconds.
    pub duration: f64,
    /// Sinusoidal components, mixed by summation.
    pub partials: Vec<Partial>,
    /// Optional echo applied to the mixed signal.
    pub echo: Option<Echo>,
    /// Fade at the head of the tone.
    pub fade_in: Fade,
    /// Fade at the tail of the tone.
    pub fade_out: Fade,
}

impl ToneSpec {
    /// Creates an empty spec of `duration` seconds with default 0.1 s fades.
    pub fn new(duration: f64) -> Self {
        ToneSpec {
            duration,
            partials: Vec::new(),
            echo: None,
            fade_in: Fade::to_silence(0.1),
            fade_out: Fade::to_silence(0.1),
        }
    }

    /// Appends a partial to the mix.
    pub fn partial(mut self, partial: Partial) -> Self {
        self.partials.push(partial);
        self
    }

    /// Adds an echo of `gain` strength delayed by `delay` seconds.
    pub fn with_echo(mut self, delay: f64, gain: f64) -> Self {
        self.echo = Some(Echo { delay, gain });
        self
    }

    /// Sets both edge fades to `seconds` long, fading to silence.
    pub fn with_fades(mut self, seconds: f64) -> Self {
        self.fade_in = Fade::to_silence(seconds);
        self.fade_out = Fade::to_silence(seconds);
        self
    }

    /// Replaces the head fade.
    pub fn with_fade_in(mut self, fade: Fade) -> Self {
        self.fade_in = fade;
        self
    }

    /// Replaces the tail fade.
    pub fn with_fade_out(mut self, fade: Fade) -> Self {
        self.fade_out = fade;
        self
    }
}
