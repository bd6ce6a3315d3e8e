//! In-process playback through the host's default output device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::error::PlaybackError;

/// Plays rendered tones on the default output device.
///
/// The device and stream are opened per call. Alarms fire minutes apart at
/// most, so setup cost is irrelevant, and a stateless engine picks up a
/// device that appeared or disappeared since the last ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct AudioEngine;

impl AudioEngine {
    /// True when a default output device with a usable configuration exists.
    pub fn probe(&self) -> bool {
        let host = cpal::default_host();
        host.default_output_device()
            .and_then(|device| device.default_output_config().ok())
            .is_some()
    }

    /// Plays mono `samples` to completion, blocking the calling thread.
    ///
    /// The signal is resampled to the device rate when they differ and
    /// duplicated across the device's channels.
    pub fn play(&self, samples: &[i16], sample_rate: u32) -> Result<(), PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::Unavailable("no default output device"))?;
        let config = device
            .default_output_config()
            .map_err(|e| PlaybackError::Stream(e.to_string()))?;

        match config.sample_format() {
            cpal::SampleFormat::F32 => {
                run::<f32>(&device, &config.into(), samples, sample_rate)
            }
            cpal::SampleFormat::I16 => {
                run::<i16>(&device, &config.into(), samples, sample_rate)
            }
            cpal::SampleFormat::U16 => {
                run::<u16>(&device, &config.into(), samples, sample_rate)
            }
            other => Err(PlaybackError::Stream(format!(
                "unsupported sample format: {other}"
            ))),
        }
    }
}

fn run<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    samples: &[i16],
    sample_rate: u32,
) -> Result<(), PlaybackError>
where
    T: cpal::Sample + cpal::FromSample<f64> + cpal::SizedSample,
{
    let channels = config.channels as usize;
    let device_rate = config.sample_rate.0;
    let mut source = ResamplingSource::new(samples, sample_rate, device_rate);
    let expected = Duration::from_secs_f64(
        source.output_len() as f64 / f64::from(device_rate.max(1)),
    );

    let finished = Arc::new(AtomicBool::new(false));
    let finished_in_callback = finished.clone();

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value: T = match source.next_sample() {
                        Some(sample) => T::from_sample(sample),
                        None => {
                            finished_in_callback.store(true, Ordering::Release);
                            T::from_sample(0.0)
                        }
                    };
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            |err| tracing::warn!(%err, "audio stream error"),
            None,
        )
        .map_err(|e| PlaybackError::Stream(e.to_string()))?;
    stream.play().map_err(|e| PlaybackError::Stream(e.to_string()))?;

    // Wait for the callback to drain the source, bounded in case the
    // device stalls without reporting an error.
    let deadline = Instant::now() + expected + Duration::from_millis(500);
    while !finished.load(Ordering::Acquire) {
        if Instant::now() >= deadline {
            tracing::warn!("audio stream did not finish in time, abandoning it");
            break;
        }
        thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}

/// Converts `i16` samples to `f64` and linearly interpolates them to the
/// device rate.
struct ResamplingSource {
    samples: Vec<f64>,
    /// Source samples advanced per output sample.
    step: f64,
    position: f64,
}

impl ResamplingSource {
    fn new(samples: &[i16], source_rate: u32, device_rate: u32) -> Self {
        ResamplingSource {
            samples: samples.iter().map(|&s| f64::from(s) / 32_768.0).collect(),
            step: f64::from(source_rate) / f64::from(device_rate.max(1)),
            position: 0.0,
        }
    }

    /// Output samples this source will yield before draining.
    fn output_len(&self) -> usize {
        if self.samples.is_empty() {
            return 0;
        }
        (self.samples.len() as f64 / self.step).ceil() as usize
    }

    fn next_sample(&mut self) -> Option<f64> {
        let base = self.position.floor() as usize;
        if base >= self.samples.len() {
            return None;
        }
        let frac = self.position - base as f64;
        let current = self.samples[base];
        let next = self.samples.get(base + 1).copied().unwrap_or(0.0);
        self.position += self.step;
        Some(current + (next - current) * frac)
    }
}
