//! Renders every alarm preset to a WAV file for auditioning.
//!
//! Usage: `export_presets [output-dir]` (default `preset-wavs/`).

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use tocsin::{synthesize, PresetId, SAMPLE_RATE};

fn main() -> Result<()> {
    let out_dir = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("preset-wavs"));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    println!("{:<14} {:>9} {:>8}", "preset", "samples", "seconds");
    for id in PresetId::ALL {
        let samples =
            synthesize(&id.tone(), SAMPLE_RATE).with_context(|| format!("rendering {id}"))?;

        let path = out_dir.join(format!("{}.wav", id.slug()));
        let mut writer = WavWriter::create(&path, spec)
            .with_context(|| format!("creating {}", path.display()))?;
        for &sample in &samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        println!(
            "{:<14} {:>9} {:>8.2}",
            id.slug(),
            samples.len(),
            samples.len() as f64 / f64::from(SAMPLE_RATE)
        );
    }
    println!("\nwrote {} files to {}", PresetId::ALL.len(), out_dir.display());
    Ok(())
}
