//! Playback through an external command-line player.
//!
//! Covers hosts where the in-process engine cannot open a device but a
//! stock player (`afplay` on macOS, `aplay`/`paplay` on Linux) can still
//! reach the sound hardware. Rendered presets are materialized as WAV
//! files in a per-process scratch directory on first use; when a preset
//! has no rendering, or its scratch WAV cannot be written or played, the
//! stock alert sound mapped to the preset stands in.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use hound::{WavSpec, WavWriter};

use crate::bank::SoundPreset;
use crate::error::PlaybackError;
use crate::presets::PresetId;

/// Plays alarms by shelling out to the host's audio player.
#[derive(Debug)]
pub struct SystemPlayer {
    scratch: PathBuf,
    materialized: Mutex<HashMap<PresetId, PathBuf>>,
}

/// Distinguishes scratch directories when one process builds several
/// players, as the test suite does.
static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// The file handed to the external player.
#[derive(Debug)]
enum Payload {
    /// The preset rendered to a scratch WAV.
    Rendered(PathBuf),
    /// A stock alert sound standing in for the rendering.
    Stock(PathBuf),
}

impl Payload {
    fn path(&self) -> &Path {
        match self {
            Payload::Rendered(path) | Payload::Stock(path) => path,
        }
    }
}

impl SystemPlayer {
    pub fn new() -> Self {
        let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);
        SystemPlayer {
            scratch: env::temp_dir().join(format!("tocsin-{}-{seq}", std::process::id())),
            materialized: Mutex::new(HashMap::new()),
        }
    }

    /// True when a known player binary is on `PATH`.
    pub fn probe(&self) -> bool {
        find_player().is_some()
    }

    /// Plays `preset` through the external player, blocking until the
    /// player exits.
    ///
    /// The rendered preset is the preferred payload. The stock alert
    /// sound mapped to `id` takes its place when there is no rendering,
    /// and is retried when the scratch WAV cannot be written or played,
    /// so a read-only scratch directory does not silence the stage.
    pub fn play(
        &self,
        preset: Option<&SoundPreset>,
        id: PresetId,
    ) -> Result<(), PlaybackError> {
        let player =
            find_player().ok_or(PlaybackError::Unavailable("no system audio player on PATH"))?;
        let payload = self.resolve_payload(preset, id)?;
        match run_player(player, payload.path()) {
            Err(error) if matches!(payload, Payload::Rendered(_)) => {
                let Some(stock) = stock_sound_path(id) else {
                    return Err(error);
                };
                tracing::warn!(
                    preset = %id,
                    %error,
                    "scratch WAV did not play, retrying with the stock sound"
                );
                run_player(player, &stock)
            }
            result => result,
        }
    }

    /// Picks the file handed to the player: the preset rendered to a
    /// scratch WAV when possible, otherwise the stock alert sound mapped
    /// to `id`, which needs no scratch write.
    fn resolve_payload(
        &self,
        preset: Option<&SoundPreset>,
        id: PresetId,
    ) -> Result<Payload, PlaybackError> {
        let Some(preset) = preset else {
            return stock_sound_path(id).map(Payload::Stock).ok_or(
                PlaybackError::Unavailable("no stock alert sound on this platform"),
            );
        };
        match self.materialize(preset) {
            Ok(path) => Ok(Payload::Rendered(path)),
            Err(error) => match stock_sound_path(id) {
                Some(stock) => {
                    tracing::warn!(
                        preset = %id,
                        %error,
                        "scratch WAV unavailable, substituting the stock sound"
                    );
                    Ok(Payload::Stock(stock))
                }
                None => Err(error),
            },
        }
    }

    /// Writes the preset to the scratch directory once and reuses the
    /// file on later rings.
    fn materialize(&self, preset: &SoundPreset) -> Result<PathBuf, PlaybackError> {
        let mut cache = self.materialized.lock().unwrap();
        if let Some(path) = cache.get(&preset.id()) {
            if path.is_file() {
                return Ok(path.clone());
            }
        }

        fs::create_dir_all(&self.scratch)?;
        let path = self.scratch.join(format!("{}.wav", preset.id().slug()));
        write_wav(&path, preset)?;
        cache.insert(preset.id(), path.clone());
        Ok(path)
    }
}

impl Default for SystemPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SystemPlayer {
    fn drop(&mut self) {
        // Best effort: a leftover scratch directory is untidy, not wrong.
        let _ = fs::remove_dir_all(&self.scratch);
    }
}

fn run_player(player: &str, path: &Path) -> Result<(), PlaybackError> {
    let status = Command::new(player)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(PlaybackError::PlayerStatus(status))
    }
}

fn write_wav(path: &Path, preset: &SoundPreset) -> Result<(), PlaybackError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: preset.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in preset.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// The first command-line player present on this host.
fn find_player() -> Option<&'static str> {
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &["afplay"]
    } else if cfg!(target_os = "linux") {
        &["aplay", "paplay"]
    } else {
        &[]
    };
    candidates.iter().copied().find(|name| on_path(name))
}

fn on_path(name: &str) -> bool {
    let Some(paths) = env::var_os("PATH") else {
        return false;
    };
    env::split_paths(&paths).any(|dir| dir.join(name).is_file())
}

/// The stock alert sound mapped to each preset, used when the rendering
/// is missing or its scratch WAV fails. Only macOS ships a usable set of
/// named alert files.
fn stock_sound_path(id: PresetId) -> Option<PathBuf> {
    if !cfg!(target_os = "macos") {
        return None;
    }
    let name = match id {
        PresetId::DefaultBeep => "Glass",
        PresetId::Radar => "Ping",
        PresetId::Beacon => "Pop",
        PresetId::Bulletin => "Tink",
        PresetId::Signal => "Basso",
        PresetId::Hillside => "Blow",
        PresetId::Playtime => "Frog",
        PresetId::Sencha => "Funk",
    };
    Some(PathBuf::from(format!("/System/Library/Sounds/{name}.aiff")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::SoundBank;
    use hound::WavReader;

    #[test]
    fn test_materialize_writes_a_valid_wav_once() {
        let bank = SoundBank::build();
        let preset = bank.get(PresetId::DefaultBeep).unwrap();
        let player = SystemPlayer::new();

        let path = player.materialize(&preset).unwrap();
        let again = player.materialize(&preset).unwrap();
        assert_eq!(path, again);

        let reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, preset.sample_rate());
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len() as usize, preset.samples().len());
    }

    #[test]
    fn test_scratch_directory_is_removed_on_drop() {
        let bank = SoundBank::build();
        let preset = bank.get(PresetId::Radar).unwrap();
        let scratch;
        {
            let player = SystemPlayer::new();
            scratch = player.scratch.clone();
            player.materialize(&preset).unwrap();
            assert!(scratch.exists());
        }
        assert!(!scratch.exists());
    }

    #[test]
    fn test_wav_contents_round_trip() {
        let bank = SoundBank::build();
        let preset = bank.get(PresetId::Sencha).unwrap();
        let player = SystemPlayer::new();

        let path = player.materialize(&preset).unwrap();
        let samples: Vec<i16> = WavReader::open(&path)
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, preset.samples());
    }

    #[test]
    fn test_payload_prefers_the_rendered_wav() {
        let bank = SoundBank::build();
        let preset = bank.get(PresetId::Beacon).unwrap();
        let player = SystemPlayer::new();

        match player
            .resolve_payload(Some(&preset), PresetId::Beacon)
            .unwrap()
        {
            Payload::Rendered(path) => assert!(path.is_file()),
            Payload::Stock(path) => {
                panic!("stock sound {} chosen over the rendering", path.display())
            }
        }
    }

    #[test]
    fn test_unwritable_scratch_substitutes_the_stock_sound() {
        let bank = SoundBank::build();
        let preset = bank.get(PresetId::Radar).unwrap();

        // A plain file where the scratch directory should go makes every
        // materialization fail.
        let blocker = env::temp_dir().join(format!("tocsin-blocked-{}", std::process::id()));
        fs::write(&blocker, b"occupied").unwrap();
        let player = SystemPlayer {
            scratch: blocker.join("scratch"),
            materialized: Mutex::new(HashMap::new()),
        };

        let payload = player.resolve_payload(Some(&preset), PresetId::Radar);
        if cfg!(target_os = "macos") {
            match payload.unwrap() {
                Payload::Stock(path) => {
                    assert_eq!(Some(path), stock_sound_path(PresetId::Radar));
                }
                Payload::Rendered(path) => {
                    panic!("scratch WAV {} written past a blocked directory", path.display())
                }
            }
        } else {
            assert!(payload.is_err());
        }
        fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn test_missing_rendering_resolves_to_the_stock_sound() {
        let player = SystemPlayer::new();
        let payload = player.resolve_payload(None, PresetId::Sencha);
        if cfg!(target_os = "macos") {
            assert!(matches!(payload, Ok(Payload::Stock(_))));
        } else {
            assert!(matches!(payload, Err(PlaybackError::Unavailable(_))));
        }
    }

    #[test]
    fn test_stock_sounds_cover_every_preset_on_macos() {
        if !cfg!(target_os = "macos") {
            for id in PresetId::ALL {
                assert_eq!(stock_sound_path(id), None);
            }
            return;
        }
        for id in PresetId::ALL {
            let path = stock_sound_path(id).unwrap();
            assert!(path.starts_with("/System/Library/Sounds"));
        }
    }
}
