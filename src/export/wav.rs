//! WAV file export

use super::{apply_fade_out, normalize_frames, ExportConfig};
use crate::backend::SoundEngine;
use crate::sgu1::Sgu1;
use crate::{Result, Sgu1Error};
use log::{debug, info};
use std::path::Path;

/// Write stereo frames as a 16-bit PCM WAV file
///
/// Normalization and fade out from `config` are applied to a copy of the
/// frames before writing.
///
/// # Errors
///
/// [`Sgu1Error::AudioFileError`] if the file cannot be created or written.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    frames: &[[f32; 2]],
    sample_rate: u32,
    config: ExportConfig,
) -> Result<()> {
    let mut frames = frames.to_vec();
    if config.normalize {
        normalize_frames(&mut frames);
    }
    if config.fade_out_duration > 0.0 {
        debug!("applying {:.1}s fade out", config.fade_out_duration);
        apply_fade_out(&mut frames, config.fade_out_duration, sample_rate);
    }

    let path = path.as_ref();
    info!(
        "writing {} frames ({:.1}s) to {}",
        frames.len(),
        frames.len() as f32 / sample_rate.max(1) as f32,
        path.display()
    );
    write_wav_file(path, &frames, sample_rate)
}

/// Render `ticks` idle ticks of `chip` straight to a WAV file
pub fn export_to_wav<E: SoundEngine, P: AsRef<Path>>(
    chip: &mut Sgu1<E>,
    ticks: usize,
    path: P,
    config: ExportConfig,
) -> Result<()> {
    let frames = super::render_ticks(chip, ticks);
    write_wav(path, &frames, chip.config().sound_hz, config)
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn write_wav_file(path: &Path, frames: &[[f32; 2]], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| Sgu1Error::AudioFileError(format!("failed to create WAV file: {e}")))?;

    for &[l, r] in frames {
        for sample in [l, r] {
            writer
                .write_sample(to_i16(sample))
                .map_err(|e| Sgu1Error::AudioFileError(format!("failed to write sample: {e}")))?;
        }
    }

    writer
        .finalize()
        .map_err(|e| Sgu1Error::AudioFileError(format!("failed to finalize WAV file: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sgu1-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_to_i16_clamps() {
        assert_eq!(to_i16(1.5), i16::MAX);
        assert_eq!(to_i16(-2.0), -i16::MAX);
        assert_eq!(to_i16(0.0), 0);
    }

    #[test]
    fn test_write_wav_round_trip_through_hound() {
        let path = temp_path("roundtrip.wav");
        let frames = vec![[0.5, -0.5], [0.0, 0.25]];
        write_wav(&path, &frames, 22_050, ExportConfig::default().normalize(false)).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 22_050);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![16383, -16383, 0, 8191]);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unwritable_path_reports_audio_error() {
        let path = temp_path("missing-dir").join("out.wav");
        let err = write_wav(&path, &[[0.0, 0.0]], 44_100, ExportConfig::default()).unwrap_err();
        assert!(matches!(err, Sgu1Error::AudioFileError(_)));
    }
}
