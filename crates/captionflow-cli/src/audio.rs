//! WAV input
//!
//! The engine only accepts mono f32 samples, so multi-channel files are
//! averaged down to one channel here.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct MonoAudio {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

/// Reads a WAV file as mono samples normalized to [-1.0, 1.0].
pub fn read_wav_mono(path: &Path) -> Result<MonoAudio> {
    let reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open WAV file {}", path.display()))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        bail!("WAV file {} declares zero channels", path.display());
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .context("Failed to read float samples")?,
        hound::SampleFormat::Int => {
            if !(1..=32).contains(&spec.bits_per_sample) {
                bail!("Unsupported bit depth: {}", spec.bits_per_sample);
            }
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_value))
                .collect::<Result<_, _>>()
                .context("Failed to read integer samples")?
        }
    };

    Ok(MonoAudio {
        sample_rate: spec.sample_rate,
        samples: mix_to_mono(&interleaved, spec.channels as usize),
    })
}

/// Averages interleaved frames; a trailing partial frame is dropped.
pub fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, channels: u16, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &sample in samples {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_mono_wav() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mono.wav");
        write_wav(&path, 1, &[0, 16384, -32768]);

        let audio = read_wav_mono(&path).unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_stereo_is_mixed_down() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stereo.wav");
        write_wav(&path, 2, &[16384, 0, -16384, -16384]);

        let audio = read_wav_mono(&path).unwrap();
        assert_eq!(audio.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_wav_mono(Path::new("/nonexistent/audio.wav")).unwrap_err();
        assert!(err.to_string().contains("Failed to open WAV file"));
    }

    #[test]
    fn test_mix_to_mono_drops_partial_frame() {
        assert_eq!(mix_to_mono(&[1.0, 0.0, 0.5], 2), vec![0.5]);
        assert_eq!(mix_to_mono(&[0.3, 0.2], 1), vec![0.3, 0.2]);
    }
}
