use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::audio::{AudioResult, Waveform};

/// Reads a WAV file into a waveform at its own sample rate. Integer PCM is scaled to
/// `[-1.0, 1.0)`.
pub fn load_wav(path: impl AsRef<Path>) -> AudioResult<Waveform> {
    let reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    let samples = match spec.sample_format {
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        },
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?,
    };

    tracing::debug!(
        path = %path.as_ref().display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits_per_sample = spec.bits_per_sample,
        "loaded wav"
    );

    Waveform::from_interleaved(&samples, spec.channels as usize, spec.sample_rate)
}

#[cfg(test)]
mod tests {
    use hound::{SampleFormat, WavSpec, WavWriter};

    use super::load_wav;
    use crate::audio::AudioError;

    fn write_wav(
        path: &std::path::Path,
        channels: u16,
        samples: &[i16],
    ) {
        let spec = WavSpec {
            channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).expect("create wav");
        for &sample in samples {
            writer.write_sample(sample).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn stereo_pcm_is_deinterleaved_and_scaled() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, &[16_384, -16_384, -32_768, 0]);

        let waveform = load_wav(&path).expect("load");
        assert_eq!(waveform.channels(), 2);
        assert_eq!(waveform.num_samples(), 2);
        assert_eq!(waveform.sample_rate(), 16_000);
        assert_eq!(waveform.samples()[[0, 0]], 0.5);
        assert_eq!(waveform.samples()[[1, 0]], -0.5);
        assert_eq!(waveform.samples()[[0, 1]], -1.0);
    }

    #[test]
    fn surround_files_are_rejected() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("surround.wav");
        write_wav(&path, 3, &[0; 6]);

        assert!(matches!(load_wav(&path), Err(AudioError::InvalidChannelCount(3))));
    }

    #[test]
    fn missing_file_is_a_wav_error() {
        assert!(matches!(load_wav("/nonexistent/audio.wav"), Err(AudioError::Wav(_))));
    }
}
