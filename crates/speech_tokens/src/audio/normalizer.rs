use ndarray::{Array2, Axis};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::{AudioError, AudioResult, Waveform};

const MAX_FLUSH_ROUNDS: usize = 64;
/// Short inputs are zero-padded to this many frames so each flush round makes progress.
const MIN_CHUNK_SIZE: usize = 1_024;

/// Quality settings for the band-limited sinc resampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleQuality {
    pub sinc_len: usize,
    pub f_cutoff: f32,
    pub oversampling_factor: usize,
}

impl Default for ResampleQuality {
    fn default() -> Self {
        Self {
            sinc_len: 256,
            f_cutoff: 0.95,
            oversampling_factor: 256,
        }
    }
}

impl ResampleQuality {
    fn parameters(&self) -> SincInterpolationParameters {
        SincInterpolationParameters {
            sinc_len: self.sinc_len,
            f_cutoff: self.f_cutoff,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: self.oversampling_factor,
            window: WindowFunction::BlackmanHarris2,
        }
    }
}

/// Brings a waveform to the channel count and sample rate a codec expects.
#[derive(Debug, Clone, Default)]
pub struct AudioNormalizer {
    quality: ResampleQuality,
}

impl AudioNormalizer {
    pub fn new(quality: ResampleQuality) -> Self {
        Self {
            quality,
        }
    }

    pub fn quality(&self) -> ResampleQuality {
        self.quality
    }

    /// Remaps channels first, then resamples every channel with one resampler.
    pub fn convert(
        &self,
        waveform: &Waveform,
        target_rate: u32,
        target_channels: usize,
    ) -> AudioResult<Waveform> {
        if target_rate == 0 {
            return Err(AudioError::InvalidSampleRate);
        }

        let remapped = remap_channels(waveform, target_channels)?;
        if waveform.sample_rate() == target_rate {
            return Waveform::new(remapped, target_rate);
        }

        let resampled = self.resample(remapped, waveform.sample_rate(), target_rate)?;
        Waveform::new(resampled, target_rate)
    }

    fn resample(
        &self,
        samples: Array2<f32>,
        source_rate: u32,
        target_rate: u32,
    ) -> AudioResult<Array2<f32>> {
        let channels = samples.nrows();
        let input_length = samples.ncols();
        let output_length = resampled_length(input_length, source_rate, target_rate);
        if input_length == 0 {
            return Ok(Array2::zeros((channels, 0)));
        }

        let ratio = target_rate as f64 / source_rate as f64;
        let chunk_size = input_length.max(MIN_CHUNK_SIZE);
        let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, self.quality.parameters(), chunk_size, channels)
            .map_err(|error| AudioError::Resample(error.to_string()))?;
        let delay = resampler.output_delay();

        let waves_in: Vec<Vec<f32>> = samples
            .axis_iter(Axis(0))
            .map(|channel| {
                let mut wave = channel.to_vec();
                wave.resize(chunk_size, 0.0);
                wave
            })
            .collect();
        let mut waves_out =
            resampler.process(&waves_in, None).map_err(|error| AudioError::Resample(error.to_string()))?;

        // The sinc filter delays its output; feed silence until the tail is flushed.
        let mut rounds = 0;
        while waves_out[0].len() < delay + output_length {
            if rounds == MAX_FLUSH_ROUNDS {
                return Err(AudioError::Resample(format!(
                    "resampler produced {} of {} frames",
                    waves_out[0].len(),
                    delay + output_length
                )));
            }
            let tail = resampler
                .process_partial(None::<&[Vec<f32>]>, None)
                .map_err(|error| AudioError::Resample(error.to_string()))?;
            for (channel, tail) in waves_out.iter_mut().zip(tail) {
                channel.extend(tail);
            }
            rounds += 1;
        }

        tracing::trace!(source_rate, target_rate, input_length, output_length, delay, "resampled waveform");

        let mut output = Array2::<f32>::zeros((channels, output_length));
        for (mut row, channel) in output.axis_iter_mut(Axis(0)).zip(&waves_out) {
            for (dst, src) in row.iter_mut().zip(&channel[delay..delay + output_length]) {
                *dst = *src;
            }
        }

        Ok(output)
    }
}

fn remap_channels(
    waveform: &Waveform,
    target_channels: usize,
) -> AudioResult<Array2<f32>> {
    let samples = waveform.samples();
    let channels = waveform.channels();
    match (channels, target_channels) {
        (1, 1) | (2, 2) => Ok(samples.to_owned()),
        (2, 1) => samples
            .mean_axis(Axis(0))
            .map(|mean| mean.insert_axis(Axis(0)))
            .ok_or_else(|| AudioError::ShapeMismatch("cannot average an empty channel axis".into())),
        (1, 2) => Ok(samples
            .broadcast((2, waveform.num_samples()))
            .ok_or_else(|| AudioError::ShapeMismatch("cannot replicate mono channel".into()))?
            .to_owned()),
        (from, to) => Err(AudioError::UnsupportedChannelConversion {
            from,
            to,
        }),
    }
}

/// `ceil(length * target_rate / source_rate)`.
pub fn resampled_length(
    length: usize,
    source_rate: u32,
    target_rate: u32,
) -> usize {
    let numerator = length as u64 * target_rate as u64;
    numerator.div_ceil(source_rate as u64) as usize
}
