use ndarray::{Array3, s};

use super::{FrameAligner, duration_seconds};
use crate::audio::{AudioError, AudioResult, TokenBatch, TokenMatrix, Waveform, WaveformBatch};

/// A waveform ready for the codec together with the sample count it had before
/// resampling or padding.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    waveform: Waveform,
    original_length: usize,
    original_sample_rate: u32,
}

impl BatchItem {
    pub fn new(
        waveform: Waveform,
        original_length: usize,
        original_sample_rate: u32,
    ) -> AudioResult<Self> {
        if original_sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate);
        }

        Ok(Self {
            waveform,
            original_length,
            original_sample_rate,
        })
    }

    /// An item whose waveform has not been resampled.
    pub fn from_waveform(waveform: Waveform) -> Self {
        let original_length = waveform.num_samples();
        let original_sample_rate = waveform.sample_rate();
        Self {
            waveform,
            original_length,
            original_sample_rate,
        }
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn original_length(&self) -> usize {
        self.original_length
    }

    pub fn duration_seconds(&self) -> f64 {
        duration_seconds(self.original_length, self.original_sample_rate)
    }
}

/// Packs waveforms of different lengths into one zero-padded batch and splits the
/// codec output back into per-item token matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchPadder;

impl BatchPadder {
    /// Stacks items into `[batch, channels, max_length]` (`channels` is 1 for a mono codec),
    /// zero-filling the tail of shorter ones. Item order is preserved.
    pub fn prepare_batch(
        &self,
        items: &[BatchItem],
    ) -> AudioResult<WaveformBatch> {
        let first = items.first().ok_or_else(|| AudioError::ShapeMismatch("cannot pad an empty batch".into()))?;
        let sample_rate = first.waveform.sample_rate();
        let channels = first.waveform.channels();

        for (index, item) in items.iter().enumerate() {
            if item.waveform.channels() != channels {
                return Err(AudioError::ShapeMismatch(format!(
                    "{} channels differ from batch channel count {channels}",
                    item.waveform.channels()
                ))
                .at_index(index));
            }
            if item.waveform.sample_rate() != sample_rate {
                return Err(AudioError::ShapeMismatch(format!(
                    "sample rate {} differs from batch rate {sample_rate}",
                    item.waveform.sample_rate()
                ))
                .at_index(index));
            }
        }

        let lengths: Box<[usize]> = items.iter().map(|item| item.waveform.num_samples()).collect();
        let max_length = lengths.iter().copied().max().unwrap_or(0);

        let mut samples = Array3::<f32>::zeros((items.len(), channels, max_length));
        for (index, item) in items.iter().enumerate() {
            let length = lengths[index];
            samples.slice_mut(s![index, .., ..length]).assign(&item.waveform.samples());
        }

        tracing::debug!(batch_size = items.len(), max_length, "padded waveform batch");

        WaveformBatch::new(samples, sample_rate, lengths)
    }

    /// Fits each item's codec output to exactly its own expected frame count, so the
    /// result never depends on the other items in the batch. Items as long as
    /// the padded batch get the full tolerance check; shorter items only the shortfall
    /// check, since their raw output also covers padding.
    pub fn restore_batch(
        &self,
        aligner: &FrameAligner,
        raw: &TokenBatch,
        items: &[BatchItem],
    ) -> AudioResult<Vec<TokenMatrix>> {
        if raw.batch_size() != items.len() {
            return Err(AudioError::ShapeMismatch(format!(
                "codec returned {} items for a batch of {}",
                raw.batch_size(),
                items.len()
            )));
        }

        let max_length = items.iter().map(|item| item.waveform.num_samples()).max().unwrap_or(0);
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let codes = raw.item(index);
                let duration = item.duration_seconds();
                let aligned = if item.waveform.num_samples() == max_length {
                    aligner.align(codes, duration)
                } else {
                    aligner.align_padded(codes, duration)
                };
                aligned.map_err(|error| error.at_index(index))
            })
            .collect()
    }
}
