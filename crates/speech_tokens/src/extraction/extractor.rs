use super::{BatchItem, BatchPadder, FrameAligner};
use crate::{
    audio::{AudioError, AudioNormalizer, AudioResult, CodecPort, TokenBatch, TokenMatrix, Waveform, WaveformBatch},
    config::{CodecSpec, TokenConfig},
};

/// Turns waveforms into frame-aligned codec tokens.
///
/// Owns its codec handle; run several extractors with separate handles for parallel
/// throughput. Any failure aborts the whole call, batches included.
pub struct Extractor<C> {
    codec: C,
    codec_spec: CodecSpec,
    config: TokenConfig,
    normalizer: AudioNormalizer,
    aligner: FrameAligner,
    padder: BatchPadder,
}

impl<C: CodecPort> Extractor<C> {
    pub fn new(
        codec: C,
        codec_spec: CodecSpec,
        config: TokenConfig,
    ) -> Self {
        Self {
            codec,
            codec_spec,
            config,
            normalizer: AudioNormalizer::default(),
            aligner: FrameAligner::from_config(&config),
            padder: BatchPadder,
        }
    }

    pub fn with_normalizer(
        self,
        normalizer: AudioNormalizer,
    ) -> Self {
        Self {
            normalizer,
            ..self
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn codec_spec(&self) -> CodecSpec {
        self.codec_spec
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn frame_shift(&self) -> f64 {
        self.config.frame_shift()
    }

    pub fn feature_dim(&self) -> usize {
        self.config.feature_dim()
    }

    /// Encodes a single waveform. The frame grid follows the duration of the input as
    /// given, before any resampling.
    pub fn extract_one(
        &self,
        waveform: &Waveform,
    ) -> AudioResult<TokenMatrix> {
        let duration = waveform.duration_seconds();
        let normalized = self.normalize(waveform)?;
        let batch = WaveformBatch::from_waveform(normalized);

        let raw = self.codec.encode(&batch)?;
        if raw.batch_size() != 1 {
            return Err(AudioError::ShapeMismatch(format!(
                "codec returned {} items for a single waveform",
                raw.batch_size()
            )));
        }
        self.check_quantizers(&raw);

        let aligned = self.aligner.align(raw.item(0), duration)?;
        tracing::debug!(
            samples = waveform.num_samples(),
            sample_rate = waveform.sample_rate(),
            raw_frames = raw.frames(),
            frames = aligned.frames(),
            "extracted tokens"
        );
        Ok(aligned)
    }

    /// Encodes `waveforms` with a single codec call. `lengths[i]` is the number of valid
    /// samples in `waveforms[i]`; anything past it is dropped before encoding. Every
    /// waveform must be sampled at `sample_rate`. Results keep the input order.
    pub fn extract_batch(
        &self,
        waveforms: &[Waveform],
        sample_rate: u32,
        lengths: &[usize],
    ) -> AudioResult<Vec<TokenMatrix>> {
        if lengths.len() != waveforms.len() {
            return Err(AudioError::ShapeMismatch(format!(
                "{} lengths for {} waveforms",
                lengths.len(),
                waveforms.len()
            )));
        }
        if waveforms.is_empty() {
            return Ok(Vec::new());
        }

        let items = waveforms
            .iter()
            .zip(lengths)
            .enumerate()
            .map(|(index, (waveform, &length))| {
                self.batch_item(waveform, sample_rate, length).map_err(|error| error.at_index(index))
            })
            .collect::<AudioResult<Vec<_>>>()?;

        let batch = self.padder.prepare_batch(&items)?;
        let raw = self.codec.encode(&batch)?;
        self.check_quantizers(&raw);

        let matrices = self.padder.restore_batch(&self.aligner, &raw, &items)?;
        tracing::debug!(
            batch_size = matrices.len(),
            padded_samples = batch.max_length(),
            raw_frames = raw.frames(),
            "extracted token batch"
        );
        Ok(matrices)
    }

    #[cfg(feature = "wav")]
    pub fn extract_wav(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> AudioResult<TokenMatrix> {
        let waveform = crate::io::load_wav(path)?;
        self.extract_one(&waveform)
    }

    /// Runs the codec's decoder on one matrix. Meant for round-trip checks; the result
    /// is at the codec's native sample rate.
    pub fn decode(
        &self,
        tokens: &TokenMatrix,
    ) -> AudioResult<Waveform> {
        let decoded = self.codec.decode(&TokenBatch::from_matrix(tokens))?;
        if decoded.batch_size() != 1 {
            return Err(AudioError::ShapeMismatch(format!(
                "codec decoded {} items from a single token matrix",
                decoded.batch_size()
            )));
        }
        decoded.item(0)
    }

    fn batch_item(
        &self,
        waveform: &Waveform,
        sample_rate: u32,
        length: usize,
    ) -> AudioResult<BatchItem> {
        if waveform.sample_rate() != sample_rate {
            return Err(AudioError::ShapeMismatch(format!(
                "waveform sampled at {} Hz in a {sample_rate} Hz batch",
                waveform.sample_rate()
            )));
        }
        let normalized = self.normalize(&waveform.truncated(length)?)?;
        BatchItem::new(normalized, length, sample_rate)
    }

    fn normalize(
        &self,
        waveform: &Waveform,
    ) -> AudioResult<Waveform> {
        self.normalizer.convert(waveform, self.codec_spec.sample_rate(), self.codec_spec.channels())
    }

    fn check_quantizers(
        &self,
        raw: &TokenBatch,
    ) {
        if raw.quantizers() != self.config.num_quantizers() {
            tracing::warn!(
                codec_quantizers = raw.quantizers(),
                configured_quantizers = self.config.num_quantizers(),
                "codec quantizer count differs from configuration"
            );
        }
    }
}
