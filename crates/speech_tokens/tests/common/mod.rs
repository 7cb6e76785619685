#![allow(dead_code)]

use std::cell::{Cell, RefCell};

use ndarray::{Array3, Axis};
use speech_tokens::audio::{CodecFailure, CodecPort, TokenBatch, WaveformBatch};

pub const CODEC_SAMPLE_RATE: u32 = 16_000;
pub const HOP_LENGTH: usize = 320;
pub const QUANTIZERS: usize = 8;
pub const CODEBOOK_SIZE: u32 = 1_024;

/// Deterministic stand-in for a neural codec: one frame per `HOP_LENGTH` samples
/// (rounded up), plus `frame_delta` extra frames, with codes derived from the energy of
/// each hop so padding and content changes are visible in the output.
pub struct HopCodec {
    frame_delta: isize,
    encode_calls: Cell<usize>,
    last_input_shape: RefCell<Option<(usize, usize, usize)>>,
}

impl HopCodec {
    pub fn new() -> Self {
        Self::with_frame_delta(0)
    }

    pub fn with_frame_delta(frame_delta: isize) -> Self {
        Self {
            frame_delta,
            encode_calls: Cell::new(0),
            last_input_shape: RefCell::new(None),
        }
    }

    pub fn encode_calls(&self) -> usize {
        self.encode_calls.get()
    }

    pub fn last_input_shape(&self) -> Option<(usize, usize, usize)> {
        *self.last_input_shape.borrow()
    }
}

impl CodecPort for HopCodec {
    fn encode(
        &self,
        batch: &WaveformBatch,
    ) -> Result<TokenBatch, CodecFailure> {
        self.encode_calls.set(self.encode_calls.get() + 1);
        let samples = batch.samples();
        *self.last_input_shape.borrow_mut() = Some(samples.dim());

        if batch.channels() != 1 {
            return Err(CodecFailure::new(format!("expected mono input, got {} channels", batch.channels())));
        }

        let frames = (batch.max_length().div_ceil(HOP_LENGTH) as isize + self.frame_delta).max(0) as usize;
        let mut codes = Array3::<u32>::zeros((batch.batch_size(), QUANTIZERS, frames));
        for (item, channels) in samples.axis_iter(Axis(0)).enumerate() {
            let signal = channels.row(0);
            for frame in 0..frames {
                let start = (frame * HOP_LENGTH).min(signal.len());
                let end = ((frame + 1) * HOP_LENGTH).min(signal.len());
                let energy: f32 = signal.slice(ndarray::s![start..end]).iter().map(|sample| sample.abs()).sum();
                let base = (energy * 100.0) as u32;
                for quantizer in 0..QUANTIZERS {
                    codes[[item, quantizer, frame]] = (base + quantizer as u32 * 7) % CODEBOOK_SIZE;
                }
            }
        }

        Ok(TokenBatch::new(codes))
    }

    fn decode(
        &self,
        tokens: &TokenBatch,
    ) -> Result<WaveformBatch, CodecFailure> {
        let length = tokens.frames() * HOP_LENGTH;
        let mut samples = Array3::<f32>::zeros((tokens.batch_size(), 1, length));
        for (item, codes) in tokens.codes().axis_iter(Axis(0)).enumerate() {
            for (frame, &code) in codes.row(0).iter().enumerate() {
                let level = code as f32 / CODEBOOK_SIZE as f32;
                samples.slice_mut(ndarray::s![item, 0, frame * HOP_LENGTH..(frame + 1) * HOP_LENGTH]).fill(level);
            }
        }

        let lengths = vec![length; tokens.batch_size()].into_boxed_slice();
        WaveformBatch::new(samples, CODEC_SAMPLE_RATE, lengths)
            .map_err(|error| CodecFailure::with_source("decoded batch is malformed", error))
    }
}

/// Codec whose every call fails.
pub struct BrokenCodec;

impl CodecPort for BrokenCodec {
    fn encode(
        &self,
        _batch: &WaveformBatch,
    ) -> Result<TokenBatch, CodecFailure> {
        Err(CodecFailure::new("weights not loaded"))
    }

    fn decode(
        &self,
        _tokens: &TokenBatch,
    ) -> Result<WaveformBatch, CodecFailure> {
        Err(CodecFailure::new("weights not loaded"))
    }
}

pub fn tone(
    frequency: f32,
    sample_rate: u32,
    length: usize,
) -> Vec<f32> {
    (0..length)
        .map(|index| (2.0 * std::f32::consts::PI * frequency * index as f32 / sample_rate as f32).sin() * 0.3)
        .collect()
}
