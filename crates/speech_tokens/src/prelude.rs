//! Commonly used types, importable with `use speech_tokens::prelude::*;`.

pub use crate::{
    VERSION,
    audio::{
        AudioError, AudioNormalizer, AudioResult, CodecFailure, CodecPort, TokenBatch, TokenLayout, TokenMatrix,
        TokenSpace, Waveform, WaveformBatch,
    },
    config::{CodecSpec, ConfigError, FrameShortfall, TokenConfig},
    extraction::{BatchItem, BatchPadder, Extractor, FrameAligner},
};
