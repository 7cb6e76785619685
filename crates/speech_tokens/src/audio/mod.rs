mod codec;
mod error;
mod normalizer;
mod token_space;
mod types;

pub use codec::{CodecFailure, CodecPort};
pub use error::{AudioError, AudioResult};
pub use normalizer::{AudioNormalizer, ResampleQuality, resampled_length};
pub use token_space::TokenSpace;
pub use types::{TokenBatch, TokenLayout, TokenMatrix, Waveform, WaveformBatch};
