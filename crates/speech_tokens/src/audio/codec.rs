use std::{error::Error, rc::Rc, sync::Arc};

use super::{TokenBatch, WaveformBatch};

/// Opaque failure raised by a codec implementation.
#[derive(Debug, thiserror::Error)]
#[error("codec failure: {message}")]
pub struct CodecFailure {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl CodecFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Boundary to a neural audio codec.
///
/// `encode` receives `[batch, 1, samples]` at the codec's native sample rate and returns
/// `[batch, quantizers, frames]`; the frame count and number of quantizers are the
/// codec's own. Implementations are expected to be deterministic and to keep no state
/// between calls.
pub trait CodecPort {
    fn encode(
        &self,
        batch: &WaveformBatch,
    ) -> Result<TokenBatch, CodecFailure>;

    fn decode(
        &self,
        tokens: &TokenBatch,
    ) -> Result<WaveformBatch, CodecFailure>;
}

macro_rules! forward_codec_port {
    ($($pointer:ty),*) => {
        $(
            impl<C: CodecPort + ?Sized> CodecPort for $pointer {
                fn encode(
                    &self,
                    batch: &WaveformBatch,
                ) -> Result<TokenBatch, CodecFailure> {
                    (**self).encode(batch)
                }

                fn decode(
                    &self,
                    tokens: &TokenBatch,
                ) -> Result<WaveformBatch, CodecFailure> {
                    (**self).decode(tokens)
                }
            }
        )*
    };
}

forward_codec_port!(&C, Box<C>, Rc<C>, Arc<C>);
