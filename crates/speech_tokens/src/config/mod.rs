mod codec_spec;
mod error;
mod token_config;

pub use codec_spec::CodecSpec;
pub use error::ConfigError;
pub use token_config::{DEFAULT_FRAME_SHIFT, DEFAULT_NUM_QUANTIZERS, FrameShortfall, TokenConfig};
