use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("frame_shift must be a positive number of seconds, got {0}")]
    InvalidFrameShift(f64),
    #[error("num_quantizers must be > 0")]
    InvalidQuantizerCount,
    #[error("codec sample_rate must be > 0")]
    InvalidSampleRate,
    #[error("codec must take mono or stereo audio, got {0} channels")]
    InvalidChannelCount(usize),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
