use super::CodecFailure;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("sample_rate must be > 0")]
    InvalidSampleRate,
    #[error("audio must be mono or stereo, got {0} channels")]
    InvalidChannelCount(usize),
    #[error("cannot convert {from} channel(s) to {to} channel(s)")]
    UnsupportedChannelConversion {
        from: usize,
        to: usize,
    },
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("codec produced {actual} frames, expected {expected} (tolerance is one frame)")]
    FrameMisalignment {
        expected: usize,
        actual: usize,
    },
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error(transparent)]
    Codec(#[from] CodecFailure),
    #[error("batch item {index}: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<AudioError>,
    },
    #[error("codec token {token} is outside codebook range 0..{codebook_size}")]
    InvalidCodecToken {
        token: u32,
        codebook_size: u32,
    },
    #[error("model token {token} is outside audio token range {range_start}..={range_end}")]
    InvalidModelToken {
        token: u64,
        range_start: u64,
        range_end: u64,
    },
    #[cfg(feature = "wav")]
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
}

impl AudioError {
    pub fn at_index(
        self,
        index: usize,
    ) -> Self {
        AudioError::BatchItem {
            index,
            source: Box::new(self),
        }
    }
}

pub type AudioResult<T> = Result<T, AudioError>;
