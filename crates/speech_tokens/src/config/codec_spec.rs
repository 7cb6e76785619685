use std::num::NonZeroU32;

use super::ConfigError;

/// Native input format of a codec, resolved by whoever loads the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecSpec {
    sample_rate: NonZeroU32,
    channels: usize,
}

impl CodecSpec {
    pub fn new(
        sample_rate: u32,
        channels: usize,
    ) -> Result<Self, ConfigError> {
        let sample_rate = NonZeroU32::new(sample_rate).ok_or(ConfigError::InvalidSampleRate)?;
        if !matches!(channels, 1 | 2) {
            return Err(ConfigError::InvalidChannelCount(channels));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn mono(sample_rate: u32) -> Result<Self, ConfigError> {
        Self::new(sample_rate, 1)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.get()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
