use serde::{Deserialize, Serialize};

use super::ConfigError;

/// 320 samples at 16 kHz.
pub const DEFAULT_FRAME_SHIFT: f64 = 320.0 / 16_000.0;
pub const DEFAULT_NUM_QUANTIZERS: usize = 8;

/// How the missing frame is filled when the codec emits one frame fewer than the
/// duration implies. Either way the output has exactly the expected frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameShortfall {
    /// Repeat the last emitted frame; zeros when nothing was emitted.
    #[default]
    RepeatLast,
    /// Fill with code 0.
    Zeros,
}

#[derive(Debug, Deserialize)]
struct RawTokenConfig {
    #[serde(default = "default_frame_shift")]
    frame_shift: f64,
    #[serde(default = "default_num_quantizers")]
    num_quantizers: usize,
    #[serde(default)]
    frame_shortfall: FrameShortfall,
}

fn default_frame_shift() -> f64 {
    DEFAULT_FRAME_SHIFT
}

fn default_num_quantizers() -> usize {
    DEFAULT_NUM_QUANTIZERS
}

impl TryFrom<RawTokenConfig> for TokenConfig {
    type Error = ConfigError;

    fn try_from(raw: RawTokenConfig) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.frame_shift, raw.num_quantizers)?.with_frame_shortfall(raw.frame_shortfall))
    }
}

/// Frame grid and codebook count the extracted tokens are reconciled to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTokenConfig")]
pub struct TokenConfig {
    frame_shift: f64,
    num_quantizers: usize,
    frame_shortfall: FrameShortfall,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            frame_shift: DEFAULT_FRAME_SHIFT,
            num_quantizers: DEFAULT_NUM_QUANTIZERS,
            frame_shortfall: FrameShortfall::default(),
        }
    }
}

impl TokenConfig {
    pub fn new(
        frame_shift: f64,
        num_quantizers: usize,
    ) -> Result<Self, ConfigError> {
        if !frame_shift.is_finite() || frame_shift <= 0.0 {
            return Err(ConfigError::InvalidFrameShift(frame_shift));
        }
        if num_quantizers == 0 {
            return Err(ConfigError::InvalidQuantizerCount);
        }

        Ok(Self {
            frame_shift,
            num_quantizers,
            frame_shortfall: FrameShortfall::default(),
        })
    }

    pub fn with_frame_shortfall(
        self,
        frame_shortfall: FrameShortfall,
    ) -> Self {
        Self {
            frame_shortfall,
            ..self
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Seconds between consecutive token frames.
    pub fn frame_shift(&self) -> f64 {
        self.frame_shift
    }

    pub fn num_quantizers(&self) -> usize {
        self.num_quantizers
    }

    /// Width of one token frame, i.e. the number of quantizers.
    pub fn feature_dim(&self) -> usize {
        self.num_quantizers
    }

    pub fn frame_shortfall(&self) -> FrameShortfall {
        self.frame_shortfall
    }
}
