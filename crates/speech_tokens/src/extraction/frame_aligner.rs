use ndarray::{Array2, ArrayView2, Axis, s};

use crate::{
    audio::{AudioError, AudioResult, TokenMatrix},
    config::{FrameShortfall, TokenConfig},
};

const ROUNDING_DIGITS: i32 = 12;

/// Largest difference between the codec's frame count and the expected one that is
/// attributed to codec edge effects rather than a configuration error.
pub const FRAME_TOLERANCE: usize = 1;

fn round_to_digits(
    value: f64,
    digits: i32,
) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}

/// Duration in seconds rounded to 12 decimal digits, so the same sample count always
/// lands on the same frame grid.
pub fn duration_seconds(
    num_samples: usize,
    sample_rate: u32,
) -> f64 {
    round_to_digits(num_samples as f64 / sample_rate as f64, ROUNDING_DIGITS)
}

/// Number of whole frames of width `frame_shift` that fit in `duration`, stepping by
/// `frame_shift`: `floor((duration - frame_shift) / frame_shift) + 1`, or 0 when the
/// audio is shorter than one frame.
pub fn expected_frame_count(
    duration: f64,
    frame_shift: f64,
) -> usize {
    if duration < frame_shift {
        return 0;
    }
    let steps = round_to_digits((duration - frame_shift) / frame_shift, ROUNDING_DIGITS);
    steps.floor() as usize + 1
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAligner {
    frame_shift: f64,
    shortfall: FrameShortfall,
}

impl FrameAligner {
    pub fn new(
        frame_shift: f64,
        shortfall: FrameShortfall,
    ) -> Self {
        Self {
            frame_shift,
            shortfall,
        }
    }

    pub fn from_config(config: &TokenConfig) -> Self {
        Self::new(config.frame_shift(), config.frame_shortfall())
    }

    pub fn frame_shift(&self) -> f64 {
        self.frame_shift
    }

    pub fn expected_frames(
        &self,
        duration: f64,
    ) -> usize {
        expected_frame_count(duration, self.frame_shift)
    }

    /// Checks `raw` (`[quantizers, frames]`) is within one frame of what `duration`
    /// implies and fits it to exactly the expected length.
    pub fn align(
        &self,
        raw: ArrayView2<'_, u32>,
        duration: f64,
    ) -> AudioResult<TokenMatrix> {
        let expected = self.expected_frames(duration);
        let actual = raw.ncols();
        if actual.abs_diff(expected) > FRAME_TOLERANCE {
            return Err(AudioError::FrameMisalignment {
                expected,
                actual,
            });
        }

        Ok(self.fit(raw, expected))
    }

    /// Like [`FrameAligner::align`] for an item that was zero-padded before encoding.
    /// The codec output covers the padded length, so only a shortfall is an error.
    pub fn align_padded(
        &self,
        raw: ArrayView2<'_, u32>,
        duration: f64,
    ) -> AudioResult<TokenMatrix> {
        let expected = self.expected_frames(duration);
        let actual = raw.ncols();
        if expected > actual + FRAME_TOLERANCE {
            return Err(AudioError::FrameMisalignment {
                expected,
                actual,
            });
        }

        Ok(self.fit(raw, expected))
    }

    fn fit(
        &self,
        raw: ArrayView2<'_, u32>,
        expected: usize,
    ) -> TokenMatrix {
        let actual = raw.ncols();
        if actual >= expected {
            return TokenMatrix::new(raw.slice(s![.., ..expected]).to_owned());
        }

        let mut codes = Array2::<u32>::zeros((raw.nrows(), expected));
        codes.slice_mut(s![.., ..actual]).assign(&raw);
        if self.shortfall == FrameShortfall::RepeatLast && actual > 0 {
            let last = raw.index_axis(Axis(1), actual - 1);
            for mut column in codes.slice_mut(s![.., actual..]).axis_iter_mut(Axis(1)) {
                column.assign(&last);
            }
        }
        TokenMatrix::new(codes)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{Array2, array};

    use super::{FrameAligner, duration_seconds, expected_frame_count};
    use crate::{audio::AudioError, config::FrameShortfall};

    fn raw_frames(frames: usize) -> Array2<u32> {
        Array2::from_shape_fn((8, frames), |(quantizer, frame)| (quantizer * 1_000 + frame) as u32)
    }

    #[test]
    fn one_second_at_sixteen_khz_is_fifty_frames() {
        let duration = duration_seconds(16_000, 16_000);
        assert_eq!(duration, 1.0);
        assert_eq!(expected_frame_count(duration, 320.0 / 16_000.0), 50);
    }

    #[test]
    fn frame_count_edges() {
        let shift = 0.02;
        assert_eq!(expected_frame_count(duration_seconds(319, 16_000), shift), 0);
        assert_eq!(expected_frame_count(duration_seconds(320, 16_000), shift), 1);
        assert_eq!(expected_frame_count(duration_seconds(639, 16_000), shift), 1);
        assert_eq!(expected_frame_count(duration_seconds(640, 16_000), shift), 2);
        assert_eq!(expected_frame_count(duration_seconds(16_319, 16_000), shift), 50);
        assert_eq!(expected_frame_count(duration_seconds(0, 16_000), shift), 0);
    }

    #[test]
    fn frame_count_is_rate_invariant() {
        let shift = 0.02;
        for (samples, rate) in [(16_000, 16_000), (44_100, 44_100), (48_000, 48_000), (8_000, 8_000)] {
            assert_eq!(expected_frame_count(duration_seconds(samples, rate), shift), 50);
        }
        for samples in 1..2_000 {
            let first = expected_frame_count(duration_seconds(samples * 7, 22_050), 0.0125);
            let second = expected_frame_count(duration_seconds(samples * 7, 22_050), 0.0125);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn within_one_frame_is_fitted_to_expected_count() {
        let aligner = FrameAligner::new(0.02, FrameShortfall::default());

        for frames in [49, 50, 51] {
            let aligned = aligner.align(raw_frames(frames).view(), 1.0).expect("within tolerance");
            assert_eq!(aligned.frames(), 50);
            assert_eq!(aligned.quantizers(), 8);
            assert_eq!(aligned.get(3, 48), Some(3_048));
        }

        let short = aligner.align(raw_frames(49).view(), 1.0).expect("one frame short");
        assert_eq!(short.get(3, 49), Some(3_048));
    }

    #[test]
    fn beyond_one_frame_is_misaligned() {
        let aligner = FrameAligner::new(0.02, FrameShortfall::default());

        for frames in [48, 52] {
            let error = aligner.align(raw_frames(frames).view(), 1.0).expect_err("outside tolerance");
            assert!(matches!(
                error,
                AudioError::FrameMisalignment {
                    expected: 50,
                    actual
                } if actual == frames
            ));
        }
    }

    #[test]
    fn repeat_last_fills_shortfall() {
        let aligner = FrameAligner::new(0.02, FrameShortfall::RepeatLast);
        let raw = array![[1, 2], [3, 4]];

        let aligned = aligner.align(raw.view(), 0.06).expect("one frame short");
        assert_eq!(aligned.codes(), array![[1, 2, 2], [3, 4, 4]]);

        let empty = Array2::<u32>::zeros((2, 0));
        let aligned = aligner.align(empty.view(), 0.02).expect("single missing frame");
        assert_eq!(aligned.codes(), array![[0], [0]]);
    }

    #[test]
    fn zeros_policy_fills_with_code_zero() {
        let aligner = FrameAligner::new(0.02, FrameShortfall::Zeros);

        let aligned = aligner.align(array![[1, 2], [3, 4]].view(), 0.06).expect("one frame short");
        assert_eq!(aligned.codes(), array![[1, 2, 0], [3, 4, 0]]);
    }

    #[test]
    fn padded_items_only_check_shortfall() {
        let aligner = FrameAligner::new(0.02, FrameShortfall::default());

        for frames in [49, 150] {
            let aligned = aligner.align_padded(raw_frames(frames).view(), 1.0).expect("padded output");
            assert_eq!(aligned.frames(), 50);
        }

        let error = aligner.align_padded(raw_frames(48).view(), 1.0).expect_err("too short");
        assert!(matches!(
            error,
            AudioError::FrameMisalignment {
                expected: 50,
                actual: 48
            }
        ));
    }
}
