use std::num::NonZeroU32;

use ndarray::{Array2, Array3, ArrayD, ArrayView2, ArrayView3, Axis, Ix2, Ix3};

use super::{AudioError, AudioResult};

fn check_channels(channels: usize) -> AudioResult<()> {
    match channels {
        1 | 2 => Ok(()),
        other => Err(AudioError::InvalidChannelCount(other)),
    }
}

/// Real-valued samples laid out as `[channels, samples]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Array2<f32>,
    sample_rate: NonZeroU32,
}

impl Waveform {
    pub fn new(
        samples: Array2<f32>,
        sample_rate: u32,
    ) -> AudioResult<Self> {
        let sample_rate = NonZeroU32::new(sample_rate).ok_or(AudioError::InvalidSampleRate)?;
        check_channels(samples.nrows())?;

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn from_mono(
        samples: Vec<f32>,
        sample_rate: u32,
    ) -> AudioResult<Self> {
        let length = samples.len();
        let samples = Array2::from_shape_vec((1, length), samples)
            .map_err(|error| AudioError::ShapeMismatch(error.to_string()))?;
        Self::new(samples, sample_rate)
    }

    /// Builds a waveform from frame-interleaved samples (`l r l r ...`).
    pub fn from_interleaved(
        samples: &[f32],
        channels: usize,
        sample_rate: u32,
    ) -> AudioResult<Self> {
        check_channels(channels)?;
        if samples.len() % channels != 0 {
            return Err(AudioError::ShapeMismatch(format!(
                "{} interleaved samples do not divide into {channels} channels",
                samples.len()
            )));
        }

        let frames = samples.len() / channels;
        let interleaved = ArrayView2::from_shape((frames, channels), samples)
            .map_err(|error| AudioError::ShapeMismatch(error.to_string()))?;
        Self::new(interleaved.t().as_standard_layout().into_owned(), sample_rate)
    }

    /// Accepts a dynamically shaped buffer and checks it is `[channels, samples]`.
    pub fn from_dyn(
        samples: ArrayD<f32>,
        sample_rate: u32,
    ) -> AudioResult<Self> {
        let rank = samples.ndim();
        let samples = samples.into_dimensionality::<Ix2>().map_err(|_| {
            AudioError::ShapeMismatch(format!("expected [channels, samples], got rank {rank}"))
        })?;
        Self::new(samples, sample_rate)
    }

    pub fn channels(&self) -> usize {
        self.samples.nrows()
    }

    pub fn num_samples(&self) -> usize {
        self.samples.ncols()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.get()
    }

    pub fn samples(&self) -> ArrayView2<'_, f32> {
        self.samples.view()
    }

    pub fn into_samples(self) -> Array2<f32> {
        self.samples
    }

    pub fn duration_seconds(&self) -> f64 {
        crate::extraction::duration_seconds(self.num_samples(), self.sample_rate())
    }

    /// Keeps the first `length` samples of every channel.
    pub fn truncated(
        &self,
        length: usize,
    ) -> AudioResult<Self> {
        if length > self.num_samples() {
            return Err(AudioError::ShapeMismatch(format!(
                "length {length} exceeds waveform of {} samples",
                self.num_samples()
            )));
        }
        if length == self.num_samples() {
            return Ok(self.clone());
        }

        Ok(Self {
            samples: self.samples.slice(ndarray::s![.., ..length]).to_owned(),
            sample_rate: self.sample_rate,
        })
    }
}

/// Samples laid out as `[batch, channels, samples]` with per-item valid lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformBatch {
    samples: Array3<f32>,
    sample_rate: NonZeroU32,
    lengths: Box<[usize]>,
}

impl WaveformBatch {
    pub fn new(
        samples: Array3<f32>,
        sample_rate: u32,
        lengths: Box<[usize]>,
    ) -> AudioResult<Self> {
        let sample_rate = NonZeroU32::new(sample_rate).ok_or(AudioError::InvalidSampleRate)?;
        let (batch_size, channels, max_length) = samples.dim();
        check_channels(channels)?;
        if lengths.len() != batch_size {
            return Err(AudioError::ShapeMismatch(format!(
                "{} lengths for a batch of {batch_size}",
                lengths.len()
            )));
        }
        if let Some(&length) = lengths.iter().find(|&&length| length > max_length) {
            return Err(AudioError::ShapeMismatch(format!(
                "length {length} exceeds padded length {max_length}"
            )));
        }

        Ok(Self {
            samples,
            sample_rate,
            lengths,
        })
    }

    /// Accepts a dynamically shaped buffer and checks it is `[batch, channels, samples]`.
    /// Every item is taken to span the full padded length.
    pub fn from_dyn(
        samples: ArrayD<f32>,
        sample_rate: u32,
    ) -> AudioResult<Self> {
        let rank = samples.ndim();
        let samples = samples.into_dimensionality::<Ix3>().map_err(|_| {
            AudioError::ShapeMismatch(format!("expected [batch, channels, samples], got rank {rank}"))
        })?;
        let (batch_size, _, max_length) = samples.dim();
        Self::new(samples, sample_rate, vec![max_length; batch_size].into_boxed_slice())
    }

    pub fn from_waveform(waveform: Waveform) -> Self {
        let length = waveform.num_samples();
        let sample_rate = waveform.sample_rate;
        Self {
            samples: waveform.into_samples().insert_axis(Axis(0)),
            sample_rate,
            lengths: vec![length].into_boxed_slice(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.samples.len_of(Axis(0))
    }

    pub fn channels(&self) -> usize {
        self.samples.len_of(Axis(1))
    }

    pub fn max_length(&self) -> usize {
        self.samples.len_of(Axis(2))
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate.get()
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn samples(&self) -> ArrayView3<'_, f32> {
        self.samples.view()
    }

    /// Returns item `index` without its trailing padding.
    pub fn item(
        &self,
        index: usize,
    ) -> AudioResult<Waveform> {
        let length = *self.lengths.get(index).ok_or_else(|| {
            AudioError::ShapeMismatch(format!("item {index} is outside batch of {}", self.batch_size()))
        })?;
        let samples = self.samples.slice(ndarray::s![index, .., ..length]).to_owned();
        Waveform::new(samples, self.sample_rate())
    }
}

/// Orientation used when exporting a [`TokenMatrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenLayout {
    /// `[quantizers, frames]`
    #[default]
    QuantizerMajor,
    /// `[frames, quantizers]`
    FrameMajor,
}

/// Frame-aligned codec output for one item, `[quantizers, frames]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatrix {
    codes: Array2<u32>,
}

impl TokenMatrix {
    pub fn new(codes: Array2<u32>) -> Self {
        Self {
            codes,
        }
    }

    pub fn from_layout(
        codes: Array2<u32>,
        layout: TokenLayout,
    ) -> Self {
        match layout {
            TokenLayout::QuantizerMajor => Self::new(codes),
            TokenLayout::FrameMajor => Self::new(codes.reversed_axes().as_standard_layout().into_owned()),
        }
    }

    pub fn quantizers(&self) -> usize {
        self.codes.nrows()
    }

    pub fn frames(&self) -> usize {
        self.codes.ncols()
    }

    pub fn get(
        &self,
        quantizer: usize,
        frame: usize,
    ) -> Option<u32> {
        self.codes.get([quantizer, frame]).copied()
    }

    pub fn codes(&self) -> ArrayView2<'_, u32> {
        self.codes.view()
    }

    pub fn into_codes(self) -> Array2<u32> {
        self.codes
    }

    pub fn to_layout(
        &self,
        layout: TokenLayout,
    ) -> Array2<u32> {
        match layout {
            TokenLayout::QuantizerMajor => self.codes.clone(),
            TokenLayout::FrameMajor => self.codes.t().as_standard_layout().into_owned(),
        }
    }
}

/// Raw codec output, `[batch, quantizers, frames]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBatch {
    codes: Array3<u32>,
}

impl TokenBatch {
    pub fn new(codes: Array3<u32>) -> Self {
        Self {
            codes,
        }
    }

    pub fn from_matrix(matrix: &TokenMatrix) -> Self {
        Self::new(matrix.codes.clone().insert_axis(Axis(0)))
    }

    pub fn batch_size(&self) -> usize {
        self.codes.len_of(Axis(0))
    }

    pub fn quantizers(&self) -> usize {
        self.codes.len_of(Axis(1))
    }

    pub fn frames(&self) -> usize {
        self.codes.len_of(Axis(2))
    }

    pub fn codes(&self) -> ArrayView3<'_, u32> {
        self.codes.view()
    }

    pub fn item(
        &self,
        index: usize,
    ) -> ArrayView2<'_, u32> {
        self.codes.index_axis(Axis(0), index)
    }
}
