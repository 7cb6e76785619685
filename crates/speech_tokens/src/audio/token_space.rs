use std::num::{NonZeroU32, NonZeroUsize};

use ndarray::Array2;

use super::{AudioError, AudioResult, TokenMatrix};

/// Places every quantizer's codebook in its own contiguous block of a flat vocabulary,
/// starting at `offset`, so codec tokens can be fed to a sequence model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpace {
    offset: u64,
    codebook_size: NonZeroU32,
    quantizers: NonZeroUsize,
}

impl TokenSpace {
    pub fn new(
        offset: u64,
        codebook_size: u32,
        quantizers: usize,
    ) -> AudioResult<Self> {
        let codebook_size = NonZeroU32::new(codebook_size)
            .ok_or_else(|| AudioError::ShapeMismatch("codebook size must be > 0".into()))?;
        let quantizers = NonZeroUsize::new(quantizers)
            .ok_or_else(|| AudioError::ShapeMismatch("token space needs at least one quantizer".into()))?;

        Ok(Self {
            offset,
            codebook_size,
            quantizers,
        })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn codebook_size(&self) -> u32 {
        self.codebook_size.get()
    }

    pub fn quantizers(&self) -> usize {
        self.quantizers.get()
    }

    pub fn range_start(&self) -> u64 {
        self.offset
    }

    pub fn range_end(&self) -> u64 {
        self.offset + self.codebook_size.get() as u64 * self.quantizers.get() as u64 - 1
    }

    pub fn to_model_token(
        &self,
        quantizer: usize,
        code: u32,
    ) -> AudioResult<u64> {
        if code >= self.codebook_size.get() {
            return Err(AudioError::InvalidCodecToken {
                token: code,
                codebook_size: self.codebook_size.get(),
            });
        }
        if quantizer >= self.quantizers.get() {
            return Err(AudioError::ShapeMismatch(format!(
                "quantizer {quantizer} is outside token space of {} quantizers",
                self.quantizers
            )));
        }

        Ok(self.offset + quantizer as u64 * self.codebook_size.get() as u64 + code as u64)
    }

    /// Returns `(quantizer, code)` for a model token.
    pub fn to_codec_token(
        &self,
        model_token: u64,
    ) -> AudioResult<(usize, u32)> {
        let start = self.range_start();
        let end = self.range_end();
        if model_token < start || model_token > end {
            return Err(AudioError::InvalidModelToken {
                token: model_token,
                range_start: start,
                range_end: end,
            });
        }

        let relative = model_token - start;
        let codebook_size = self.codebook_size.get() as u64;
        Ok(((relative / codebook_size) as usize, (relative % codebook_size) as u32))
    }

    /// Flattens a matrix frame by frame: all quantizers of frame 0, then frame 1, ...
    pub fn encode_matrix(
        &self,
        matrix: &TokenMatrix,
    ) -> AudioResult<Vec<u64>> {
        if matrix.quantizers() != self.quantizers.get() {
            return Err(AudioError::ShapeMismatch(format!(
                "matrix has {} quantizers, token space has {}",
                matrix.quantizers(),
                self.quantizers
            )));
        }

        let codes = matrix.codes();
        let mut tokens = Vec::with_capacity(codes.len());
        for frame in codes.columns() {
            for (quantizer, &code) in frame.iter().enumerate() {
                tokens.push(self.to_model_token(quantizer, code)?);
            }
        }
        Ok(tokens)
    }

    /// Inverse of [`TokenSpace::encode_matrix`]; token `i` must belong to quantizer `i % quantizers`.
    pub fn decode_matrix(
        &self,
        model_tokens: &[u64],
    ) -> AudioResult<TokenMatrix> {
        let quantizers = self.quantizers.get();
        if model_tokens.len() % quantizers != 0 {
            return Err(AudioError::ShapeMismatch(format!(
                "{} model tokens do not divide into frames of {quantizers}",
                model_tokens.len()
            )));
        }

        let frames = model_tokens.len() / quantizers;
        let mut codes = Array2::<u32>::zeros((quantizers, frames));
        for (index, &token) in model_tokens.iter().enumerate() {
            let (quantizer, code) = self.to_codec_token(token)?;
            let expected = index % quantizers;
            if quantizer != expected {
                return Err(AudioError::ShapeMismatch(format!(
                    "model token {token} at position {index} belongs to quantizer {quantizer}, expected {expected}"
                )));
            }
            codes[[quantizer, index / quantizers]] = code;
        }

        Ok(TokenMatrix::new(codes))
    }
}
