//! # Score Encoders
//!
//! The decoder only needs one probability distribution per token. Anything
//! that can produce them from a token sequence implements [`ScoreEncoder`].

use candle_core::{DType, Tensor};

use crate::error::{BeamtagError, Result};
use crate::tokenizer::Token;

/// Produces one score vector per token, in label-alphabet order.
pub trait ScoreEncoder {
    /// `&mut` because inference back-ends usually keep per-instance buffers.
    fn encode(&mut self, tokens: &[Token]) -> Result<Vec<Vec<f64>>>;
}

/// Returns distributions computed elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecomputedEncoder {
    scores: Vec<Vec<f64>>,
}

impl PrecomputedEncoder {
    pub fn new(scores: Vec<Vec<f64>>) -> Self {
        Self { scores }
    }
}

impl ScoreEncoder for PrecomputedEncoder {
    fn encode(&mut self, tokens: &[Token]) -> Result<Vec<Vec<f64>>> {
        if tokens.len() != self.scores.len() {
            return Err(BeamtagError::LengthMismatch {
                expected: tokens.len(),
                got: self.scores.len(),
            });
        }
        Ok(self.scores.clone())
    }
}

/// Wraps a model forward pass that yields logits.
///
/// The closure returns a tensor shaped `[seq_len, num_labels]`, or
/// `[1, seq_len, num_labels]` with a batch dimension. A softmax is applied
/// over the label dimension.
#[derive(Clone)]
pub struct TensorEncoder<F> {
    forward: F,
}

impl<F> TensorEncoder<F>
where
    F: FnMut(&[Token]) -> candle_core::Result<Tensor>,
{
    pub fn new(forward: F) -> Self {
        Self { forward }
    }
}

impl<F> ScoreEncoder for TensorEncoder<F>
where
    F: FnMut(&[Token]) -> candle_core::Result<Tensor>,
{
    fn encode(&mut self, tokens: &[Token]) -> Result<Vec<Vec<f64>>> {
        let logits = (self.forward)(tokens)?;
        let logits = match logits.dims() {
            [1, _, _] => logits.squeeze(0)?,
            [_, _] => logits,
            dims => {
                return Err(BeamtagError::Inference(format!(
                    "expected logits of shape [seq_len, num_labels], got {dims:?}"
                )));
            }
        };

        let probs = candle_nn::ops::softmax_last_dim(&logits.to_dtype(DType::F32)?)?;
        let rows: Vec<Vec<f32>> = probs.to_vec2()?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(f64::from).collect())
            .collect())
    }
}
