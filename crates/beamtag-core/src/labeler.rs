//! # Tokens Labeler
//!
//! Runs an encoder over a tokenized sentence and decodes its scores into a
//! schema-valid label sequence.

use std::sync::Arc;

use rayon::prelude::*;

use crate::alphabet::LabelAlphabet;
use crate::config::DecoderConfig;
use crate::decode::{Decoded, Decoder};
use crate::encoder::ScoreEncoder;
use crate::error::{BeamtagError, Result};
use crate::scored::ScoredLabel;
use crate::segment::{AnnotatedSegment, build_segments};
use crate::tokenizer::Token;

/// Labels token sequences with an encoder and a constrained decoder.
pub struct TokensLabeler<E> {
    encoder: E,
    decoder: Decoder,
}

impl<E: ScoreEncoder> TokensLabeler<E> {
    /// Create a labeler.
    ///
    /// # Errors
    /// `InvalidConfig` if a bound of `config` is zero.
    pub fn new(encoder: E, alphabet: Arc<LabelAlphabet>, config: DecoderConfig) -> Result<Self> {
        Ok(Self {
            encoder,
            decoder: Decoder::new(alphabet, config)?,
        })
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Label every token.
    ///
    /// The result has exactly one label per token and always satisfies the
    /// scheme's transition rules.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use beamtag_core::{
    ///     DecoderConfig, LabelAlphabet, PrecomputedEncoder, Scheme, Token, TokensLabeler,
    /// };
    ///
    /// let alphabet = LabelAlphabet::parse(Scheme::Iob, &["O", "B-LOC", "I-LOC"]).unwrap();
    /// let alphabet = Arc::new(alphabet);
    /// let encoder = PrecomputedEncoder::new(vec![vec![0.1, 0.8, 0.1], vec![0.1, 0.1, 0.8]]);
    /// let mut labeler = TokensLabeler::new(encoder, alphabet, DecoderConfig::default()).unwrap();
    ///
    /// let labels = labeler.predict(&Token::from_forms(&["New", "York"])).unwrap();
    /// // I-LOC may not end an IOB sentence.
    /// assert_eq!(labels[1].inner.to_string(), "O");
    /// ```
    pub fn predict(&mut self, tokens: &[Token]) -> Result<Vec<ScoredLabel>> {
        Ok(self.predict_decoded(tokens)?.labels)
    }

    /// Like [`predict`](Self::predict), also reporting how the labels were found.
    pub fn predict_decoded(&mut self, tokens: &[Token]) -> Result<Decoded> {
        label(&mut self.encoder, &self.decoder, tokens)
    }

    /// Label the tokens and group the labels into entity segments.
    pub fn predict_as_segments(&mut self, tokens: &[Token]) -> Result<Vec<AnnotatedSegment>> {
        let labels = self.predict(tokens)?;
        build_segments(&labels, Some(tokens))
    }
}

impl<E> TokensLabeler<E>
where
    E: ScoreEncoder + Clone + Send + Sync,
{
    /// Label many sentences on a pool of `workers` threads.
    ///
    /// Each worker runs its own copy of the encoder. Results are returned in
    /// input order; the first failure aborts the batch.
    pub fn predict_batch(&self, sentences: &[Vec<Token>], workers: usize) -> Result<Vec<Decoded>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        pool.install(|| {
            sentences
                .par_iter()
                .map_init(
                    || self.encoder.clone(),
                    |encoder, tokens| label(encoder, &self.decoder, tokens),
                )
                .collect()
        })
    }
}

fn label<E: ScoreEncoder>(encoder: &mut E, decoder: &Decoder, tokens: &[Token]) -> Result<Decoded> {
    let scores = encoder.encode(tokens)?;
    if scores.len() != tokens.len() {
        return Err(BeamtagError::LengthMismatch {
            expected: tokens.len(),
            got: scores.len(),
        });
    }
    decoder.decode(&scores)
}
