//! # Constrained Decoding
//!
//! Turns per-token score vectors into a label sequence that respects the
//! transition rules of the alphabet's tagging scheme.
//!
//! The [`Decoder`] first runs a bounded beam search over the pruned
//! candidates of each position. If the beam collapses or the sentence is
//! longer than the iteration budget, it falls back to a greedy pass over the
//! full distributions, which always succeeds on a validated alphabet.

pub mod beam;
pub mod candidates;
pub mod greedy;

use std::fmt;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

pub use beam::{BeamPath, BeamSearch, Candidate, Transition};

use crate::alphabet::LabelAlphabet;
use crate::config::DecoderConfig;
use crate::error::Result;
use crate::schema::Scheme;
use crate::scored::ScoredLabel;

/// Transition rule of a tagging scheme, applied to scored labels.
#[derive(Debug, Clone, Copy)]
pub struct SchemeTransition {
    scheme: Scheme,
}

impl SchemeTransition {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme }
    }
}

impl Transition<ScoredLabel> for SchemeTransition {
    fn admits(&self, previous: Option<&ScoredLabel>, current: &ScoredLabel, is_last: bool) -> bool {
        current
            .inner
            .can_follow(previous.map(|p| &p.inner), self.scheme)
            && (!is_last || self.scheme.is_terminal(current.inner.tag()))
    }
}

/// Which search produced a decoded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeStrategy {
    Beam,
    Greedy,
}

impl fmt::Display for DecodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Beam => write!(f, "beam"),
            Self::Greedy => write!(f, "greedy"),
        }
    }
}

/// A decoded sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded {
    /// One label per input position.
    pub labels: Vec<ScoredLabel>,
    pub strategy: DecodeStrategy,
    /// Mean label score (0 for an empty sentence).
    pub score: f64,
}

impl Decoded {
    fn from_picks(picks: Vec<&ScoredLabel>, strategy: DecodeStrategy) -> Self {
        let labels: Vec<ScoredLabel> = picks.into_iter().cloned().collect();
        let score = mean_score(&labels);
        Self {
            labels,
            strategy,
            score,
        }
    }

    /// Whether the greedy fallback had to be used.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.strategy == DecodeStrategy::Greedy
    }
}

fn mean_score(labels: &[ScoredLabel]) -> f64 {
    if labels.is_empty() {
        0.0
    } else {
        labels.iter().map(|l| l.score).sum::<f64>() / labels.len() as f64
    }
}

/// Beam decoder with greedy fallback over a fixed label alphabet.
#[derive(Debug, Clone)]
pub struct Decoder {
    alphabet: Arc<LabelAlphabet>,
    config: DecoderConfig,
    search: BeamSearch,
    transition: SchemeTransition,
}

impl Decoder {
    /// Create a decoder.
    ///
    /// # Errors
    /// `InvalidConfig` if a bound of `config` is zero.
    pub fn new(alphabet: Arc<LabelAlphabet>, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        let transition = SchemeTransition::new(alphabet.scheme());
        Ok(Self {
            alphabet,
            config,
            search: BeamSearch::new(&config),
            transition,
        })
    }

    pub fn alphabet(&self) -> &LabelAlphabet {
        &self.alphabet
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one sentence given one score vector per token.
    ///
    /// # Errors
    /// `DimensionMismatch` or `NonFiniteScore` for malformed score vectors.
    /// Search failure is never an error.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use beamtag_core::{Decoder, DecoderConfig, LabelAlphabet, Scheme};
    ///
    /// let alphabet = LabelAlphabet::parse(Scheme::Iob, &["O", "B-PER", "I-PER"]).unwrap();
    /// let decoder = Decoder::new(Arc::new(alphabet), DecoderConfig::default()).unwrap();
    ///
    /// let decoded = decoder
    ///     .decode(&[vec![0.1, 0.8, 0.1], vec![0.1, 0.1, 0.8], vec![0.9, 0.05, 0.05]])
    ///     .unwrap();
    /// let labels: Vec<String> = decoded.labels.iter().map(|l| l.inner.to_string()).collect();
    /// assert_eq!(labels, ["B-PER", "I-PER", "O"]);
    /// ```
    pub fn decode(&self, scores: &[Vec<f64>]) -> Result<Decoded> {
        if scores.is_empty() {
            return Ok(Decoded {
                labels: Vec::new(),
                strategy: DecodeStrategy::Beam,
                score: 0.0,
            });
        }

        let ranked = scores
            .iter()
            .enumerate()
            .map(|(position, vector)| candidates::rank(vector, &self.alphabet, position))
            .collect::<Result<Vec<_>>>()?;

        let pruned: Vec<&[ScoredLabel]> = ranked.iter().map(|r| candidates::prune(r)).collect();
        if let Some(path) = self.search.search(&pruned, &self.transition) {
            return Ok(Decoded {
                labels: path.elements.into_iter().cloned().collect(),
                strategy: DecodeStrategy::Beam,
                score: path.score,
            });
        }

        debug!(len = scores.len(), "beam search failed, falling back to greedy decoding");
        let full: Vec<&[ScoredLabel]> = ranked.iter().map(Vec::as_slice).collect();
        let picks = greedy::decode(&full, &self.transition)?;
        Ok(Decoded::from_picks(picks, DecodeStrategy::Greedy))
    }

    /// Decode many sentences on a pool of `workers` threads.
    ///
    /// Results are returned in input order.
    pub fn decode_batch(&self, batch: &[Vec<Vec<f64>>], workers: usize) -> Result<Vec<Decoded>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        pool.install(|| batch.par_iter().map(|scores| self.decode(scores)).collect())
    }
}
