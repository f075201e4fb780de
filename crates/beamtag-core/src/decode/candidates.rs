//! # Scored Candidates
//!
//! Turns one token's score vector into labels ranked by descending score.
//! The beam search only explores candidates at or above the mean of a
//! uniform distribution over the alphabet.

use crate::alphabet::LabelAlphabet;
use crate::error::{BeamtagError, Result};
use crate::scored::{Scored, ScoredLabel};

/// Rank every label of `alphabet` by its score in `scores`.
///
/// Equal scores keep alphabet order.
///
/// # Errors
/// `DimensionMismatch` if `scores` does not have one entry per label,
/// `NonFiniteScore` if an entry is NaN or infinite.
pub fn rank(scores: &[f64], alphabet: &LabelAlphabet, position: usize) -> Result<Vec<ScoredLabel>> {
    if scores.len() != alphabet.len() {
        return Err(BeamtagError::DimensionMismatch {
            position,
            expected: alphabet.len(),
            got: scores.len(),
        });
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return Err(BeamtagError::NonFiniteScore { position, index });
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let labels = alphabet.labels();
    Ok(order
        .into_iter()
        .map(|i| Scored::new(labels[i].clone(), scores[i]))
        .collect())
}

/// Keep the ranked candidates scoring at least `1 / len`.
///
/// Falls back to the whole list when nothing survives, so a position is
/// never left without options.
#[must_use]
pub fn prune(ranked: &[ScoredLabel]) -> &[ScoredLabel] {
    if ranked.is_empty() {
        return ranked;
    }

    let threshold = 1.0 / ranked.len() as f64;
    let kept = ranked.iter().take_while(|c| c.score >= threshold).count();

    if kept == 0 { ranked } else { &ranked[..kept] }
}

/// Ranked and pruned candidates for one token position.
pub fn candidates(
    scores: &[f64],
    alphabet: &LabelAlphabet,
    position: usize,
) -> Result<Vec<ScoredLabel>> {
    let ranked = rank(scores, alphabet, position)?;
    Ok(prune(&ranked).to_vec())
}
