//! # Evaluation
//!
//! Token-level, per-entity-type precision, recall and F1 of predicted labels
//! against gold labels. A token counts as correct when the predicted entity
//! type equals the gold one, whatever the segmentation tag.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::alphabet::LabelAlphabet;
use crate::error::{BeamtagError, Result};
use crate::schema::Label;

/// Confusion counts of a single entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricCounter {
    pub true_pos: usize,
    pub false_pos: usize,
    pub false_neg: usize,
}

impl MetricCounter {
    /// `tp / (tp + fp)`, 0 when nothing was predicted.
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_pos)
    }

    /// `tp / (tp + fn)`, 0 when nothing was expected.
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_pos, self.true_pos + self.false_neg)
    }

    #[must_use]
    pub fn f1_score(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for MetricCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "precision {:.2}% | recall {:.2}% | f1 score {:.2}% (tp {}, fp {}, fn {})",
            self.precision() * 100.0,
            self.recall() * 100.0,
            self.f1_score() * 100.0,
            self.true_pos,
            self.false_pos,
            self.false_neg
        )
    }
}

/// Metrics of every entity type of an alphabet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelStatistics {
    /// Counters keyed by entity type, sorted.
    pub metrics: BTreeMap<String, MetricCounter>,
    /// Sentences evaluated.
    pub sentences: usize,
    /// Sentences whose every evaluated token was correct.
    pub exact_sentences: usize,
}

impl LabelStatistics {
    /// Macro-averaged F1 over entity types.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.metrics.is_empty() {
            return 0.0;
        }
        self.metrics.values().map(MetricCounter::f1_score).sum::<f64>() / self.metrics.len() as f64
    }

    /// Fraction of sentences predicted without a single error.
    #[must_use]
    pub fn sentence_accuracy(&self) -> f64 {
        ratio(self.exact_sentences, self.sentences)
    }

    pub fn reset(&mut self) {
        self.metrics.values_mut().for_each(MetricCounter::reset);
        self.sentences = 0;
        self.exact_sentences = 0;
    }
}

impl fmt::Display for LabelStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, metric) in &self.metrics {
            writeln!(f, "label: {label} | {metric}")?;
        }
        write!(
            f,
            "macro f1 {:.2}% | exact sentences {}/{}",
            self.accuracy() * 100.0,
            self.exact_sentences,
            self.sentences
        )
    }
}

/// Accumulates [`LabelStatistics`] over annotated sentences.
#[derive(Debug, Clone)]
pub struct Evaluator {
    stats: LabelStatistics,
    ignore_missing_labels: bool,
}

impl Evaluator {
    /// Track every entity type of `alphabet`.
    ///
    /// With `ignore_missing_labels`, gold labels whose type is unknown to the
    /// alphabet are skipped instead of failing the sentence.
    pub fn new(alphabet: &LabelAlphabet, ignore_missing_labels: bool) -> Self {
        let metrics = alphabet
            .values()
            .into_iter()
            .map(|value| (value.to_string(), MetricCounter::default()))
            .collect();
        Self {
            stats: LabelStatistics {
                metrics,
                ..LabelStatistics::default()
            },
            ignore_missing_labels,
        }
    }

    /// Add one sentence. The statistics are left untouched on error.
    ///
    /// # Errors
    /// `LengthMismatch` if the two sequences differ in length, `UnknownLabel`
    /// if a label type is not tracked (gold types are exempt with
    /// `ignore_missing_labels`).
    pub fn evaluate_sentence(&mut self, gold: &[Label], predicted: &[Label]) -> Result<()> {
        if gold.len() != predicted.len() {
            warn!(
                gold = gold.len(),
                predicted = predicted.len(),
                "gold and predicted label counts differ"
            );
            return Err(BeamtagError::LengthMismatch {
                expected: gold.len(),
                got: predicted.len(),
            });
        }

        let mut pairs = Vec::with_capacity(gold.len());
        for (g, p) in gold.iter().zip(predicted) {
            if !self.is_tracked(g) {
                if self.ignore_missing_labels {
                    continue;
                }
                return Err(BeamtagError::UnknownLabel(g.to_string()));
            }
            if !self.is_tracked(p) {
                return Err(BeamtagError::UnknownLabel(p.to_string()));
            }
            pairs.push((g, p));
        }

        let exact = pairs.iter().all(|(g, p)| g.value() == p.value());
        for (g, p) in pairs {
            self.evaluate_prediction(g, p);
        }
        self.stats.sentences += 1;
        if exact {
            self.stats.exact_sentences += 1;
        }
        Ok(())
    }

    fn is_tracked(&self, label: &Label) -> bool {
        label.is_outside() || self.stats.metrics.contains_key(label.value())
    }

    /// Count a single token. Both labels must be tracked.
    fn evaluate_prediction(&mut self, gold: &Label, predicted: &Label) {
        let metrics = &mut self.stats.metrics;
        if predicted.value() == gold.value() {
            if let Some(m) = metrics.get_mut(gold.value()) {
                m.true_pos += 1;
            }
        } else {
            if let Some(m) = metrics.get_mut(gold.value()) {
                m.false_neg += 1;
            }
            if let Some(m) = metrics.get_mut(predicted.value()) {
                m.false_pos += 1;
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> &LabelStatistics {
        &self.stats
    }

    pub fn into_stats(self) -> LabelStatistics {
        self.stats
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }
}
