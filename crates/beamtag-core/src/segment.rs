//! # Segment Builder
//!
//! Groups a decoded label sequence into contiguous entity segments. A segment
//! opens on `B` or `U`, grows through same-type `I`/`E` labels, and its score
//! is the mean of the member label scores.

use serde::{Deserialize, Serialize};

use crate::error::{BeamtagError, Result};
use crate::schema::{Label, Tag};
use crate::scored::ScoredLabel;
use crate::tokenizer::Token;

/// A contiguous run of tokens carrying one entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSegment {
    /// First token index.
    pub start_token: usize,
    /// Last token index (inclusive).
    pub end_token: usize,
    /// Char offset of the first token, when tokens were supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_char: Option<usize>,
    /// Char offset just past the last token (exclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_char: Option<usize>,
    /// Entity type, e.g. `PER`.
    pub annotation: String,
    /// Mean score of the segment's labels.
    pub score: f64,
}

impl AnnotatedSegment {
    /// Number of tokens covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_token - self.start_token + 1
    }

    /// Always `false`: a segment covers at least one token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Forms of the covered tokens joined by single spaces.
    ///
    /// Returns `None` if the segment lies outside `tokens`.
    pub fn text(&self, tokens: &[Token]) -> Option<String> {
        let covered = tokens.get(self.start_token..=self.end_token)?;
        Some(
            covered
                .iter()
                .map(|t| t.form.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}

struct OpenSegment<'a> {
    start: usize,
    value: &'a str,
    sum: f64,
    count: usize,
}

impl OpenSegment<'_> {
    fn close(self, end: usize, tokens: Option<&[Token]>) -> AnnotatedSegment {
        AnnotatedSegment {
            start_token: self.start,
            end_token: end,
            start_char: tokens.map(|t| t[self.start].start),
            end_char: tokens.map(|t| t[end].end),
            annotation: self.value.to_string(),
            score: self.sum / self.count as f64,
        }
    }
}

/// Whether `next` extends a segment currently ending in `current`.
fn continues(current: &Label, next: Option<&ScoredLabel>) -> bool {
    matches!(current.tag(), Tag::Beginning | Tag::Inside)
        && next.is_some_and(|n| {
            n.inner.tag().is_continuation() && n.inner.value() == current.value()
        })
}

/// Build the entity segments of a decoded sentence.
///
/// Char offsets are filled in when `tokens` is given.
///
/// # Errors
/// `LengthMismatch` if `tokens` does not have one entry per label.
pub fn build_segments(
    labels: &[ScoredLabel],
    tokens: Option<&[Token]>,
) -> Result<Vec<AnnotatedSegment>> {
    if let Some(got) = tokens.map(<[Token]>::len).filter(|&n| n != labels.len()) {
        return Err(BeamtagError::LengthMismatch {
            expected: labels.len(),
            got,
        });
    }

    let mut segments = Vec::new();
    let mut open: Option<OpenSegment<'_>> = None;

    for (i, scored) in labels.iter().enumerate() {
        let label = &scored.inner;
        if label.is_outside() {
            continue;
        }

        let segment = match open.take() {
            Some(mut segment) if label.tag().is_continuation() => {
                segment.sum += scored.score;
                segment.count += 1;
                segment
            }
            // B, U, or a continuation without an open segment.
            _ => OpenSegment {
                start: i,
                value: label.value(),
                sum: scored.score,
                count: 1,
            },
        };

        if continues(label, labels.get(i + 1)) {
            open = Some(segment);
        } else {
            segments.push(segment.close(i, tokens));
        }
    }

    Ok(segments)
}
