//! # Scheme Conversion
//!
//! Converts label sequences between IOB and BIEOU. Conversions always build
//! new labels; the input slice is never modified.

use super::label::Label;
use super::tag::{Scheme, Tag};
use crate::error::{BeamtagError, Result};

/// Convert a label sequence from one scheme to another.
///
/// # Errors
/// Returns `InvalidLabel` if a label's tag does not belong to `from`.
///
/// # Examples
/// ```
/// use beamtag_core::schema::{convert, Label, Scheme};
///
/// let iob: Vec<Label> = ["B-PER", "I-PER", "O", "B-LOC"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// let bieou = convert(&iob, Scheme::Iob, Scheme::Bieou).unwrap();
/// let text: Vec<String> = bieou.iter().map(|l| l.to_string()).collect();
/// assert_eq!(text, ["B-PER", "E-PER", "O", "U-LOC"]);
/// ```
pub fn convert(labels: &[Label], from: Scheme, to: Scheme) -> Result<Vec<Label>> {
    if let Some(foreign) = labels.iter().find(|l| !from.contains(l.tag())) {
        return Err(BeamtagError::InvalidLabel(format!(
            "{foreign} is not a {from} label"
        )));
    }

    match (from, to) {
        (Scheme::Iob, Scheme::Bieou) => iob_to_bieou(labels),
        (Scheme::Bieou, Scheme::Iob) => bieou_to_iob(labels),
        _ => Ok(labels.to_vec()),
    }
}

/// Whether `next` continues the segment carried by `current`.
fn continues(current: &Label, next: Option<&Label>) -> bool {
    next.is_some_and(|n| n.tag() == Tag::Inside && n.value() == current.value())
}

fn iob_to_bieou(labels: &[Label]) -> Result<Vec<Label>> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let next = labels.get(i + 1);
            match label.tag() {
                Tag::Beginning if continues(label, next) => Ok(label.clone()),
                Tag::Beginning => label.with_tag(Tag::Unit),
                Tag::Inside if continues(label, next) => Ok(label.clone()),
                Tag::Inside => label.with_tag(Tag::End),
                _ => Ok(label.clone()),
            }
        })
        .collect()
}

fn bieou_to_iob(labels: &[Label]) -> Result<Vec<Label>> {
    labels
        .iter()
        .map(|label| match label.tag() {
            Tag::Unit => label.with_tag(Tag::Beginning),
            Tag::End => label.with_tag(Tag::Inside),
            _ => Ok(label.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(s: &str) -> Vec<Label> {
        s.split_whitespace().map(|l| l.parse().unwrap()).collect()
    }

    fn render(labels: &[Label]) -> String {
        labels
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_iob_to_bieou() {
        let out = convert(
            &labels("B-PER I-PER I-PER O B-LOC B-ORG I-ORG"),
            Scheme::Iob,
            Scheme::Bieou,
        )
        .unwrap();
        assert_eq!(render(&out), "B-PER I-PER E-PER O U-LOC B-ORG E-ORG");
    }

    #[test]
    fn test_inside_of_other_type_does_not_continue() {
        let out = convert(&labels("B-PER I-LOC"), Scheme::Iob, Scheme::Bieou).unwrap();
        assert_eq!(render(&out), "U-PER E-LOC");
    }

    #[test]
    fn test_bieou_to_iob() {
        let out = convert(
            &labels("U-PER O B-LOC I-LOC E-LOC"),
            Scheme::Bieou,
            Scheme::Iob,
        )
        .unwrap();
        assert_eq!(render(&out), "B-PER O B-LOC I-LOC I-LOC");
    }

    #[test]
    fn test_input_is_untouched() {
        let input = labels("B-PER O");
        let _ = convert(&input, Scheme::Iob, Scheme::Bieou).unwrap();
        assert_eq!(render(&input), "B-PER O");
    }

    #[test]
    fn test_identity_and_foreign_tags() {
        let input = labels("U-PER O");
        assert_eq!(convert(&input, Scheme::Bieou, Scheme::Bieou).unwrap(), input);
        assert!(convert(&input, Scheme::Iob, Scheme::Bieou).is_err());
    }
}
