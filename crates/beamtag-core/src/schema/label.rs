use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::tag::{Scheme, Tag};
use crate::error::{BeamtagError, Result};

/// A label: segmentation tag plus entity type.
///
/// The value is empty iff the tag is [`Tag::Outside`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label {
    tag: Tag,
    value: String,
}

impl Label {
    /// Creates a label, checking that `value` is empty iff `tag` is `Outside`.
    pub fn new(tag: Tag, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if tag.is_outside() != value.is_empty() {
            return Err(BeamtagError::InvalidLabel(format!("{tag}-{value}")));
        }
        Ok(Self { tag, value })
    }

    /// The `O` label.
    #[must_use]
    pub fn outside() -> Self {
        Self {
            tag: Tag::Outside,
            value: String::new(),
        }
    }

    #[must_use]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Entity type, empty for `Outside`.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_outside(&self) -> bool {
        self.tag.is_outside()
    }

    /// Returns a copy of this label carrying a different tag.
    ///
    /// Converting to or from `Outside` fails because the value would change
    /// meaning.
    pub fn with_tag(&self, tag: Tag) -> Result<Self> {
        Self::new(tag, self.value.clone())
    }

    /// Whether this label may follow `previous` under `scheme`.
    ///
    /// Besides the tag transition, two labels that both carry a value must
    /// carry the same value.
    #[must_use]
    pub fn can_follow(&self, previous: Option<&Label>, scheme: Scheme) -> bool {
        scheme.can_follow(self.tag, previous.map(Label::tag))
            && previous.is_none_or(|prev| {
                prev.value.is_empty() || self.value.is_empty() || prev.value == self.value
            })
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_empty() {
            write!(f, "{}", self.tag)
        } else {
            write!(f, "{}-{}", self.tag, self.value)
        }
    }
}

impl FromStr for Label {
    type Err = BeamtagError;

    /// Parses `O`, `B-PER`, `I-PER`, `E-PER`, `U-PER`. The aliases `S-`
    /// (single) and `L-` (last) map to `Unit` and `End`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "O" {
            return Ok(Self::outside());
        }

        let invalid = || BeamtagError::InvalidLabel(s.to_string());
        let (prefix, value) = s.split_once('-').ok_or_else(invalid)?;
        let mut chars = prefix.chars();
        let tag = match (chars.next(), chars.next()) {
            (Some('S'), None) => Tag::Unit,
            (Some('L'), None) => Tag::End,
            (Some(c), None) => Tag::from_annotation(c).ok_or_else(invalid)?,
            _ => return Err(invalid()),
        };

        Self::new(tag, value).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Label {
    type Error = BeamtagError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Label {
        s.parse().unwrap()
    }

    #[test]
    fn test_value_invariant() {
        assert!(Label::new(Tag::Outside, "").is_ok());
        assert!(Label::new(Tag::Outside, "PER").is_err());
        assert!(Label::new(Tag::Beginning, "").is_err());
        assert!(Label::new(Tag::Beginning, "PER").is_ok());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(label("O"), Label::outside());
        assert_eq!(label("B-PER").tag(), Tag::Beginning);
        assert_eq!(label("B-PER").value(), "PER");
        assert_eq!(label("S-LOC").tag(), Tag::Unit);
        assert_eq!(label("L-LOC").tag(), Tag::End);
        assert_eq!(label("I-MISC").to_string(), "I-MISC");
        assert_eq!(label("U-ORG").to_string(), "U-ORG");
        assert_eq!(Label::outside().to_string(), "O");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "B", "B-", "X-PER", "BB-PER", "O-PER", "per"] {
            assert!(bad.parse::<Label>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_hyphenated_values_are_kept() {
        let l = label("B-WORK-OF-ART");
        assert_eq!(l.value(), "WORK-OF-ART");
    }

    #[test]
    fn test_value_continuity() {
        let s = Scheme::Iob;
        assert!(label("I-PER").can_follow(Some(&label("B-PER")), s));
        assert!(!label("I-LOC").can_follow(Some(&label("B-PER")), s));
        assert!(!label("B-LOC").can_follow(Some(&label("I-PER")), s));
        assert!(label("B-LOC").can_follow(Some(&Label::outside()), s));
        assert!(label("O").can_follow(Some(&label("I-PER")), s));
        assert!(!label("I-PER").can_follow(None, s));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&label("B-PER")).unwrap();
        assert_eq!(json, "\"B-PER\"");
        let back: Label = serde_json::from_str(&json).unwrap();
        assert_eq!(back, label("B-PER"));
        assert!(serde_json::from_str::<Label>("\"Q-PER\"").is_err());
    }
}
