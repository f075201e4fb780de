//! # Label Alphabet
//!
//! Bidirectional index ⇄ label mapping consistent with the dimension ordering
//! of the encoder's score vectors. Validated against its scheme when built so
//! that decoding never meets a misconfigured alphabet.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{BeamtagError, Result};
use crate::schema::{Label, Scheme, Tag};

/// Serialized form of an alphabet.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AlphabetRepr {
    scheme: Scheme,
    labels: Vec<Label>,
}

/// The output labels of a model, in score-vector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AlphabetRepr", into = "AlphabetRepr")]
pub struct LabelAlphabet {
    scheme: Scheme,
    labels: Vec<Label>,
    index: HashMap<Label, usize>,
}

impl LabelAlphabet {
    /// Build and validate an alphabet.
    ///
    /// # Errors
    /// Returns `InvalidSchema` if the alphabet is empty, has duplicates,
    /// uses tags foreign to `scheme`, lacks `O`, or has a segment type that
    /// cannot be closed (BIEOU: no `E-` label; IOB: `I-` without `B-`).
    pub fn new(scheme: Scheme, labels: Vec<Label>) -> Result<Self> {
        if labels.is_empty() {
            return Err(BeamtagError::InvalidSchema("label alphabet is empty".into()));
        }

        let mut index = HashMap::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            if !scheme.contains(label.tag()) {
                return Err(BeamtagError::InvalidSchema(format!(
                    "label {label} does not belong to the {scheme} scheme"
                )));
            }
            if index.insert(label.clone(), i).is_some() {
                return Err(BeamtagError::InvalidSchema(format!("duplicate label {label}")));
            }
        }

        if !index.contains_key(&Label::outside()) {
            return Err(BeamtagError::InvalidSchema(
                "label alphabet must contain the O label".into(),
            ));
        }

        let has = |tag: Tag, value: &str| {
            labels
                .iter()
                .any(|l| l.tag() == tag && l.value() == value)
        };
        for label in &labels {
            let missing = match (scheme, label.tag()) {
                (Scheme::Bieou, Tag::Beginning | Tag::Inside) if !has(Tag::End, label.value()) => {
                    Some(Tag::End)
                }
                (Scheme::Iob, Tag::Inside) if !has(Tag::Beginning, label.value()) => {
                    Some(Tag::Beginning)
                }
                _ => None,
            };
            if let Some(tag) = missing {
                return Err(BeamtagError::InvalidSchema(format!(
                    "label {label} requires {tag}-{} in the alphabet",
                    label.value()
                )));
            }
        }

        Ok(Self {
            scheme,
            labels,
            index,
        })
    }

    /// Build an alphabet from label strings such as `"B-PER"`.
    pub fn parse<S: AsRef<str>>(scheme: Scheme, labels: &[S]) -> Result<Self> {
        let labels = labels
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<Label>>>()?;
        Self::new(scheme, labels)
    }

    /// Build the complete alphabet of `scheme` over the given entity types:
    /// `O` first, then every tag of the scheme for each type.
    pub fn complete<S: AsRef<str>>(scheme: Scheme, values: &[S]) -> Result<Self> {
        let mut labels = vec![Label::outside()];
        for value in values {
            for &tag in scheme.tags().iter().filter(|t| !t.is_outside()) {
                labels.push(Label::new(tag, value.as_ref())?);
            }
        }
        Self::new(scheme, labels)
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false`: empty alphabets are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Label at a score-vector index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    /// Score-vector index of a label.
    #[must_use]
    pub fn index_of(&self, label: &Label) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Parse a label string and check that it belongs to this alphabet.
    pub fn lookup(&self, s: &str) -> Result<Label> {
        let label: Label = s.parse()?;
        if self.index.contains_key(&label) {
            Ok(label)
        } else {
            Err(BeamtagError::UnknownLabel(label.to_string()))
        }
    }

    /// Entity types carried by the alphabet, sorted.
    #[must_use]
    pub fn values(&self) -> BTreeSet<&str> {
        self.labels
            .iter()
            .filter(|l| !l.is_outside())
            .map(Label::value)
            .collect()
    }
}

impl TryFrom<AlphabetRepr> for LabelAlphabet {
    type Error = BeamtagError;

    fn try_from(repr: AlphabetRepr) -> Result<Self> {
        Self::new(repr.scheme, repr.labels)
    }
}

impl From<LabelAlphabet> for AlphabetRepr {
    fn from(alphabet: LabelAlphabet) -> Self {
        AlphabetRepr {
            scheme: alphabet.scheme,
            labels: alphabet.labels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iob_alphabet_lookup() {
        let alphabet = LabelAlphabet::parse(Scheme::Iob, &["O", "B-PER", "I-PER"]).unwrap();
        assert_eq!(alphabet.len(), 3);
        assert_eq!(alphabet.get(1).unwrap().to_string(), "B-PER");
        assert_eq!(alphabet.index_of(&"I-PER".parse().unwrap()), Some(2));
        assert!(alphabet.get(3).is_none());
        assert!(alphabet.lookup("B-LOC").is_err());
        assert_eq!(alphabet.values().into_iter().collect::<Vec<_>>(), ["PER"]);
    }

    #[test]
    fn test_complete_bieou() {
        let alphabet = LabelAlphabet::complete(Scheme::Bieou, &["PER", "LOC"]).unwrap();
        assert_eq!(alphabet.len(), 9);
        assert_eq!(alphabet.get(0), Some(&Label::outside()));
        assert!(alphabet.lookup("U-LOC").is_ok());
        assert!(alphabet.lookup("E-PER").is_ok());
    }

    #[test]
    fn test_rejects_misconfigured_alphabets() {
        let cases: &[(Scheme, &[&str])] = &[
            (Scheme::Iob, &[]),
            (Scheme::Iob, &["B-PER", "I-PER"]),
            (Scheme::Iob, &["O", "B-PER", "B-PER"]),
            (Scheme::Iob, &["O", "U-PER"]),
            (Scheme::Iob, &["O", "I-PER"]),
            (Scheme::Bieou, &["O", "B-PER", "I-PER", "U-PER"]),
        ];
        for (scheme, labels) in cases {
            let result = LabelAlphabet::parse(*scheme, *labels);
            assert!(
                matches!(result, Err(BeamtagError::InvalidSchema(_))),
                "{labels:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_unit_only_bieou_is_valid() {
        assert!(LabelAlphabet::parse(Scheme::Bieou, &["O", "U-PER"]).is_ok());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let json = r#"{"scheme":"bieou","labels":["O","B-PER","E-PER","U-PER"]}"#;
        let alphabet: LabelAlphabet = serde_json::from_str(json).unwrap();
        assert_eq!(alphabet.scheme(), Scheme::Bieou);
        assert_eq!(serde_json::to_string(&alphabet).unwrap(), json);

        let broken = r#"{"scheme":"bieou","labels":["O","B-PER"]}"#;
        assert!(serde_json::from_str::<LabelAlphabet>(broken).is_err());
    }
}
