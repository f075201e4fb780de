use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Label;

/// A value paired with a confidence score, typically a softmax probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored<T> {
    pub inner: T,
    pub score: f64,
}

impl<T> Scored<T> {
    pub fn new(inner: T, score: f64) -> Self {
        Self { inner, score }
    }

    /// Maps the wrapped value, keeping the score.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Scored<U> {
        Scored {
            inner: f(self.inner),
            score: self.score,
        }
    }

    /// Discards the score.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Display> fmt::Display for Scored<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.inner, self.score)
    }
}

/// A label with its decoding score.
pub type ScoredLabel = Scored<Label>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_display_and_map() {
        let s = Scored::new(Label::outside(), 0.9);
        assert_eq!(s.to_string(), "O (0.900)");

        let mapped = s.map(|l| l.to_string());
        assert_eq!(mapped.inner, "O");
        assert_eq!(mapped.score, 0.9);
    }
}
