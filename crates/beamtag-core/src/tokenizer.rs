//! # Tokenizer
//!
//! Splits raw text into word and punctuation tokens for sequence labeling.
//! Offsets count chars, not bytes, so they line up with what annotation
//! tools report.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Words or single non-space symbols.
const TOKEN_PATTERN: &str = r"\w+|[^\w\s]";

/// A token with its position in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The token text
    pub form: String,
    /// Token index in the sentence
    pub index: usize,
    /// Char offset of the first char
    pub start: usize,
    /// Char offset just past the last char
    pub end: usize,
}

impl Token {
    /// Build tokens from pre-split forms, as if they had been joined by
    /// single spaces.
    ///
    /// # Examples
    /// ```
    /// use beamtag_core::Token;
    ///
    /// let tokens = Token::from_forms(&["New", "York"]);
    /// assert_eq!((tokens[1].start, tokens[1].end), (4, 8));
    /// ```
    pub fn from_forms<S: AsRef<str>>(forms: &[S]) -> Vec<Token> {
        let mut offset = 0;
        forms
            .iter()
            .enumerate()
            .map(|(index, form)| {
                let form = form.as_ref();
                let start = offset;
                let end = start + form.chars().count();
                offset = end + 1;
                Token {
                    form: form.to_string(),
                    index,
                    start,
                    end,
                }
            })
            .collect()
    }

    /// Length in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Regex-based word tokenizer.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    pattern: Regex,
}

impl Tokenizer {
    /// Create a new tokenizer instance.
    pub fn new() -> crate::Result<Self> {
        Ok(Self {
            pattern: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// Tokenize a sentence.
    ///
    /// # Examples
    /// ```
    /// use beamtag_core::Tokenizer;
    ///
    /// let tokenizer = Tokenizer::new().unwrap();
    /// let tokens = tokenizer.tokenize("Ada, meet Charles.");
    /// let forms: Vec<_> = tokens.iter().map(|t| t.form.as_str()).collect();
    /// assert_eq!(forms, ["Ada", ",", "meet", "Charles", "."]);
    /// ```
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        // Running (byte, char) position used to translate match offsets.
        let mut byte_pos = 0;
        let mut char_pos = 0;

        for m in self.pattern.find_iter(input) {
            char_pos += input[byte_pos..m.start()].chars().count();
            let start = char_pos;
            char_pos += m.as_str().chars().count();
            byte_pos = m.end();

            tokens.push(Token {
                form: m.as_str().to_string(),
                index: tokens.len(),
                start,
                end: char_pos,
            });
        }

        tokens
    }
}
