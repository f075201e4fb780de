//! # Beamtag Core
//!
//! Constrained decoding for neural sequence labelers. Given one probability
//! distribution over a label alphabet per token, produces the best label
//! sequence that is valid under an IOB or BIEOU tagging scheme, and groups it
//! into entity segments.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use beamtag_core::{build_segments, Decoder, DecoderConfig, LabelAlphabet, Scheme, Token};
//!
//! let alphabet = LabelAlphabet::complete(Scheme::Bieou, &["PER"]).unwrap();
//! let decoder = Decoder::new(Arc::new(alphabet), DecoderConfig::default()).unwrap();
//!
//! // Scores in alphabet order: O, B-PER, I-PER, E-PER, U-PER
//! let decoded = decoder
//!     .decode(&[
//!         vec![0.1, 0.7, 0.1, 0.05, 0.05],
//!         vec![0.1, 0.1, 0.1, 0.6, 0.1],
//!         vec![0.8, 0.05, 0.05, 0.05, 0.05],
//!     ])
//!     .unwrap();
//!
//! let tokens = Token::from_forms(&["Grace", "Hopper", "said"]);
//! let segments = build_segments(&decoded.labels, Some(&tokens)).unwrap();
//! assert_eq!(segments.len(), 1);
//! assert_eq!(segments[0].text(&tokens).as_deref(), Some("Grace Hopper"));
//! ```
pub mod alphabet;
pub mod config;
pub mod decode;
pub mod encoder;
pub mod error;
pub mod evaluation;
pub mod labeler;
pub mod schema;
pub mod scored;
pub mod segment;
pub mod tokenizer;

// Re-export primary API
pub use alphabet::LabelAlphabet;
pub use config::DecoderConfig;
pub use decode::{DecodeStrategy, Decoded, Decoder};
pub use encoder::{PrecomputedEncoder, ScoreEncoder, TensorEncoder};
pub use error::{BeamtagError, Result};
pub use evaluation::{Evaluator, LabelStatistics, MetricCounter};
pub use labeler::TokensLabeler;
pub use schema::{Label, Scheme, Tag, convert};
pub use scored::{Scored, ScoredLabel};
pub use segment::{AnnotatedSegment, build_segments};
pub use tokenizer::{Token, Tokenizer};
