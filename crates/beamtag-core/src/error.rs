use thiserror::Error;

/// Errors that can occur during beamtag core operations.
///
/// Search exhaustion is deliberately absent: a beam that collapses is reported
/// as `None` and recovered by the greedy fallback.
#[derive(Debug, Error)]
pub enum BeamtagError {
    /// The label alphabet is inconsistent with its tagging scheme.
    #[error("invalid schema configuration: {0}")]
    InvalidSchema(String),

    /// A score vector does not match the alphabet size.
    #[error("score vector at position {position} has {got} entries, expected {expected}")]
    DimensionMismatch {
        /// Token position of the offending vector.
        position: usize,
        /// Size of the label alphabet.
        expected: usize,
        /// Length of the vector actually supplied.
        got: usize,
    },

    /// A score vector contains NaN or an infinite value.
    #[error("non-finite score at position {position}, label index {index}")]
    NonFiniteScore {
        /// Token position of the offending vector.
        position: usize,
        /// Index of the label inside the vector.
        index: usize,
    },

    /// Two parallel sequences have different lengths.
    #[error("length mismatch: expected {expected} items, got {got}")]
    LengthMismatch {
        /// Expected number of items.
        expected: usize,
        /// Number of items supplied.
        got: usize,
    },

    /// A label string could not be parsed.
    #[error("invalid label: {0:?}")]
    InvalidLabel(String),

    /// A label is not part of the alphabet.
    #[error("label not in alphabet: {0}")]
    UnknownLabel(String),

    /// The greedy decoder found no admissible label (unreachable with a
    /// validated alphabet).
    #[error("no admissible label at position {position}")]
    NoAdmissibleLabel {
        /// Token position where decoding got stuck.
        position: usize,
    },

    /// A decoder configuration value is out of range.
    #[error("invalid decoder configuration: {0}")]
    InvalidConfig(String),

    /// The upstream encoder failed to produce scores.
    #[error("inference error: {0}")]
    Inference(String),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regex pattern failed to compile (should not happen with static patterns).
    #[error("regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    /// The worker pool for batch decoding could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<candle_core::Error> for BeamtagError {
    fn from(err: candle_core::Error) -> Self {
        Self::Inference(err.to_string())
    }
}

/// Result type alias for beamtag operations.
pub type Result<T> = std::result::Result<T, BeamtagError>;
