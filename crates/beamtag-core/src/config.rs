//! # Decoder Configuration
//!
//! Resource bounds of the beam search. `None` means unbounded and is written
//! as `-1` in serialized configurations.

use serde::{Deserialize, Serialize};

use crate::error::{BeamtagError, Result};

/// Default maximum number of live states per step.
pub const DEFAULT_MAX_BEAM_SIZE: usize = 3;
/// Default maximum number of extensions per state.
pub const DEFAULT_MAX_FORK_SIZE: usize = 5;
/// Default maximum sentence length the beam search will attempt.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Configuration for the beam decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Max number of parallel states kept after each step.
    #[serde(with = "cap")]
    pub max_beam_size: Option<usize>,
    /// Max number of extensions generated from a single state.
    #[serde(with = "cap")]
    pub max_fork_size: Option<usize>,
    /// Max number of positions the beam search processes.
    #[serde(with = "cap")]
    pub max_iterations: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_beam_size: Some(DEFAULT_MAX_BEAM_SIZE),
            max_fork_size: Some(DEFAULT_MAX_FORK_SIZE),
            max_iterations: Some(DEFAULT_MAX_ITERATIONS),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every bound removed.
    pub fn unbounded() -> Self {
        Self {
            max_beam_size: None,
            max_fork_size: None,
            max_iterations: None,
        }
    }

    /// Set the beam size (`None` = unbounded).
    pub fn with_beam_size(mut self, size: Option<usize>) -> Self {
        self.max_beam_size = size;
        self
    }

    /// Set the fork size (`None` = unbounded).
    pub fn with_fork_size(mut self, size: Option<usize>) -> Self {
        self.max_fork_size = size;
        self
    }

    /// Set the iteration budget (`None` = unbounded).
    pub fn with_max_iterations(mut self, iterations: Option<usize>) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Reject bounds of zero, which would make every search fail.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("max_beam_size", self.max_beam_size),
            ("max_fork_size", self.max_fork_size),
            ("max_iterations", self.max_iterations),
        ] {
            if value == Some(0) {
                return Err(BeamtagError::InvalidConfig(format!(
                    "{name} must be positive or -1 (unbounded)"
                )));
            }
        }
        Ok(())
    }
}

/// Converts a signed command-line style bound (`-1` = unbounded).
pub fn bound_from_signed(value: i64) -> Result<Option<usize>> {
    match value {
        -1 => Ok(None),
        v if v < 0 => Err(BeamtagError::InvalidConfig(format!(
            "bound {v} is invalid, use -1 for unbounded"
        ))),
        v => usize::try_from(v)
            .map(Some)
            .map_err(|_| BeamtagError::InvalidConfig(format!("bound {v} is too large"))),
    }
}

mod cap {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<usize>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_u64(*v as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        super::bound_from_signed(raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_beam_size, Some(3));
        assert_eq!(config.max_fork_size, Some(5));
        assert_eq!(config.max_iterations, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = DecoderConfig::new()
            .with_beam_size(Some(5))
            .with_fork_size(Some(3))
            .with_max_iterations(None);
        assert_eq!(config.max_beam_size, Some(5));
        assert_eq!(config.max_fork_size, Some(3));
        assert_eq!(config.max_iterations, None);
    }

    #[test]
    fn test_zero_bound_rejected() {
        let config = DecoderConfig::new().with_fork_size(Some(0));
        assert!(matches!(config.validate(), Err(BeamtagError::InvalidConfig(_))));
    }

    #[test]
    fn test_minus_one_means_unbounded() {
        let config: DecoderConfig =
            serde_json::from_str(r#"{"max_beam_size": -1, "max_iterations": 20}"#).unwrap();
        assert_eq!(config.max_beam_size, None);
        assert_eq!(config.max_fork_size, Some(DEFAULT_MAX_FORK_SIZE));
        assert_eq!(config.max_iterations, Some(20));

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"max_beam_size\":-1"));

        assert!(serde_json::from_str::<DecoderConfig>(r#"{"max_beam_size": -2}"#).is_err());
    }

    #[test]
    fn test_misspelled_keys_rejected() {
        let result = serde_json::from_str::<DecoderConfig>(r#"{"beam_size": 1, "fork_size": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bound_from_signed() {
        assert_eq!(bound_from_signed(-1).unwrap(), None);
        assert_eq!(bound_from_signed(4).unwrap(), Some(4));
        assert!(bound_from_signed(-3).is_err());
    }
}
