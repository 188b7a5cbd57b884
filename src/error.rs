use thiserror::Error;

use crate::chain::NodeId;
use crate::domain::{Hash256, OutPoint};

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Chain index errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("unknown parent node {parent}")]
    UnknownParent { parent: NodeId },

    #[error("unknown node {id}")]
    UnknownNode { id: NodeId },

    #[error("node height {actual} does not follow its parent (expected {expected})")]
    HeightMismatch { expected: i32, actual: i32 },
}

/// Errors raised by the absorption computations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbsorptionError {
    /// The candidate does not extend the current best chain tip.
    #[error("node at height {candidate_height} does not connect to the best chain (tip {expected_parent:?})")]
    ChainMismatch {
        candidate_height: i32,
        expected_parent: Option<NodeId>,
    },
}

/// Reject classification carried by a validation rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
    Malformed,
    Invalid,
    Obsolete,
    Duplicate,
    NonStandard,
    Dust,
    InsufficientFee,
    Checkpoint,
}

/// A rule violation reported by the transaction validation collaborator.
///
/// The order book wraps these without reinterpreting them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{description}")]
pub struct RuleError {
    pub code: RejectCode,
    pub description: String,
}

impl RuleError {
    pub fn new(code: RejectCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }
}

/// Order admission rejections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("already have order {hash}")]
    AlreadyInBook { hash: Hash256 },

    #[error("output {outpoint} already spent by order {spent_by} in the book")]
    DuplicateSpend { outpoint: OutPoint, spent_by: Hash256 },

    #[error("not an order: {hash}")]
    NotAnOrder { hash: Hash256 },

    #[error("order {hash} exchanges a zero token-0 amount")]
    ZeroAmount { hash: Hash256 },

    #[error("order {hash} is a coinbase")]
    Coinbase { hash: Hash256 },

    #[error(transparent)]
    Rule(#[from] RuleError),
}

impl BookError {
    /// Reject code to report to the submitting peer.
    #[must_use]
    pub fn reject_code(&self) -> RejectCode {
        match self {
            Self::AlreadyInBook { .. } | Self::DuplicateSpend { .. } => RejectCode::Duplicate,
            Self::NotAnOrder { .. } | Self::ZeroAmount { .. } | Self::Coinbase { .. } => {
                RejectCode::Invalid
            }
            Self::Rule(rule) => rule.code,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Absorption(#[from] AbsorptionError),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_error_passes_through_unchanged() {
        let rule = RuleError::new(RejectCode::NonStandard, "sigop cost is too high");
        let err = BookError::from(rule.clone());
        assert_eq!(err.to_string(), "sigop cost is too high");
        assert_eq!(err.reject_code(), RejectCode::NonStandard);
    }

    #[test]
    fn admission_rejections_map_to_reject_codes() {
        let hash = Hash256::ZERO;
        assert_eq!(
            BookError::AlreadyInBook { hash }.reject_code(),
            RejectCode::Duplicate
        );
        assert_eq!(
            BookError::NotAnOrder { hash }.reject_code(),
            RejectCode::Invalid
        );
    }

    #[test]
    fn crate_error_wraps_transparently() {
        let err: Error = AbsorptionError::ChainMismatch {
            candidate_height: 9,
            expected_parent: None,
        }
        .into();
        assert!(err.to_string().contains("height 9"));
    }
}
