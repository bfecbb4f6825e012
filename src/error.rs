//! Error types for trace consolidation
//!
//! Failure to match a pattern is never an error: it is the normal negative branch
//! that drives the commit-and-slide step. Errors here cover rejected pattern
//! registrations, operations the engine cannot classify, and bad configuration.

use crate::operation::OperationKind;
use thiserror::Error;

/// Errors surfaced by the consolidation engine and its registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsolidationError {
    #[error("Cannot consolidate operation kind: {}", .kind.to_string().to_uppercase())]
    UnsupportedPattern { kind: OperationKind },

    #[error("Unknown operation kind: {0}")]
    UnknownKind(String),

    #[error("Malformed operation at position {position}: {reason}")]
    MalformedOperation { position: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for consolidation operations
pub type Result<T> = std::result::Result<T, ConsolidationError>;
