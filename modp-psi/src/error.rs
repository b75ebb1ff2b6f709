//! Error types for the PSI protocol.

use thiserror::Error;

/// Errors that can occur during PSI protocol execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PsiError {
    /// Group parameters failed validation.
    #[error("Invalid group parameters: {0}")]
    InvalidGroup(String),

    /// An identifier could not be encoded as text.
    #[error("Identifier {index} could not be encoded: {reason}")]
    Encoding { index: usize, reason: String },

    /// The secure randomness source was unavailable.
    #[error("Secure randomness unavailable: {0}")]
    Randomness(String),

    /// A blinded value received from the peer was outside the group.
    #[error("Invalid blinded value at position {index}: {reason}")]
    InvalidBlindedValue { index: usize, reason: String },

    /// A re-blinded reply did not answer the list it was meant for.
    #[error("Expected {expected} re-blinded values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A message of the wrong kind arrived at an exchange step.
    #[error("Expected {expected} message, got {actual}")]
    UnexpectedMessage {
        expected: &'static str,
        actual: &'static str,
    },

    /// The message exchange with the peer did not complete.
    #[error("Exchange failed: {0}")]
    Exchange(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for PSI operations.
pub type Result<T> = std::result::Result<T, PsiError>;
