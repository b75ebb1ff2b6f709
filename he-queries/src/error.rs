//! Error types for homomorphic queries.

use thiserror::Error;

/// Errors raised by a homomorphic scheme or by the queries built on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeError {
    /// Key generation was asked for an unsupported key size.
    #[error("Key generation failed: {0}")]
    KeyGen(String),

    /// A plaintext does not fit the scheme's plaintext space.
    #[error("Value out of range: {0}")]
    Range(String),

    /// A ciphertext could not be decrypted with the given key.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// A PIR query asked for a position past the end of the database.
    #[error("Index {index} is out of range for a database of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// A PIR query and the database it is applied to differ in length.
    #[error("Expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The secure randomness source was unavailable.
    #[error("Secure randomness unavailable: {0}")]
    Randomness(String),
}

/// Result type for homomorphic operations.
pub type Result<T> = std::result::Result<T, HeError>;
