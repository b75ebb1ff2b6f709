//! # Queries over additively homomorphic encryption
//!
//! Two small protocols built on any [`AdditiveHomomorphic`] scheme:
//!
//! - [`aggregate`] - an encrypted sum, where values are added as ciphertexts
//!   and decrypted once.
//! - [`pir`] - single-database private information retrieval with a one-hot
//!   encrypted selection vector.
//!
//! [`Paillier`] is the bundled backend.
//!
//! ```
//! use he_queries::{encrypted_sum, AdditiveHomomorphic, Paillier};
//! use num_bigint::BigUint;
//!
//! let (pk, sk) = Paillier.keygen(256)?;
//! let total = encrypted_sum(&Paillier, &pk, &sk, &[BigUint::from(5u32), BigUint::from(7u32)])?;
//! assert_eq!(total, BigUint::from(12u32));
//! # Ok::<(), he_queries::HeError>(())
//! ```

pub use aggregate::{encrypted_sum, EncryptedSum};
pub use error::{HeError, Result};
pub use paillier::Paillier;
pub use pir::{answer, decode, pir_fetch, PirQuery};
pub use scheme::AdditiveHomomorphic;

pub mod aggregate;
pub mod error;
pub mod paillier;
pub mod pir;
pub mod scheme;
