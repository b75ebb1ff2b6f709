//! Single-database private information retrieval.
//!
//! The client encrypts a one-hot selection vector. The server folds
//! `acc + bit_i * db_i` over the database without learning which bit is set,
//! and the client decrypts the single entry it selected.

use crate::error::{HeError, Result};
use crate::scheme::AdditiveHomomorphic;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// An encrypted one-hot selection vector.
pub struct PirQuery<S: AdditiveHomomorphic> {
    bits: Vec<S::Ciphertext>,
}

impl<S: AdditiveHomomorphic> PirQuery<S> {
    /// Build a query selecting `index` out of `len` entries.
    ///
    /// # Errors
    /// Returns `HeError::IndexOutOfRange` if `index >= len`.
    pub fn build(scheme: &S, pk: &S::PublicKey, len: usize, index: usize) -> Result<Self> {
        if index >= len {
            return Err(HeError::IndexOutOfRange { index, len });
        }
        let one = BigUint::one();
        let zero = BigUint::zero();
        let bits = (0..len)
            .map(|j| scheme.encrypt(pk, if j == index { &one } else { &zero }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { bits })
    }

    /// Number of entries the query is shaped for.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}

impl<S: AdditiveHomomorphic> Clone for PirQuery<S> {
    fn clone(&self) -> Self {
        Self {
            bits: self.bits.clone(),
        }
    }
}

/// Server side: fold the query against the database.
///
/// # Errors
/// Returns `HeError::LengthMismatch` if the query does not match the
/// database size, and the scheme's `Range` error if an entry does not fit the
/// plaintext space.
pub fn answer<S: AdditiveHomomorphic>(
    scheme: &S,
    pk: &S::PublicKey,
    query: &PirQuery<S>,
    database: &[BigUint],
) -> Result<S::Ciphertext> {
    if query.len() != database.len() {
        return Err(HeError::LengthMismatch {
            expected: database.len(),
            actual: query.len(),
        });
    }
    let bound = scheme.plaintext_modulus(pk);
    if let Some(i) = database.iter().position(|entry| entry >= bound) {
        // the reply would come back reduced mod the plaintext space
        return Err(HeError::Range(format!("database entry {} exceeds the plaintext space", i)));
    }
    let mut acc = scheme.encrypt(pk, &BigUint::zero())?;
    for (bit, entry) in query.bits.iter().zip(database) {
        let term = scheme.scalar_mul(pk, bit, entry);
        acc = scheme.add(pk, &acc, &term);
    }
    tracing::debug!(entries = database.len(), "answered pir query");
    Ok(acc)
}

/// Client side: decrypt the server's reply.
pub fn decode<S: AdditiveHomomorphic>(
    scheme: &S,
    sk: &S::PrivateKey,
    reply: &S::Ciphertext,
) -> Result<BigUint> {
    scheme.decrypt(sk, reply)
}

/// Build a query, answer it and decode the reply in one call.
pub fn pir_fetch<S: AdditiveHomomorphic>(
    scheme: &S,
    pk: &S::PublicKey,
    sk: &S::PrivateKey,
    database: &[BigUint],
    index: usize,
) -> Result<BigUint> {
    let query = PirQuery::build(scheme, pk, database.len(), index)?;
    let reply = answer(scheme, pk, &query, database)?;
    decode(scheme, sk, &reply)
}
