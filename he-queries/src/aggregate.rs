//! Encrypted sum: contributors encrypt, an aggregator adds ciphertexts, and
//! only the private-key holder sees the total.

use crate::error::Result;
use crate::scheme::AdditiveHomomorphic;
use num_bigint::BigUint;

/// Running homomorphic sum held by an aggregator that only has the public key.
pub struct EncryptedSum<'a, S: AdditiveHomomorphic> {
    scheme: &'a S,
    pk: &'a S::PublicKey,
    acc: S::Ciphertext,
    count: usize,
}

impl<'a, S: AdditiveHomomorphic> EncryptedSum<'a, S> {
    /// Start from an encryption of zero.
    pub fn new(scheme: &'a S, pk: &'a S::PublicKey) -> Result<Self> {
        let acc = scheme.encrypt(pk, &BigUint::from(0u32))?;
        Ok(Self {
            scheme,
            pk,
            acc,
            count: 0,
        })
    }

    /// Add one contributor's ciphertext.
    pub fn absorb(&mut self, c: &S::Ciphertext) {
        self.acc = self.scheme.add(self.pk, &self.acc, c);
        self.count += 1;
    }

    /// Number of ciphertexts absorbed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Consume the aggregator and return the encrypted total.
    pub fn finish(self) -> S::Ciphertext {
        self.acc
    }
}

/// Encrypt every value, fold them with `add`, and decrypt the total once.
///
/// An empty input sums to zero. Plaintext overflow wraps modulo the scheme's
/// plaintext space.
///
/// # Errors
/// Propagates the scheme's `Range` and `Decryption` errors unchanged.
pub fn encrypted_sum<S: AdditiveHomomorphic>(
    scheme: &S,
    pk: &S::PublicKey,
    sk: &S::PrivateKey,
    values: &[BigUint],
) -> Result<BigUint> {
    let mut sum = EncryptedSum::new(scheme, pk)?;
    for value in values {
        let c = scheme.encrypt(pk, value)?;
        sum.absorb(&c);
    }
    tracing::debug!(count = sum.count(), "folded encrypted values");
    scheme.decrypt(sk, &sum.finish())
}
