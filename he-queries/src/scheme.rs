//! The additively homomorphic encryption contract.

use crate::error::Result;
use num_bigint::BigUint;

/// An encryption scheme that supports addition of ciphertexts and
/// multiplication of a ciphertext by a plaintext scalar.
///
/// Operations are named methods rather than operator overloads; the sum and
/// PIR queries are generic over this trait only.
pub trait AdditiveHomomorphic {
    type PublicKey;
    type PrivateKey;
    type Ciphertext: Clone;

    /// Generate a key pair with a modulus of `bit_length` bits.
    ///
    /// # Errors
    /// `HeError::KeyGen` for an unsupported `bit_length`.
    fn keygen(&self, bit_length: u64) -> Result<(Self::PublicKey, Self::PrivateKey)>;

    /// Plaintexts live in `[0, plaintext_modulus)`; sums wrap modulo it.
    fn plaintext_modulus<'k>(&self, pk: &'k Self::PublicKey) -> &'k BigUint;

    /// Encrypt `value`.
    ///
    /// # Errors
    /// `HeError::Range` if `value` exceeds the plaintext space.
    fn encrypt(&self, pk: &Self::PublicKey, value: &BigUint) -> Result<Self::Ciphertext>;

    /// Decrypt `c`.
    ///
    /// # Errors
    /// `HeError::Decryption` if `c` was not produced under this key.
    fn decrypt(&self, sk: &Self::PrivateKey, c: &Self::Ciphertext) -> Result<BigUint>;

    /// A ciphertext of the sum of the plaintexts of `c1` and `c2`.
    ///
    /// If either input was produced under a different key, the result fails
    /// to decrypt with `HeError::Decryption`.
    fn add(
        &self,
        pk: &Self::PublicKey,
        c1: &Self::Ciphertext,
        c2: &Self::Ciphertext,
    ) -> Self::Ciphertext;

    /// A ciphertext of `k` times the plaintext of `c`.
    fn scalar_mul(&self, pk: &Self::PublicKey, c: &Self::Ciphertext, k: &BigUint)
        -> Self::Ciphertext;
}
