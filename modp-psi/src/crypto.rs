//! Cryptographic operations for the PSI protocol.
//!
//! Blinding is exponentiation in the multiplicative group mod `P`:
//! `blind(x) = G^(a * H(x))` and `reblind(v) = v^b`. Because exponents
//! multiply, `(G^(a*h))^b == (G^(b*h))^a`, and the two parties arrive at the
//! same doubly blinded value for every identifier they share.

use crate::error::{PsiError, Result};
use crate::group::GroupParameters;
use crate::messages::BlindedValue;
use crate::primality::sample_range;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fmt;

/// An opaque textual identifier held by one party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier from raw bytes.
    ///
    /// # Errors
    /// Returns `PsiError::Encoding` if the bytes are not valid UTF-8.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes)
            .map(Identifier)
            .map_err(|e| PsiError::Encoding {
                index: 0,
                reason: e.to_string(),
            })
    }

    /// The identifier's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The byte encoding that gets hashed.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Unwrap into the owned text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Identifier(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Convert a list of raw byte strings into identifiers.
///
/// Fails on the first entry that is not valid UTF-8. The whole list is
/// rejected; bad entries are never skipped.
///
/// # Errors
/// Returns `PsiError::Encoding` carrying the offending entry's position.
pub fn identifiers_from_bytes(items: Vec<Vec<u8>>) -> Result<Vec<Identifier>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, bytes)| {
            Identifier::from_bytes(bytes).map_err(|e| match e {
                PsiError::Encoding { reason, .. } => PsiError::Encoding { index, reason },
                other => other,
            })
        })
        .collect()
}

/// The hash of an identifier, an integer in `[0, P)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exponent(BigUint);

impl Exponent {
    /// The reduced hash value.
    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

/// A party's private exponent, uniform in `[1, P-1)`.
///
/// There is no accessor for the value and it is not `Clone`, so it stays with
/// the party state that owns it and is dropped with that state.
pub struct PartySecret(BigUint);

impl PartySecret {
    #[cfg(test)]
    pub(crate) fn from_value(value: BigUint) -> Self {
        PartySecret(value)
    }
}

impl fmt::Debug for PartySecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PartySecret(..)")
    }
}

/// Hash an identifier to an exponent.
///
/// SHA-256 of the identifier's bytes, read big-endian and reduced mod `P`.
/// Distinct identifiers can collide; a collision shows up as a false-positive
/// match and cannot be detected.
///
/// # Arguments
/// * `id` - Identifier to hash
/// * `params` - Group whose modulus bounds the result
///
/// # Returns
/// An exponent in `[0, P)`, identical across parties and runs
pub fn hash_identifier(id: &Identifier, params: &GroupParameters) -> Exponent {
    let digest = Sha256::digest(id.as_bytes());
    Exponent(BigUint::from_bytes_be(&digest) % params.modulus())
}

/// Generate a secret from the operating system's secure randomness source.
///
/// # Errors
/// Returns `PsiError::Randomness` if the source is unavailable.
pub fn generate_secret(params: &GroupParameters) -> Result<PartySecret> {
    generate_secret_with(&mut OsRng, params)
}

/// Generate a secret from the given cryptographic RNG.
///
/// # Errors
/// Returns `PsiError::Randomness` if the RNG fails. There is no fallback.
pub fn generate_secret_with<R: CryptoRng + RngCore + ?Sized>(
    rng: &mut R,
    params: &GroupParameters,
) -> Result<PartySecret> {
    let upper = params.group_order();
    sample_range(rng, &BigUint::one(), &upper)
        .map(PartySecret)
        .map_err(|e| PsiError::Randomness(e.to_string()))
}

/// Blind one identifier: `G^(secret * H(id)) mod P`.
pub fn blind_identifier(
    id: &Identifier,
    secret: &PartySecret,
    params: &GroupParameters,
) -> BlindedValue {
    let h = hash_identifier(id, params);
    // P is prime, so exponents can be taken mod P - 1
    let exponent = (&secret.0 * h.value()) % params.group_order();
    BlindedValue::new(params.generator().modpow(&exponent, params.modulus()))
}

/// Blind a list of identifiers, preserving order.
///
/// # Arguments
/// * `identifiers` - Local identifiers
/// * `secret` - The local party's secret
/// * `params` - Shared group parameters
///
/// # Returns
/// One blinded value per identifier, at the same position
pub fn blind(
    identifiers: &[Identifier],
    secret: &PartySecret,
    params: &GroupParameters,
) -> Vec<BlindedValue> {
    identifiers
        .par_iter()
        .map(|id| blind_identifier(id, secret, params))
        .collect()
}

/// Raise each received value to `secret` mod `P`, preserving order.
///
/// # Arguments
/// * `values` - Blinded values received from the peer
/// * `secret` - The local party's secret
/// * `params` - Shared group parameters
///
/// # Errors
/// Returns `PsiError::InvalidBlindedValue` if a value lies outside `[1, P)`.
pub fn reblind(
    values: &[BlindedValue],
    secret: &PartySecret,
    params: &GroupParameters,
) -> Result<Vec<BlindedValue>> {
    values
        .par_iter()
        .enumerate()
        .map(|(index, value)| {
            let v = value.as_biguint();
            if v.is_zero() || v >= params.modulus() {
                return Err(PsiError::InvalidBlindedValue {
                    index,
                    reason: "value is outside [1, P)".to_string(),
                });
            }
            Ok(BlindedValue::new(v.modpow(&secret.0, params.modulus())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OfflineRng;

    impl RngCore for OfflineRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source offline"))
        }
    }

    impl CryptoRng for OfflineRng {}

    fn secret(v: u64) -> PartySecret {
        PartySecret::from_value(BigUint::from(v))
    }

    #[test]
    fn test_hash_identifier_deterministic() {
        let id = Identifier::from("ID001");
        let h1 = hash_identifier(&id, &GroupParameters::demo());
        let h2 = hash_identifier(&id, &GroupParameters::demo());
        assert_eq!(h1, h2, "Hashing same identifier should produce same exponent");

        let h3 = hash_identifier(&Identifier::from("ID002"), &GroupParameters::demo());
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_hash_identifier_in_range() {
        let params = GroupParameters::demo();
        for i in 0..50 {
            let id = Identifier::from(format!("ID{:03}", i));
            assert!(hash_identifier(&id, &params).value() < params.modulus());
        }
    }

    #[test]
    fn test_hash_identifier_known_value() {
        // SHA-256("abc") = ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad
        let digest = BigUint::parse_bytes(
            b"ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            16,
        )
        .unwrap();
        let params = GroupParameters::demo();
        let h = hash_identifier(&Identifier::from("abc"), &params);
        assert_eq!(h.value(), &(digest % params.modulus()));
    }

    #[test]
    fn test_identifier_from_invalid_bytes() {
        let result = identifiers_from_bytes(vec![b"ok".to_vec(), vec![0xff, 0xfe], b"x".to_vec()]);
        assert!(matches!(result, Err(PsiError::Encoding { index: 1, .. })));

        let ids = identifiers_from_bytes(vec![b"a".to_vec(), b"b".to_vec()]).unwrap();
        assert_eq!(ids, vec![Identifier::from("a"), Identifier::from("b")]);
    }

    #[test]
    fn test_generate_secret_in_range() {
        let params = GroupParameters::demo();
        let upper = params.modulus() - BigUint::one();
        for _ in 0..20 {
            let s = generate_secret(&params).unwrap();
            assert!(s.0 >= BigUint::one() && s.0 < upper);
        }
    }

    #[test]
    fn test_generate_secret_fails_without_randomness() {
        let result = generate_secret_with(&mut OfflineRng, &GroupParameters::demo());
        assert!(matches!(result, Err(PsiError::Randomness(_))));
    }

    #[test]
    fn test_secret_debug_redacted() {
        assert_eq!(format!("{:?}", secret(12345)), "PartySecret(..)");
    }

    #[test]
    fn test_blind_matches_direct_computation() {
        let params = GroupParameters::demo();
        let id = Identifier::from("ID003");
        let a = secret(987654321);
        let h = hash_identifier(&id, &params);
        let expected = params
            .generator()
            .modpow(&(BigUint::from(987654321u64) * h.value()), params.modulus());
        assert_eq!(blind_identifier(&id, &a, &params).as_biguint(), &expected);
    }

    #[test]
    fn test_blind_preserves_order() {
        let params = GroupParameters::demo();
        let ids: Vec<Identifier> = ["a", "b", "c", "d"].into_iter().map(Identifier::from).collect();
        let a = secret(42);
        let blinded = blind(&ids, &a, &params);
        assert_eq!(blinded.len(), 4);
        for (id, value) in ids.iter().zip(&blinded) {
            assert_eq!(&blind_identifier(id, &a, &params), value);
        }
    }

    #[test]
    fn test_reblind_commutes() {
        let params = GroupParameters::demo();
        let ids = vec![Identifier::from("apple"), Identifier::from("banana")];
        let a = generate_secret(&params).unwrap();
        let b = generate_secret(&params).unwrap();

        let ab = reblind(&blind(&ids, &a, &params), &b, &params).unwrap();
        let ba = reblind(&blind(&ids, &b, &params), &a, &params).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_reblind_rejects_out_of_group_values() {
        let params = GroupParameters::demo();
        let a = secret(7);
        let values = vec![
            BlindedValue::new(BigUint::from(3u32)),
            BlindedValue::new(params.modulus().clone()),
        ];
        let result = reblind(&values, &a, &params);
        assert!(matches!(
            result,
            Err(PsiError::InvalidBlindedValue { index: 1, .. })
        ));

        let zero = vec![BlindedValue::new(BigUint::zero())];
        assert!(reblind(&zero, &a, &params).is_err());
    }

    #[test]
    fn test_blind_empty_list() {
        let params = GroupParameters::demo();
        let a = secret(5);
        assert!(blind(&[], &a, &params).is_empty());
        assert!(reblind(&[], &a, &params).unwrap().is_empty());
    }
}
