//! Paillier encryption over `num-bigint`.
//!
//! With `g = n + 1`:
//! - `Enc(m) = (1 + m*n) * r^n mod n^2`
//! - `Dec(c) = L(c^lambda mod n^2) * mu mod n`, where `L(u) = (u - 1) / n`
//! - `Enc(a) * Enc(b) = Enc(a + b)` and `Enc(a)^k = Enc(k * a)`

use crate::error::{HeError, Result};
use crate::scheme::AdditiveHomomorphic;
use modp_psi::primality::{random_prime, sample_range};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::fmt;

/// Smallest accepted modulus size.
pub const MIN_KEY_BITS: u64 = 128;

/// Identifies the key a ciphertext was produced under.
type Fingerprint = [u8; 8];

fn fingerprint(n: &BigUint) -> Fingerprint {
    let digest = Sha256::digest(n.to_bytes_be());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Fingerprint of a ciphertext combined from inputs under different keys.
/// `decrypt` never accepts it.
const MIXED_KEYS: Option<Fingerprint> = None;

fn combined_fingerprint(pk: &PublicKey, inputs: &[&Ciphertext]) -> Option<Fingerprint> {
    if inputs.iter().all(|c| c.fingerprint == Some(pk.fingerprint)) {
        Some(pk.fingerprint)
    } else {
        MIXED_KEYS
    }
}

fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = BigInt::from(a.clone());
    let m = BigInt::from(m.clone());
    let egcd = a.extended_gcd(&m);
    if !egcd.gcd.is_one() {
        return None;
    }
    egcd.x.mod_floor(&m).to_biguint()
}

fn randomness_error(e: rand::Error) -> HeError {
    HeError::Randomness(e.to_string())
}

/// Paillier public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    n: BigUint,
    n_squared: BigUint,
    fingerprint: Fingerprint,
}

impl PublicKey {
    fn from_modulus(n: BigUint) -> Self {
        let n_squared = &n * &n;
        let fingerprint = fingerprint(&n);
        Self {
            n,
            n_squared,
            fingerprint,
        }
    }

    /// The modulus `n`; plaintexts live in `[0, n)`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Size of the modulus in bits.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }
}

/// Paillier private key.
pub struct PrivateKey {
    public: PublicKey,
    lambda: BigUint,
    mu: BigUint,
}

impl PrivateKey {
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

/// Paillier ciphertext, an element of `Z*_{n^2}`.
///
/// Carries the fingerprint of the key it was produced under, or none if it
/// was combined from ciphertexts under different keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    value: BigUint,
    fingerprint: Option<Fingerprint>,
}

impl Ciphertext {
    /// The raw group element.
    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

/// The Paillier scheme. Randomness comes from `OsRng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paillier;

impl AdditiveHomomorphic for Paillier {
    type PublicKey = PublicKey;
    type PrivateKey = PrivateKey;
    type Ciphertext = Ciphertext;

    fn keygen(&self, bit_length: u64) -> Result<(PublicKey, PrivateKey)> {
        if bit_length < MIN_KEY_BITS || bit_length % 2 != 0 {
            return Err(HeError::KeyGen(format!(
                "bit length must be even and at least {}, got {}",
                MIN_KEY_BITS, bit_length
            )));
        }
        let mut rng = OsRng;
        let half = bit_length / 2;
        loop {
            let p = random_prime(half, &mut rng).map_err(randomness_error)?;
            let q = random_prime(half, &mut rng).map_err(randomness_error)?;
            if p == q {
                continue;
            }
            let n = &p * &q;
            let lambda = (&p - 1u32).lcm(&(&q - 1u32));
            let Some(mu) = mod_inverse(&lambda, &n) else {
                continue;
            };
            tracing::debug!(bits = n.bits(), "generated paillier key pair");
            let public = PublicKey::from_modulus(n);
            let private = PrivateKey {
                public: public.clone(),
                lambda,
                mu,
            };
            return Ok((public, private));
        }
    }

    fn plaintext_modulus<'k>(&self, pk: &'k PublicKey) -> &'k BigUint {
        &pk.n
    }

    fn encrypt(&self, pk: &PublicKey, value: &BigUint) -> Result<Ciphertext> {
        if value >= &pk.n {
            return Err(HeError::Range(format!(
                "plaintext must be below the {}-bit modulus",
                pk.bits()
            )));
        }
        let mut rng = OsRng;
        let r = loop {
            let r = sample_range(&mut rng, &BigUint::one(), &pk.n).map_err(randomness_error)?;
            if r.gcd(&pk.n).is_one() {
                break r;
            }
        };
        let gm = (BigUint::one() + value * &pk.n) % &pk.n_squared;
        let rn = r.modpow(&pk.n, &pk.n_squared);
        Ok(Ciphertext {
            value: (gm * rn) % &pk.n_squared,
            fingerprint: Some(pk.fingerprint),
        })
    }

    fn decrypt(&self, sk: &PrivateKey, c: &Ciphertext) -> Result<BigUint> {
        let pk = &sk.public;
        if c.fingerprint != Some(pk.fingerprint) {
            return Err(HeError::Decryption(
                "ciphertext was produced under a different key".to_string(),
            ));
        }
        if c.value.is_zero() || c.value >= pk.n_squared || !c.value.gcd(&pk.n).is_one() {
            return Err(HeError::Decryption(
                "ciphertext is not an element of Z*_{n^2}".to_string(),
            ));
        }
        let u = c.value.modpow(&sk.lambda, &pk.n_squared);
        let l = (u - 1u32) / &pk.n;
        Ok((l * &sk.mu) % &pk.n)
    }

    fn add(&self, pk: &PublicKey, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
        Ciphertext {
            value: (&c1.value * &c2.value) % &pk.n_squared,
            fingerprint: combined_fingerprint(pk, &[c1, c2]),
        }
    }

    fn scalar_mul(&self, pk: &PublicKey, c: &Ciphertext, k: &BigUint) -> Ciphertext {
        Ciphertext {
            value: c.value.modpow(k, &pk.n_squared),
            fingerprint: combined_fingerprint(pk, &[c]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BITS: u64 = 512;

    fn big(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn test_keygen_rejects_bad_bit_lengths() {
        for bits in [0u64, 64, 127, 129, 257] {
            assert!(
                matches!(Paillier.keygen(bits), Err(HeError::KeyGen(_))),
                "bit length {} should be rejected",
                bits
            );
        }
    }

    #[test]
    fn test_keygen_modulus_size() {
        let (pk, sk) = Paillier.keygen(TEST_BITS).unwrap();
        assert_eq!(pk.bits(), TEST_BITS);
        assert_eq!(sk.public_key(), &pk);
    }

    #[test]
    fn test_homomorphic_addition() {
        let (pk, sk) = Paillier.keygen(TEST_BITS).unwrap();
        let c5 = Paillier.encrypt(&pk, &big(5)).unwrap();
        let c7 = Paillier.encrypt(&pk, &big(7)).unwrap();
        let sum = Paillier.add(&pk, &c5, &c7);
        assert_eq!(Paillier.decrypt(&sk, &sum).unwrap(), big(12));
    }

    #[test]
    fn test_scalar_multiplication() {
        let (pk, sk) = Paillier.keygen(TEST_BITS).unwrap();
        let c = Paillier.encrypt(&pk, &big(6)).unwrap();
        assert_eq!(
            Paillier.decrypt(&sk, &Paillier.scalar_mul(&pk, &c, &big(7))).unwrap(),
            big(42)
        );
        assert_eq!(
            Paillier.decrypt(&sk, &Paillier.scalar_mul(&pk, &c, &big(0))).unwrap(),
            big(0)
        );
    }

    #[test]
    fn test_addition_wraps_mod_n() {
        let (pk, sk) = Paillier.keygen(TEST_BITS).unwrap();
        let top = pk.n() - 1u32;
        let c1 = Paillier.encrypt(&pk, &top).unwrap();
        let c2 = Paillier.encrypt(&pk, &big(3)).unwrap();
        assert_eq!(Paillier.decrypt(&sk, &Paillier.add(&pk, &c1, &c2)).unwrap(), big(2));
    }

    #[test]
    fn test_encryption_is_randomized() {
        let (pk, sk) = Paillier.keygen(TEST_BITS).unwrap();
        let a = Paillier.encrypt(&pk, &big(9)).unwrap();
        let b = Paillier.encrypt(&pk, &big(9)).unwrap();
        assert_ne!(a, b);
        assert_eq!(Paillier.decrypt(&sk, &a).unwrap(), Paillier.decrypt(&sk, &b).unwrap());
    }

    #[test]
    fn test_plaintext_out_of_range() {
        let (pk, _) = Paillier.keygen(TEST_BITS).unwrap();
        let n = pk.n().clone();
        assert!(matches!(Paillier.encrypt(&pk, &n), Err(HeError::Range(_))));
    }

    #[test]
    fn test_decrypt_with_wrong_key() {
        let (pk, _) = Paillier.keygen(TEST_BITS).unwrap();
        let (_, other_sk) = Paillier.keygen(TEST_BITS).unwrap();
        let c = Paillier.encrypt(&pk, &big(1)).unwrap();
        assert!(matches!(
            Paillier.decrypt(&other_sk, &c),
            Err(HeError::Decryption(_))
        ));
    }

    #[test]
    fn test_decrypt_rejects_malformed_ciphertext() {
        let (pk, sk) = Paillier.keygen(TEST_BITS).unwrap();
        let zero = Ciphertext {
            value: BigUint::zero(),
            fingerprint: Some(pk.fingerprint),
        };
        assert!(matches!(Paillier.decrypt(&sk, &zero), Err(HeError::Decryption(_))));
    }

    #[test]
    fn test_cross_key_add_fails_to_decrypt() {
        let (pk_a, _) = Paillier.keygen(TEST_BITS).unwrap();
        let (pk_b, sk_b) = Paillier.keygen(TEST_BITS).unwrap();
        let foreign = Paillier.encrypt(&pk_a, &big(5)).unwrap();
        let own = Paillier.encrypt(&pk_b, &big(7)).unwrap();

        let sum = Paillier.add(&pk_b, &foreign, &own);
        assert!(matches!(
            Paillier.decrypt(&sk_b, &sum),
            Err(HeError::Decryption(_))
        ));

        // mixing stays detectable through further operations
        let scaled = Paillier.scalar_mul(&pk_b, &sum, &big(3));
        let again = Paillier.add(&pk_b, &scaled, &own);
        assert!(matches!(
            Paillier.decrypt(&sk_b, &again),
            Err(HeError::Decryption(_))
        ));
    }

    #[test]
    fn test_scalar_mul_under_other_key_fails_to_decrypt() {
        let (pk_a, _) = Paillier.keygen(TEST_BITS).unwrap();
        let (pk_b, sk_b) = Paillier.keygen(TEST_BITS).unwrap();
        let c = Paillier.encrypt(&pk_a, &big(4)).unwrap();
        let scaled = Paillier.scalar_mul(&pk_b, &c, &big(2));
        assert!(matches!(
            Paillier.decrypt(&sk_b, &scaled),
            Err(HeError::Decryption(_))
        ));
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let (_, sk) = Paillier.keygen(TEST_BITS).unwrap();
        let debug = format!("{:?}", sk);
        assert!(!debug.contains("lambda"));
        assert!(!debug.contains("mu"));
    }
}
