//! Group parameters for modular-exponentiation blinding.

use crate::error::{PsiError, Result};
use crate::primality::is_probable_prime;
use num_bigint::BigUint;
use num_traits::One;
use rand::rngs::OsRng;

/// Moduli below this size are accepted but reported as undersized.
pub const RECOMMENDED_MODULUS_BITS: u64 = 2048;

/// RFC 3526 group 14 (2048-bit MODP) safe prime.
const MODP_2048_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

/// A prime modulus `P` and generator `G` shared by both parties.
///
/// Values are immutable once constructed. `new` and `from_hex` validate their
/// input. The `demo` and `modp_2048` presets are fixed constants and skip the
/// check; call [`GroupParameters::validate`] on them where the cost is
/// acceptable (configuration loading does).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParameters {
    modulus: BigUint,
    generator: BigUint,
}

impl GroupParameters {
    /// Build and validate group parameters.
    ///
    /// # Errors
    /// Returns `PsiError::InvalidGroup` if the modulus is not prime or the
    /// generator is outside `[2, P-1)`.
    pub fn new(modulus: BigUint, generator: BigUint) -> Result<Self> {
        let params = Self { modulus, generator };
        params.validate()?;
        Ok(params)
    }

    /// Build group parameters from hexadecimal strings.
    pub fn from_hex(modulus: &str, generator: &str) -> Result<Self> {
        let modulus = parse_hex(modulus, "modulus")?;
        let generator = parse_hex(generator, "generator")?;
        Self::new(modulus, generator)
    }

    /// Demonstration group: `P = 2^127 - 1`, `G = 5`.
    ///
    /// At about 127 bits this modulus is far too small for discrete log to be
    /// hard. Use it for tests and demos only.
    pub fn demo() -> Self {
        Self {
            modulus: (BigUint::one() << 127u32) - BigUint::one(),
            generator: BigUint::from(5u32),
        }
    }

    /// RFC 3526 2048-bit MODP group with generator 2.
    pub fn modp_2048() -> Self {
        Self {
            // constant is well-formed hex
            modulus: BigUint::parse_bytes(MODP_2048_HEX.as_bytes(), 16).unwrap_or_default(),
            generator: BigUint::from(2u32),
        }
    }

    /// Check that the modulus is prime and the generator is in `[2, P-1)`.
    ///
    /// An undersized modulus passes but is logged as a warning.
    pub fn validate(&self) -> Result<()> {
        if self.modulus < BigUint::from(5u32) {
            return Err(PsiError::InvalidGroup(
                "modulus must be at least 5".to_string(),
            ));
        }
        let prime = is_probable_prime(&self.modulus, &mut OsRng)
            .map_err(|e| PsiError::Randomness(e.to_string()))?;
        if !prime {
            return Err(PsiError::InvalidGroup("modulus is not prime".to_string()));
        }
        let upper = &self.modulus - BigUint::one();
        if self.generator < BigUint::from(2u32) || self.generator >= upper {
            return Err(PsiError::InvalidGroup(
                "generator must lie in [2, P-1)".to_string(),
            ));
        }
        if self.bits() < RECOMMENDED_MODULUS_BITS {
            tracing::warn!(
                bits = self.bits(),
                recommended = RECOMMENDED_MODULUS_BITS,
                "group modulus is undersized; discrete log may be feasible"
            );
        }
        Ok(())
    }

    /// The prime modulus `P`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// The generator `G`.
    pub fn generator(&self) -> &BigUint {
        &self.generator
    }

    /// Size of the modulus in bits.
    pub fn bits(&self) -> u64 {
        self.modulus.bits()
    }

    /// Whether `(P - 1) / 2` is also prime.
    pub fn is_safe_prime(&self) -> Result<bool> {
        let q = (&self.modulus - BigUint::one()) >> 1u32;
        is_probable_prime(&q, &mut OsRng).map_err(|e| PsiError::Randomness(e.to_string()))
    }

    /// `P - 1`, the order of the multiplicative group.
    pub(crate) fn group_order(&self) -> BigUint {
        &self.modulus - BigUint::one()
    }
}

fn parse_hex(s: &str, what: &str) -> Result<BigUint> {
    let trimmed = s.trim().trim_start_matches("0x");
    BigUint::parse_bytes(trimmed.as_bytes(), 16)
        .ok_or_else(|| PsiError::InvalidGroup(format!("{} is not valid hexadecimal", what)))
}
