//! Probabilistic primality testing and uniform sampling over `BigUint`.
//!
//! All randomness is drawn with `try_fill_bytes`, so a failing source is
//! reported to the caller instead of panicking.

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

/// Number of Miller-Rabin rounds with random bases.
///
/// The probability that a composite passes is at most 4^-40.
pub const MILLER_RABIN_ROUNDS: usize = 40;

const SMALL_PRIMES: [u32; 46] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199,
];

/// Sample a uniform integer in `[0, bound)` by rejection sampling.
///
/// `bound` must be non-zero.
pub fn sample_below<R: RngCore + ?Sized>(
    rng: &mut R,
    bound: &BigUint,
) -> Result<BigUint, rand::Error> {
    debug_assert!(!bound.is_zero(), "sampling bound must be non-zero");
    let bits = bound.bits();
    let len = ((bits + 7) / 8) as usize;
    let excess = (len as u64 * 8 - bits) as u32;
    let mut buf = vec![0u8; len];
    loop {
        rng.try_fill_bytes(&mut buf)?;
        if let Some(top) = buf.first_mut() {
            *top &= 0xffu8 >> excess;
        }
        let candidate = BigUint::from_bytes_be(&buf);
        if &candidate < bound {
            return Ok(candidate);
        }
    }
}

/// Sample a uniform integer in `[low, high)`.
///
/// Requires `low < high`.
pub fn sample_range<R: RngCore + ?Sized>(
    rng: &mut R,
    low: &BigUint,
    high: &BigUint,
) -> Result<BigUint, rand::Error> {
    debug_assert!(low < high, "empty sampling range");
    let width = high - low;
    Ok(low + sample_below(rng, &width)?)
}

/// Test `n` for primality: trial division, then Miller-Rabin.
///
/// # Errors
/// Returns the randomness source's error if a witness cannot be drawn.
pub fn is_probable_prime<R: CryptoRng + RngCore + ?Sized>(
    n: &BigUint,
    rng: &mut R,
) -> Result<bool, rand::Error> {
    let two = BigUint::from(2u32);
    if n < &two {
        return Ok(false);
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return Ok(true);
        }
        if (n % &p).is_zero() {
            return Ok(false);
        }
    }

    let one = BigUint::one();
    let n_minus_one = n - &one;
    // n is odd here, so n - 1 has at least one trailing zero
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = sample_range(rng, &two, &n_minus_one)?;
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return Ok(false);
    }
    Ok(true)
}

/// Generate a random prime with exactly `bits` bits and its top two bits set.
///
/// Setting both top bits guarantees that the product of two such primes has
/// exactly `2 * bits` bits.
pub fn random_prime<R: CryptoRng + RngCore + ?Sized>(
    bits: u64,
    rng: &mut R,
) -> Result<BigUint, rand::Error> {
    debug_assert!(bits >= 8, "prime size too small");
    let bound = BigUint::one() << bits;
    let top = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2));
    loop {
        let candidate = sample_below(rng, &bound)? | &top | BigUint::one();
        if is_probable_prime(&candidate, rng)? {
            return Ok(candidate);
        }
    }
}
