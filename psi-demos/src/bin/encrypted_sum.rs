//! Encrypted sum example.
//!
//! Each value is encrypted on its own, the ciphertexts are added, and only
//! the total is decrypted.
//!
//! Run with:
//! ```bash
//! cargo run --bin encrypted_sum -- 120 250 300
//! ```

use clap::Parser;
use he_queries::{AdditiveHomomorphic, EncryptedSum, Paillier};
use num_bigint::BigUint;

#[derive(Debug, Parser)]
#[command(about = "Sum values under Paillier encryption")]
struct Args {
    /// Values to add
    #[arg(required = true)]
    values: Vec<u64>,

    /// Paillier modulus size in bits
    #[arg(long, default_value_t = 2048)]
    bits: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    psi_demos::init_tracing();
    let args = Args::parse();

    println!("Generating a {}-bit Paillier key pair...", args.bits);
    let (pk, sk) = Paillier.keygen(args.bits)?;

    let mut sum = EncryptedSum::new(&Paillier, &pk)?;
    for value in &args.values {
        let c = Paillier.encrypt(&pk, &BigUint::from(*value))?;
        sum.absorb(&c);
    }
    println!("Aggregated {} ciphertexts", sum.count());

    let total = Paillier.decrypt(&sk, &sum.finish())?;
    let plain: u128 = args.values.iter().map(|v| u128::from(*v)).sum();
    println!("Decrypted sum: {}", total);
    println!("Plaintext sum: {}", plain);
    println!(
        "Verification: {}",
        if total == BigUint::from(plain) { "PASSED" } else { "FAILED" }
    );
    Ok(())
}
