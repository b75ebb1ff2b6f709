//! Single-database PIR example.
//!
//! The client asks for one entry with an encrypted one-hot vector; the server
//! answers without learning which entry was selected.
//!
//! Run with:
//! ```bash
//! cargo run --bin pir_query -- --index 2 120 250 300 450 500
//! ```

use clap::Parser;
use he_queries::{answer, decode, AdditiveHomomorphic, Paillier, PirQuery};
use num_bigint::BigUint;

#[derive(Debug, Parser)]
#[command(about = "Fetch one database entry privately")]
struct Args {
    /// Position to fetch
    #[arg(long)]
    index: usize,

    /// Database entries
    #[arg(required = true)]
    database: Vec<u64>,

    /// Paillier modulus size in bits
    #[arg(long, default_value_t = 2048)]
    bits: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    psi_demos::init_tracing();
    let args = Args::parse();
    let database: Vec<BigUint> = args.database.iter().map(|v| BigUint::from(*v)).collect();

    // client
    println!("Generating a {}-bit Paillier key pair...", args.bits);
    let (pk, sk) = Paillier.keygen(args.bits)?;
    let query = PirQuery::build(&Paillier, &pk, database.len(), args.index)?;
    println!("Client built a {}-entry encrypted query", query.len());

    // server
    let reply = answer(&Paillier, &pk, &query, &database)?;

    // client
    let value = decode(&Paillier, &sk, &reply)?;
    println!("Entry {}: {}", args.index, value);
    println!(
        "Verification: {}",
        if value == database[args.index] { "PASSED" } else { "FAILED" }
    );
    Ok(())
}
