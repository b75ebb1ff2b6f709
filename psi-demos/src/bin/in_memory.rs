//! In-memory example of PSI protocol execution.
//!
//! Both parties run in this process on separate threads, exchanging messages
//! over an in-memory channel.
//!
//! Run with:
//! ```bash
//! cargo run --bin in_memory
//! RUST_LOG=debug cargo run --bin in_memory -- --group modp-2048
//! ```

use clap::{Parser, ValueEnum};
use modp_psi::{
    intersect, intersect_with, Disclosure, GroupParameters, Identifier, ProtocolConfig,
};
use rand::seq::SliceRandom;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GroupChoice {
    Demo,
    #[value(name = "modp-2048")]
    Modp2048,
}

#[derive(Debug, Parser)]
#[command(about = "Run the PSI protocol between two in-process parties")]
struct Args {
    /// Group to blind in
    #[arg(long, value_enum, default_value = "demo")]
    group: GroupChoice,

    /// Let the responder learn the intersection too
    #[arg(long)]
    mutual: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    psi_demos::init_tracing();
    let args = Args::parse();

    let params = match args.group {
        GroupChoice::Demo => GroupParameters::demo(),
        GroupChoice::Modp2048 => GroupParameters::modp_2048(),
    };
    params.validate()?;

    println!("=== PSI Protocol In-Memory Example ===\n");

    let passengers = ["ID001", "ID002", "ID003", "ID004"];
    let watchlist = ["ID003", "ID005", "ID001"];
    println!("Initiator's identifiers: {:?}", passengers);
    println!("Responder's identifiers: {:?}", watchlist);

    let common = intersect(&passengers, &watchlist, &params)?;
    let mut sorted: Vec<_> = common.iter().collect();
    sorted.sort();
    println!("Intersection: {:?}", sorted);

    // === Larger run: 20 sampled from A plus 30 outsiders, shuffled ===
    println!("\n=== Sampled Subset Example ===\n");

    let mut rng = rand::thread_rng();
    let list_a: Vec<Identifier> = (0..50)
        .map(|i| Identifier::from(format!("passenger-{:03}", i)))
        .collect();
    let sampled: Vec<Identifier> = list_a.choose_multiple(&mut rng, 20).cloned().collect();
    let mut list_b = sampled.clone();
    list_b.extend((0..30).map(|i| Identifier::from(format!("outsider-{:03}", i))));
    list_b.shuffle(&mut rng);

    let config = ProtocolConfig {
        disclosure: if args.mutual {
            Disclosure::Mutual
        } else {
            Disclosure::Unilateral
        },
        ..ProtocolConfig::default()
    };
    println!("A: {} identifiers, B: {} identifiers", list_a.len(), list_b.len());

    let outcome = intersect_with(list_a, list_b, &params, &config)?;
    let expected: HashSet<Identifier> = sampled.into_iter().collect();
    let found: HashSet<Identifier> = outcome.initiator.iter().cloned().collect();

    println!("Initiator found {} common identifiers (expected 20)", found.len());
    match &outcome.responder {
        Some(result) => println!("Responder found {} common identifiers", result.len()),
        None => println!("Responder learned nothing (unilateral disclosure)"),
    }
    println!(
        "Verification: {}",
        if found == expected { "PASSED" } else { "FAILED" }
    );

    Ok(())
}
