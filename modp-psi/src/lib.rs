//! # Private Set Intersection over a prime-order group
//!
//! This library implements two-party Private Set Intersection (PSI) with
//! commutative Diffie-Hellman blinding by modular exponentiation. Each party
//! raises `G^H(x)` to its own secret; applying the peer's secret on top gives
//! `G^(a*b*H(x)) mod P` on both sides for every shared identifier `x`, while
//! values for non-shared identifiers stay unlinkable.
//!
//! ## Features
//!
//! - **Explicit parameters**: group parameters are validated values passed
//!   into every operation, never process-wide state.
//! - **Transport Agnostic**: the protocol talks to the peer through the
//!   [`Transport`] trait. An in-memory pair is included, and the message types
//!   derive serde so any wire format can carry them.
//! - **Type-State Pattern**: `Party -> BlindedParty -> ReblindedParty`, each
//!   step consuming the last, so a secret cannot be reused across runs.
//! - **Configurable disclosure**: unilateral (initiator only, the default) or
//!   mutual.
//!
//! ## Example Usage
//!
//! ```
//! use modp_psi::{intersect, GroupParameters};
//!
//! let passengers = ["ID001", "ID002", "ID003", "ID004"];
//! let watchlist = ["ID003", "ID005", "ID001"];
//!
//! let common = intersect(&passengers, &watchlist, &GroupParameters::demo())?;
//! assert_eq!(common.len(), 2);
//! assert!(common.contains("ID001") && common.contains("ID003"));
//! # Ok::<(), modp_psi::PsiError>(())
//! ```
//!
//! ## Security Considerations
//!
//! - Semi-honest model only. A malicious peer can deviate undetected.
//! - [`GroupParameters::demo`] is about 127 bits and is not secure. Use
//!   [`GroupParameters::modp_2048`] or a configured safe prime.
//! - Identifier hashes can collide. A collision produces a false-positive
//!   match that cannot be told apart from a real one.
//! - The exchange must run over an authenticated channel (e.g. TLS) in
//!   production.
//!
//! ## Modules
//!
//! - [`group`] - Group parameters and validation
//! - [`crypto`] - Identifier hashing, secrets, blinding
//! - [`state`] - Party states (type-state pattern)
//! - [`protocol`] - Two-party orchestration
//! - [`messages`] - Message types for protocol exchange
//! - [`transport`] - Exchange boundary
//! - [`config`] - TOML configuration
//! - [`primality`] - Primality testing and sampling
//! - [`error`] - Error types

pub use config::{ProtocolConfig, PsiConfig, DEFAULT_EXCHANGE_TIMEOUT};
pub use crypto::{
    blind, generate_secret, hash_identifier, identifiers_from_bytes, reblind, Exponent,
    Identifier, PartySecret,
};
pub use error::{PsiError, Result};
pub use group::GroupParameters;
pub use messages::{
    BlindedValue, BlindedValuesMessage, IntersectionResult, PsiMessage, ReblindedValuesMessage,
};
pub use protocol::{intersect, intersect_with, run_initiator, run_responder, Disclosure, RunOutcome};
pub use state::{BlindedParty, Party, ReblindedParty, Role};
pub use transport::{MemoryTransport, Transport};

pub mod config;
pub mod crypto;
pub mod error;
pub mod group;
pub mod messages;
pub mod primality;
pub mod protocol;
pub mod state;
pub mod transport;

/// Integration tests for the full PSI protocol.
#[cfg(test)]
mod integration_tests {
    use super::*;
    use num_bigint::BigUint;
    use proptest::prelude::*;
    use rand::rngs::OsRng;
    use rand::seq::SliceRandom;
    use std::collections::HashSet;

    fn generated_ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}-{:04}", prefix, i)).collect()
    }

    #[test]
    fn test_sampled_subset_recovered_for_any_shuffle() {
        let mut rng = OsRng;
        let list_a = generated_ids("passenger", 50);

        let sampled: Vec<String> = list_a.choose_multiple(&mut rng, 20).cloned().collect();
        let mut list_b = sampled.clone();
        list_b.extend(generated_ids("outsider", 30));

        let expected: HashSet<String> = sampled.into_iter().collect();
        for _ in 0..3 {
            list_b.shuffle(&mut rng);
            let result = intersect(&list_a, &list_b, &GroupParameters::demo()).unwrap();
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn test_hash_determinism_across_parameter_instances() {
        let id = Identifier::from("ID001");
        let first = GroupParameters::demo();
        let second = GroupParameters::from_hex("7fffffffffffffffffffffffffffffff", "5").unwrap();
        assert_eq!(hash_identifier(&id, &first), hash_identifier(&id, &second));
    }

    #[test]
    fn test_fresh_secrets_per_run() {
        // blinded values for the same list differ between runs
        let params = GroupParameters::demo();
        let ids = vec![Identifier::from("ID001")];
        let (_, first) = Party::new(Role::Initiator, ids.clone(), params.clone())
            .unwrap()
            .blind();
        let (_, second) = Party::new(Role::Initiator, ids, params).unwrap().blind();
        assert_ne!(first, second);
    }

    #[test]
    fn test_manual_exchange_over_json() {
        // serialize every message as a remote transport would
        fn wire(msg: PsiMessage) -> PsiMessage {
            let json = serde_json::to_string(&msg).unwrap();
            serde_json::from_str(&json).unwrap()
        }
        fn unwrap_blinded(msg: PsiMessage) -> BlindedValuesMessage {
            match msg {
                PsiMessage::Blinded(m) => m,
                other => panic!("unexpected {}", other.kind()),
            }
        }
        fn unwrap_reblinded(msg: PsiMessage) -> ReblindedValuesMessage {
            match msg {
                PsiMessage::Reblinded(m) => m,
                other => panic!("unexpected {}", other.kind()),
            }
        }

        let params = GroupParameters::demo();
        let alice = Party::new(
            Role::Initiator,
            vec!["apple".into(), "banana".into()],
            params.clone(),
        )
        .unwrap();
        let bob = Party::new(
            Role::Responder,
            vec!["banana".into(), "kiwi".into()],
            params,
        )
        .unwrap();

        let (alice, a1) = alice.blind();
        let (bob, b1) = bob.blind();
        let a1 = unwrap_blinded(wire(a1.into()));
        let b1 = unwrap_blinded(wire(b1.into()));

        let (alice, _) = alice.reblind(b1).unwrap();
        let (_, a2) = bob.reblind(a1).unwrap();
        let a2 = unwrap_reblinded(wire(a2.into()));

        let result = alice.finalize(a2).unwrap();
        assert_eq!(result.into_strings(), HashSet::from(["banana".to_string()]));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_blinding_commutes(
            a in 1u64..u64::MAX,
            b in 1u64..u64::MAX,
            id in "[A-Za-z0-9]{1,16}",
        ) {
            let params = GroupParameters::demo();
            let ids = vec![Identifier::from(id)];
            let a = PartySecret::from_value(BigUint::from(a));
            let b = PartySecret::from_value(BigUint::from(b));

            let ab = reblind(&blind(&ids, &a, &params), &b, &params).unwrap();
            let ba = reblind(&blind(&ids, &b, &params), &a, &params).unwrap();
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn test_intersection_matches_set_semantics(
            a in proptest::collection::hash_set("[a-z]{1,6}", 0..12),
            b in proptest::collection::hash_set("[a-z]{1,6}", 0..12),
        ) {
            let list_a: Vec<String> = a.iter().cloned().collect();
            let list_b: Vec<String> = b.iter().cloned().collect();
            let expected: HashSet<String> = a.intersection(&b).cloned().collect();
            let result = intersect(&list_a, &list_b, &GroupParameters::demo()).unwrap();
            prop_assert_eq!(result, expected);
        }

        #[test]
        fn test_order_and_duplicates_do_not_change_result(
            base in proptest::collection::vec("[a-d]{1,2}", 1..10),
            other in proptest::collection::vec("[a-d]{1,2}", 1..10),
        ) {
            let params = GroupParameters::demo();
            let expected = intersect(&base, &other, &params).unwrap();

            let mut shuffled = base.clone();
            shuffled.reverse();
            let mut doubled = other.clone();
            doubled.extend(other.iter().cloned());

            prop_assert_eq!(intersect(&shuffled, &doubled, &params).unwrap(), expected);
        }
    }
}
