//! Protocol state management for PSI.
//!
//! A party moves through `Party` -> `BlindedParty` -> `ReblindedParty`, each
//! transition consuming the previous state. The secret travels with the state
//! and is dropped with it, so it cannot be carried into another run.

use crate::crypto::{blind, generate_secret, reblind, Identifier, PartySecret};
use crate::error::{PsiError, Result};
use crate::group::GroupParameters;
use crate::messages::{
    BlindedValue, BlindedValuesMessage, IntersectionResult, ReblindedValuesMessage,
};
use std::collections::HashSet;
use std::fmt;

/// Which side of the exchange a party plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Sends its blinded list first.
    Initiator,
    /// Answers the initiator's blinded list.
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => f.write_str("initiator"),
            Role::Responder => f.write_str("responder"),
        }
    }
}

/// One side of the PSI protocol before round 1.
///
/// Each peer creates its own `Party` with a fresh secret for every run.
#[derive(Debug)]
pub struct Party {
    role: Role,
    secret: PartySecret,
    identifiers: Vec<Identifier>,
    params: GroupParameters,
}

impl Party {
    /// Create a party with a fresh random secret.
    ///
    /// # Errors
    /// Returns `PsiError::Randomness` if no secure randomness is available.
    pub fn new(role: Role, identifiers: Vec<Identifier>, params: GroupParameters) -> Result<Self> {
        let secret = generate_secret(&params)?;
        Ok(Self {
            role,
            secret,
            identifiers,
            params,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_secret(
        role: Role,
        identifiers: Vec<Identifier>,
        params: GroupParameters,
        secret: PartySecret,
    ) -> Self {
        Self {
            role,
            secret,
            identifiers,
            params,
        }
    }

    /// This party's role in the run.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The identifiers this party holds, in input order.
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Round 1: blind the local identifiers with the local secret.
    ///
    /// # Returns
    /// The next state and the message that goes to the peer
    pub fn blind(self) -> (BlindedParty, BlindedValuesMessage) {
        let values = blind(&self.identifiers, &self.secret, &self.params);
        tracing::debug!(role = %self.role, count = values.len(), "round 1 blinded");
        let message = BlindedValuesMessage::new(values);
        (BlindedParty { inner: self }, message)
    }
}

/// A party whose own list has been blinded and sent.
#[derive(Debug)]
pub struct BlindedParty {
    inner: Party,
}

impl BlindedParty {
    /// This party's role in the run.
    pub fn role(&self) -> Role {
        self.inner.role
    }

    /// Round 2: raise the peer's blinded list to the local secret.
    ///
    /// Returns the next state, which keeps the doubly blinded peer values as
    /// its match set, and the reply that carries the same values back to the
    /// peer in its original order.
    ///
    /// # Errors
    /// Returns `PsiError::InvalidBlindedValue` if the peer sent a value
    /// outside the group.
    pub fn reblind(
        self,
        peer: BlindedValuesMessage,
    ) -> Result<(ReblindedParty, ReblindedValuesMessage)> {
        let Party {
            role,
            secret,
            identifiers,
            params,
        } = self.inner;
        let doubled = reblind(&peer.values, &secret, &params)?;
        tracing::debug!(role = %role, count = doubled.len(), "round 2 re-blinded peer values");

        let peer_set: HashSet<BlindedValue> = doubled.iter().cloned().collect();
        let state = ReblindedParty {
            role,
            identifiers,
            peer_set,
        };
        drop(secret);
        Ok((state, ReblindedValuesMessage::new(doubled)))
    }
}

/// A party holding the peer's doubly blinded values and awaiting its own.
///
/// The secret is gone by this point; only matching remains.
#[derive(Debug)]
pub struct ReblindedParty {
    role: Role,
    identifiers: Vec<Identifier>,
    peer_set: HashSet<BlindedValue>,
}

impl ReblindedParty {
    /// This party's role in the run.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Match the local list against the peer's doubly blinded values.
    ///
    /// `own` is this party's round-1 list after the peer re-blinded it. It is
    /// walked in local list order and every identifier whose doubly blinded
    /// value appears in the peer set is reported.
    ///
    /// # Errors
    /// Returns `PsiError::LengthMismatch` if `own` does not have one value per
    /// local identifier.
    pub fn finalize(self, own: ReblindedValuesMessage) -> Result<IntersectionResult> {
        if own.len() != self.identifiers.len() {
            return Err(PsiError::LengthMismatch {
                expected: self.identifiers.len(),
                actual: own.len(),
            });
        }
        let found: HashSet<Identifier> = self
            .identifiers
            .into_iter()
            .zip(own.values)
            .filter(|(_, value)| self.peer_set.contains(value))
            .map(|(id, _)| id)
            .collect();
        tracing::debug!(role = %self.role, matched = found.len(), "intersection matched");
        Ok(IntersectionResult::new(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    fn ids(items: &[&str]) -> Vec<Identifier> {
        items.iter().map(|s| Identifier::from(*s)).collect()
    }

    #[test]
    fn test_party_new() {
        let party = Party::new(Role::Initiator, ids(&["a"]), GroupParameters::demo()).unwrap();
        assert_eq!(party.role(), Role::Initiator);
        assert_eq!(party.identifiers(), &ids(&["a"])[..]);
    }

    #[test]
    fn test_party_debug_hides_secret() {
        let party = Party::with_secret(
            Role::Responder,
            ids(&["a"]),
            GroupParameters::demo(),
            PartySecret::from_value(BigUint::from(31337u32)),
        );
        let debug = format!("{:?}", party);
        assert!(debug.contains("PartySecret(..)"));
        assert!(!debug.contains("31337"));
    }

    #[test]
    fn test_blind_message_length() {
        let party = Party::new(Role::Initiator, ids(&["a", "b", "c"]), GroupParameters::demo())
            .unwrap();
        let (state, msg) = party.blind();
        assert_eq!(msg.len(), 3);
        assert_eq!(state.role(), Role::Initiator);
    }

    #[test]
    fn test_two_party_flow() {
        let params = GroupParameters::demo();
        let alice = Party::new(Role::Initiator, ids(&["apple", "banana", "cherry"]), params.clone())
            .unwrap();
        let bob = Party::new(Role::Responder, ids(&["banana", "date"]), params).unwrap();

        let (alice, alice_msg) = alice.blind();
        let (bob, bob_msg) = bob.blind();

        let (alice, alice_echo) = alice.reblind(bob_msg).unwrap();
        let (bob, bob_echo) = bob.reblind(alice_msg).unwrap();

        // each side finalizes with its own list as re-blinded by the peer
        let alice_result = alice.finalize(bob_echo).unwrap();
        let bob_result = bob.finalize(alice_echo).unwrap();

        assert_eq!(alice_result.len(), 1);
        assert!(alice_result.contains(&Identifier::from("banana")));
        assert_eq!(alice_result, bob_result);
    }

    #[test]
    fn test_finalize_length_mismatch() {
        let params = GroupParameters::demo();
        let alice = Party::new(Role::Initiator, ids(&["a", "b"]), params.clone()).unwrap();
        let bob = Party::new(Role::Responder, ids(&["a"]), params).unwrap();

        let (alice, _) = alice.blind();
        let (_, bob_msg) = bob.blind();
        let (alice, echo) = alice.reblind(bob_msg).unwrap();

        // echo answers bob's single-item list, not alice's two
        let result = alice.finalize(echo);
        assert_eq!(
            result,
            Err(PsiError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_reblind_rejects_invalid_peer_values() {
        let params = GroupParameters::demo();
        let alice = Party::new(Role::Initiator, ids(&["a"]), params.clone()).unwrap();
        let (alice, _) = alice.blind();
        let forged = BlindedValuesMessage::new(vec![BlindedValue::new(params.modulus() + 1u32)]);
        assert!(matches!(
            alice.reblind(forged),
            Err(PsiError::InvalidBlindedValue { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_lists() {
        let params = GroupParameters::demo();
        let alice = Party::new(Role::Initiator, vec![], params.clone()).unwrap();
        let bob = Party::new(Role::Responder, ids(&["a"]), params).unwrap();

        let (alice, alice_msg) = alice.blind();
        let (bob, bob_msg) = bob.blind();
        let (alice, _) = alice.reblind(bob_msg).unwrap();
        let (_, bob_echo) = bob.reblind(alice_msg).unwrap();

        assert!(alice.finalize(bob_echo).unwrap().is_empty());
    }
}
