//! Message types exchanged between PSI protocol peers.

use crate::crypto::Identifier;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A blinded group element, an integer in `[0, P)`.
///
/// Serializes as a lowercase hex string of its big-endian bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BlindedValue(BigUint);

impl BlindedValue {
    /// Wrap a group element.
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// The underlying group element.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }
}

impl From<BlindedValue> for String {
    fn from(value: BlindedValue) -> Self {
        hex::encode(value.0.to_bytes_be())
    }
}

impl TryFrom<String> for BlindedValue {
    type Error = hex::FromHexError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let bytes = hex::decode(s)?;
        Ok(Self(BigUint::from_bytes_be(&bytes)))
    }
}

/// Round-1 message: the sender's own identifiers, blinded with its secret.
///
/// Values are in the sender's list order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlindedValuesMessage {
    pub values: Vec<BlindedValue>,
}

impl BlindedValuesMessage {
    /// Create a new blinded values message.
    ///
    /// # Arguments
    /// * `values` - Blinded values in the sender's list order
    pub fn new(values: Vec<BlindedValue>) -> Self {
        Self { values }
    }

    /// Returns the number of values in this message.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this message contains no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Round-2 message: a received `BlindedValuesMessage` raised to the
/// receiver's secret, returned to its original sender in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReblindedValuesMessage {
    pub values: Vec<BlindedValue>,
}

impl ReblindedValuesMessage {
    /// Create a reblinded values message.
    ///
    /// # Arguments
    /// * `values` - Doubly blinded values, in the order they were received
    pub fn new(values: Vec<BlindedValue>) -> Self {
        Self { values }
    }

    /// Number of values in the message.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Any message crossing the exchange boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PsiMessage {
    Blinded(BlindedValuesMessage),
    Reblinded(ReblindedValuesMessage),
}

impl PsiMessage {
    /// Short name of the message kind, for error reporting.
    pub fn kind(&self) -> &'static str {
        match self {
            PsiMessage::Blinded(_) => "blinded",
            PsiMessage::Reblinded(_) => "reblinded",
        }
    }
}

impl From<BlindedValuesMessage> for PsiMessage {
    fn from(msg: BlindedValuesMessage) -> Self {
        PsiMessage::Blinded(msg)
    }
}

impl From<ReblindedValuesMessage> for PsiMessage {
    fn from(msg: ReblindedValuesMessage) -> Self {
        PsiMessage::Reblinded(msg)
    }
}

/// Final result of the PSI protocol: the identifiers found in both lists.
///
/// Built fresh for every run. Order is not significant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntersectionResult {
    identifiers: HashSet<Identifier>,
}

impl IntersectionResult {
    pub fn new(identifiers: HashSet<Identifier>) -> Self {
        Self { identifiers }
    }

    /// Returns the number of identifiers in the intersection.
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// Returns true if the intersection is empty.
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.identifiers.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.identifiers.iter()
    }

    /// Consume the result, yielding the identifiers as plain strings.
    pub fn into_strings(self) -> HashSet<String> {
        self.identifiers
            .into_iter()
            .map(Identifier::into_string)
            .collect()
    }
}
