//! Core protocol logic for PSI.
//!
//! Message flow, with `A` the initiator's list and `B` the responder's:
//!
//! ```text
//! initiator                              responder
//!   Blinded(A^a)            ------>
//!                           <------      Blinded(B^b)
//!                           <------      Reblinded(A^ab)
//!   Reblinded(B^ab)         ------>      (mutual disclosure only)
//! ```
//!
//! The initiator matches `A^ab` against its own `B^ab`. Under mutual
//! disclosure the responder does the same with the roles swapped.

use crate::config::ProtocolConfig;
use crate::crypto::Identifier;
use crate::error::{PsiError, Result};
use crate::group::GroupParameters;
use crate::messages::{
    BlindedValuesMessage, IntersectionResult, PsiMessage, ReblindedValuesMessage,
};
use crate::state::{Party, Role};
use crate::transport::{MemoryTransport, Transport};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::thread;

/// Which parties learn the intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disclosure {
    /// Only the initiator learns the intersection.
    #[default]
    Unilateral,
    /// Both parties learn the intersection.
    Mutual,
}

/// Results of a run driven locally for both parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// What the initiator learned.
    pub initiator: IntersectionResult,
    /// What the responder learned, `None` under unilateral disclosure.
    pub responder: Option<IntersectionResult>,
}

fn expect_blinded(message: PsiMessage) -> Result<BlindedValuesMessage> {
    match message {
        PsiMessage::Blinded(m) => Ok(m),
        other => Err(PsiError::UnexpectedMessage {
            expected: "blinded",
            actual: other.kind(),
        }),
    }
}

fn expect_reblinded(message: PsiMessage) -> Result<ReblindedValuesMessage> {
    match message {
        PsiMessage::Reblinded(m) => Ok(m),
        other => Err(PsiError::UnexpectedMessage {
            expected: "reblinded",
            actual: other.kind(),
        }),
    }
}

/// Run the initiator's side of one protocol run over `transport`.
///
/// # Errors
/// Any failure aborts the run. Nothing partial is returned and the secret is
/// dropped with the state.
pub fn run_initiator<T: Transport>(
    identifiers: Vec<Identifier>,
    params: &GroupParameters,
    config: &ProtocolConfig,
    mut transport: T,
) -> Result<IntersectionResult> {
    let span = tracing::info_span!("psi_run", role = %Role::Initiator, items = identifiers.len());
    let _guard = span.enter();

    let party = Party::new(Role::Initiator, identifiers, params.clone())?;
    let (party, own_blinded) = party.blind();
    transport.send(own_blinded.into())?;

    let peer_blinded = expect_blinded(transport.recv()?)?;
    let (party, peer_echo) = party.reblind(peer_blinded)?;

    let own_echo = expect_reblinded(transport.recv()?)?;
    if config.disclosure == Disclosure::Mutual {
        transport.send(peer_echo.into())?;
    }

    let result = party.finalize(own_echo)?;
    tracing::info!(matched = result.len(), "intersection computed");
    Ok(result)
}

/// Run the responder's side of one protocol run over `transport`.
///
/// Returns `Some` only under mutual disclosure.
pub fn run_responder<T: Transport>(
    identifiers: Vec<Identifier>,
    params: &GroupParameters,
    config: &ProtocolConfig,
    mut transport: T,
) -> Result<Option<IntersectionResult>> {
    let span = tracing::info_span!("psi_run", role = %Role::Responder, items = identifiers.len());
    let _guard = span.enter();

    let party = Party::new(Role::Responder, identifiers, params.clone())?;
    let peer_blinded = expect_blinded(transport.recv()?)?;

    let (party, own_blinded) = party.blind();
    transport.send(own_blinded.into())?;

    let (party, peer_echo) = party.reblind(peer_blinded)?;
    transport.send(peer_echo.into())?;

    match config.disclosure {
        Disclosure::Unilateral => {
            tracing::info!("run complete; intersection disclosed to initiator only");
            Ok(None)
        }
        Disclosure::Mutual => {
            let own_echo = expect_reblinded(transport.recv()?)?;
            let result = party.finalize(own_echo)?;
            tracing::info!(matched = result.len(), "intersection computed");
            Ok(Some(result))
        }
    }
}

/// Drive both parties in this process, each on its own thread.
pub fn intersect_with(
    list_a: Vec<Identifier>,
    list_b: Vec<Identifier>,
    params: &GroupParameters,
    config: &ProtocolConfig,
) -> Result<RunOutcome> {
    let (a_end, b_end) = MemoryTransport::pair();
    let a_end = a_end.with_timeout(config.exchange_timeout);
    let b_end = b_end.with_timeout(config.exchange_timeout);

    thread::scope(|s| -> Result<RunOutcome> {
        let responder = s.spawn(move || run_responder(list_b, params, config, b_end));
        let initiator = run_initiator(list_a, params, config, a_end);
        let responder = responder
            .join()
            .map_err(|_| PsiError::Exchange("responder thread panicked".to_string()))?;
        combine_outcomes(initiator, responder)
    })
}

/// Merge both sides' results, reporting the root cause of a failed run.
///
/// A failing responder drops its channel, so the initiator usually fails
/// with `Exchange` too. The responder's error is reported in that case.
fn combine_outcomes(
    initiator: Result<IntersectionResult>,
    responder: Result<Option<IntersectionResult>>,
) -> Result<RunOutcome> {
    match (initiator, responder) {
        (Ok(initiator), Ok(responder)) => Ok(RunOutcome {
            initiator,
            responder,
        }),
        (Err(PsiError::Exchange(_)), Err(cause)) => Err(cause),
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

/// Compute the intersection of `list_a` and `list_b`.
///
/// Runs the protocol with unilateral disclosure and returns what the side
/// holding `list_a` learns. Duplicates in either list are tolerated and the
/// result is a set. Empty lists yield an empty result.
///
/// # Arguments
/// * `list_a` - Identifiers held by the initiator
/// * `list_b` - Identifiers held by the responder
/// * `params` - Shared group parameters
///
/// # Returns
/// The identifiers present in both lists
///
/// # Errors
/// Fails if secret generation, blinding or the exchange fails. There are no
/// retries.
pub fn intersect<S: AsRef<str>>(
    list_a: &[S],
    list_b: &[S],
    params: &GroupParameters,
) -> Result<HashSet<String>> {
    let to_ids = |list: &[S]| -> Vec<Identifier> {
        list.iter().map(|s| Identifier::from(s.as_ref())).collect()
    };
    let outcome = intersect_with(
        to_ids(list_a),
        to_ids(list_b),
        params,
        &ProtocolConfig::default(),
    )?;
    Ok(outcome.initiator.into_strings())
}
