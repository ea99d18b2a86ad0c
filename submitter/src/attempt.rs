use std::fmt;

use vetapp_core::{
    AccountAddress, CallPayload, GasEstimate, InclusionResult, SignerIdentity, SignerKind, TxHash,
};

use crate::SubmissionFailure;

/// Stage of a single submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Building,
    Simulated,
    Signed,
    Submitted,
    Confirmed,
    Failed(SubmissionFailure),
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Confirmed | SubmissionState::Failed(_))
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Building => f.write_str("building"),
            SubmissionState::Simulated => f.write_str("simulated"),
            SubmissionState::Signed => f.write_str("signed"),
            SubmissionState::Submitted => f.write_str("submitted"),
            SubmissionState::Confirmed => f.write_str("confirmed"),
            SubmissionState::Failed(failure) => write!(f, "failed({})", failure.kind()),
        }
    }
}

/// Simulation failed; the transaction went out with default gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulateWarning(pub String);

/// Record of one call to the submitter. Never persisted.
#[derive(Debug, Clone)]
pub struct SubmissionAttempt {
    pub payload: CallPayload,
    pub signer_kind: SignerKind,
    pub signer_address: AccountAddress,
    /// Every state visited, in order, starting with `Building`.
    pub states: Vec<SubmissionState>,
    pub estimate: Option<GasEstimate>,
    pub simulate_warning: Option<SimulateWarning>,
    pub hash: Option<TxHash>,
    pub result: Option<Result<InclusionResult, SubmissionFailure>>,
}

impl SubmissionAttempt {
    pub(crate) fn new(payload: CallPayload, signer: &SignerIdentity) -> Self {
        Self {
            payload,
            signer_kind: signer.kind(),
            signer_address: signer.address(),
            states: vec![SubmissionState::Building],
            estimate: None,
            simulate_warning: None,
            hash: None,
            result: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        self.states.last().unwrap_or(&SubmissionState::Building)
    }

    pub(crate) fn transition(&mut self, next: SubmissionState) {
        debug_assert!(!self.state().is_terminal(), "attempt already finished");
        self.states.push(next);
    }

    /// Collapse into the hash of the confirmed transaction or the failure.
    pub fn into_result(self) -> Result<TxHash, SubmissionFailure> {
        match self.result {
            Some(Ok(inclusion)) => Ok(inclusion.hash),
            Some(Err(failure)) => Err(failure),
            None => Err(SubmissionFailure::BuildError(
                "submission did not run".to_owned(),
            )),
        }
    }
}
