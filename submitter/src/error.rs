use std::time::Duration;

use vetapp_core::{ChainCommunicationError, TxHash};

/// Why a submission ended without a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionFailure {
    #[error("failed to build transaction: {0}")]
    BuildError(String),
    #[error("user rejected the signature request")]
    UserRejected,
    #[error("failed to sign transaction: {0}")]
    SignError(String),
    #[error("transaction rejected before execution: {0}")]
    SubmitRejected(String),
    /// The transaction may still land; `hash` identifies it.
    #[error("transaction {hash} not confirmed within {timeout:?}")]
    InclusionTimeout { hash: TxHash, timeout: Duration },
    #[error("transaction {hash} failed on chain: {vm_status}")]
    ExecutionFailed {
        hash: TxHash,
        abort_code: Option<u64>,
        vm_status: String,
    },
}

impl SubmissionFailure {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmissionFailure::BuildError(_) => "build_error",
            SubmissionFailure::UserRejected => "user_rejected",
            SubmissionFailure::SignError(_) => "sign_error",
            SubmissionFailure::SubmitRejected(_) => "submit_rejected",
            SubmissionFailure::InclusionTimeout { .. } => "inclusion_timeout",
            SubmissionFailure::ExecutionFailed { .. } => "execution_failed",
        }
    }

    pub(crate) fn at_build(err: ChainCommunicationError) -> Self {
        match err {
            ChainCommunicationError::UserRejected => Self::UserRejected,
            other => Self::BuildError(other.to_string()),
        }
    }

    pub(crate) fn at_sign(err: ChainCommunicationError) -> Self {
        match err {
            ChainCommunicationError::UserRejected => Self::UserRejected,
            other => Self::SignError(other.to_string()),
        }
    }

    pub(crate) fn at_submit(err: ChainCommunicationError) -> Self {
        match err {
            ChainCommunicationError::UserRejected => Self::UserRejected,
            other => Self::SubmitRejected(other.to_string()),
        }
    }

    /// Any failure while waiting leaves the outcome unknown, so it is reported
    /// as a timeout carrying the hash.
    pub(crate) fn at_inclusion(hash: TxHash, timeout: Duration) -> Self {
        Self::InclusionTimeout { hash, timeout }
    }
}
