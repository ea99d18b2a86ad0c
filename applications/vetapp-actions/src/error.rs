use vetapp_core::{ChainCommunicationError, CodecError, ContractAccount};
use vetapp_submitter::SubmissionFailure;

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field}: {source}")]
    InvalidAddress {
        field: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("{field}: {value:?} is not a whole number that fits in u64")]
    InvalidAmount { field: &'static str, value: String },
    #[error("{field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
    #[error("{0} address not configured")]
    ConfigMissing(ContractAccount),
    #[error("{0} is already submitting")]
    InFlight(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Submission(#[from] SubmissionFailure),
    #[error(transparent)]
    Query(#[from] ChainCommunicationError),
    #[error("unexpected result from {function}: {reason}")]
    UnexpectedViewResult { function: String, reason: String },
}

impl ActionError {
    /// Errors caught before anything was sent to the chain.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ActionError::Missing { .. }
                | ActionError::InvalidAddress { .. }
                | ActionError::InvalidAmount { .. }
                | ActionError::InvalidInput { .. }
                | ActionError::ConfigMissing(_)
                | ActionError::InFlight(_)
                | ActionError::Codec(_)
        )
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, ActionError::Submission(SubmissionFailure::UserRejected))
    }
}
