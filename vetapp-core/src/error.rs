use std::{error::Error as StdError, fmt::Display, time::Duration};

use crate::{CodecError, TxHash};

/// Errors from talking to a chain through a [`ChainGateway`](crate::ChainGateway).
///
/// Variants map one to one onto the stage that failed so callers can branch on
/// the kind without parsing messages.
#[derive(Debug, thiserror::Error)]
pub enum ChainCommunicationError {
    /// The payload is malformed or the node could not supply sender state.
    #[error("failed to build transaction: {0}")]
    BuildError(String),
    /// Simulation failed. Callers treat this as a warning.
    #[error("simulation failed: {0}")]
    SimulationFailed(String),
    /// The wallet user cancelled the signature request.
    #[error("user rejected the signature request")]
    UserRejected,
    #[error("failed to sign transaction: {0}")]
    SignError(String),
    /// The node refused the transaction before execution.
    #[error("transaction rejected: {0}")]
    SubmitRejected(String),
    #[error("transaction {hash} was not executed within {timeout:?}")]
    InclusionTimeout { hash: TxHash, timeout: Duration },
    #[error("view call {function} failed: {reason}")]
    ViewCallFailed { function: String, reason: String },
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Anything else, typically a transport error.
    #[error("{0}")]
    Other(Box<dyn StdError + Send + Sync>),
}

impl ChainCommunicationError {
    pub fn from_other<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::Other(Box::new(err))
    }

    pub fn from_other_str(err: impl Display) -> Self {
        Self::Other(err.to_string().into())
    }

    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected)
    }
}

pub type ChainResult<T> = Result<T, ChainCommunicationError>;
