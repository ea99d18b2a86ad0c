use std::time::Duration;

use async_trait::async_trait;

use crate::{
    AccountAddress, CallPayload, ChainResult, FunctionId, GasEstimate, InclusionResult,
    RawTransaction, SignedTransaction, SignerIdentity, TxHash, TypeTag,
};

/// Everything the submission pipeline and the query layer need from a chain.
///
/// Implementations own transport, retries of individual HTTP requests and
/// response parsing. They never retry a whole submission.
#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Fetch sender state and chain id and produce an unsigned transaction with
    /// default gas parameters.
    async fn build(&self, sender: AccountAddress, payload: &CallPayload)
        -> ChainResult<RawTransaction>;

    /// Dry-run the transaction and estimate gas. Best effort.
    async fn simulate(
        &self,
        txn: &RawTransaction,
        signer: &SignerIdentity,
    ) -> ChainResult<GasEstimate>;

    async fn sign(&self, signer: &SignerIdentity, txn: RawTransaction)
        -> ChainResult<SignedTransaction>;

    async fn submit(&self, txn: &SignedTransaction) -> ChainResult<TxHash>;

    /// Poll until the transaction is executed or `timeout` elapses.
    async fn wait_for_inclusion(&self, hash: &TxHash, timeout: Duration)
        -> ChainResult<InclusionResult>;

    /// Call a read-only view function. Arguments and results are JSON as the
    /// node's view endpoint expects them.
    async fn view(
        &self,
        function: &FunctionId,
        type_args: &[TypeTag],
        args: Vec<serde_json::Value>,
    ) -> ChainResult<Vec<serde_json::Value>>;

    /// Link to a block explorer page for `hash`, if the chain has one.
    fn explorer_url(&self, _hash: &TxHash) -> Option<String> {
        None
    }
}
