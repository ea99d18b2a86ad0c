use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use vetapp_core::{
    AccountAddress, CallPayload, ChainGateway, ChainResult, FunctionId, GasEstimate,
    InclusionResult, RawTransaction, SignedTransaction, SignerIdentity, TxHash, TypeTag,
};
use vetapp_submitter::{SubmissionFailure, SubmitsTransactions};

mock! {
    pub Gateway {}

    #[async_trait]
    impl ChainGateway for Gateway {
        async fn build(&self, sender: AccountAddress, payload: &CallPayload) -> ChainResult<RawTransaction>;
        async fn simulate(&self, txn: &RawTransaction, signer: &SignerIdentity) -> ChainResult<GasEstimate>;
        async fn sign(&self, signer: &SignerIdentity, txn: RawTransaction) -> ChainResult<SignedTransaction>;
        async fn submit(&self, txn: &SignedTransaction) -> ChainResult<TxHash>;
        async fn wait_for_inclusion(&self, hash: &TxHash, timeout: Duration) -> ChainResult<InclusionResult>;
        async fn view(&self, function: &FunctionId, type_args: &[TypeTag], args: Vec<serde_json::Value>) -> ChainResult<Vec<serde_json::Value>>;
        fn explorer_url(&self, hash: &TxHash) -> Option<String>;
    }
}

mock! {
    pub Submitter {}

    #[async_trait]
    impl SubmitsTransactions for Submitter {
        async fn submit(
            &self,
            payload: CallPayload,
            signer: &SignerIdentity,
        ) -> Result<TxHash, SubmissionFailure>;
    }
}
