use async_trait::async_trait;
use mockall::mock;
use vetapp_core::{CallPayload, SignerIdentity, TxHash};
use vetapp_submitter::{SubmissionFailure, SubmitsTransactions};

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
