use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::{mock, predicate::eq};
use tracing_test::traced_test;
use vetapp_core::{
    AccountAddress, CallPayload, ChainCommunicationError, ChainGateway, ChainResult,
    EntryFunction, FunctionId, GasEstimate, HeldKeySigner, InclusionResult, RawTransaction,
    SignedTransaction, SignerIdentity, TransactionAuthenticator, TransactionPayload, TxHash,
    TypeTag,
};

use crate::{
    SubmissionFailure, SubmissionState, SubmitsTransactions, SubmitterMetrics, SubmitterSettings,
    TransactionSubmitter,
};

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

const HASH: TxHash = TxHash::new([0xab; 32]);

fn payload() -> CallPayload {
    let function: FunctionId = "0xabc::helper_ve::distribute_gauges".parse().unwrap();
    CallPayload::new(function, vec![])
}

fn signer() -> SignerIdentity {
    HeldKeySigner::from_bytes(&[5u8; 32]).into()
}

fn raw_txn(sender: AccountAddress, payload: &CallPayload) -> RawTransaction {
    RawTransaction {
        sender,
        sequence_number: 1,
        payload: TransactionPayload(EntryFunction::from(payload)),
        max_gas_amount: 200_000,
        gas_unit_price: 100,
        expiration_timestamp_secs: 30,
        chain_id: 2,
    }
}

fn signed(raw: RawTransaction) -> SignedTransaction {
    SignedTransaction {
        raw_txn: raw,
        authenticator: TransactionAuthenticator::Ed25519 {
            public_key: [0; 32],
            signature: [0; 64],
        },
    }
}

fn included(success: bool) -> InclusionResult {
    InclusionResult {
        hash: HASH,
        success,
        vm_status: if success {
            "Executed successfully".into()
        } else {
            "Move abort in 0xabc::voter: E_EPOCH(0x7): ".into()
        },
        gas_used: 42,
        abort_code: (!success).then_some(7),
    }
}

/// Gateway whose build, simulate, sign and submit succeed.
fn gateway_up_to_submit() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .times(1)
        .returning(|sender, payload| Ok(raw_txn(sender, payload)));
    gateway.expect_simulate().times(1).returning(|_, _| {
        Ok(GasEstimate {
            gas_unit_price: 150,
            max_gas_units: 3_000,
        })
    });
    gateway
        .expect_sign()
        .times(1)
        .returning(|_, raw| Ok(signed(raw)));
    gateway.expect_submit().times(1).returning(|_| Ok(HASH));
    gateway.expect_explorer_url().returning(|_| None);
    gateway
}

fn submitter(gateway: impl ChainGateway + 'static) -> TransactionSubmitter {
    TransactionSubmitter::new(
        Arc::new(gateway),
        SubmitterSettings {
            inclusion_timeout: Duration::from_secs(30),
        },
        SubmitterMetrics::dummy_instance(),
    )
}

#[tokio::test]
async fn happy_path_visits_every_state_in_order() {
    let mut gateway = gateway_up_to_submit();
    gateway
        .expect_wait_for_inclusion()
        .with(eq(HASH), eq(Duration::from_secs(30)))
        .times(1)
        .returning(|_, _| Ok(included(true)));

    let attempt = submitter(gateway).submit_attempt(payload(), &signer()).await;

    assert_eq!(
        attempt.states,
        vec![
            SubmissionState::Building,
            SubmissionState::Simulated,
            SubmissionState::Signed,
            SubmissionState::Submitted,
            SubmissionState::Confirmed,
        ]
    );
    assert_eq!(attempt.hash, Some(HASH));
    assert_eq!(attempt.estimate.map(|e| e.max_gas_units), Some(3_000));
    assert!(attempt.simulate_warning.is_none());
    assert_eq!(attempt.into_result(), Ok(HASH));
}

#[tokio::test]
async fn simulation_estimate_is_applied_before_signing() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .returning(|sender, payload| Ok(raw_txn(sender, payload)));
    gateway.expect_simulate().returning(|_, _| {
        Ok(GasEstimate {
            gas_unit_price: 150,
            max_gas_units: 3_000,
        })
    });
    gateway
        .expect_sign()
        .withf(|_, raw| raw.gas_unit_price == 150 && raw.max_gas_amount == 3_000)
        .times(1)
        .returning(|_, raw| Ok(signed(raw)));
    gateway.expect_submit().returning(|_| Ok(HASH));
    gateway
        .expect_wait_for_inclusion()
        .returning(|_, _| Ok(included(true)));
    gateway.expect_explorer_url().returning(|_| None);

    let result = submitter(gateway).submit(payload(), &signer()).await;
    assert_eq!(result, Ok(HASH));
}

#[tokio::test]
#[traced_test]
async fn simulation_failure_is_a_warning_and_default_gas_is_kept() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .returning(|sender, payload| Ok(raw_txn(sender, payload)));
    gateway.expect_simulate().times(1).returning(|_, _| {
        Err(ChainCommunicationError::SimulationFailed(
            "node unavailable".into(),
        ))
    });
    gateway
        .expect_sign()
        .withf(|_, raw| raw.gas_unit_price == 100 && raw.max_gas_amount == 200_000)
        .times(1)
        .returning(|_, raw| Ok(signed(raw)));
    gateway.expect_submit().times(1).returning(|_| Ok(HASH));
    gateway
        .expect_wait_for_inclusion()
        .times(1)
        .returning(|_, _| Ok(included(true)));
    gateway.expect_explorer_url().returning(|_| None);

    let attempt = submitter(gateway).submit_attempt(payload(), &signer()).await;

    assert_eq!(attempt.state(), &SubmissionState::Confirmed);
    assert!(attempt
        .simulate_warning
        .as_ref()
        .is_some_and(|w| w.0.contains("node unavailable")));
    assert!(attempt.estimate.is_none());
    assert!(logs_contain("simulation failed, submitting with default gas"));
}

#[tokio::test]
async fn build_failure_stops_before_simulation() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .times(1)
        .returning(|_, _| Err(ChainCommunicationError::BuildError("no account".into())));
    gateway.expect_simulate().times(0);
    gateway.expect_sign().times(0);
    gateway.expect_submit().times(0);

    let attempt = submitter(gateway).submit_attempt(payload(), &signer()).await;

    assert_eq!(attempt.states.len(), 2);
    assert!(matches!(
        attempt.state(),
        SubmissionState::Failed(SubmissionFailure::BuildError(msg)) if msg.contains("no account")
    ));
}

#[tokio::test]
async fn wallet_rejection_never_submits_or_waits() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .returning(|sender, payload| Ok(raw_txn(sender, payload)));
    gateway.expect_simulate().returning(|_, _| {
        Ok(GasEstimate {
            gas_unit_price: 100,
            max_gas_units: 1_000,
        })
    });
    gateway
        .expect_sign()
        .times(1)
        .returning(|_, _| Err(ChainCommunicationError::UserRejected));
    gateway.expect_submit().times(0);
    gateway.expect_wait_for_inclusion().times(0);

    let attempt = submitter(gateway).submit_attempt(payload(), &signer()).await;

    assert_eq!(
        attempt.states,
        vec![
            SubmissionState::Building,
            SubmissionState::Simulated,
            SubmissionState::Failed(SubmissionFailure::UserRejected),
        ]
    );
    assert!(attempt.hash.is_none());
}

#[tokio::test]
async fn other_sign_errors_are_sign_errors() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .returning(|sender, payload| Ok(raw_txn(sender, payload)));
    gateway
        .expect_simulate()
        .returning(|_, _| Err(ChainCommunicationError::SimulationFailed("x".into())));
    gateway
        .expect_sign()
        .returning(|_, _| Err(ChainCommunicationError::SignError("bad key".into())));
    gateway.expect_submit().times(0);

    let result = submitter(gateway).submit(payload(), &signer()).await;
    assert!(matches!(result, Err(SubmissionFailure::SignError(_))));
}

#[tokio::test]
async fn submit_rejection_is_reported() {
    let mut gateway = MockGateway::new();
    gateway
        .expect_build()
        .returning(|sender, payload| Ok(raw_txn(sender, payload)));
    gateway.expect_simulate().returning(|_, _| {
        Ok(GasEstimate {
            gas_unit_price: 100,
            max_gas_units: 1_000,
        })
    });
    gateway.expect_sign().returning(|_, raw| Ok(signed(raw)));
    gateway.expect_submit().times(1).returning(|_| {
        Err(ChainCommunicationError::SubmitRejected(
            "SEQUENCE_NUMBER_TOO_OLD".into(),
        ))
    });
    gateway.expect_wait_for_inclusion().times(0);

    let attempt = submitter(gateway).submit_attempt(payload(), &signer()).await;
    assert_eq!(attempt.states.last().map(ToString::to_string).as_deref(), Some("failed(submit_rejected)"));
}

#[tokio::test]
async fn execution_failure_carries_abort_code() {
    let mut gateway = gateway_up_to_submit();
    gateway
        .expect_wait_for_inclusion()
        .returning(|_, _| Ok(included(false)));

    let result = submitter(gateway).submit(payload(), &signer()).await;
    match result {
        Err(SubmissionFailure::ExecutionFailed {
            hash, abort_code, ..
        }) => {
            assert_eq!(hash, HASH);
            assert_eq!(abort_code, Some(7));
        }
        other => panic!("unexpected result {other:?}"),
    }
}

/// Gateway that accepts the transaction and never reports it executed.
struct StalledGateway;

#[async_trait]
impl ChainGateway for StalledGateway {
    async fn build(
        &self,
        sender: AccountAddress,
        payload: &CallPayload,
    ) -> ChainResult<RawTransaction> {
        Ok(raw_txn(sender, payload))
    }

    async fn simulate(
        &self,
        _txn: &RawTransaction,
        _signer: &SignerIdentity,
    ) -> ChainResult<GasEstimate> {
        Err(ChainCommunicationError::SimulationFailed("skip".into()))
    }

    async fn sign(
        &self,
        _signer: &SignerIdentity,
        txn: RawTransaction,
    ) -> ChainResult<SignedTransaction> {
        Ok(signed(txn))
    }

    async fn submit(&self, _txn: &SignedTransaction) -> ChainResult<TxHash> {
        Ok(HASH)
    }

    async fn wait_for_inclusion(
        &self,
        _hash: &TxHash,
        _timeout: Duration,
    ) -> ChainResult<InclusionResult> {
        std::future::pending().await
    }

    async fn view(
        &self,
        _function: &FunctionId,
        _type_args: &[TypeTag],
        _args: Vec<serde_json::Value>,
    ) -> ChainResult<Vec<serde_json::Value>> {
        Ok(vec![])
    }
}

#[tokio::test(start_paused = true)]
async fn inclusion_timeout_is_enforced_by_the_submitter() {
    let submitter = submitter(StalledGateway);
    let started = tokio::time::Instant::now();

    let attempt = submitter.submit_attempt(payload(), &signer()).await;

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
    assert_eq!(
        attempt.state(),
        &SubmissionState::Failed(SubmissionFailure::InclusionTimeout {
            hash: HASH,
            timeout: Duration::from_secs(30),
        })
    );
    assert_eq!(attempt.hash, Some(HASH));
}
