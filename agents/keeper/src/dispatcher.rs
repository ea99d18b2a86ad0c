use std::{fmt, sync::Arc};

use derive_new::new;
use tracing::{error, info, instrument, warn};
use vetapp_core::{CallPayload, ContractAccount, ProtocolAddresses, SignerIdentity, TxHash};
use vetapp_submitter::{SubmissionFailure, SubmitsTransactions};

use crate::metrics::KeeperMetrics;

/// Trigger of the hourly gauge distribution, in the cron syntax the job was
/// first deployed with.
pub const HOURLY_DISTRIBUTION: &str = "1 * * * *";

/// An entry function run with no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledJob {
    pub account: ContractAccount,
    pub module: &'static str,
    pub function: &'static str,
}

const DISTRIBUTE_GAUGES: ScheduledJob = ScheduledJob {
    account: ContractAccount::VeTappHelper,
    module: "helper_ve",
    function: "distribute_gauges",
};

/// Fixed trigger table.
const SCHEDULE_TABLE: &[(&str, ScheduledJob)] = &[
    (HOURLY_DISTRIBUTION, DISTRIBUTE_GAUGES),
    ("hourly", DISTRIBUTE_GAUGES),
];

/// Resolve a trigger to its job.
pub fn resolve(trigger: &str) -> Option<ScheduledJob> {
    SCHEDULE_TABLE
        .iter()
        .find(|(name, _)| *name == trigger)
        .map(|(_, job)| *job)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown schedule {0:?}")]
    UnknownSchedule(String),
}

/// Configuration a firing needs but did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMissing {
    SignerKey,
    Contract(ContractAccount),
}

impl fmt::Display for ConfigMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigMissing::SignerKey => f.write_str("APTOS_PRIVATE_KEY is not set"),
            ConfigMissing::Contract(account) => write!(f, "{account} address is not set"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FiringOutcome {
    Submitted(TxHash),
    Skipped(ConfigMissing),
    Failed(SubmissionFailure),
}

impl FiringOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            FiringOutcome::Submitted(_) => "submitted",
            FiringOutcome::Skipped(_) => "skipped",
            FiringOutcome::Failed(failure) => failure.kind(),
        }
    }
}

/// Turns schedule firings into submissions signed by the held key.
///
/// Firings are independent: nothing here deduplicates or serializes two
/// firings of the same trigger.
#[derive(new)]
pub struct ScheduledDispatcher {
    submitter: Arc<dyn SubmitsTransactions>,
    contracts: ProtocolAddresses,
    signer: Option<SignerIdentity>,
    metrics: KeeperMetrics,
}

impl fmt::Debug for ScheduledDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledDispatcher")
            .field("contracts", &self.contracts)
            .field("signer", &self.signer.as_ref().map(|s| s.address()))
            .finish_non_exhaustive()
    }
}

impl ScheduledDispatcher {
    /// Handle one firing of `trigger`.
    ///
    /// Missing configuration is a skip, not an error. Submission failures are
    /// logged and reported in the outcome; they never propagate.
    #[instrument(skip(self), fields(job))]
    pub async fn fire(&self, trigger: &str) -> Result<FiringOutcome, DispatchError> {
        let job =
            resolve(trigger).ok_or_else(|| DispatchError::UnknownSchedule(trigger.to_owned()))?;
        let outcome = self.run_job(job).await;
        self.metrics.observe(trigger, &outcome);
        Ok(outcome)
    }

    async fn run_job(&self, job: ScheduledJob) -> FiringOutcome {
        let Some(signer) = &self.signer else {
            return skip(ConfigMissing::SignerKey);
        };
        let function = match self.contracts.function(job.account, job.module, job.function) {
            None => return skip(ConfigMissing::Contract(job.account)),
            Some(Ok(function)) => function,
            Some(Err(err)) => {
                // identifiers in the table are static; this only trips on a bad edit
                error!(?job, ?err, "invalid scheduled job");
                return FiringOutcome::Failed(SubmissionFailure::BuildError(err.to_string()));
            }
        };
        tracing::Span::current().record("job", tracing::field::display(&function));

        let payload = CallPayload::new(function.clone(), Vec::new());
        let args = payload.hex_args();
        match self.submitter.submit(payload, signer).await {
            Ok(hash) => {
                info!(%function, ?hash, "scheduled job confirmed");
                FiringOutcome::Submitted(hash)
            }
            Err(failure) => {
                error!(%function, ?args, %failure, "scheduled job failed");
                FiringOutcome::Failed(failure)
            }
        }
    }
}

fn skip(missing: ConfigMissing) -> FiringOutcome {
    warn!("Skipping cron: {missing}");
    FiringOutcome::Skipped(missing)
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;
    use vetapp_core::{encode_address, HeldKeySigner};

    use super::*;
    use crate::test_utils::MockSubmitter;

    const HASH: TxHash = TxHash::new([0x11; 32]);

    fn signer() -> SignerIdentity {
        HeldKeySigner::from_bytes(&[7u8; 32]).into()
    }

    fn contracts() -> ProtocolAddresses {
        let mut contracts = ProtocolAddresses::default();
        contracts.set(
            ContractAccount::VeTappHelper,
            Some(encode_address("0xabc").unwrap()),
        );
        contracts
    }

    fn dispatcher(
        submitter: MockSubmitter,
        contracts: ProtocolAddresses,
        signer: Option<SignerIdentity>,
    ) -> ScheduledDispatcher {
        ScheduledDispatcher::new(
            Arc::new(submitter),
            contracts,
            signer,
            KeeperMetrics::dummy_instance(),
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn skips_without_a_key() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().times(0);
        let dispatcher = dispatcher(submitter, contracts(), None);

        let outcome = dispatcher.fire("hourly").await.unwrap();
        assert_eq!(outcome, FiringOutcome::Skipped(ConfigMissing::SignerKey));
        assert!(logs_contain("Skipping cron: APTOS_PRIVATE_KEY is not set"));
    }

    #[tokio::test]
    async fn skips_without_the_helper_address() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().times(0);
        let dispatcher = dispatcher(submitter, ProtocolAddresses::default(), Some(signer()));

        let outcome = dispatcher.fire(HOURLY_DISTRIBUTION).await.unwrap();
        assert_eq!(
            outcome,
            FiringOutcome::Skipped(ConfigMissing::Contract(ContractAccount::VeTappHelper))
        );
    }

    #[tokio::test]
    async fn unknown_trigger_is_an_error() {
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().times(0);
        let dispatcher = dispatcher(submitter, contracts(), Some(signer()));

        let err = dispatcher.fire("*/5 * * * *").await.unwrap_err();
        assert_eq!(err, DispatchError::UnknownSchedule("*/5 * * * *".to_owned()));
    }

    #[tokio::test]
    async fn hourly_distributes_gauges_once() {
        let expected_signer = signer().address();
        let mut submitter = MockSubmitter::new();
        submitter
            .expect_submit()
            .withf(move |payload, signer| {
                payload.function().to_string()
                    == format!("{}::helper_ve::distribute_gauges", encode_address("0xabc").unwrap())
                    && payload.args().is_empty()
                    && payload.type_args().is_empty()
                    && signer.address() == expected_signer
            })
            .times(1)
            .returning(|_, _| Ok(HASH));
        let dispatcher = dispatcher(submitter, contracts(), Some(signer()));

        let outcome = dispatcher.fire("hourly").await.unwrap();
        assert_eq!(outcome, FiringOutcome::Submitted(HASH));
    }

    #[tokio::test]
    #[traced_test]
    async fn failures_end_only_the_firing() {
        let mut submitter = MockSubmitter::new();
        submitter
            .expect_submit()
            .times(2)
            .returning(|_, _| {
                Err(SubmissionFailure::SubmitRejected(
                    "SEQUENCE_NUMBER_TOO_OLD".into(),
                ))
            });
        let dispatcher = dispatcher(submitter, contracts(), Some(signer()));

        for _ in 0..2 {
            let outcome = dispatcher.fire("hourly").await.unwrap();
            assert_eq!(outcome.label(), "submit_rejected");
        }
        assert!(logs_contain("distribute_gauges"));
        assert!(logs_contain("SEQUENCE_NUMBER_TOO_OLD"));
    }
}
