use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use derive_new::new;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};
use vetapp_core::{CallPayload, ChainGateway, InclusionResult, SignerIdentity, TxHash};

use crate::{SimulateWarning, SubmissionAttempt, SubmissionFailure, SubmissionState, SubmitterMetrics};

#[derive(Debug, Clone, Copy)]
pub struct SubmitterSettings {
    /// Upper bound on waiting for execution after submission.
    pub inclusion_timeout: Duration,
}

impl Default for SubmitterSettings {
    fn default() -> Self {
        Self {
            inclusion_timeout: Duration::from_secs(60),
        }
    }
}

/// Anything that can run a payload through to a confirmed transaction.
///
/// Scheduled jobs and UI commands depend on this rather than on
/// [`TransactionSubmitter`] so they can be exercised without a chain.
#[async_trait]
pub trait SubmitsTransactions: Send + Sync {
    async fn submit(
        &self,
        payload: CallPayload,
        signer: &SignerIdentity,
    ) -> Result<TxHash, SubmissionFailure>;
}

/// Drives one payload through build, simulate, sign, submit and wait.
///
/// One attempt per call. Nothing is retried: a failure at any stage ends the
/// attempt and the caller decides what to do next.
#[derive(new)]
pub struct TransactionSubmitter {
    gateway: Arc<dyn ChainGateway>,
    settings: SubmitterSettings,
    metrics: SubmitterMetrics,
}

impl TransactionSubmitter {
    /// Run the full pipeline and return the attempt record.
    #[instrument(skip_all, fields(function = %payload.function(), signer = %signer.address()))]
    pub async fn submit_attempt(
        &self,
        payload: CallPayload,
        signer: &SignerIdentity,
    ) -> SubmissionAttempt {
        let started = Instant::now();
        let mut attempt = SubmissionAttempt::new(payload, signer);

        let result = self.run(&mut attempt, signer).await;
        match &result {
            Ok(inclusion) => {
                attempt.transition(SubmissionState::Confirmed);
                info!(
                    hash = %inclusion.hash,
                    gas_used = inclusion.gas_used,
                    explorer = %self.gateway.explorer_url(&inclusion.hash).unwrap_or_default(),
                    "transaction confirmed"
                );
            }
            Err(failure) => {
                attempt.transition(SubmissionState::Failed(failure.clone()));
                if matches!(failure, SubmissionFailure::UserRejected) {
                    info!("signature request rejected by user");
                } else {
                    error!(
                        function = %attempt.payload.function(),
                        args = ?attempt.payload.hex_args(),
                        hash = ?attempt.hash,
                        error = %failure,
                        "transaction submission failed"
                    );
                }
            }
        }
        attempt.result = Some(result);
        self.metrics
            .observe(&attempt, started.elapsed().as_secs_f64());
        attempt
    }

    async fn run(
        &self,
        attempt: &mut SubmissionAttempt,
        signer: &SignerIdentity,
    ) -> Result<InclusionResult, SubmissionFailure> {
        let mut txn = self
            .gateway
            .build(signer.address(), &attempt.payload)
            .await
            .map_err(SubmissionFailure::at_build)?;

        match self.gateway.simulate(&txn, signer).await {
            Ok(estimate) => {
                txn.apply_estimate(&estimate);
                attempt.estimate = Some(estimate);
            }
            Err(err) => {
                warn!(error = %err, "simulation failed, submitting with default gas");
                attempt.simulate_warning = Some(SimulateWarning(err.to_string()));
            }
        }
        attempt.transition(SubmissionState::Simulated);

        let signed = self
            .gateway
            .sign(signer, txn)
            .await
            .map_err(SubmissionFailure::at_sign)?;
        attempt.transition(SubmissionState::Signed);

        let hash = self
            .gateway
            .submit(&signed)
            .await
            .map_err(SubmissionFailure::at_submit)?;
        attempt.hash = Some(hash);
        attempt.transition(SubmissionState::Submitted);
        info!(%hash, "transaction submitted");

        let timeout = self.settings.inclusion_timeout;
        let inclusion =
            match tokio::time::timeout(timeout, self.gateway.wait_for_inclusion(&hash, timeout))
                .await
            {
                Ok(Ok(inclusion)) => inclusion,
                Ok(Err(err)) => {
                    warn!(%hash, error = %err, "could not confirm inclusion");
                    return Err(SubmissionFailure::at_inclusion(hash, timeout));
                }
                Err(_) => return Err(SubmissionFailure::at_inclusion(hash, timeout)),
            };

        if !inclusion.success {
            return Err(SubmissionFailure::ExecutionFailed {
                hash,
                abort_code: inclusion.abort_code,
                vm_status: inclusion.vm_status,
            });
        }
        Ok(inclusion)
    }
}

#[async_trait]
impl SubmitsTransactions for TransactionSubmitter {
    async fn submit(
        &self,
        payload: CallPayload,
        signer: &SignerIdentity,
    ) -> Result<TxHash, SubmissionFailure> {
        self.submit_attempt(payload, signer).await.into_result()
    }
}
