use std::sync::Arc;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info_span, Instrument};

use crate::{dispatcher::ScheduledDispatcher, settings::ScheduleConf};

/// Fires one schedule on a fixed period. Each firing runs on its own task, so
/// a slow or panicking firing never delays or stops the next one.
#[derive(Debug)]
pub struct Ticker {
    dispatcher: Arc<ScheduledDispatcher>,
    schedule: ScheduleConf,
}

impl Ticker {
    pub fn new(dispatcher: Arc<ScheduledDispatcher>, schedule: ScheduleConf) -> Self {
        Self {
            dispatcher,
            schedule,
        }
    }

    pub async fn run(self) {
        let every = self.schedule.every;
        let mut interval = interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let dispatcher = self.dispatcher.clone();
            let trigger = self.schedule.trigger.clone();
            debug!(%trigger, "schedule fired");
            tokio::spawn(
                async move {
                    if let Err(err) = dispatcher.fire(&trigger).await {
                        error!(%err, "schedule firing rejected");
                    }
                }
                .instrument(info_span!("firing", trigger = %self.schedule.trigger)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use vetapp_core::{
        encode_address, CallPayload, ContractAccount, HeldKeySigner, ProtocolAddresses,
        SignerIdentity, TxHash,
    };
    use vetapp_submitter::{SubmissionFailure, SubmitsTransactions};

    use super::*;
    use crate::{metrics::KeeperMetrics, test_utils::MockSubmitter};

    /// Panics on its first call and counts every call.
    #[derive(Default)]
    struct PanicsOnce {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl SubmitsTransactions for PanicsOnce {
        async fn submit(
            &self,
            _payload: CallPayload,
            _signer: &SignerIdentity,
        ) -> Result<TxHash, SubmissionFailure> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first firing blows up");
            }
            Ok(TxHash::new([1; 32]))
        }
    }

    fn ticker(submitter: impl SubmitsTransactions + 'static, every: Duration) -> Ticker {
        let mut contracts = ProtocolAddresses::default();
        contracts.set(
            ContractAccount::VeTappHelper,
            Some(encode_address("0xabc").unwrap()),
        );
        let dispatcher = ScheduledDispatcher::new(
            Arc::new(submitter),
            contracts,
            Some(HeldKeySigner::from_bytes(&[3u8; 32]).into()),
            KeeperMetrics::dummy_instance(),
        );
        Ticker::new(
            Arc::new(dispatcher),
            ScheduleConf {
                trigger: "hourly".to_owned(),
                every,
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut submitter = MockSubmitter::new();
        submitter.expect_submit().returning(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(TxHash::new([1; 32]))
        });

        let handle = tokio::spawn(ticker(submitter, Duration::from_secs(3600)).run());
        tokio::time::sleep(Duration::from_secs(3600 * 2 + 1)).await;
        handle.abort();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn a_panicking_firing_does_not_stop_the_ticker() {
        let submitter = PanicsOnce::default();
        let calls = submitter.calls.clone();

        let handle = tokio::spawn(ticker(submitter, Duration::from_secs(60)).run());
        tokio::time::sleep(Duration::from_secs(60 * 3 + 1)).await;
        assert!(!handle.is_finished());
        handle.abort();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
