use std::sync::Arc;

use async_trait::async_trait;
use eyre::{eyre, Result};
use futures_util::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};
use vetapp_base::{BaseAgent, CoreMetrics, Server};
use vetapp_core::SignerIdentity;

use crate::{
    dispatcher::{resolve, ScheduledDispatcher},
    metrics::KeeperMetrics,
    settings::{KeeperSettings, ScheduleConf},
    ticker::Ticker,
};

/// Runs the protocol's periodic maintenance transactions and serves the
/// front-end assets.
#[derive(Debug)]
pub struct Keeper {
    dispatcher: Arc<ScheduledDispatcher>,
    schedules: Vec<ScheduleConf>,
    server: Arc<Server>,
}

#[async_trait]
impl BaseAgent for Keeper {
    const AGENT_NAME: &'static str = "keeper";

    type Settings = KeeperSettings;

    async fn from_settings(settings: Self::Settings, metrics: Arc<CoreMetrics>) -> Result<Self>
    where
        Self: Sized,
    {
        if let Some(unknown) = settings
            .schedules
            .iter()
            .find(|schedule| resolve(&schedule.trigger).is_none())
        {
            return Err(eyre!("schedules: unknown trigger {:?}", unknown.trigger));
        }

        let signer = settings.signer.clone().map(SignerIdentity::from);
        match &signer {
            Some(signer) => info!(address = %signer.address(), "scheduled signer loaded"),
            None => warn!("no signer key provisioned, scheduled jobs will be skipped"),
        }

        let gateway = settings.chain.build_gateway()?;
        let submitter = settings.chain.build_submitter(gateway, &metrics)?;
        let dispatcher = ScheduledDispatcher::new(
            Arc::new(submitter),
            settings.contracts,
            signer,
            KeeperMetrics::new(metrics.registry())?,
        );
        let server = Server::new(
            settings.server.port,
            metrics.clone(),
            settings.server.assets_dir.clone(),
        );

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            schedules: settings.schedules.clone(),
            server: Arc::new(server),
        })
    }

    async fn run(self) -> Result<()> {
        let mut tasks: Vec<JoinHandle<()>> = vec![self.server.clone().run()];

        for schedule in self.schedules {
            info!(trigger = %schedule.trigger, every = %humantime::format_duration(schedule.every), "starting ticker");
            let span = info_span!("Ticker", trigger = %schedule.trigger);
            tasks.push(tokio::spawn(
                Ticker::new(self.dispatcher.clone(), schedule)
                    .run()
                    .instrument(span),
            ));
        }

        // Tickers never return; this only ends if a task panics.
        try_join_all(tasks).await?;
        Ok(())
    }
}
