use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use eyre::Result;
use tracing::info;

use crate::{metrics::CoreMetrics, settings::Settings};

/// Settings of an agent defined from configuration
pub trait LoadableFromSettings: AsRef<Settings> + Sized {
    /// Create a new instance of these settings by reading the configs and env
    /// vars.
    fn load() -> Result<Self>;
}

/// A long running vetapp process.
#[async_trait]
pub trait BaseAgent: Send + Sync + Debug {
    /// The agent's name
    const AGENT_NAME: &'static str;

    /// The settings object for this agent
    type Settings: LoadableFromSettings;

    /// Instantiate the agent from the standard settings object
    async fn from_settings(settings: Self::Settings, metrics: Arc<CoreMetrics>) -> Result<Self>
    where
        Self: Sized;

    /// Start running this agent.
    #[allow(clippy::async_yields_async)]
    async fn run(self) -> Result<()>;
}

/// Call this from `main` to fully initialize and run the agent for its entire
/// lifecycle. This will initialize the metrics registry and tracing as well.
pub async fn agent_main<A: BaseAgent>() -> Result<()> {
    let settings = A::Settings::load()?;
    let core_settings: &Settings = settings.as_ref();

    core_settings.tracing.start_tracing()?;
    let metrics = core_settings.metrics(A::AGENT_NAME)?;

    let agent = A::from_settings(settings, metrics).await?;
    let result = agent.run().await;
    info!(agent = A::AGENT_NAME, "Shutting down agent...");
    result
}
