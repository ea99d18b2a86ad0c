//! Settings shared by vetapp processes.
//!
//! ### Configuration
//!
//! Settings are read from JSON config files, then from the environment.
//!
//! #### N.B.: Environment variable names correspond 1:1 with the config file's JSON object hierarchy.
//!
//! Variables prefixed with `VETAPP_` override the hierarchical structure, with
//! `__` separating levels. For example `VETAPP_CHAIN__NETWORK=mainnet`
//! overrides `{"chain": {"network": ...}}` and
//! `VETAPP_CONTRACTS__VE_TAPP_HELPER=0xabc` overrides
//! `{"contracts": {"ve_tapp_helper": ...}}`.
//!
//! ### Configuration value precedence
//!
//! Later sources take precedence:
//!
//! 1. Legacy deployment variables: `APTOS_NETWORK` (or `VITE_APP_NETWORK`),
//!    `APTOS_API_KEY`, `APTOS_PRIVATE_KEY` and the bare contract names
//!    (`ve_tapp_helper`, `vetapp`, ...).
//! 2. The files in `./config/*.json`, when that directory exists.
//! 3. The files listed in `CONFIG_FILES`, comma separated, in order.
//! 4. `VETAPP_` environment variables.

use std::{path::PathBuf, sync::Arc, time::Duration};

use eyre::{eyre, Context, Result};
use serde::Deserialize;
use vetapp_aptos::{AptosGateway, AptosGatewayConf};
use vetapp_core::{
    encode_address, ChainGateway, ContractAccount, GasDefaults, Network, ProtocolAddresses,
};
use vetapp_submitter::{SubmitterMetrics, SubmitterSettings, TransactionSubmitter};

pub use loader::load_settings_object;
pub use trace::*;

use crate::CoreMetrics;

mod loader;
mod trace;

/// Chain connection settings.
#[derive(Debug, Clone)]
pub struct ChainConf {
    pub network: Network,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub inclusion_timeout: Duration,
    pub gas: GasDefaults,
}

impl Default for ChainConf {
    fn default() -> Self {
        let gateway = AptosGatewayConf::default();
        Self {
            network: gateway.network,
            api_key: None,
            request_timeout: gateway.request_timeout,
            poll_interval: gateway.poll_interval,
            inclusion_timeout: SubmitterSettings::default().inclusion_timeout,
            gas: gateway.gas,
        }
    }
}

impl ChainConf {
    pub fn gateway_conf(&self) -> AptosGatewayConf {
        AptosGatewayConf {
            network: self.network.clone(),
            api_key: self.api_key.clone(),
            request_timeout: self.request_timeout,
            poll_interval: self.poll_interval,
            gas: self.gas,
        }
    }

    pub fn build_gateway(&self) -> Result<Arc<dyn ChainGateway>> {
        let gateway = AptosGateway::new(&self.gateway_conf())
            .with_context(|| format!("connecting to {}", self.network))?;
        Ok(Arc::new(gateway))
    }

    pub fn build_submitter(
        &self,
        gateway: Arc<dyn ChainGateway>,
        metrics: &CoreMetrics,
    ) -> Result<TransactionSubmitter> {
        let submitter_metrics = SubmitterMetrics::new(metrics.registry())?;
        Ok(TransactionSubmitter::new(
            gateway,
            SubmitterSettings {
                inclusion_timeout: self.inclusion_timeout,
            },
            submitter_metrics,
        ))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConf {
    pub port: u16,
    /// Directory of built front-end assets; unset serves no static files.
    pub assets_dir: Option<PathBuf>,
}

impl Default for ServerConf {
    fn default() -> Self {
        Self {
            port: 9090,
            assets_dir: None,
        }
    }
}

/// Settings every vetapp process shares.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub chain: ChainConf,
    pub contracts: ProtocolAddresses,
    pub server: ServerConf,
    pub tracing: TracingConfig,
}

impl Settings {
    /// Create the core metrics from the settings given the name of the agent.
    pub fn metrics(&self, name: &str) -> Result<Arc<CoreMetrics>> {
        Ok(Arc::new(CoreMetrics::new(
            name,
            self.server.port,
            prometheus::Registry::new(),
        )?))
    }
}

impl AsRef<Settings> for Settings {
    fn as_ref(&self) -> &Settings {
        self
    }
}

/// Settings as they appear in files and the environment, before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    chain: RawChainConf,
    contracts: RawContracts,
    server: RawServerConf,
    tracing: TracingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawChainConf {
    network: Option<String>,
    api_key: Option<String>,
    request_timeout: Option<String>,
    poll_interval: Option<String>,
    inclusion_timeout: Option<String>,
    max_gas_amount: Option<u64>,
    gas_unit_price: Option<u64>,
    expiration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawContracts {
    tapp: Option<String>,
    vetapp: Option<String>,
    ve_tapp_helper: Option<String>,
    gauge: Option<String>,
    amm: Option<String>,
    clmm: Option<String>,
    stable: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawServerConf {
    port: Option<u16>,
    assets_dir: Option<String>,
}

/// Unset and empty values are both "not configured".
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an optional humantime duration such as `30s` or `1h 5m`.
pub fn parse_duration(field: &str, value: &Option<String>) -> Result<Option<Duration>> {
    non_empty(value)
        .map(|text| {
            humantime::parse_duration(text)
                .with_context(|| format!("{field}: invalid duration {text:?}"))
        })
        .transpose()
}

impl TryFrom<RawSettings> for Settings {
    type Error = eyre::Report;

    fn try_from(raw: RawSettings) -> Result<Self> {
        let defaults = ChainConf::default();
        let chain = ChainConf {
            network: match non_empty(&raw.chain.network) {
                Some(text) => text.parse::<Network>().context("chain.network")?,
                None => defaults.network,
            },
            api_key: non_empty(&raw.chain.api_key).map(str::to_owned),
            request_timeout: parse_duration("chain.request_timeout", &raw.chain.request_timeout)?
                .unwrap_or(defaults.request_timeout),
            poll_interval: parse_duration("chain.poll_interval", &raw.chain.poll_interval)?
                .unwrap_or(defaults.poll_interval),
            inclusion_timeout: parse_duration(
                "chain.inclusion_timeout",
                &raw.chain.inclusion_timeout,
            )?
            .unwrap_or(defaults.inclusion_timeout),
            gas: GasDefaults {
                max_gas_amount: raw
                    .chain
                    .max_gas_amount
                    .unwrap_or(defaults.gas.max_gas_amount),
                gas_unit_price: raw
                    .chain
                    .gas_unit_price
                    .unwrap_or(defaults.gas.gas_unit_price),
                expiration: parse_duration("chain.expiration", &raw.chain.expiration)?
                    .unwrap_or(defaults.gas.expiration),
            },
        };
        if chain.inclusion_timeout.is_zero() {
            return Err(eyre!("chain.inclusion_timeout must be greater than zero"));
        }

        let mut contracts = ProtocolAddresses::default();
        for (account, value) in [
            (ContractAccount::Tapp, &raw.contracts.tapp),
            (ContractAccount::Vetapp, &raw.contracts.vetapp),
            (ContractAccount::VeTappHelper, &raw.contracts.ve_tapp_helper),
            (ContractAccount::Gauge, &raw.contracts.gauge),
            (ContractAccount::Amm, &raw.contracts.amm),
            (ContractAccount::Clmm, &raw.contracts.clmm),
            (ContractAccount::Stable, &raw.contracts.stable),
        ] {
            let address = non_empty(value)
                .map(encode_address)
                .transpose()
                .with_context(|| format!("contracts.{account}"))?;
            contracts.set(account, address);
        }

        let server = ServerConf {
            port: raw.server.port.unwrap_or(ServerConf::default().port),
            assets_dir: non_empty(&raw.server.assets_dir).map(PathBuf::from),
        };

        Ok(Settings {
            chain,
            contracts,
            server,
            tracing: raw.tracing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: serde_json::Value) -> RawSettings {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = Settings::try_from(RawSettings::default()).unwrap();
        assert_eq!(settings.chain.network, Network::Testnet);
        assert_eq!(settings.contracts, ProtocolAddresses::default());
        assert_eq!(settings.server, ServerConf::default());
    }

    #[test]
    fn parses_chain_and_contracts() {
        let settings = Settings::try_from(raw(serde_json::json!({
            "chain": {
                "network": "mainnet",
                "inclusion_timeout": "2m",
                "gas_unit_price": 150
            },
            "contracts": { "ve_tapp_helper": "0xabc", "vetapp": "" },
            "server": { "port": 8787, "assets_dir": "dist" }
        })))
        .unwrap();

        assert_eq!(settings.chain.network, Network::Mainnet);
        assert_eq!(settings.chain.inclusion_timeout, Duration::from_secs(120));
        assert_eq!(settings.chain.gas.gas_unit_price, 150);
        assert_eq!(
            settings.contracts.ve_tapp_helper,
            Some(encode_address("0xabc").unwrap())
        );
        assert_eq!(settings.contracts.vetapp, None);
        assert_eq!(settings.server.port, 8787);
        assert_eq!(settings.server.assets_dir, Some(PathBuf::from("dist")));
    }

    #[test]
    fn reports_the_offending_field() {
        let err = Settings::try_from(raw(serde_json::json!({
            "contracts": { "gauge": "0xnothex" }
        })))
        .unwrap_err();
        assert!(format!("{err:#}").contains("contracts.gauge"));

        let err = Settings::try_from(raw(serde_json::json!({
            "chain": { "poll_interval": "soon" }
        })))
        .unwrap_err();
        assert!(format!("{err:#}").contains("chain.poll_interval"));
    }
}
