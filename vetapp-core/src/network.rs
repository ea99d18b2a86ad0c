use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer};

use crate::TxHash;

const EXPLORER_BASE: &str = "https://explorer.aptoslabs.com";

/// Which chain deployment to talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
    Local,
    /// A fullnode REST endpoint given by URL.
    Custom(String),
}

impl Network {
    /// Base URL of the fullnode REST API, including the `/v1` path.
    pub fn rest_url(&self) -> &str {
        match self {
            Network::Mainnet => "https://api.mainnet.aptoslabs.com/v1",
            Network::Testnet => "https://api.testnet.aptoslabs.com/v1",
            Network::Devnet => "https://api.devnet.aptoslabs.com/v1",
            Network::Local => "http://127.0.0.1:8080/v1",
            Network::Custom(url) => url,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
            Network::Local => "local",
            Network::Custom(_) => "custom",
        }
    }

    pub fn explorer_url(&self, hash: &TxHash) -> String {
        format!("{EXPLORER_BASE}/txn/{hash}/?network={}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network {0:?}, expected mainnet, testnet, devnet, local or an http(s) url")]
pub struct UnknownNetwork(pub String);

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            "local" | "localnet" => Ok(Network::Local),
            lower if lower.starts_with("http://") || lower.starts_with("https://") => {
                Ok(Network::Custom(trimmed.trim_end_matches('/').to_owned()))
            }
            _ => Err(UnknownNetwork(s.to_owned())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Custom(url) => f.write_str(url),
            other => f.write_str(other.name()),
        }
    }
}

impl<'de> Deserialize<'de> for Network {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
