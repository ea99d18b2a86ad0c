//! Keeper configuration.
//!
//! On top of the shared settings the keeper reads:
//! - `signer.key`: hex ed25519 private key of the scheduled signer. Also read
//!   from `APTOS_PRIVATE_KEY`. Unset means every firing is skipped.
//! - `schedules`: list of `{ "trigger": ..., "every": ... }`, where `every` is a
//!   humantime duration. Defaults to the hourly gauge distribution.

use std::time::Duration;

use derive_more::{AsMut, AsRef, Deref, DerefMut};
use eyre::{eyre, Context, Result};
use serde::Deserialize;
use vetapp_base::{
    settings::{load_settings_object, parse_duration, RawSettings, Settings},
    LoadableFromSettings,
};
use vetapp_core::HeldKeySigner;

use crate::dispatcher::HOURLY_DISTRIBUTION;

/// How often a trigger fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleConf {
    pub trigger: String,
    pub every: Duration,
}

impl ScheduleConf {
    fn hourly_distribution() -> Self {
        Self {
            trigger: HOURLY_DISTRIBUTION.to_owned(),
            every: Duration::from_secs(60 * 60),
        }
    }
}

/// Settings for `Keeper`
#[derive(Debug, AsRef, AsMut, Deref, DerefMut)]
pub struct KeeperSettings {
    #[as_ref]
    #[as_mut]
    #[deref]
    #[deref_mut]
    base: Settings,

    /// The scheduled signer, if a key was provisioned
    pub signer: Option<HeldKeySigner>,
    /// Triggers to fire and their period
    pub schedules: Vec<ScheduleConf>,
}

/// Keeper-only keys. Read in a second pass over the same sources as
/// [`RawSettings`] so that values coming from the environment keep their
/// string-to-number coercion.
#[derive(Debug, Default, Deserialize)]
struct RawKeeperSettings {
    #[serde(default)]
    signer: RawSignerConf,
    #[serde(default)]
    schedules: Option<Vec<RawScheduleConf>>,
}

#[derive(Default, Deserialize)]
struct RawSignerConf {
    key: Option<String>,
}

// Never print the key.
impl std::fmt::Debug for RawSignerConf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawSignerConf")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RawScheduleConf {
    trigger: Option<String>,
    every: Option<String>,
}

impl KeeperSettings {
    fn from_raw(base: RawSettings, raw: RawKeeperSettings) -> Result<Self> {
        let base = Settings::try_from(base)?;

        let signer = match raw.signer.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => {
                Some(HeldKeySigner::from_hex(key).context("signer.key")?)
            }
            _ => None,
        };

        let schedules = match raw.schedules {
            None => vec![ScheduleConf::hourly_distribution()],
            Some(schedules) => schedules
                .into_iter()
                .enumerate()
                .map(|(i, schedule)| {
                    let trigger = schedule
                        .trigger
                        .filter(|t| !t.trim().is_empty())
                        .ok_or_else(|| eyre!("schedules[{i}].trigger is required"))?;
                    let every = parse_duration(&format!("schedules[{i}].every"), &schedule.every)?
                        .ok_or_else(|| eyre!("schedules[{i}].every is required"))?;
                    if every.is_zero() {
                        return Err(eyre!("schedules[{i}].every must be greater than zero"));
                    }
                    Ok(ScheduleConf { trigger, every })
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            base,
            signer,
            schedules,
        })
    }
}

impl LoadableFromSettings for KeeperSettings {
    fn load() -> Result<Self> {
        let base: RawSettings = load_settings_object()?;
        let raw: RawKeeperSettings = load_settings_object()?;
        Self::from_raw(base, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0x0101010101010101010101010101010101010101010101010101010101010101";

    fn parse(json: serde_json::Value) -> Result<KeeperSettings> {
        let base: RawSettings = serde_json::from_value(json.clone())?;
        let raw: RawKeeperSettings = serde_json::from_value(json)?;
        KeeperSettings::from_raw(base, raw)
    }

    #[test]
    fn defaults_to_hourly_distribution_without_signer() {
        let settings = parse(serde_json::json!({})).unwrap();
        assert!(settings.signer.is_none());
        assert_eq!(settings.schedules, vec![ScheduleConf::hourly_distribution()]);
        assert_eq!(settings.server.port, 9090);
    }

    #[test]
    fn parses_signer_and_schedules() {
        let settings = parse(serde_json::json!({
            "signer": { "key": KEY },
            "schedules": [{ "trigger": "hourly", "every": "15m" }],
            "contracts": { "ve_tapp_helper": "0xabc" }
        }))
        .unwrap();

        let signer = settings.signer.as_ref().unwrap();
        assert_eq!(signer.address(), HeldKeySigner::from_hex(KEY).unwrap().address());
        assert_eq!(
            settings.schedules,
            vec![ScheduleConf {
                trigger: "hourly".to_owned(),
                every: Duration::from_secs(15 * 60),
            }]
        );
        assert!(settings.contracts.ve_tapp_helper.is_some());
    }

    #[test]
    fn debug_output_never_contains_the_key() {
        let json = serde_json::json!({ "signer": { "key": KEY } });
        let raw: RawKeeperSettings = serde_json::from_value(json.clone()).unwrap();
        assert!(!format!("{raw:?}").contains("0101"));

        let settings = parse(json).unwrap();
        assert!(!format!("{settings:?}").contains("0101010101"));
    }

    #[test]
    fn rejects_bad_schedule_entries() {
        let err = parse(serde_json::json!({
            "schedules": [{ "trigger": "hourly", "every": "0s" }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("schedules[0].every"));

        let err = parse(serde_json::json!({ "signer": { "key": "zz" } })).unwrap_err();
        assert!(format!("{err:#}").contains("signer.key"));
    }
}
