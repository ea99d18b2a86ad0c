use std::{collections::HashMap, env, path::PathBuf};

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use eyre::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::debug;

const ENV_PREFIX: &str = "VETAPP";

/// Variables from earlier deployments, mapped to the config key they provide
/// a default for. The first variable present wins for each key.
const LEGACY_ENV: &[(&str, &[&str])] = &[
    ("chain.network", &["APTOS_NETWORK", "VITE_APP_NETWORK"]),
    ("chain.api_key", &["APTOS_API_KEY"]),
    ("signer.key", &["APTOS_PRIVATE_KEY"]),
    ("contracts.tapp", &["tapp", "TAPP"]),
    ("contracts.vetapp", &["vetapp", "VETAPP"]),
    ("contracts.ve_tapp_helper", &["ve_tapp_helper", "VE_TAPP_HELPER"]),
    ("contracts.gauge", &["gauge", "GAUGE"]),
    ("contracts.amm", &["amm", "AMM"]),
    ("contracts.clmm", &["clmm", "CLMM"]),
    ("contracts.stable", &["stable", "STABLE"]),
];

/// Load a settings object from the config locations.
/// Further documentation can be found in the `settings` module.
pub fn load_settings_object<T: DeserializeOwned>() -> Result<T> {
    let mut files: Vec<PathBuf> = json_files_in("./config");
    files.extend(
        env::var("CONFIG_FILES")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default(),
    );
    load_from_sources(&files, env::vars().collect())
}

fn json_files_in(dir: &str) -> Vec<PathBuf> {
    let Ok(entries) = PathBuf::from(dir).read_dir() else {
        return vec![];
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

pub(crate) fn load_from_sources<T: DeserializeOwned>(
    files: &[PathBuf],
    vars: HashMap<String, String>,
) -> Result<T> {
    let builder = with_legacy_defaults(Config::builder(), &vars)?;
    let builder = files.iter().fold(builder, |builder, path| {
        debug!(path = %path.display(), "loading config file");
        builder.add_source(File::from(path.as_path()))
    });

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .source(Some(vars)),
        )
        .build()
        .with_context(|| format!("reading config files {files:?}"))?;

    config
        .try_deserialize::<T>()
        .context("Config deserialization error, please check the settings documentation")
}

fn with_legacy_defaults(
    builder: ConfigBuilder<DefaultState>,
    vars: &HashMap<String, String>,
) -> Result<ConfigBuilder<DefaultState>> {
    LEGACY_ENV.iter().try_fold(builder, |builder, (key, names)| {
        let value = names
            .iter()
            .filter_map(|name| vars.get(*name))
            .find(|value| !value.trim().is_empty());
        match value {
            Some(value) => Ok(builder.set_default(*key, value.as_str())?),
            None => Ok(builder),
        }
    })
}
