use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{types::Config, ConfigError};
use crate::reclaim::RemovalOrder;
use crate::units::{ByteSize, Seconds};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "spacegate.toml";

/// Prefix for environment overrides; `__` separates nested keys
/// (e.g. `SPACEGATE_DISK__REQUIRED=50GiB`)
const ENV_PREFIX: &str = "SPACEGATE_";

/// Keys whose environment values are taken verbatim. `Env` parses values,
/// so a password such as `0042` would otherwise arrive as the integer 42.
const VERBATIM_ENV_KEYS: [&str; 3] = [
    "torrent_client.qbittorrent.url",
    "torrent_client.qbittorrent.username",
    "torrent_client.qbittorrent.password",
];

/// Values supplied on the command line. They take precedence over the
/// config file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub path: Option<PathBuf>,
    pub required: Option<ByteSize>,
    pub qbit_url: Option<String>,
    pub qbit_username: Option<String>,
    pub qbit_password: Option<String>,
    pub reclaim_enabled: Option<bool>,
    pub dry_run: Option<bool>,
    pub min_ratio: Option<f64>,
    pub min_seeding_time: Option<Seconds>,
    pub order: Option<RemovalOrder>,
    pub delete_files: Option<bool>,
    pub settle_secs: Option<Seconds>,
}

impl ConfigOverrides {
    fn apply(&self, figment: Figment) -> Figment {
        let figment = set(figment, "disk.path", &self.path);
        let figment = set(figment, "disk.required", &self.required);
        let figment = set(figment, "torrent_client.qbittorrent.url", &self.qbit_url);
        let figment = set(
            figment,
            "torrent_client.qbittorrent.username",
            &self.qbit_username,
        );
        let figment = set(
            figment,
            "torrent_client.qbittorrent.password",
            &self.qbit_password,
        );
        let figment = set(figment, "reclaim.enabled", &self.reclaim_enabled);
        let figment = set(figment, "reclaim.dry_run", &self.dry_run);
        let figment = set(figment, "reclaim.min_ratio", &self.min_ratio);
        let figment = set(figment, "reclaim.min_seeding_time", &self.min_seeding_time);
        let figment = set(figment, "reclaim.order", &self.order);
        let figment = set(figment, "reclaim.delete_files", &self.delete_files);
        set(figment, "reclaim.settle_secs", &self.settle_secs)
    }
}

fn verbatim_env(figment: Figment) -> Figment {
    VERBATIM_ENV_KEYS.iter().fold(figment, |figment, key| {
        let var = format!("{}{}", ENV_PREFIX, key.replace('.', "__").to_uppercase());
        set(figment, key, &std::env::var(var).ok())
    })
}

fn set<T: Serialize>(figment: Figment, key: &str, value: &Option<T>) -> Figment {
    match value {
        Some(v) => figment.merge(Serialized::default(key, v)),
        None => figment,
    }
}

/// Load configuration from file with environment and command line overrides.
///
/// An explicitly given `path` must exist; without one, `spacegate.toml` in
/// the working directory is used when present.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.display().to_string()));
            }
            figment = figment.merge(Toml::file(path));
        }
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                debug!("Using default config file {:?}", default_path);
                figment = figment.merge(Toml::file(default_path));
            }
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
    figment = verbatim_env(figment);
    figment = overrides.apply(figment);

    let mut config: Config = figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    expand_env_placeholders(&mut config)?;
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    let mut config: Config =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    expand_env_placeholders(&mut config)?;
    Ok(config)
}

/// Replace `$NAME` credentials with the value of environment variable NAME.
fn expand_env_placeholders(config: &mut Config) -> Result<(), ConfigError> {
    let Some(qbit) = config
        .torrent_client
        .as_mut()
        .and_then(|tc| tc.qbittorrent.as_mut())
    else {
        return Ok(());
    };

    for value in [&mut qbit.url, &mut qbit.username, &mut qbit.password] {
        if let Some(name) = value.strip_prefix('$').map(str::to_string) {
            *value = std::env::var(&name).map_err(|_| ConfigError::MissingEnvVar(name))?;
        }
    }
    Ok(())
}
