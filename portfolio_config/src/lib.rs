use std::{
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use config::{Environment, File, FileFormat};
use portfolio_models::email_address::{EmailAddress, EmailAddressWithName};
use serde::Deserialize;

pub use duration::Duration;

mod duration;

pub const DEFAULT_CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../config.toml");

/// Colon separated list of additional config files, applied in order after the
/// default config.
pub const CONFIG_PATHS_ENV: &str = "PORTFOLIO_CONFIG";

/// Prefix of environment variables overriding single config values, e.g.
/// `PORTFOLIO__HTTP__PORT=8080`.
pub const ENV_PREFIX: &str = "PORTFOLIO";

/// Load the default config, any files listed in `PORTFOLIO_CONFIG` and
/// `PORTFOLIO__*` environment variables.
pub fn load() -> anyhow::Result<Config> {
    let mut paths = vec![PathBuf::from(DEFAULT_CONFIG_PATH)];
    if let Some(extra) = std::env::var_os(CONFIG_PATHS_ENV) {
        paths.extend(std::env::split_paths(&extra));
    }
    load_with_overrides(&paths, &[])
}

/// Load the default config file only, ignoring the environment.
pub fn load_dev_config() -> anyhow::Result<Config> {
    build(&[Path::new(DEFAULT_CONFIG_PATH)], &[], false)
}

/// Load the given config files followed by inline toml `overrides`.
pub fn load_with_overrides(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
) -> anyhow::Result<Config> {
    build(paths, overrides, true)
}

fn build(
    paths: &[impl AsRef<Path>],
    overrides: &[&str],
    environment: bool,
) -> anyhow::Result<Config> {
    let builder = paths
        .iter()
        .try_fold(config::Config::builder(), |builder, path| {
            let path = path.as_ref();
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file at {}", path.display()))?;
            let source = File::from_str(&content, FileFormat::Toml);
            anyhow::Ok(builder.add_source(source))
        })?;

    let builder = overrides.iter().fold(builder, |builder, &content| {
        builder.add_source(File::from_str(content, FileFormat::Toml))
    });

    let builder = if environment {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
    } else {
        builder
    };

    builder
        .build()?
        .try_deserialize()
        .context("Failed to load config")
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub http: HttpConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    pub email: EmailConfig,
    pub contact: ContactConfig,
    pub health: HealthConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
    pub port_attempts: u16,
}

#[derive(Debug, Default, Deserialize)]
pub struct PersistenceConfig {
    /// Contacts are kept in memory only if unset.
    pub snapshot_path: Option<PathBuf>,
    pub max_contacts: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct EmailConfig {
    /// Notifications are disabled if unset.
    pub smtp_url: Option<String>,
    pub from: EmailAddressWithName,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Recipient of contact form notifications.
    pub email: EmailAddress,
    pub owner_name: String,
    pub notification_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub struct HealthConfig {
    pub cache_ttl: Duration,
}
