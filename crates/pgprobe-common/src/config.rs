//! Probe configuration loaded from defaults, config files, the environment and
//! command-line overrides.
//!
//! Supports `.env` files for development.
//! Config precedence: overrides > env vars > .env file > config file > defaults

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Name of the optional config file looked up in the working directory
/// (`pgprobe.toml`, `pgprobe.yaml`, ...).
pub const DEFAULT_CONFIG_NAME: &str = "pgprobe";

/// Environment prefix, e.g. `PGPROBE_DATABASE__HOST`.
pub const ENV_PREFIX: &str = "PGPROBE";

/// Load the configuration, reading `.env` and `PGPROBE_*` environment variables.
///
/// `file` is an explicit config file that must exist; `overrides` come from the
/// command line and win over every other source.
pub fn load(file: Option<&Path>, overrides: &ConnectionOverrides) -> Result<ProbeConfig, ConfigError> {
    // Load .env file if present (development)
    let _ = dotenvy::dotenv();

    build(file, Some(environment()), overrides)
}

/// `PGPROBE_*` variables, nested with `__` (`PGPROBE_DATABASE__PORT`).
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

/// Assemble the configuration from the given sources without touching the
/// process environment unless `env` is supplied.
pub fn build(
    file: Option<&Path>,
    env: Option<Environment>,
    overrides: &ConnectionOverrides,
) -> Result<ProbeConfig, ConfigError> {
    let mut builder = defaults()?
        .add_source(File::with_name(DEFAULT_CONFIG_NAME).required(false));

    if let Some(path) = file {
        builder = builder.add_source(File::from(path).required(true));
    }

    if let Some(env) = env {
        builder = builder.add_source(env);
    }

    let cfg = overrides.apply(builder)?.build()?;
    let probe_config: ProbeConfig = cfg.try_deserialize()?;
    tracing::debug!(
        host = %probe_config.database.host,
        port = probe_config.database.port,
        database = %probe_config.database.name,
        user = %probe_config.database.user,
        url = probe_config.database.url.is_some(),
        "Configuration loaded"
    );
    Ok(probe_config)
}

/// The coordinates a local development database is expected at.
fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("database.host", "localhost")?
        .set_default("database.port", 5432)?
        .set_default("database.name", "dentist_db")?
        .set_default("database.user", "postgres")?
        .set_default("database.password", "postgres")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Full PostgreSQL connection URL. When set, the discrete fields below are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Database name
    pub name: String,
    pub user: String,
    pub password: String,
}

/// Values supplied on the command line. `None` leaves the lower-precedence
/// sources in charge.
#[derive(Debug, Default, Clone)]
pub struct ConnectionOverrides {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ConnectionOverrides {
    fn apply(
        &self,
        mut builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        if let Some(url) = &self.url {
            builder = builder.set_override("database.url", url.as_str())?;
        }
        if let Some(host) = &self.host {
            builder = builder.set_override("database.host", host.as_str())?;
        }
        if let Some(port) = self.port {
            builder = builder.set_override("database.port", i64::from(port))?;
        }
        if let Some(database) = &self.database {
            builder = builder.set_override("database.name", database.as_str())?;
        }
        if let Some(user) = &self.user {
            builder = builder.set_override("database.user", user.as_str())?;
        }
        if let Some(password) = &self.password {
            builder = builder.set_override("database.password", password.as_str())?;
        }
        Ok(builder)
    }
}
