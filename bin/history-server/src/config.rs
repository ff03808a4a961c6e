//! Server configuration.
//!
//! Settings load from the embedded `base_config.ron` and are overridden by
//! `SAFEHISTORY_`-prefixed environment variables.

use core::{num::NonZeroUsize, time::Duration};

use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Loads the configuration, applying environment overrides on top of the
/// embedded base file.
///
/// Nested keys use double underscores: `SAFEHISTORY_APP__LISTEN` maps to
/// `app.listen`.
///
/// # Errors
///
/// If the configuration could not be loaded or parsed
pub fn get_configuration() -> Result<Config, ConfigError> {
    config::Config::builder()
        .add_source(File::from_str(include_str!("base_config.ron"), FileFormat::Ron))
        .add_source(
            Environment::with_prefix(Config::CONFIG_ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

/// All server settings.
#[derive(Deserialize)]
pub struct Config {
    /// Listener and CORS settings
    pub app: AppConfig,

    /// Database settings
    pub db: DbConfig,

    /// Ledger node settings
    pub ledger: LedgerConfig,
}

/// Listener and CORS settings.
#[derive(Deserialize)]
pub struct AppConfig {
    /// The address to listen on (e.g., "0.0.0.0:8000")
    pub listen: String,

    /// Allowed CORS origins; `["*"]` allows all, `[]` disables CORS
    pub cors_allowed_origins: Vec<String>,
}

/// Database settings.
#[derive(Deserialize)]
pub struct DbConfig {
    /// The PostgreSQL connection URL
    pub db_url: String,

    /// Upper bound on pooled connections
    pub max_conn: NonZeroUsize,
}

/// Ledger node settings.
#[derive(Deserialize)]
pub struct LedgerConfig {
    /// The JSON-RPC endpoint wallet state is read from
    pub rpc_url: String,

    /// Per-request timeout for ledger reads (humantime form, e.g. "30s")
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Config {
    const CONFIG_ENV_PREFIX: &str = "SAFEHISTORY";
}
