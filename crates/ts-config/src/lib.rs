//! # ts-config
//!
//! Layered settings: built-in defaults, then an optional `config/threadspire.toml`,
//! then `THREADSPIRE__SECTION__KEY` environment variables (a `.env` file is
//! loaded first when present).

use config::{Config, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "THREADSPIRE";
const CONFIG_FILE: &str = "config/threadspire";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    pub service: ServiceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub backend: Backend,
    /// Connection string; may carry credentials, so it is never logged.
    pub url: SecretString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// An `EnvFilter` directive such as `info` or `ts_services=debug,info`.
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServiceSettings {
    pub max_write_attempts: u32,
}

impl Settings {
    pub fn load() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self, SettingsError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5001)?
            .set_default("database.backend", "memory")?
            .set_default("database.url", "sqlite:threadspire.db")?
            .set_default("log.level", "info")?
            .set_default("log.format", "compact")?
            .set_default("service.max_write_attempts", 3)?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(env.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        debug!(backend = ?settings.database.backend, addr = %settings.server.addr(), "settings loaded");
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.service.max_write_attempts == 0 {
            return Err(SettingsError::Invalid(
                "service.max_write_attempts must be at least 1".to_string(),
            ));
        }
        if self.log.level.trim().is_empty() {
            return Err(SettingsError::Invalid("log.level must not be empty".to_string()));
        }
        Ok(())
    }
}
