//! Configuration loaded from the environment.
//!
//! A `.env` file is honored when present (see `main`). Every setting has a
//! default except `DATABASE_URL`, which the postgres backend requires.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::history::HistoryOrder;

/// Main configuration.
#[derive(Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    /// Present when `DATABASE_URL` is set.
    pub database: Option<DatabaseConfig>,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let history = HistoryConfig::from_env()?;
        let database = DatabaseConfig::from_env()?;

        if history.backend == HistoryBackend::Postgres && database.is_none() {
            return Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
        }

        Ok(Self {
            server: ServerConfig::from_env()?,
            history,
            database,
            logging: LoggingConfig::from_env()?,
        })
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: optional_env("CALCULADORA_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_env("CALCULADORA_PORT", 8000)?,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CALCULADORA_HOST".to_string(),
                message: format!("{e}"),
            })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Where operation records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for HistoryBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(HistoryBackend::Postgres),
            "memory" | "mem" => Ok(HistoryBackend::Memory),
            _ => Err(format!(
                "invalid history backend '{}', expected 'postgres' or 'memory'",
                s
            )),
        }
    }
}

/// History settings.
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    pub order: HistoryOrder,
}

impl HistoryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            backend: parse_env("HISTORY_BACKEND", HistoryBackend::Postgres)?,
            order: parse_env("HISTORY_ORDER", HistoryOrder::Ascending)?,
        })
    }
}

/// PostgreSQL connection settings.
#[derive(Debug)]
pub struct DatabaseConfig {
    url: SecretString,
    pub pool_size: usize,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: SecretString::from(url.into()),
            pool_size: 10,
            connect_timeout: Duration::from_secs(5),
        }
    }

    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(url) = optional_env("DATABASE_URL") else {
            return Ok(None);
        };

        Ok(Some(Self {
            url: SecretString::from(url),
            pool_size: parse_env("DATABASE_POOL_SIZE", 10)?,
            connect_timeout: Duration::from_secs(parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5)?),
        }))
    }

    pub fn url(&self) -> &SecretString {
        &self.url
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("invalid log format '{}', expected 'text' or 'json'", s)),
        }
    }
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

impl LoggingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            format: parse_env("LOG_FORMAT", LogFormat::Text)?,
            level: optional_env("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_env(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
