//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use larder_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LARDER_BIND_ADDR: {value:?} is not a socket address")]
    BindAddr { value: String },
    #[error("LARDER_LOG_FORMAT: {0}")]
    LogFormat(#[from] larder_observability::UnknownLogFormat),
    #[error("DATABASE_URL: {value:?} is not a sqlite:// url")]
    DatabaseUrl { value: String },
}

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Nothing survives a restart.
    InMemory,
    Sqlite { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = get("LARDER_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::BindAddr { value: bind_addr.clone() })?;

        let store = match get("DATABASE_URL") {
            Some(url) if url.starts_with("sqlite:") => StoreConfig::Sqlite { url },
            Some(url) => return Err(ConfigError::DatabaseUrl { value: url }),
            None => StoreConfig::InMemory,
        };

        let log_format = match get("LARDER_LOG_FORMAT") {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            store,
            log_format,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store: StoreConfig::InMemory,
            log_format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("LARDER_BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "sqlite://larder.db"),
            ("LARDER_LOG_FORMAT", "pretty"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(
            config.store,
            StoreConfig::Sqlite {
                url: "sqlite://larder.db".to_string()
            }
        );
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap();
        assert_eq!(config.store, StoreConfig::InMemory);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("LARDER_BIND_ADDR", "localhost")])),
            Err(ConfigError::BindAddr { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")])),
            Err(ConfigError::DatabaseUrl { .. })
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("LARDER_LOG_FORMAT", "xml")])),
            Err(ConfigError::LogFormat(_))
        ));
    }
}
