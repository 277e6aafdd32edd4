//! Configuration loading and representation.
//!
//! Everything is read from environment variables. Optional settings that are
//! missing or unparsable fall back to defaults with a warning; settings the
//! process cannot run without produce a [`ConfigError`].

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::batch::BatchProcessorConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")]
    MissingDatabaseUrl,

    #[error("invalid BIND_ADDR {value:?}: {reason}")]
    InvalidBindAddr { value: String, reason: String },

    #[error("BATCH_POOL_SIZE must be at least 1")]
    ZeroPoolSize,
}

/// Which item store backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub batch: BatchProcessorConfig,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                value: bind_raw.clone(),
                reason: e.to_string(),
            })?;

        let use_persistent = parse_or(&lookup, "USE_PERSISTENT_STORES", false);
        let store = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        let defaults = BatchProcessorConfig::default();
        let pool_size: usize = parse_or(&lookup, "BATCH_POOL_SIZE", defaults.pool_size);
        if pool_size == 0 {
            return Err(ConfigError::ZeroPoolSize);
        }

        let mut batch = defaults.with_pool_size(pool_size);
        if let Some(ms) = parse_opt::<u64>(&lookup, "BATCH_DEADLINE_MS") {
            batch = batch.with_deadline(Duration::from_millis(ms));
        }

        Ok(Self {
            bind_addr,
            store,
            batch,
        })
    }
}

fn parse_opt<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    parse_opt(lookup, key).unwrap_or(default)
}
