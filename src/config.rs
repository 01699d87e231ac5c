//! Backend connection settings.
//!
//! Settings are read from the environment by default. Hosts embedding the
//! crate can deserialize [`BackendConfig`] from their own configuration
//! instead.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the `PostgreSQL` connection URL.
pub const DATABASE_URL_VAR: &str = "DAYBOOK_DATABASE_URL";

/// Environment variable holding the connection pool size.
pub const MAX_CONNECTIONS_VAR: &str = "DAYBOOK_DB_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Connection settings for the hosted data service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    database_url: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
}

/// Errors raised while loading [`BackendConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

const fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl BackendConfig {
    /// Creates settings for `database_url` with the default pool size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = database_url.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Missing(DATABASE_URL_VAR));
        }
        Ok(Self {
            database_url: trimmed.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        })
    }

    /// Sets the connection pool size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `max_connections` is zero.
    pub fn with_max_connections(mut self, max_connections: u32) -> Result<Self, ConfigError> {
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: MAX_CONNECTIONS_VAR,
                value: max_connections.to_string(),
                reason: "pool size must be at least one",
            });
        }
        self.max_connections = max_connections;
        Ok(self)
    }

    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or the pool size is
    /// not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which maps variable names to
    /// values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the URL is missing or the pool size is
    /// not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(DATABASE_URL_VAR).ok_or(ConfigError::Missing(DATABASE_URL_VAR))?;
        let config = Self::new(url)?;
        match lookup(MAX_CONNECTIONS_VAR) {
            None => Ok(config),
            Some(raw) => {
                let size = raw.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                    key: MAX_CONNECTIONS_VAR,
                    value: raw.clone(),
                    reason: "expected a positive integer",
                })?;
                config.with_max_connections(size)
            }
        }
    }

    /// Returns the connection URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the connection pool size.
    #[must_use]
    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
