//! Server configuration loaded from the environment.
//!
//! A `.env` file in the working directory is honoured when present. Every
//! key has a default, so an empty environment yields a working local setup
//! backed by `todos.db`.

use std::env;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite connection URL.
    pub database_url: String,
    pub max_connections: u32,
    pub app_host: String,
    pub app_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://todos.db".to_string(),
            max_connections: 5,
            app_host: "127.0.0.1".to_string(),
            app_port: 3000,
        }
    }
}

impl AppConfig {
    /// Reads `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `APP_HOST` and
    /// `PORT`, falling back to [`AppConfig::default`] for each one unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary key source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parsed(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            app_host: lookup("APP_HOST").unwrap_or(defaults.app_host),
            app_port: parsed(&lookup, "PORT", defaults.app_port)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
            key,
            message: err.to_string(),
        }),
    }
}
