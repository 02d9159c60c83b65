//! Connection settings read from the environment.
//!
//! | variable                     | default     |
//! |------------------------------|-------------|
//! | `PERSONAL_DATA_DB_USERNAME`  | `root`      |
//! | `PERSONAL_DATA_DB_PASSWORD`  | (empty)     |
//! | `PERSONAL_DATA_DB_HOST`      | `localhost` |
//! | `PERSONAL_DATA_DB_PORT`      | `3306`      |
//! | `PERSONAL_DATA_DB_NAME`      | required    |

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const ENV_USERNAME: &str = "PERSONAL_DATA_DB_USERNAME";
pub const ENV_PASSWORD: &str = "PERSONAL_DATA_DB_PASSWORD";
pub const ENV_HOST: &str = "PERSONAL_DATA_DB_HOST";
pub const ENV_PORT: &str = "PERSONAL_DATA_DB_PORT";
pub const ENV_NAME: &str = "PERSONAL_DATA_DB_NAME";

const DEFAULT_USERNAME: &str = "root";
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3306;

/// MySQL / MariaDB database name: alphanumeric, underscore, hyphen, 1-64 chars.
static DB_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{1,64}$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database: String,
}

impl DbConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(ENV_USERNAME).unwrap_or_else(|| DEFAULT_USERNAME.to_string());
        let password = lookup(ENV_PASSWORD).unwrap_or_default();
        let host = lookup(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(ENV_PORT) {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: ENV_PORT,
                value: raw.clone(),
            })?,
        };

        let database = lookup(ENV_NAME)
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::Missing(ENV_NAME))?;
        if !DB_NAME_RE.is_match(&database) {
            return Err(ConfigError::Invalid {
                var: ENV_NAME,
                value: database,
            });
        }

        Ok(Self {
            username,
            password,
            host,
            port,
            database,
        })
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish()
    }
}
