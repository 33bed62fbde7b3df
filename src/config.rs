//! Process configuration, read from the environment once at boot.
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `PORT` | `3000` | listen port |
//! | `API_PREFIX` | `api` | prefix for every registered route |
//! | `APP_ENV` | `development` | `production` switches logging and DB target rules |
//! | `LOG_LEVEL` | `debug` / `info` in production | used when `RUST_LOG` is unset |
//! | `DATABASE_HOST`, `DATABASE_PORT` | unset, `27017` | discrete target |
//! | `DATABASE_URL` | unset | full connection string |
//! | `DATABASE_NAME` | unset | database to open |
//! | `DATABASE_USER`, `DATABASE_PASSWORD` | unset | credentials for host/port targets |
//!
//! Empty values count as unset.

use std::net::SocketAddr;
use std::str::FromStr;

use tracing::debug;

use crate::db::ConnectionConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub api_prefix: String,
    pub is_production: bool,
    pub log_level: String,
    pub database: ConnectionConfig,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let is_production = get("APP_ENV").is_some_and(|env| env.eq_ignore_ascii_case("production"));
        let default_level = if is_production { "info" } else { "debug" };

        Ok(Self {
            port: parse(&get, "PORT")?.unwrap_or(3000),
            api_prefix: get("API_PREFIX").unwrap_or_else(|| "api".to_owned()),
            is_production,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| default_level.to_owned()),
            database: ConnectionConfig {
                host: get("DATABASE_HOST"),
                port: parse(&get, "DATABASE_PORT")?,
                username: get("DATABASE_USER"),
                password: get("DATABASE_PASSWORD"),
                database_name: get("DATABASE_NAME"),
                is_production,
                url: get("DATABASE_URL"),
            },
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

fn parse<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(key)
        .map(|value| value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }))
        .transpose()
}
