use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub db_max_connections: u32,

    /// How long the office-location list is served from memory before the
    /// next clock-in reloads it.
    pub office_cache_ttl_secs: u64,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_clock_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 10)?,
            office_cache_ttl_secs: parsed_or("OFFICE_CACHE_TTL_SECS", 60)?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            rate_clock_per_min: parsed_or("RATE_CLOCK_PER_MIN", 30)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: parsed_or("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: jwt_secret.to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            office_cache_ttl_secs: 60,
            rate_protected_per_min: 1000,
            rate_clock_per_min: 1000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
        }
    }
}
