//! Runtime configuration loaded from the environment (and `.env` when present).
//!
//! Everything the server needs at startup is resolved here once, including the
//! signing secret for bearer tokens. A missing or weak secret is a startup
//! error; the server never falls back to a built-in key.

use std::env;
use thiserror::Error;

/// Minimum signing secret length in bytes (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// Minimum number of distinct byte values in the signing secret. Rejects
/// padded placeholders such as `"aaaa..."`.
pub const MIN_SECRET_DISTINCT_BYTES: usize = 8;

const DEFAULT_PUBLIC_PATH_PREFIX: &str = "/api/auth/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error("JWT_SECRET is too weak: {0}")]
    WeakSecret(&'static str),
}

/// Which persistence backend the server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub public_path_prefix: String,
    pub cors_allowed_origins: Vec<String>,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND")
            .unwrap_or_else(|| "postgres".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" | "pg" => StoreBackend::Postgres,
            "memory" | "mem" => StoreBackend::Memory,
            _ => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let server_port = match lookup("SERVER_PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("SERVER_PORT"))?,
            None => 8080,
        };

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        validate_secret(jwt_secret.as_bytes())?;

        let token_ttl_hours = match lookup("TOKEN_TTL_HOURS") {
            Some(hours) => hours
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0 && ttl_from_hours(*h).is_some())
                .ok_or(ConfigError::Invalid("TOKEN_TTL_HOURS"))?,
            None => 24,
        };

        let public_path_prefix = match lookup("PUBLIC_PATH_PREFIX") {
            Some(prefix) if prefix.starts_with('/') => prefix,
            Some(_) => return Err(ConfigError::Invalid("PUBLIC_PATH_PREFIX")),
            None => DEFAULT_PUBLIC_PATH_PREFIX.to_string(),
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(cost) => cost
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .ok_or(ConfigError::Invalid("BCRYPT_COST"))?,
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            store_backend,
            database_url,
            server_port,
            server_host,
            jwt_secret,
            token_ttl_hours,
            public_path_prefix,
            cors_allowed_origins,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

/// Rejects secrets that cannot carry 256 bits of key material.
/// Token lifetime for `hours`, or `None` when chrono cannot represent it.
pub fn ttl_from_hours(hours: i64) -> Option<chrono::Duration> {
    chrono::Duration::try_hours(hours)
}

pub fn validate_secret(secret: &[u8]) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::WeakSecret("must be at least 32 bytes"));
    }

    let mut seen = [false; 256];
    for byte in secret {
        seen[*byte as usize] = true;
    }
    if seen.iter().filter(|s| **s).count() < MIN_SECRET_DISTINCT_BYTES {
        return Err(ConfigError::WeakSecret("too few distinct characters"));
    }

    Ok(())
}
