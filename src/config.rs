use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use log::info;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// One year; token lifetimes beyond this are treated as misconfiguration.
const MAX_TTL_HOURS: i64 = 24 * 365;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub secret_key: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// A signup with this email may take the ADMIN role without an admin
    /// token. Used to create the first administrator.
    pub admin_email: Option<String>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = required(&lookup, "SECRET_KEY")?;
        let database_url = required(&lookup, "DATABASE_URL")?;
        let access_hours = ttl_hours(&lookup, "ACCESS_TOKEN_TTL_HOURS", "24")?;
        let refresh_hours = ttl_hours(&lookup, "REFRESH_TOKEN_TTL_HOURS", "168")?;
        let admin_email = lookup("ADMIN_EMAIL")
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());

        Ok(Config {
            port: try_load(&lookup, "PORT", "8080")?,
            database_url,
            secret_key,
            access_token_ttl: Duration::hours(access_hours),
            refresh_token_ttl: Duration::hours(refresh_hours),
            admin_email,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            port: 8080,
            database_url: String::from("postgres://localhost/test"),
            secret_key: String::from("test-secret"),
            access_token_ttl: Duration::hours(24),
            refresh_token_ttl: Duration::hours(168),
            admin_email: Some(String::from("owner@example.com")),
        }
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
}

fn ttl_hours<F>(lookup: &F, key: &'static str, default: &str) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let hours: i64 = try_load(lookup, key, default)?;
    if !(1..=MAX_TTL_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("must be between 1 and {MAX_TTL_HOURS} hours"),
        });
    }
    Ok(hours)
}
