//! Typed binding of the canonical store into [`ResolvedConfig`]
//!
//! Any coercion failure aborts the whole bind; there is no partially bound
//! config.

use super::layer::RawValue;
use super::merge::CanonicalStore;
use crate::domain::{
    AppConfig, DatabaseConfig, LogFormat, ResolvedConfig, SecurityConfig, ServerConfig,
};
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

pub fn bind(store: &CanonicalStore) -> Result<ResolvedConfig, ConfigError> {
    let server = ServerConfig {
        port: number(store, "server.port")?,
        host: string(store, "server.host")?,
        read_timeout: duration(store, "server.read_timeout")?,
        write_timeout: duration(store, "server.write_timeout")?,
        idle_timeout: duration(store, "server.idle_timeout")?,
        shutdown_timeout: duration(store, "server.shutdown_timeout")?,
    };

    let database = DatabaseConfig {
        url: string(store, "database.url")?,
        max_connections: number(store, "database.max_connections")?,
        min_connections: number(store, "database.min_connections")?,
        timeout: duration(store, "database.timeout")?,
        max_conn_lifetime: duration(store, "database.max_conn_lifetime")?,
        max_conn_idle_time: duration(store, "database.max_conn_idle_time")?,
        run_migrations: boolean(store, "database.run_migrations")?,
        ssl_mode: string(store, "database.ssl_mode")?,
    };

    let app = AppConfig {
        environment: string(store, "app.environment")?,
        debug: boolean(store, "app.debug")?,
        log_level: string(store, "app.log_level")?,
        log_format: log_format(store, "app.log_format")?,
    };

    let security = SecurityConfig {
        trusted_proxies: list(store, "security.trusted_proxies")?,
        enable_cors: boolean(store, "security.enable_cors")?,
        allowed_origins: list(store, "security.allowed_origins")?,
    };

    Ok(ResolvedConfig { server, database, app, security })
}

fn raw<'a>(store: &'a CanonicalStore, key: &str) -> Result<&'a RawValue, ConfigError> {
    store.get(key).ok_or_else(|| ConfigError::MissingValue { key: key.to_string() })
}

fn scalar<'a>(
    store: &'a CanonicalStore,
    key: &str,
    expected: &'static str,
) -> Result<&'a str, ConfigError> {
    match raw(store, key)? {
        RawValue::Scalar(s) => Ok(s.trim()),
        RawValue::List(items) => Err(ConfigError::coercion(
            key,
            expected,
            format!("[{}]", items.join(", ")),
            "lists are not accepted here",
        )),
    }
}

fn string(store: &CanonicalStore, key: &str) -> Result<String, ConfigError> {
    scalar(store, key, "a string").map(str::to_string)
}

fn number<T>(store: &CanonicalStore, key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = scalar(store, key, "an integer")?;
    value.parse().map_err(|e| ConfigError::coercion(key, "an integer", value, e))
}

fn duration(store: &CanonicalStore, key: &str) -> Result<Duration, ConfigError> {
    let value = scalar(store, key, "a duration")?;
    humantime::parse_duration(value).map_err(|e| ConfigError::coercion(key, "a duration", value, e))
}

fn boolean(store: &CanonicalStore, key: &str) -> Result<bool, ConfigError> {
    let value = scalar(store, key, "a boolean")?;
    parse_bool(value).ok_or_else(|| {
        ConfigError::coercion(key, "a boolean", value, "use true/false, 1/0, yes/no or on/off")
    })
}

fn log_format(store: &CanonicalStore, key: &str) -> Result<LogFormat, ConfigError> {
    let value = scalar(store, key, "a log format")?;
    LogFormat::parse(value)
        .ok_or_else(|| ConfigError::coercion(key, "a log format", value, "use text or json"))
}

fn list(store: &CanonicalStore, key: &str) -> Result<Vec<String>, ConfigError> {
    let items: Vec<String> = match raw(store, key)? {
        RawValue::List(items) => items
            .iter()
            .map(|item| item.trim())
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        RawValue::Scalar(s) => parse_csv(s),
    };
    Ok(items)
}

/// Split a comma-separated string, trimming whitespace and discarding empty
/// segments.
pub fn parse_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
