//! Command-line overrides, the highest-precedence input layer

use super::layer::{CanonicalKey, Layer, LayerSource, RawValue};
use crate::error::ConfigError;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser};
use std::collections::BTreeMap;

/// One flag per overridable canonical key. Flag names are the keys.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideFlags {
    /// Server port
    #[arg(long = "server.port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Server host
    #[arg(long = "server.host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Database URL (skips URL assembly from credentials)
    #[arg(long = "database.url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Database host
    #[arg(long = "database.host", value_name = "HOST")]
    pub database_host: Option<String>,

    /// Database port
    #[arg(long = "database.port", value_name = "PORT")]
    pub database_port: Option<u16>,

    /// Database name
    #[arg(long = "database.name", value_name = "NAME")]
    pub database_name: Option<String>,

    /// Run migrations at startup
    #[arg(
        long = "database.run_migrations",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub database_run_migrations: Option<bool>,

    /// Environment name (production enables lockdown)
    #[arg(long = "app.environment", value_name = "ENV")]
    pub app_environment: Option<String>,

    /// Debug mode
    #[arg(
        long = "app.debug",
        value_name = "BOOL",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub app_debug: Option<bool>,

    /// Log level: debug, info, warn or error
    #[arg(long = "app.log_level", value_name = "LEVEL")]
    pub app_log_level: Option<String>,

    /// Trusted proxies (comma-separated)
    #[arg(long = "security.trusted_proxies", value_name = "LIST")]
    pub security_trusted_proxies: Option<String>,

    /// Allowed CORS origins (comma-separated)
    #[arg(long = "security.allowed_origins", value_name = "LIST")]
    pub security_allowed_origins: Option<String>,
}

/// Standalone parser for the flag surface, used when flags arrive as a raw
/// argument vector instead of through the `webconf` binary.
#[derive(Parser, Debug)]
#[command(name = "webconf-flags", no_binary_name = true, disable_help_flag = true)]
struct FlagSurface {
    #[command(flatten)]
    flags: OverrideFlags,
}

impl OverrideFlags {
    /// Parse an argument vector (without the program name). Anything outside
    /// the declared surface is a [`ConfigError::FlagParse`].
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let surface = FlagSurface::try_parse_from(args)?;
        Ok(surface.flags)
    }

    /// Only flags that were actually given end up in the layer.
    pub fn to_layer(&self) -> Layer {
        let entries: [(&str, Option<String>); 12] = [
            ("server.port", self.server_port.map(|v| v.to_string())),
            ("server.host", self.server_host.clone()),
            ("database.url", self.database_url.clone()),
            ("database.host", self.database_host.clone()),
            ("database.port", self.database_port.map(|v| v.to_string())),
            ("database.name", self.database_name.clone()),
            ("database.run_migrations", self.database_run_migrations.map(|v| v.to_string())),
            ("app.environment", self.app_environment.clone()),
            ("app.debug", self.app_debug.map(|v| v.to_string())),
            ("app.log_level", self.app_log_level.clone()),
            ("security.trusted_proxies", self.security_trusted_proxies.clone()),
            ("security.allowed_origins", self.security_allowed_origins.clone()),
        ];

        let values: BTreeMap<CanonicalKey, RawValue> = entries
            .into_iter()
            .filter_map(|(key, value)| Some((CanonicalKey::parse(key)?, RawValue::Scalar(value?))))
            .collect();

        Layer::new(LayerSource::Flags, values)
    }
}
