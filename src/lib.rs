//! webconf: layered startup configuration for web services
//!
//! Resolves defaults, a TOML/YAML config file, a dotenv file, environment
//! variables and command-line flags into one immutable [`ResolvedConfig`]
//! consumed by the HTTP server, the database pool and the logger.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::{OverrideFlags, Resolution, Resolver};
pub use domain::{AppConfig, DatabaseConfig, LogFormat, ResolvedConfig, SecurityConfig, ServerConfig};
pub use error::ConfigError;
