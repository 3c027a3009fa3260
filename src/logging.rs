//! Logger construction from the resolved `app` section

use crate::domain::{AppConfig, LogFormat};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Effective level: `debug = true` forces DEBUG, otherwise `log_level`
/// decides and anything unrecognised means INFO.
pub fn level_for(app: &AppConfig) -> Level {
    if app.debug {
        return Level::DEBUG;
    }
    match app.log_level.trim().to_ascii_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the process-wide subscriber. Log lines go to stdout as text or
/// JSON. Fails if a global subscriber is already set.
pub fn init(app: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level_for(app).into());

    let (text, json) = match app.log_format {
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stdout))),
        LogFormat::Text => (Some(fmt::layer().with_writer(std::io::stdout)), None),
    };

    tracing_subscriber::registry()
        .with(text)
        .with(json)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {e}"))
}

/// Subscriber used while the configuration itself is being resolved, before
/// `app.log_level` is known. Writes to stderr.
pub fn bootstrap_subscriber(verbose: bool) -> impl tracing::Subscriber + Send + Sync {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.into()))
}
