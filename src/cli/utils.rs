//! Shared CLI utilities.

use clap::Args;
use std::path::PathBuf;
use webconf::{logging, OverrideFlags, Resolution, Resolver};

/// Source selection and overrides shared by every resolving command.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Config file to load instead of probing config.toml/config.yaml
    #[arg(short = 'c', long, value_name = "FILE", env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Dotenv file to load instead of .env in the base directory
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Directory the conventional config and .env paths are relative to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub base_dir: PathBuf,

    /// Ignore process environment variables
    #[arg(long)]
    pub no_env: bool,

    #[command(flatten)]
    pub overrides: OverrideFlags,
}

impl ResolveArgs {
    pub fn resolver(&self) -> Resolver {
        let resolver = Resolver::new(&self.base_dir)
            .config_file(self.config.clone())
            .dotenv_file(self.env_file.clone())
            .flags(self.overrides.clone());
        if self.no_env {
            resolver.without_env()
        } else {
            resolver
        }
    }
}

/// Resolve under a scoped stderr subscriber, since the real logger depends
/// on the outcome.
pub fn resolve(args: &ResolveArgs, verbose: bool) -> anyhow::Result<Resolution> {
    let resolver = args.resolver();
    let resolution = tracing::subscriber::with_default(logging::bootstrap_subscriber(verbose), || {
        resolver.resolve_detailed()
    })?;
    Ok(resolution)
}

/// Mask values that hold credentials.
pub fn display_value(key: &str, value: &str) -> String {
    match key {
        "database.password" if !value.is_empty() => "***".to_string(),
        "database.url" => webconf::domain::redact_url_password(value),
        _ => value.to_string(),
    }
}
