//! Show command implementation

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::utils::{resolve, ResolveArgs};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Print the database password instead of masking it
    #[arg(long)]
    pub show_secrets: bool,

    #[command(flatten)]
    pub resolve: ResolveArgs,
}

pub fn run(args: ShowArgs, verbose: bool) -> Result<()> {
    let mut config = resolve(&args.resolve, verbose)?.config;
    if !args.show_secrets {
        config.database.url = config.database.redacted_url();
    }

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&config)?,
        OutputFormat::Toml => toml::to_string_pretty(&config)?,
    };
    println!("{}", rendered.trim_end());

    Ok(())
}
