//! Check command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{resolve, ResolveArgs};
use webconf::logging;

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,
}

pub fn run(args: CheckArgs, verbose: bool) -> Result<()> {
    let config = resolve(&args.resolve, verbose)?.config;

    logging::init(&config.app)?;
    tracing::info!(
        environment = %config.app.environment,
        listen = %config.server.listen_addr(),
        log_format = %config.app.log_format,
        "configuration resolved"
    );

    println!("Configuration OK");
    println!("  Environment: {}", config.app.environment);
    println!("  Listen address: {}", config.server.listen_addr());
    println!("  Database: {}", config.database.redacted_url());
    println!(
        "  Pool: {}..{} connections",
        config.database.min_connections, config.database.max_connections
    );
    if config.app.is_production() {
        println!("  Production lockdown: active");
    }

    Ok(())
}
