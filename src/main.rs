//! webconf: resolve and inspect layered service configuration

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
