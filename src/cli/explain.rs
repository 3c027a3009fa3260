//! Explain command implementation

use anyhow::Result;
use clap::Args;

use super::utils::{display_value, resolve, ResolveArgs};
use webconf::config::SourceOutcome;

#[derive(Args)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub resolve: ResolveArgs,
}

pub fn run(args: ExplainArgs, verbose: bool) -> Result<()> {
    let resolution = resolve(&args.resolve, verbose)?;

    println!("Sources:");
    for (source, outcome) in &resolution.sources {
        match outcome {
            SourceOutcome::Absent => println!("  {}: absent", source),
            SourceOutcome::ParseError { path, message } => {
                println!("  {}: unreadable {} ({})", source, path.display(), message)
            }
            SourceOutcome::Loaded { path: Some(path), layer } => {
                println!("  {}: {} keys from {}", source, layer.len(), path.display())
            }
            SourceOutcome::Loaded { path: None, layer } => {
                println!("  {}: {} keys", source, layer.len())
            }
        }
    }

    let width = resolution.store.iter().map(|(key, _)| key.field().len()).max().unwrap_or(0);

    // Store iteration is key-ordered, so each section's fields are contiguous.
    let mut current_section = None;
    for (key, entry) in resolution.store.iter() {
        if current_section != Some(key.section()) {
            current_section = Some(key.section());
            println!("{}:", key.section());
        }
        let value = display_value(key.as_str(), &entry.value.to_string());
        println!("  {:width$}  {}  [{}]", key.field(), value, entry.origin, width = width);
    }

    Ok(())
}
