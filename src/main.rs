use anyhow::Result;
use clap::Parser;
use opensearch_explain::cli::Cli;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the structured output.
    let default_level = if cli.verbose() { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli.run()
}
