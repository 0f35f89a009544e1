mod commands;

use clap::Parser;
use kalenteri::startup;
use tracing::debug;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = commands::Cli::parse();

    // Initialize logging
    startup::init_logging(startup::CLI_LOG_FILTER)?;

    // Load configuration
    let config = startup::load_config()?;
    debug!("Using API at {}", config.api_base_url);

    commands::run(cli, config).await?;
    Ok(())
}
