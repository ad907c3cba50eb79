use clap::Parser;
use tracing_subscriber::EnvFilter;

use masterblog::config::{Cli, Config};
use masterblog::shell::Shell;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging; stderr so the shell output stays clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config_path = Config::config_path(&cli);
    let config = Config::load(&cli)?;
    tracing::info!("Using API at {}", config.api.base_url);

    let shell = Shell::new(config, config_path)?;
    shell.run().await
}
