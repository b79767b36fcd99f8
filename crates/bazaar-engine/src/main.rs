//! Bazaar pricing engine entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Dynamic market-pricing and anti-manipulation engine.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BAZAAR_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    bazaar_telemetry::init_logging()?;

    info!("Starting bazaar pricing engine v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config {
        Some(path) => bazaar_engine::AppConfig::from_file(&path),
        None => bazaar_engine::AppConfig::load(),
    };

    let app = bazaar_engine::Application::new(config)?;
    app.run().await?;

    Ok(())
}
