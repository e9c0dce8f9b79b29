//! orbview - headless live viewer for remote body simulations.

use protocol::templates::{all_templates, template};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod config;
mod control;
mod stream;

use cli::Command;
use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let command = match Command::parse(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    if command == Command::Templates {
        for t in all_templates() {
            println!("{:<20} {} ({} bodies)", t.key, t.title, t.params.space_objects.len());
        }
        return Ok(());
    }

    info!("orbview v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let path = Config::path();
    let config = Config::load(&path)?;
    info!("Loaded configuration from {}", path.display());
    info!("  Stream: {}", config.stream.url);
    info!("  Control API: {}", config.control.base_url);
    info!("  Canvas: {}x{}", config.display.width, config.display.height);
    info!(
        "  Scale bounds: [{}, {}]",
        config.viewer.min_scale, config.viewer.max_scale
    );

    let launch = match command {
        Command::Launch { template: key } => template(&key).map(|t| t.params),
        _ => None,
    };

    app::run(config, launch).await
}
