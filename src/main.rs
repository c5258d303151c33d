use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use bookshelf::api::compose;
use bookshelf::config::{load_config, ServiceConfig};
use bookshelf::data::memory::MemoryDataAccess;
use bookshelf::lifecycle::{signals, startup, Shutdown};
use bookshelf::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Greeting and book catalog HTTP service", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate the configuration, print the route table and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        database = ?config.database.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "bookshelf starting"
    );

    if cli.check {
        let app = compose(Arc::new(MemoryDataAccess::new()), &config).await?;
        for route in app.routes() {
            println!(
                "{:<7} {:<28} {}",
                route.method().as_str(),
                route.pattern().as_str(),
                route.group()
            );
        }
        return Ok(());
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
