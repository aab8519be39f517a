//! Event collector server
//!
//! Serves the converted diagram next to a bounded window of posted events.
//!
//! Run with: cargo run --bin archflow-collector -- --data-dir diagrams/shop

use std::path::PathBuf;

use archflow::collector::{CollectorConfig, CollectorServer, DEFAULT_CAPACITY};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "archflow-collector", about = "Collect events and serve them with the diagram")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Directory containing objects.json and mapping.json
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Directory served as static files
    #[arg(long, default_value = "public")]
    static_dir: PathBuf,

    /// Do not serve static files
    #[arg(long)]
    no_static: bool,

    /// Number of events retained
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info,archflow=debug",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).with_target(true).init();
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = CollectorConfig {
        host: args.host,
        port: args.port,
        data_dir: args.data_dir,
        static_dir: (!args.no_static).then_some(args.static_dir),
        capacity: args.capacity,
        enable_cors: !args.no_cors,
        enable_tracing: true,
    };

    if let Err(e) = CollectorServer::new(config)
        .start_with_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Collector failed");
        std::process::exit(1);
    }
}
