//! Native desktop viewer
//!
//! Run with: cargo run --features viewer --bin archflow-viewer -- --url http://127.0.0.1:5000

use archflow::app::{ArchflowApp, ViewerSettings};
use archflow::core::AnimationMode;
use archflow::fetch::DEFAULT_COLLECTOR_URL;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "archflow-viewer", about = "Animate collector events over the architecture diagram")]
struct Args {
    /// Collector base URL
    #[arg(long, env = "ARCHFLOW_URL", default_value = DEFAULT_COLLECTOR_URL)]
    url: String,

    /// Animation mode: sequential or auto
    #[arg(long, default_value = "sequential")]
    mode: AnimationMode,

    /// Duration of one animation in milliseconds
    #[arg(long, default_value_t = 1000)]
    speed_ms: u32,
}

fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,archflow=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();
    let settings = ViewerSettings {
        speed_ms: args.speed_ms,
        mode: args.mode,
        ..ViewerSettings::default()
    }
    .clamped();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("archflow")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "archflow",
        options,
        Box::new(move |cc| Ok(Box::new(ArchflowApp::new(cc, args.url, settings)))),
    )
}
