//! Headless pipeline driver
//!
//! Loads the diagram from a running collector, polls its events and runs the
//! scheduler against an in-memory surface, logging every transition.
//!
//! Run with: cargo run --bin archflow-cli -- --url http://127.0.0.1:5000

use std::time::Duration;

use archflow::core::{
    AnimationMode, EnqueueOutcome, HeadlessSurface, Poller, Scheduler, SchedulerConfig,
};
use archflow::fetch::{CollectorClient, DEFAULT_COLLECTOR_URL};
use archflow::time::now_millis;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "archflow-cli", about = "Replay collector events against the diagram without a GUI")]
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

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,archflow=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let client = CollectorClient::new(&args.url);
    info!(url = client.base_url(), "Loading graph");
    let loaded = match client.fetch_graph().await {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "Could not load diagram");
            std::process::exit(1);
        }
    };

    let config = SchedulerConfig {
        mode: args.mode,
        ..SchedulerConfig::default()
    };
    let mut surface = HeadlessSurface::new(&loaded.graph);
    let mut scheduler = Scheduler::new(&loaded.graph, &loaded.mapping, config);
    if let Err(e) = scheduler.set_speed(args.speed_ms) {
        warn!(error = %e, "Keeping default speed");
    }
    let mut poller = Poller::new();

    info!(
        mode = %scheduler.config().mode,
        speed_ms = scheduler.config().speed_ms,
        "Polling for events"
    );

    let mut poll_interval = tokio::time::interval(Duration::from_secs(1));
    let mut frame_interval = tokio::time::interval(Duration::from_millis(16));
    let mut stats_interval = tokio::time::interval(Duration::from_secs(5));
    let mut polls_failed = 0u64;

    loop {
        tokio::select! {
            _ = poll_interval.tick() => {
                let now = now_millis();
                poller.begin(now);
                let result = client.fetch_events().await;
                poller.finish();
                match result {
                    Ok(window) => {
                        for event in poller.observe(window) {
                            let id = event.id.clone();
                            match scheduler.enqueue(event, &mut surface, now_millis()) {
                                EnqueueOutcome::Accepted => info!(event_id = %id, "Event queued"),
                                EnqueueOutcome::Discarded { .. } => {}
                            }
                        }
                    }
                    Err(e) => {
                        polls_failed += 1;
                        warn!(error = %e, "Poll failed");
                    }
                }
            }
            _ = frame_interval.tick() => {
                scheduler.tick(&mut surface, now_millis());
            }
            _ = stats_interval.tick() => {
                let stats = scheduler.stats();
                info!(
                    accepted = stats.accepted,
                    discarded = stats.discarded,
                    completed = stats.completed,
                    missing_edge = stats.missing_edge,
                    pending = scheduler.pending_len(),
                    animating = scheduler.running().len(),
                    markers = surface.marker_count(),
                    seen = poller.seen().len(),
                    polls_failed,
                    "stats"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }
    Ok(())
}
