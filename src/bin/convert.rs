//! Convert a draw.io diagram into `objects.json` and a `mapping.json` stub
//!
//! Run with: cargo run --bin archflow-convert -- diagram.drawio --out-dir public

use std::path::PathBuf;

use archflow::convert::convert_file;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "archflow-convert", about = "Convert a draw.io diagram to a graph description")]
struct Args {
    /// Path to the .drawio / .xml file
    diagram: PathBuf,

    /// Directory receiving objects.json and mapping.json
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,archflow=debug"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if !args.diagram.is_file() {
        error!(path = %args.diagram.display(), "Diagram file does not exist");
        eprintln!("usage: archflow-convert <diagram> [--out-dir <dir>]");
        std::process::exit(1);
    }

    let result = convert_file(&args.diagram).and_then(|conversion| {
        let paths = conversion.write_outputs(&args.out_dir)?;
        Ok((conversion, paths))
    });

    match result {
        Ok((conversion, paths)) => info!(
            nodes = conversion.graph.nodes.len(),
            edges = conversion.graph.edges.len(),
            mapping_entries = conversion.mapping.len(),
            skipped = conversion.skipped,
            objects = %paths.objects.display(),
            mapping = %paths.mapping.display(),
            "Conversion complete"
        ),
        Err(e) => {
            error!(error = %e, path = %args.diagram.display(), "Conversion failed");
            std::process::exit(1);
        }
    }
}
