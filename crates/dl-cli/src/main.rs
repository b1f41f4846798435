//! deliveries — generate delivery-vehicle trajectories.
//!
//! Loads a road network (CSV files, or a built-in grid), creates warehouses
//! and vehicles, plans one route per vehicle and working day, routes every
//! leg, and writes warehouses, vehicles, deliveries and segments to the
//! chosen backend.
//!
//! ```text
//! deliveries --nodes nodes.csv --edges edges.csv -s 0.05 -o out -f parquet
//! ```
//!
//! Ctrl-C stops the run between routing batches or deliveries; rows already
//! produced are flushed before exit.

mod args;
mod network;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dl_core::Verbosity;
use dl_generator::{CancelToken, Generator, GeneratorBuilder, GeneratorObserver, RunSummary};
use dl_output::{CsvWriter, OutputObserver, OutputWriter};
use dl_spatial::{load_network_csv, RoadNetwork, Router};
use dl_trajectory::TrajectoryBuilder;

use args::{command, NetworkSource, OutputFormat, Settings};
use network::synthetic_grid;

// ── Logging ───────────────────────────────────────────────────────────────────

/// Default filter directive for a verbosity level.
fn log_directive(verbosity: Verbosity) -> &'static str {
    match verbosity {
        Verbosity::None    => "off",
        Verbosity::Minimal => "info",
        Verbosity::Medium  => "debug",
        Verbosity::Verbose => "trace",
    }
}

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(verbosity)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Network ───────────────────────────────────────────────────────────────────

fn load_network(source: &NetworkSource) -> Result<RoadNetwork> {
    let network = match source {
        NetworkSource::Files { nodes, edges } => load_network_csv(nodes, edges)
            .with_context(|| format!("cannot load network from '{}' and '{}'", nodes.display(), edges.display()))?,
        NetworkSource::Grid(size) => synthetic_grid(*size),
    };
    info!(nodes = network.node_count(), edges = network.edge_count(), "network loaded");
    Ok(network)
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn run<R: Router, B: TrajectoryBuilder>(
    generator: &Generator<R, B>,
    format:    OutputFormat,
    out_dir:   &Path,
) -> Result<RunSummary> {
    match format {
        OutputFormat::Csv => run_with(generator, CsvWriter::new(out_dir)?),

        #[cfg(feature = "sqlite")]
        OutputFormat::Sqlite => run_with(generator, dl_output::SqliteWriter::new(out_dir)?),

        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => run_with(generator, dl_output::ParquetWriter::new(out_dir)?),

        #[allow(unreachable_patterns)]
        other => bail!("output format '{other}' is not compiled in; rebuild with `--features {other}`"),
    }
}

fn run_with<R: Router, B: TrajectoryBuilder, W: OutputWriter>(
    generator: &Generator<R, B>,
    writer:    W,
) -> Result<RunSummary> {
    let mut observer = OutputObserver::new(writer, &generator.network);
    let result = generator.run(&mut observer);
    if result.is_err() {
        // Close files so partial output stays readable.
        observer.on_run_end(&RunSummary::default());
    }
    let summary = result.context("generation failed")?;
    if let Some(e) = observer.take_error() {
        return Err(e).context("cannot write output");
    }
    Ok(summary)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let matches = command().get_matches();
    let settings = Settings::from_matches(&matches)?;
    init_logging(settings.config.verbosity);

    let network = load_network(&settings.network)?;

    let cancel = CancelToken::new();
    ctrlc::set_handler({
        let cancel = cancel.clone();
        move || cancel.cancel()
    })
    .context("cannot set interruption handler")?;

    let generator = GeneratorBuilder::new(settings.config.clone(), network)
        .cancel_token(cancel)
        .restrict_network(settings.restrict)
        .build()?;

    std::fs::create_dir_all(&settings.out_dir)
        .with_context(|| format!("cannot create output directory '{}'", settings.out_dir.display()))?;

    let t0 = Instant::now();
    let summary = run(&generator, settings.format, &settings.out_dir)?;
    info!(elapsed_ms = t0.elapsed().as_millis() as u64, format = %settings.format, "run complete");

    println!("{summary}");
    println!("output:              {} ({})", settings.out_dir.display(), settings.format);
    Ok(())
}
