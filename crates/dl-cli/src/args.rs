//! Command-line arguments.
//!
//! Settings are resolved in three layers: `GeneratorConfig::default()`, then
//! the optional JSON file given with `--config`, then individual flags.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use dl_core::{GeneratorConfig, RouteMode, Verbosity};

use crate::network::DEFAULT_GRID_SIZE;

pub const CONFIG_ARG_NAME: &str = "config";
pub const NODES_ARG_NAME: &str = "nodes";
pub const EDGES_ARG_NAME: &str = "edges";
pub const GRID_ARG_NAME: &str = "grid";
pub const OUT_DIR_ARG_NAME: &str = "out-dir";
pub const FORMAT_ARG_NAME: &str = "format";
pub const SCALE_FACTOR_ARG_NAME: &str = "scale-factor";
pub const WAREHOUSES_ARG_NAME: &str = "warehouses";
pub const VEHICLES_ARG_NAME: &str = "vehicles";
pub const DAYS_ARG_NAME: &str = "days";
pub const START_DAY_ARG_NAME: &str = "start-day";
pub const ROUTE_MODE_ARG_NAME: &str = "route-mode";
pub const DISTURB_ARG_NAME: &str = "disturb";
pub const VERBOSITY_ARG_NAME: &str = "verbosity";
pub const SEED_ARG_NAME: &str = "seed";
pub const BATCH_SIZE_ARG_NAME: &str = "batch-size";
pub const SAMPLING_ARG_NAME: &str = "sampling-interval-ms";
pub const NO_RESTRICT_ARG_NAME: &str = "no-restrict";

// ── OutputFormat ──────────────────────────────────────────────────────────────

/// Output backend selected with `--format`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Sqlite,
    Parquet,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Csv     => "csv",
            OutputFormat::Sqlite  => "sqlite",
            OutputFormat::Parquet => "parquet",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv"     => Ok(OutputFormat::Csv),
            "sqlite"  => Ok(OutputFormat::Sqlite),
            "parquet" => Ok(OutputFormat::Parquet),
            other => Err(format!("unknown output format {other:?}")),
        }
    }
}

// ── Network source ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub enum NetworkSource {
    Files { nodes: PathBuf, edges: PathBuf },
    Grid(u32),
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Everything `main` needs, resolved from the command line.
#[derive(Clone, Debug)]
pub struct Settings {
    pub config:   GeneratorConfig,
    pub network:  NetworkSource,
    pub out_dir:  PathBuf,
    pub format:   OutputFormat,
    pub restrict: bool,
}

impl Settings {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let mut config = match matches.get_one::<PathBuf>(CONFIG_ARG_NAME) {
            Some(path) => load_config(path)?,
            None => GeneratorConfig::default(),
        };
        apply_overrides(&mut config, matches);
        config.validate().context("invalid configuration")?;

        let network = match (
            matches.get_one::<PathBuf>(NODES_ARG_NAME),
            matches.get_one::<PathBuf>(EDGES_ARG_NAME),
        ) {
            (Some(nodes), Some(edges)) => NetworkSource::Files {
                nodes: nodes.clone(),
                edges: edges.clone(),
            },
            (None, None) => NetworkSource::Grid(
                matches.get_one::<u32>(GRID_ARG_NAME).copied().unwrap_or(DEFAULT_GRID_SIZE),
            ),
            _ => bail!("--{NODES_ARG_NAME} and --{EDGES_ARG_NAME} must be given together"),
        };

        Ok(Self {
            config,
            network,
            out_dir:  matches
                .get_one::<PathBuf>(OUT_DIR_ARG_NAME)
                .cloned()
                .unwrap_or_else(|| PathBuf::from("output")),
            format:   matches.get_one::<OutputFormat>(FORMAT_ARG_NAME).copied().unwrap_or_default(),
            restrict: !matches.get_flag(NO_RESTRICT_ARG_NAME),
        })
    }
}

/// Read a JSON configuration.  Missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let file = File::open(path).with_context(|| format!("cannot open config file '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse config file '{}'", path.display()))
}

fn apply_overrides(config: &mut GeneratorConfig, m: &ArgMatches) {
    if let Some(&v) = m.get_one::<f64>(SCALE_FACTOR_ARG_NAME) {
        config.scale_factor = v;
    }
    if let Some(&v) = m.get_one::<u32>(WAREHOUSES_ARG_NAME) {
        config.warehouses = Some(v);
    }
    if let Some(&v) = m.get_one::<u32>(VEHICLES_ARG_NAME) {
        config.vehicles = Some(v);
    }
    if let Some(&v) = m.get_one::<u32>(DAYS_ARG_NAME) {
        config.days = Some(v);
    }
    if let Some(&v) = m.get_one::<NaiveDate>(START_DAY_ARG_NAME) {
        config.start_day = v;
    }
    if let Some(&v) = m.get_one::<RouteMode>(ROUTE_MODE_ARG_NAME) {
        config.route_mode = v;
    }
    if m.get_flag(DISTURB_ARG_NAME) {
        config.disturb = true;
    }
    if let Some(&v) = m.get_one::<Verbosity>(VERBOSITY_ARG_NAME) {
        config.verbosity = v;
    }
    if let Some(&v) = m.get_one::<u64>(SEED_ARG_NAME) {
        config.seed = v;
    }
    if let Some(&v) = m.get_one::<usize>(BATCH_SIZE_ARG_NAME) {
        config.batch_size = v;
    }
    if let Some(&v) = m.get_one::<u64>(SAMPLING_ARG_NAME) {
        config.sampling_interval_ms = v;
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

pub fn command() -> Command {
    Command::new("deliveries")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates delivery vehicle trajectories on a road network")
        .arg(
            Arg::new(CONFIG_ARG_NAME)
                .help("JSON configuration file; flags override its values")
                .short('c')
                .long(CONFIG_ARG_NAME)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(NODES_ARG_NAME)
                .help("Road network nodes CSV (id,x,y)")
                .long(NODES_ARG_NAME)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(EDGES_ARG_NAME)
                .help("Road network edges CSV (id,source,target,highway,...)")
                .long(EDGES_ARG_NAME)
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(GRID_ARG_NAME)
                .help("Side of the built-in grid network when no files are given")
                .long(GRID_ARG_NAME)
                .value_name("N")
                .conflicts_with_all([NODES_ARG_NAME, EDGES_ARG_NAME])
                .value_parser(value_parser!(u32).range(2..)),
        )
        .arg(
            Arg::new(OUT_DIR_ARG_NAME)
                .help("Directory for the output files [default: output]")
                .short('o')
                .long(OUT_DIR_ARG_NAME)
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(FORMAT_ARG_NAME)
                .help("Output backend: csv, sqlite or parquet [default: csv]")
                .short('f')
                .long(FORMAT_ARG_NAME)
                .value_parser(value_parser!(OutputFormat)),
        )
        .arg(
            Arg::new(SCALE_FACTOR_ARG_NAME)
                .help("Scale factor deriving warehouse, vehicle and day counts")
                .short('s')
                .long(SCALE_FACTOR_ARG_NAME)
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new(WAREHOUSES_ARG_NAME)
                .help("Number of warehouses")
                .long(WAREHOUSES_ARG_NAME)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new(VEHICLES_ARG_NAME)
                .help("Number of vehicles")
                .long(VEHICLES_ARG_NAME)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new(DAYS_ARG_NAME)
                .help("Number of days")
                .long(DAYS_ARG_NAME)
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new(START_DAY_ARG_NAME)
                .help("First day, YYYY-MM-DD")
                .long(START_DAY_ARG_NAME)
                .value_parser(value_parser!(NaiveDate)),
        )
        .arg(
            Arg::new(ROUTE_MODE_ARG_NAME)
                .help("fastest or shortest")
                .long(ROUTE_MODE_ARG_NAME)
                .value_parser(value_parser!(RouteMode)),
        )
        .arg(
            Arg::new(DISTURB_ARG_NAME)
                .help("Add positional noise to trajectories")
                .long(DISTURB_ARG_NAME)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new(VERBOSITY_ARG_NAME)
                .help("none, minimal, medium or verbose; RUST_LOG takes precedence")
                .short('v')
                .long(VERBOSITY_ARG_NAME)
                .value_parser(value_parser!(Verbosity)),
        )
        .arg(
            Arg::new(SEED_ARG_NAME)
                .help("RNG seed")
                .long(SEED_ARG_NAME)
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new(BATCH_SIZE_ARG_NAME)
                .help("Pairs per routing call")
                .long(BATCH_SIZE_ARG_NAME)
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new(SAMPLING_ARG_NAME)
                .help("Maximum gap between trajectory instants while moving; 0 = vertices only")
                .long(SAMPLING_ARG_NAME)
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new(NO_RESTRICT_ARG_NAME)
                .help("Do not restrict the network to its largest strongly-connected component")
                .long(NO_RESTRICT_ARG_NAME)
                .action(ArgAction::SetTrue),
        )
}
