//! Generator configuration.
//!
//! # Scale factor
//!
//! Counts not given explicitly are derived from `scale_factor` the way the
//! BerlinMOD benchmark scales its data sets:
//!
//! ```text
//! warehouses = round(100  · √sf)        (at least 1)
//! vehicles   = round(1000 · √sf)        (at least 1)
//! days       = round(28   · √sf) + 2
//! ```
//!
//! The default scale factor 0.005 yields 7 warehouses, 71 vehicles and
//! 4 days.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::time::Calendar;
use crate::{DlError, DlResult};

// ── RouteMode ─────────────────────────────────────────────────────────────────

/// Edge weighting used by the routing engine.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RouteMode {
    /// Minimise travel time (length / speed limit).
    #[default]
    Fastest,
    /// Minimise distance.
    Shortest,
}

impl RouteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteMode::Fastest  => "fastest",
            RouteMode::Shortest => "shortest",
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = DlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastest"  => Ok(RouteMode::Fastest),
            "shortest" => Ok(RouteMode::Shortest),
            other => Err(DlError::Parse(format!(
                "invalid route mode {other:?}: expected \"fastest\" or \"shortest\""
            ))),
        }
    }
}

// ── Verbosity ─────────────────────────────────────────────────────────────────

/// How much progress reporting a run produces.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Verbosity {
    None,
    #[default]
    Minimal,
    Medium,
    Verbose,
}

impl Verbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            Verbosity::None    => "none",
            Verbosity::Minimal => "minimal",
            Verbosity::Medium  => "medium",
            Verbosity::Verbose => "verbose",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verbosity {
    type Err = DlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none"    => Ok(Verbosity::None),
            "minimal" => Ok(Verbosity::Minimal),
            "medium"  => Ok(Verbosity::Medium),
            "verbose" => Ok(Verbosity::Verbose),
            other => Err(DlError::Parse(format!(
                "invalid verbosity {other:?}: expected none, minimal, medium or verbose"
            ))),
        }
    }
}

// ── GeneratorConfig ───────────────────────────────────────────────────────────

/// Top-level generator configuration.
///
/// Typically loaded from a JSON file by the CLI and then patched with
/// command-line overrides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorConfig {
    /// Derives the counts below when they are `None`.
    pub scale_factor: f64,

    pub warehouses: Option<u32>,
    pub vehicles:   Option<u32>,
    pub days:       Option<u32>,

    /// First calendar day of the run.
    pub start_day: NaiveDate,

    pub route_mode: RouteMode,

    /// Add positional noise to generated trajectories.
    pub disturb: bool,

    pub verbosity: Verbosity,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Maximum number of (source, target) pairs per routing call.
    pub batch_size: usize,

    /// Pauses shorter than this are not materialised in trajectories.
    pub min_pause_ms: u64,

    /// Vehicles never travel slower than this, whatever the speed limit.
    pub min_velocity_kmh: f64,

    /// Maximum gap between consecutive trajectory instants while moving.
    /// `0` emits one instant per geometry vertex only.
    pub sampling_interval_ms: u64,

    /// Redraws allowed per destination before planning gives up.
    pub max_destination_retries: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            scale_factor:            0.005,
            warehouses:              None,
            vehicles:                None,
            days:                    None,
            start_day:               NaiveDate::from_ymd_opt(2020, 6, 1).unwrap_or_default(),
            route_mode:              RouteMode::Fastest,
            disturb:                 false,
            verbosity:               Verbosity::Minimal,
            seed:                    1,
            batch_size:              1_000,
            min_pause_ms:            300,
            min_velocity_kmh:        1.0,
            sampling_interval_ms:    0,
            max_destination_retries: 1_000,
        }
    }
}

impl GeneratorConfig {
    pub fn warehouse_count(&self) -> u32 {
        self.warehouses
            .unwrap_or_else(|| scaled(100.0, self.scale_factor).max(1))
    }

    pub fn vehicle_count(&self) -> u32 {
        self.vehicles
            .unwrap_or_else(|| scaled(1_000.0, self.scale_factor).max(1))
    }

    pub fn day_count(&self) -> u32 {
        self.days
            .unwrap_or_else(|| scaled(28.0, self.scale_factor) + 2)
    }

    /// The run's calendar.
    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.start_day, self.day_count())
    }

    /// Reject configurations the generator cannot run with.
    pub fn validate(&self) -> DlResult<()> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(DlError::Config(format!(
                "scale factor must be positive, got {}",
                self.scale_factor
            )));
        }
        if self.warehouse_count() == 0 {
            return Err(DlError::Config("warehouse count must be at least 1".into()));
        }
        if self.vehicle_count() == 0 {
            return Err(DlError::Config("vehicle count must be at least 1".into()));
        }
        if self.day_count() == 0 {
            return Err(DlError::Config("day count must be at least 1".into()));
        }
        if self.batch_size == 0 {
            return Err(DlError::Config("batch size must be at least 1".into()));
        }
        if !(self.min_velocity_kmh.is_finite() && self.min_velocity_kmh > 0.0) {
            return Err(DlError::Config(format!(
                "minimum velocity must be positive, got {}",
                self.min_velocity_kmh
            )));
        }
        if self.max_destination_retries == 0 {
            return Err(DlError::Config(
                "max destination retries must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn scaled(base: f64, scale_factor: f64) -> u32 {
    (base * scale_factor.max(0.0).sqrt()).round() as u32
}
