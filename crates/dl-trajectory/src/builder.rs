//! Path-to-trajectory construction.
//!
//! # Kinematic model
//!
//! [`KinematicBuilder`] drives the oriented steps of a path in order:
//!
//! | Phase        | Behaviour                                                  |
//! |--------------|------------------------------------------------------------|
//! | drive        | each leg at `max(speed_limit, min_velocity_kmh)`           |
//! | junction     | on a category change, wait with probability [`stop_probability`] for a bounded-Gaussian time; waits under `min_pause_ms` are skipped |
//! | densify      | extra interpolated instants every `sampling_interval_ms` (0 = off) |
//! | disturb      | interior instants shifted by a random walk (step sd 1 m, radius ≤ 100 m) |
//!
//! Timestamps are rounded to the millisecond.  Two vertices that would
//! round to the same millisecond are separated by one millisecond so the
//! sequence stays strictly increasing.

use dl_core::time::millis;
use dl_core::{GeneratorConfig, Point, StreamRng, Timestamp};
use dl_spatial::{PathStep, RoadCategory};

use crate::trajectory::POSITION_EPSILON_M;
use crate::{Instant, Trajectory};

/// Standard deviation of one random-walk step of the disturbance (metres).
const NOISE_STEP_SD_M: f64 = 1.0;

/// Maximum distance a disturbed instant may drift from its true position.
const NOISE_MAX_M: f64 = 100.0;

/// Upper bound of a junction wait (milliseconds).
const MAX_JUNCTION_WAIT_MS: f64 = 30_000.0;

// ── TrajectoryBuilder ─────────────────────────────────────────────────────────

/// Turns a routed path into a timestamped trajectory.
///
/// # Contract
///
/// - The first instant is at `start`, at the first step's entry position.
/// - The last instant is at the last step's exit position.
/// - Returns `None` when the steps hold fewer than two distinct positions.
/// - All randomness is drawn from `rng`, so the same stream yields the same
///   trajectory.
pub trait TrajectoryBuilder: Send + Sync {
    fn build(
        &self,
        steps:   &[PathStep],
        start:   Timestamp,
        disturb: bool,
        rng:     &mut StreamRng,
    ) -> Option<Trajectory>;
}

// ── KinematicBuilder ──────────────────────────────────────────────────────────

/// Default [`TrajectoryBuilder`]: speed-limit driving with junction waits.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicBuilder {
    /// Junction waits shorter than this are not emitted.
    pub min_pause_ms:         u64,
    /// Floor applied to every step's speed limit.
    pub min_velocity_kmh:     f64,
    /// Maximum spacing between emitted instants; 0 emits vertices only.
    pub sampling_interval_ms: u64,
}

impl Default for KinematicBuilder {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

/// Probability of waiting when moving from a road of category `from` onto
/// one of category `to`.
///
/// Joining a more important road usually means yielding; turning off onto a
/// minor road rarely does.
pub fn stop_probability(from: RoadCategory, to: RoadCategory) -> f64 {
    if from == to {
        0.0
    } else if to.rank() < from.rank() {
        0.8
    } else {
        0.3
    }
}

impl KinematicBuilder {
    pub fn new(min_pause_ms: u64, min_velocity_kmh: f64, sampling_interval_ms: u64) -> Self {
        Self { min_pause_ms, min_velocity_kmh, sampling_interval_ms }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            config.min_pause_ms,
            config.min_velocity_kmh,
            config.sampling_interval_ms,
        )
    }

    /// Travel time over `distance_m` at `speed_kmh`, floored at the minimum
    /// velocity (milliseconds).
    fn leg_ms(&self, distance_m: f64, speed_kmh: f64) -> f64 {
        let kmh = speed_kmh.max(self.min_velocity_kmh);
        distance_m / (kmh / 3.6) * 1_000.0
    }
}

/// Accumulates instants while keeping timestamps strictly increasing.
struct Recorder {
    start:    Timestamp,
    instants: Vec<Instant>,
}

impl Recorder {
    fn push(&mut self, point: Point, offset_ms: f64) {
        let mut time = self.start + millis(offset_ms.round() as i64);
        if let Some(last) = self.instants.last() {
            if time <= last.time {
                time = last.time + millis(1);
            }
        }
        self.instants.push(Instant::new(point, time));
    }
}

impl TrajectoryBuilder for KinematicBuilder {
    fn build(
        &self,
        steps:   &[PathStep],
        start:   Timestamp,
        disturb: bool,
        rng:     &mut StreamRng,
    ) -> Option<Trajectory> {
        let mut rec = Recorder { start, instants: Vec::new() };
        let mut clock_ms = 0.0_f64;
        let mut last: Option<Point> = None;
        let mut prev_category: Option<RoadCategory> = None;

        for step in steps {
            // Junction wait at the shared vertex.
            if let (Some(from), Some(at)) = (prev_category, last) {
                let p = stop_probability(from, step.category);
                if p > 0.0 && rng.gen_bool(p) {
                    let wait = rng.bounded_gauss(0.0, MAX_JUNCTION_WAIT_MS);
                    if wait >= self.min_pause_ms as f64 {
                        clock_ms += wait;
                        rec.push(at, clock_ms);
                    }
                }
            }

            for &pt in step.geometry.points() {
                let Some(prev) = last else {
                    rec.push(pt, clock_ms);
                    last = Some(pt);
                    continue;
                };
                let distance = prev.distance(pt);
                if distance <= POSITION_EPSILON_M {
                    continue;
                }
                let leg = self.leg_ms(distance, step.speed_kmh);
                if self.sampling_interval_ms > 0 {
                    let pieces = (leg / self.sampling_interval_ms as f64).ceil() as usize;
                    for i in 1..pieces {
                        let f = i as f64 / pieces as f64;
                        rec.push(prev.lerp(pt, f), clock_ms + leg * f);
                    }
                }
                clock_ms += leg;
                rec.push(pt, clock_ms);
                last = Some(pt);
            }
            prev_category = Some(step.category);
        }

        let mut instants = rec.instants;
        let origin = instants.first()?.point;
        if !instants.iter().any(|i| i.point.distance(origin) > POSITION_EPSILON_M) {
            return None;
        }

        if disturb {
            disturb_interior(&mut instants, rng);
        }
        Trajectory::new(instants).ok()
    }
}

/// Shift every instant except the first and last by an accumulated
/// Gaussian random walk, clamped to [`NOISE_MAX_M`].
fn disturb_interior(instants: &mut [Instant], rng: &mut StreamRng) {
    let n = instants.len();
    if n < 3 {
        return;
    }
    let (mut dx, mut dy) = (0.0_f64, 0.0_f64);
    for inst in &mut instants[1..n - 1] {
        dx += rng.gauss(0.0, NOISE_STEP_SD_M);
        dy += rng.gauss(0.0, NOISE_STEP_SD_M);
        let r = dx.hypot(dy);
        if r > NOISE_MAX_M {
            dx *= NOISE_MAX_M / r;
            dy *= NOISE_MAX_M / r;
        }
        inst.point = inst.point.offset(dx, dy);
    }
}
