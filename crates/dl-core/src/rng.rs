//! Deterministic, seed-derived random streams.
//!
//! # Determinism strategy
//!
//! A run has one master seed.  Every independent consumer of randomness
//! (fleet creation, the planner for one vehicle-day, the synthesizer for one
//! delivery) gets its own `SmallRng` seeded by:
//!
//!   seed = master_seed XOR (stream_key * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive keys uniformly across the seed space.  This
//! means:
//!
//! - Streams never share state, so vehicle-days can be planned and
//!   synthesised in any order (or in parallel) with identical results.
//! - Adding vehicles or days at the end does not disturb existing streams.
//! - No RNG is global; each is passed explicitly by `&mut`.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::VehicleId;

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Rejections allowed in [`StreamRng::bounded_gauss`] before clamping.
const BOUNDED_GAUSS_TRIES: usize = 64;

/// Purpose tag folded into a stream key so different phases drawing for the
/// same vehicle-day never collide.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stream {
    /// Warehouse placement.
    Warehouses,
    /// Vehicle attributes (licence, type, brand) for one vehicle.
    Vehicle(VehicleId),
    /// Destination planning for one vehicle on one day.
    Planning { vehicle: VehicleId, day: u32 },
    /// Trajectory synthesis for one vehicle on one day.
    Synthesis { vehicle: VehicleId, day: u32 },
}

impl Stream {
    /// Pack the tag into a 64-bit key: 4 bits of purpose, 32 bits of vehicle,
    /// 28 bits of day.
    fn key(self) -> u64 {
        let (tag, vehicle, day): (u64, u32, u32) = match self {
            Stream::Warehouses                  => (1, 0, 0),
            Stream::Vehicle(v)                  => (2, v.0, 0),
            Stream::Planning { vehicle, day }   => (3, vehicle.0, day),
            Stream::Synthesis { vehicle, day }  => (4, vehicle.0, day),
        };
        (tag << 60) | ((vehicle as u64) << 28) | (day as u64 & 0x0fff_ffff)
    }
}

// ── StreamRng ─────────────────────────────────────────────────────────────────

/// A deterministic random stream derived from the run seed.  Each stream
/// belongs to exactly one task.
pub struct StreamRng(SmallRng);

impl StreamRng {
    /// Seed deterministically from the run's master seed and a stream tag.
    pub fn new(master_seed: u64, stream: Stream) -> Self {
        let seed = master_seed ^ stream.key().wrapping_mul(MIXING_CONSTANT);
        StreamRng(SmallRng::seed_from_u64(seed))
    }

    /// Seed directly, bypassing stream derivation.  Handy in tests.
    pub fn from_seed(seed: u64) -> Self {
        StreamRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// Uniform integer in `[lo, hi]` (both inclusive).  Returns `lo` when the
    /// range is empty.
    #[inline]
    pub fn uniform_int(&mut self, lo: u32, hi: u32) -> u32 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Choose a random element from a slice.
    /// Returns `None` if the slice is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.0)
    }

    /// Gaussian deviate with the given mean and standard deviation.
    ///
    /// A non-finite, zero or negative `sd` degenerates to `mean`.
    pub fn gauss(&mut self, mean: f64, sd: f64) -> f64 {
        if !(sd.is_finite() && sd > 0.0) {
            return mean;
        }
        match Normal::new(mean, sd) {
            Ok(normal) => normal.sample(&mut self.0),
            Err(_) => mean,
        }
    }

    /// Gaussian value restricted to `[lo, hi]`.
    ///
    /// Mean is the interval midpoint and the standard deviation a quarter of
    /// its width, so roughly 95 % of raw draws already fall inside.  Draws
    /// outside are rejected; after `BOUNDED_GAUSS_TRIES` rejections the last
    /// draw is clamped.
    pub fn bounded_gauss(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        let mean = (lo + hi) / 2.0;
        let sd = (hi - lo) / 4.0;
        let mut value = mean;
        for _ in 0..BOUNDED_GAUSS_TRIES {
            value = self.gauss(mean, sd);
            if (lo..=hi).contains(&value) {
                return value;
            }
        }
        value.clamp(lo, hi)
    }
}
