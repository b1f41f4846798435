//! Timestamped point sequences.

use std::fmt;

use dl_core::time::format_timestamp;
use dl_core::{LineString, Point, Timestamp};

use crate::{TrajectoryError, TrajectoryResult};

/// Positions closer than this are treated as the same place (metres).
pub const POSITION_EPSILON_M: f64 = 1e-6;

// ── Instant ───────────────────────────────────────────────────────────────────

/// A position at a moment in time.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instant {
    pub point: Point,
    pub time:  Timestamp,
}

impl Instant {
    #[inline]
    pub fn new(point: Point, time: Timestamp) -> Self {
        Self { point, time }
    }
}

/// MobilityDB instant form, e.g. `POINT(1 2)@2020-06-01 07:00:00.000`.
impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.point, format_timestamp(self.time))
    }
}

// ── Trajectory ────────────────────────────────────────────────────────────────

/// A non-empty sequence of instants with strictly increasing timestamps.
///
/// Position between two instants is their linear interpolation.  All
/// mutators preserve the ordering invariant and report a
/// [`TrajectoryError`] instead of breaking it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    instants: Vec<Instant>,
}

impl Trajectory {
    /// Validate and wrap a sequence of instants.
    pub fn new(instants: Vec<Instant>) -> TrajectoryResult<Self> {
        if instants.is_empty() {
            return Err(TrajectoryError::Empty);
        }
        for pair in instants.windows(2) {
            if pair[1].time <= pair[0].time {
                return Err(TrajectoryError::NonMonotonic {
                    previous: pair[0].time,
                    next:     pair[1].time,
                });
            }
        }
        Ok(Self { instants })
    }

    pub fn instants(&self) -> &[Instant] {
        &self.instants
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    fn first(&self) -> Instant {
        self.instants[0]
    }

    fn last(&self) -> Instant {
        self.instants[self.instants.len() - 1]
    }

    pub fn start_time(&self) -> Timestamp {
        self.first().time
    }

    pub fn end_time(&self) -> Timestamp {
        self.last().time
    }

    pub fn start_point(&self) -> Point {
        self.first().point
    }

    pub fn end_point(&self) -> Point {
        self.last().point
    }

    /// Travelled distance in metres, summed over consecutive instants.
    pub fn length(&self) -> f64 {
        self.instants
            .windows(2)
            .map(|w| w[0].point.distance(w[1].point))
            .sum()
    }

    /// Append an instant at `point`, strictly after the current end time.
    ///
    /// Used to model a vehicle standing still: appending the end position at
    /// a later time stretches the trajectory without moving it.
    pub fn append_stationary(&mut self, point: Point, time: Timestamp) -> TrajectoryResult<()> {
        let end = self.end_time();
        if time <= end {
            return Err(TrajectoryError::NonMonotonic { previous: end, next: time });
        }
        self.instants.push(Instant::new(point, time));
        Ok(())
    }

    /// Concatenate trajectories in order.
    ///
    /// Where one part starts exactly when the previous one ends, the shared
    /// instant must be at the same position and is kept once.  A part that
    /// starts later leaves a gap that is bridged by interpolation.
    pub fn merge(parts: &[Trajectory]) -> TrajectoryResult<Trajectory> {
        let Some((head, tail)) = parts.split_first() else {
            return Err(TrajectoryError::Empty);
        };
        let total = parts.iter().map(Trajectory::len).sum();
        let mut instants: Vec<Instant> = Vec::with_capacity(total);
        instants.extend_from_slice(&head.instants);

        for part in tail {
            let prev = instants[instants.len() - 1];
            let next = part.first();
            let skip = if next.time < prev.time {
                return Err(TrajectoryError::NonMonotonic { previous: prev.time, next: next.time });
            } else if next.time == prev.time {
                if prev.point.distance(next.point) > POSITION_EPSILON_M {
                    return Err(TrajectoryError::Discontinuous { time: next.time });
                }
                1
            } else {
                0
            };
            instants.extend_from_slice(&part.instants[skip..]);
        }
        Ok(Trajectory { instants })
    }

    /// The travelled path as a line, with consecutive duplicate positions
    /// (stops) collapsed.
    pub fn trace(&self) -> LineString {
        let mut points: Vec<Point> = Vec::with_capacity(self.instants.len());
        for inst in &self.instants {
            match points.last() {
                Some(last) if last.distance(inst.point) <= POSITION_EPSILON_M => {}
                _ => points.push(inst.point),
            }
        }
        LineString::new(points)
    }
}

/// MobilityDB sequence form: `[POINT(x y)@t1, POINT(x y)@t2, …]`.
impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, inst) in self.instants.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{inst}")?;
        }
        f.write_str("]")
    }
}
