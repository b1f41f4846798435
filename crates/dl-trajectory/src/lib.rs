//! `dl-trajectory` — timestamped vehicle trajectories.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`trajectory`] | `Instant`, `Trajectory` — append, merge, trace, MobilityDB text |
//! | [`builder`]    | `TrajectoryBuilder` trait, `KinematicBuilder` default          |
//! | [`error`]      | `TrajectoryError`, `TrajectoryResult<T>`                       |
//!
//! # Movement model
//!
//! A trajectory is a sequence of instants with strictly increasing
//! timestamps, linearly interpolated between instants.  The
//! [`KinematicBuilder`] turns the oriented steps of a routed path into such
//! a sequence:
//!
//! 1. Every geometry vertex becomes one instant; the vehicle drives each
//!    leg at the step's speed limit.
//! 2. Where the road category changes the vehicle may wait at the junction
//!    (one extra instant at the same position).
//! 3. Long legs are optionally densified to a fixed sampling interval.
//! 4. With disturbance enabled, interior instants drift by accumulated
//!    Gaussian noise, as a GPS receiver would report them.
//!
//! Any other constructor can be plugged in through [`TrajectoryBuilder`].

pub mod builder;
pub mod error;
pub mod trajectory;


pub use builder::{KinematicBuilder, TrajectoryBuilder};
pub use error::{TrajectoryError, TrajectoryResult};
pub use trajectory::{Instant, Trajectory};
