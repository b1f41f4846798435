use dl_core::Timestamp;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("a trajectory needs at least one instant")]
    Empty,

    #[error("instant at {next} does not follow {previous}")]
    NonMonotonic { previous: Timestamp, next: Timestamp },

    #[error("trajectories meet at {time} in two different positions")]
    Discontinuous { time: Timestamp },
}

pub type TrajectoryResult<T> = Result<T, TrajectoryError>;
