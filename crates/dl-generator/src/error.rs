use dl_core::{DlError, EdgeId, NodeId, VehicleId};
use dl_spatial::SpatialError;
use dl_trajectory::TrajectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("configuration error: {0}")]
    Config(#[from] DlError),

    #[error("the road network has no nodes")]
    EmptyNetwork,

    #[error("routing failed: {0}")]
    Routing(#[from] SpatialError),

    #[error("path row {seq} of {from}→{to} uses {edge}, which does not leave {node}")]
    InvalidPathRow {
        from:   NodeId,
        to:     NodeId,
        seq:    u32,
        node:   NodeId,
        edge:   EdgeId,
    },

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("no free destination for {vehicle} on day {day} after {retries} draws")]
    DestinationExhausted {
        vehicle: VehicleId,
        day:     u32,
        retries: u32,
    },

    #[error("trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("generation cancelled")]
    Cancelled,
}

pub type GenResult<T> = Result<T, GenError>;
