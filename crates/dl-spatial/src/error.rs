//! Spatial-subsystem error type.

use thiserror::Error;

use dl_core::NodeId;

/// Errors produced by `dl-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("{0} not found in network")]
    NodeNotFound(NodeId),

    #[error("road network has no nodes")]
    EmptyNetwork,

    #[error("edge {edge} references unknown node {node}")]
    UnknownNodeRef { edge: i64, node: i64 },

    #[error("duplicate node id {0}")]
    DuplicateNode(i64),

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
