//! Oriented path steps.

use dl_core::{EdgeId, LineString};

use crate::RoadCategory;

/// One edge of an assembled path, with its geometry already oriented in the
/// direction of travel.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathStep {
    pub edge:      EdgeId,
    /// Geometry from the step's entry node to its exit node.
    pub geometry:  LineString,
    pub speed_kmh: f64,
    pub category:  RoadCategory,
}
