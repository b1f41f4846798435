//! `dl-core` — foundational types for the delivery trajectory generator.
//!
//! This crate is a dependency of every other `dl-*` crate.  It intentionally
//! has no `dl-*` dependencies and few external ones (`rand`, `rand_distr`,
//! `chrono`, `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `EdgeId`, `WarehouseId`, `VehicleId`, `DeliveryId` |
//! | [`geo`]      | `Point`, `LineString` (projected metres, WKT display)     |
//! | [`time`]     | `Timestamp`, `Calendar`, duration helpers                 |
//! | [`rng`]      | `StreamRng`, `Stream` (seed-derived random streams)       |
//! | [`config`]   | `GeneratorConfig`, `RouteMode`, `Verbosity`               |
//! | [`error`]    | `DlError`, `DlResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{GeneratorConfig, RouteMode, Verbosity};
pub use error::{DlError, DlResult};
pub use geo::{LineString, Point};
pub use ids::{DeliveryId, EdgeId, NodeId, VehicleId, WarehouseId};
pub use rng::{Stream, StreamRng};
pub use time::{Calendar, Timestamp};
