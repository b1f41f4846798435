//! `dl-spatial` — road network, batch routing, and network loading.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR over arcs), `RoadNetworkBuilder`, `RoadCategory` |
//! | [`router`]  | `Router` trait, `PathRow`, `DijkstraRouter`                 |
//! | [`path`]    | `PathStep` — one oriented step of an assembled path         |
//! | [`loader`]  | `load_network_csv`, `load_network_readers`                  |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod loader;
pub mod network;
pub mod path;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use loader::{load_network_csv, load_network_readers};
pub use network::{EdgeSpec, RoadCategory, RoadNetwork, RoadNetworkBuilder};
pub use path::PathStep;
pub use router::{DijkstraRouter, PathRow, Router};
