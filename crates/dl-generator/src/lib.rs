//! `dl-generator` — the delivery synthesis pipeline.
//!
//! # Phases
//!
//! ```text
//! ① Fleet       — warehouses on random nodes, vehicles assigned round-robin.
//! ② Plan        — per working vehicle-day: [warehouse, 3–7 customers, warehouse];
//!                 distinct consecutive pairs collected in first-seen order.
//! ③ Route       — pairs sent to the Router in batches of `batch_size`;
//!                 raw rows assembled into oriented path steps.
//! ④ Synthesize  — per plan: one trajectory per leg, dwell at customers,
//!                 segments merged into the delivery trajectory.  A leg
//!                 without a path drops the whole delivery.
//! ```
//!
//! Every vehicle-day draws from its own seed-derived [`StreamRng`][dl_core::StreamRng]
//! stream, so a run is reproducible from its seed alone.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`fleet`]       | `Fleet`, `Warehouse`, `Vehicle`                          |
//! | [`planner`]     | `RoutePlan`, `plan_stops`, `PairRegistry`                |
//! | [`compiler`]    | `batches`, `route_pairs`                                 |
//! | [`assembler`]   | `PathTable`, `assemble`, `assemble_into`                 |
//! | [`synthesizer`] | `DeliverySynthesizer`                                    |
//! | [`records`]     | `DeliveryRecord`, `SegmentRecord`, `DeliveryOutcome`     |
//! | [`generator`]   | `Generator`, `RunSummary`                                |
//! | [`builder`]     | `GeneratorBuilder`                                       |
//! | [`observer`]    | `GeneratorObserver`, `NoopObserver`                      |
//! | [`cancel`]      | `CancelToken`                                            |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Plans and synthesizes vehicle-days on Rayon's pool.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dl_core::GeneratorConfig;
//! use dl_generator::{GeneratorBuilder, NoopObserver};
//!
//! let generator = GeneratorBuilder::new(GeneratorConfig::default(), network).build()?;
//! let summary = generator.run(&mut NoopObserver)?;
//! println!("{summary}");
//! ```

pub mod assembler;
pub mod builder;
pub mod cancel;
pub mod compiler;
pub mod error;
pub mod fleet;
pub mod generator;
pub mod observer;
pub mod planner;
pub mod records;
pub mod synthesizer;

#[cfg(test)]
mod tests;

pub use assembler::PathTable;
pub use builder::GeneratorBuilder;
pub use cancel::CancelToken;
pub use error::{GenError, GenResult};
pub use fleet::{Fleet, Vehicle, Warehouse};
pub use generator::{Generator, RunSummary};
pub use observer::{GeneratorObserver, NoopObserver};
pub use planner::{PairRegistry, RoutePlan};
pub use records::{DeliveryOutcome, DeliveryRecord, DropReason, SegmentRecord};
pub use synthesizer::DeliverySynthesizer;
