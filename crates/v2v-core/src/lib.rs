//! `v2v-core` — foundational types for the v2v connectivity simulator.
//!
//! This crate is a dependency of every other `v2v-*` crate.  It has no
//! `v2v-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `NodeId`, `EdgeId`, `MacroCellId`, `MicroCellId` |
//! | [`geo`]         | `GeoPoint`, haversine distance, interpolation              |
//! | [`time`]        | `Tick`, `SimClock`, `TimeSource` implementations           |
//! | [`rng`]         | `VehicleRng` (per-vehicle), `SimRng` (global)              |
//! | [`road_class`]  | `RoadClass` enum and the drivable allow-list               |
//! | [`radio`]       | `Transceiver`, the per-rebuild radio snapshot of a vehicle |
//! | [`error`]       | `V2vError`, `V2vResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod radio;
pub mod rng;
pub mod road_class;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{V2vError, V2vResult};
pub use geo::{GeoBounds, GeoPoint};
pub use ids::{EdgeId, MacroCellId, MicroCellId, NodeId, VehicleId};
pub use radio::Transceiver;
pub use rng::{SimRng, VehicleRng};
pub use road_class::RoadClass;
pub use time::{ManualTimeSource, MonotonicTimeSource, SimClock, Tick, TimeSource};
