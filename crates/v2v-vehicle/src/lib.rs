//! `v2v-vehicle` — vehicles moving over the shared road graph.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`vehicle`] | `Vehicle`, `VehicleParams`, `UpdateOutcome`                     |
//! | [`motion`]  | edge-selection policy at intersections                          |
//! | [`fleet`]   | `VehicleFleet`, the id-indexed arena owning every vehicle       |
//! | [`spawn`]   | `random_drivable_node`, the spawn-point picker                  |
//! | [`error`]   | `VehicleError`, `VehicleResult<T>`                              |
//!
//! # Movement model (continuous edge interpolation)
//!
//! 1. A vehicle sits on a directed half-edge `current → next` with
//!    `progress_m` metres already covered.
//! 2. `update(dt)` advances `speed * dt` metres.  Distance left over after
//!    reaching `next` carries onto the following edge, for as many edges as
//!    the step covers.
//! 3. At each intersection a new edge is drawn at random from the drivable
//!    half-edges, avoiding an immediate U-turn unless it is the only option.
//! 4. Reaching the destination swaps origin and destination, so vehicles
//!    commute back and forth indefinitely.
//!
//! Positions are never stored: [`Vehicle::position`] interpolates between
//! the endpoints of the current edge on demand.

pub mod error;
pub mod fleet;
pub mod motion;
pub mod spawn;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use error::{VehicleError, VehicleResult};
pub use fleet::VehicleFleet;
pub use spawn::random_drivable_node;
pub use vehicle::{UpdateOutcome, Vehicle, VehicleParams};
