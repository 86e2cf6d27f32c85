//! `v2v-antenna` — hierarchical spatial index for the interference graph.
//!
//! The plane is covered by a handful of *macro* cells whose centres follow
//! the fleet's density (a few rounds of k-means over a sample of vehicle
//! positions).  Each macro cell is tiled by a uniform grid of *micro* cells.
//! Every vehicle is assigned to its nearest micro cell, and a vehicle's
//! candidate partners are the members of its own micro cell and of the
//! micro cells within link range of it.
//!
//! # Soundness
//!
//! Two micro cells are neighbours when their centres are at most
//! `link_range + r1 + r2` apart, where `link_range` is the largest
//! transmission range currently in the fleet.  That bound only holds for
//! vehicles that actually lie within their cell's radius.  Vehicles that
//! drifted outside the covered area are assigned as *strays*: every nearby
//! query includes them, and their own candidate set is the whole fleet.  The
//! index therefore never hides a true link, it just degrades towards a full
//! scan when the fleet wanders far from where the grid was laid out.
//!
//! # Crate layout
//!
//! | Module          | Contents                                           |
//! |-----------------|----------------------------------------------------|
//! | [`config`]      | `GridConfig`                                       |
//! | [`grid`]        | `AntennaGrid`, `MacroAntenna`, `MicroAntenna`, `GridStats` |
//! | [`placement`]   | position sampling, k-means, micro-cell layout      |
//! | [`collections`] | `IdMap` / `IdSet` (FxHash with the `fx-hash` feature) |

pub mod collections;
pub mod config;
pub mod grid;
pub mod placement;

#[cfg(test)]
mod tests;

pub use collections::{IdMap, IdSet};
pub use config::GridConfig;
pub use grid::{AntennaGrid, GridStats, MacroAntenna, MicroAntenna};
