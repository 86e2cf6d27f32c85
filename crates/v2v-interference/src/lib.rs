//! `v2v-interference` — who can talk to whom.
//!
//! An [`InterferenceGraph`] is rebuilt from a snapshot of every vehicle's
//! position and transmission range:
//!
//! ```text
//! rebuild(snapshot):
//!   ① Scan     — enumerate candidate pairs: every pair (classic, O(n²)) or
//!                the pairs the antenna grid says may be close (indexed).
//!   ② Link     — keep a pair iff the distance is within *both* ranges.
//!   ③ Closure  — flood-fill connected components over the direct links;
//!                a vehicle reaches every other member of its component.
//! build(vehicles):
//!   ④ Publish  — each vehicle's neighbour list becomes its reachable set.
//! ```
//!
//! Every rebuild replaces the previous graph wholesale.  Queries about ids
//! that were not part of the last snapshot return empty results.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                |
//! |------------|-------------------------------------------------------|
//! | `parallel` | Runs the scan/link phase on Rayon's thread pool.      |
//! | `fx-hash`  | FxHash for the id-keyed maps.                         |
//! | `serde`    | Serialize/Deserialize on config and stats types.      |

pub mod closure;
pub mod config;
pub mod graph;
pub mod scan;
pub mod stats;

#[cfg(test)]
mod tests;

pub use v2v_antenna::{IdMap, IdSet};

pub use config::{IndexConfig, ScanMode};
pub use graph::InterferenceGraph;
pub use stats::GraphStats;
