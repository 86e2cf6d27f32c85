//! `v2v-road` — the road network every vehicle drives on.
//!
//! The network is built once by a collaborator (builder calls or the CSV
//! loader), wrapped in an `Arc`, and only ever read afterwards.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`          |
//! | [`loader`]  | `load_csv`, `load_csv_files`                                |
//! | [`error`]   | `RoadError`, `RoadResult<T>`                                |

pub mod error;
pub mod loader;
pub mod network;


pub use error::{RoadError, RoadResult};
pub use loader::{load_csv, load_csv_files};
pub use network::{RoadNetwork, RoadNetworkBuilder, RoadSegment};
