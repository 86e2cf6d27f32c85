//! CSV road-network loader.
//!
//! A thin collaborator for drivers that keep their road data as plain
//! tables.  Two files are read:
//!
//! ```csv
//! id,lat,lon
//! 1001,48.5734,7.7521
//! 1002,48.5747,7.7541
//! ```
//!
//! ```csv
//! from,to,length_m,highway,oneway
//! 1001,1002,,primary,no
//! ```
//!
//! - `id` / `from` / `to` are external (e.g. OSM) integer ids; they are
//!   remapped to dense `NodeId`s in file order.
//! - `length_m` may be left empty, in which case the haversine distance
//!   between the two nodes is used.
//! - `highway` is an OSM highway tag (see [`RoadClass::from_tag`]).
//! - `oneway` accepts `yes`/`true`/`1` (anything else is two-way).

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use v2v_core::{GeoPoint, NodeId, RoadClass};

use crate::network::{RoadNetwork, RoadNetworkBuilder, RoadSegment};
use crate::{RoadError, RoadResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id:  i64,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct EdgeRecord {
    from:     i64,
    to:       i64,
    length_m: Option<f64>,
    highway:  String,
    #[serde(default)]
    oneway:   String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a road network from a node CSV file and an edge CSV file.
pub fn load_csv_files(nodes: &Path, edges: &Path) -> RoadResult<RoadNetwork> {
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_csv(nodes, edges)
}

/// Like [`load_csv_files`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_csv<N: Read, E: Read>(nodes: N, edges: E) -> RoadResult<RoadNetwork> {
    let mut builder = RoadNetworkBuilder::new();
    let mut ids: HashMap<i64, NodeId> = HashMap::new();

    // ── Nodes ─────────────────────────────────────────────────────────────
    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let row = result.map_err(|e| RoadError::Parse(e.to_string()))?;
        let pos = GeoPoint::try_new(row.lat, row.lon)?;
        if ids.contains_key(&row.id) {
            return Err(RoadError::DuplicateNode(row.id));
        }
        ids.insert(row.id, builder.add_node(pos));
    }

    // ── Edges ─────────────────────────────────────────────────────────────
    let mut edge_reader = csv::Reader::from_reader(edges);
    for result in edge_reader.deserialize::<EdgeRecord>() {
        let row = result.map_err(|e| RoadError::Parse(e.to_string()))?;
        let from = *ids.get(&row.from).ok_or(RoadError::UnknownNodeRef(row.from))?;
        let to   = *ids.get(&row.to).ok_or(RoadError::UnknownNodeRef(row.to))?;

        let length_m = row
            .length_m
            .unwrap_or_else(|| builder.node_pos(from).distance_m(builder.node_pos(to)));
        let segment = RoadSegment {
            length_m,
            road_class: RoadClass::from_tag(&row.highway),
            oneway:     parse_oneway(&row.oneway),
        };
        builder.add_road(from, to, segment);
    }

    Ok(builder.build())
}

fn parse_oneway(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "yes" | "true" | "1")
}
