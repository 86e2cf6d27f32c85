//! Synthetic road network: a rectangular street grid.
//!
//! Every fourth street (in each direction) is a primary arterial, the rest
//! are tertiary.  The outermost northern street is one-way eastbound, which
//! only matters with `enforce_oneway`.

use std::path::Path;

use anyhow::{Context, Result};

use v2v_core::{GeoPoint, NodeId, RoadClass};
use v2v_road::{RoadNetwork, RoadNetworkBuilder, load_csv_files};

use crate::config::NetworkConfig;

pub fn build_grid(cfg: &NetworkConfig) -> RoadNetwork {
    let rows = cfg.rows.max(2);
    let cols = cfg.cols.max(2);
    let origin = GeoPoint::new(cfg.origin_lat, cfg.origin_lon);

    let mut b = RoadNetworkBuilder::with_capacity(rows * cols, 2 * rows * cols);
    let mut ids: Vec<NodeId> = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            ids.push(b.add_node(origin.offset_m(r as f64 * cfg.spacing_m, c as f64 * cfg.spacing_m)));
        }
    }

    let class = |street: usize| if street % 4 == 0 { RoadClass::Primary } else { RoadClass::Tertiary };
    for r in 0..rows {
        for c in 0..cols {
            let here = ids[r * cols + c];
            if c + 1 < cols {
                b.add_road_auto(here, ids[r * cols + c + 1], class(r), r == rows - 1);
            }
            if r + 1 < rows {
                b.add_road_auto(here, ids[(r + 1) * cols + c], class(c), false);
            }
        }
    }
    b.build()
}

pub fn load(cfg: &NetworkConfig) -> Result<RoadNetwork> {
    match (&cfg.nodes_csv, &cfg.edges_csv) {
        (Some(nodes), Some(edges)) => load_csv_files(Path::new(nodes), Path::new(edges))
            .with_context(|| format!("loading road network from {nodes} and {edges}")),
        (None, None) => Ok(build_grid(cfg)),
        _ => anyhow::bail!("nodes_csv and edges_csv must be given together"),
    }
}
