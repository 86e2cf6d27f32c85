//! Edge-selection policy at intersections.
//!
//! Vehicles do not plan routes.  At every intersection they pick one of the
//! drivable outgoing half-edges at random, narrowing the choice in order:
//!
//! - with one-way enforcement on, half-edges running against a one-way tag
//!   are only used when the intersection has no legal exit (the end of a
//!   one-way street), so a vehicle is never trapped by enforcement alone;
//! - edges that lead straight back to the previous intersection are only
//!   used when nothing else remains.

use v2v_core::{EdgeId, NodeId, VehicleRng};
use v2v_road::RoadNetwork;

/// `true` if `edge` is drivable and, when `enforce_oneway` is set, does not
/// run against a one-way tag.
#[inline]
pub fn is_legal(network: &RoadNetwork, edge: EdgeId, enforce_oneway: bool) -> bool {
    network.edge_class[edge.index()].is_drivable()
        && !(enforce_oneway && network.edge_against_oneway[edge.index()])
}

/// Choose the next half-edge out of `at`.
///
/// Returns `None` only when `at` has no drivable half-edge at all (a true
/// dead end).
pub fn select_edge(
    network:        &RoadNetwork,
    at:             NodeId,
    previous:       Option<NodeId>,
    enforce_oneway: bool,
    rng:            &mut VehicleRng,
) -> Option<EdgeId> {
    let drivable: Vec<EdgeId> = network
        .out_edges(at)
        .filter(|&e| is_legal(network, e, false))
        .collect();
    if drivable.is_empty() {
        return None;
    }

    let legal: Vec<EdgeId> = drivable
        .iter()
        .copied()
        .filter(|&e| is_legal(network, e, enforce_oneway))
        .collect();
    let candidates = if legal.is_empty() { drivable } else { legal };

    let forward: Vec<EdgeId> = candidates
        .iter()
        .copied()
        .filter(|e| Some(network.edge_to[e.index()]) != previous)
        .collect();

    if forward.is_empty() {
        rng.choose(&candidates).copied()
    } else {
        rng.choose(&forward).copied()
    }
}
