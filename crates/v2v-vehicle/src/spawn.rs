//! Spawn-point selection.

use v2v_core::{NodeId, SimRng};
use v2v_road::RoadNetwork;

/// Pick a random node with at least one drivable outgoing half-edge.
///
/// Draws up to `attempts` uniformly random nodes, rejecting any draw that is
/// out of range or has no drivable edge.  If every draw is rejected, falls
/// back to the lowest-id node that qualifies.  Returns `None` only when the
/// network has no drivable node at all.
pub fn random_drivable_node(network: &RoadNetwork, rng: &mut SimRng, attempts: u32) -> Option<NodeId> {
    let count = u32::try_from(network.node_count()).ok()?;
    if count == 0 {
        return None;
    }

    for _ in 0..attempts {
        let node = NodeId(rng.gen_range(0..count));
        if !network.contains_node(node) || network.drivable_out_degree(node) == 0 {
            continue;
        }
        return Some(node);
    }

    (0..count)
        .map(NodeId)
        .find(|&n| network.drivable_out_degree(n) > 0)
}
