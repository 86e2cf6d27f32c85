//! Transitive closure as connected components.
//!
//! Two vehicles can reach each other exactly when they sit in the same
//! connected component of the direct-link graph, so the closure is stored
//! as a partition rather than as one reachable set per vehicle.

use std::collections::VecDeque;

use v2v_antenna::{IdMap, IdSet};
use v2v_core::VehicleId;

#[derive(Clone, Debug, Default)]
pub struct Components {
    /// Members of each component, ascending.  Components are ordered by
    /// their smallest member.
    pub groups:       Vec<Vec<VehicleId>>,
    pub component_of: IdMap<VehicleId, u32>,
}

impl Components {
    /// Breadth-first flood fill from each not-yet-visited vehicle, in
    /// ascending id order.
    pub fn flood_fill(adjacency: &IdMap<VehicleId, IdSet<VehicleId>>) -> Self {
        let mut ids: Vec<VehicleId> = adjacency.keys().copied().collect();
        ids.sort_unstable();

        let mut out = Components::default();
        let mut queue = VecDeque::new();
        for &start in &ids {
            if out.component_of.contains_key(&start) {
                continue;
            }
            let c = out.groups.len() as u32;
            let mut group = vec![start];
            out.component_of.insert(start, c);
            queue.push_back(start);

            while let Some(v) = queue.pop_front() {
                let Some(next) = adjacency.get(&v) else { continue };
                for &w in next {
                    if !out.component_of.contains_key(&w) {
                        out.component_of.insert(w, c);
                        group.push(w);
                        queue.push_back(w);
                    }
                }
            }
            group.sort_unstable();
            out.groups.push(group);
        }
        out
    }

    /// Members of `id`'s component, or `None` for an unknown id.
    pub fn group_of(&self, id: VehicleId) -> Option<&[VehicleId]> {
        let c = *self.component_of.get(&id)?;
        self.groups.get(c as usize).map(Vec::as_slice)
    }

    pub fn same(&self, a: VehicleId, b: VehicleId) -> bool {
        match (self.component_of.get(&a), self.component_of.get(&b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}
