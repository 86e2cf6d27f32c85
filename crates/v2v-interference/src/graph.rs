//! `InterferenceGraph`: direct links, closure and reachability queries.

use std::time::Instant;

use tracing::debug;

use v2v_antenna::{AntennaGrid, IdMap, IdSet};
use v2v_core::{Transceiver, VehicleId};
use v2v_vehicle::Vehicle;

use crate::closure::Components;
use crate::config::{IndexConfig, ScanMode};
use crate::scan;
use crate::stats::GraphStats;

pub struct InterferenceGraph {
    config:     IndexConfig,
    grid:       AntennaGrid,
    adjacency:  IdMap<VehicleId, IdSet<VehicleId>>,
    components: Components,
    last:       GraphStats,
    /// Returned by `direct_neighbors` for unknown ids.
    empty:      IdSet<VehicleId>,
}

impl Default for InterferenceGraph {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl InterferenceGraph {
    pub fn new(config: IndexConfig) -> Self {
        let grid = AntennaGrid::new(config.grid.clone());
        Self {
            config,
            grid,
            adjacency:  IdMap::default(),
            components: Components::default(),
            last:       GraphStats::default(),
            empty:      IdSet::default(),
        }
    }

    #[inline] pub fn config(&self) -> &IndexConfig { &self.config }
    #[inline] pub fn grid(&self) -> &AntennaGrid { &self.grid }

    /// Lay out the antenna grid for `snapshot`, unless the configuration
    /// says this fleet should not use it.  Returns `true` if the grid was
    /// laid out by this call.
    pub fn initialize_spatial_index(&mut self, snapshot: &[Transceiver]) -> bool {
        let wanted = match self.config.mode {
            ScanMode::Classic => false,
            ScanMode::Auto    => snapshot.len() >= self.config.min_fleet,
            ScanMode::Indexed => !snapshot.is_empty(),
        };
        wanted && self.grid.initialize(snapshot)
    }

    // ── Rebuild ───────────────────────────────────────────────────────────

    /// Replace the graph with the one induced by `snapshot`.
    ///
    /// The antenna layout survives; only the vehicle assignment is redone.
    pub fn rebuild(&mut self, snapshot: &[Transceiver]) -> GraphStats {
        let started = Instant::now();

        self.adjacency.clear();
        for t in snapshot {
            self.adjacency.insert(t.id, IdSet::default());
        }

        let mode = self.resolve_mode(snapshot);
        let scanned = match mode {
            ScanMode::Indexed => {
                let max_range = snapshot.iter().map(|t| t.range_m).fold(0.0, f64::max);
                self.grid.ensure_link_range(max_range);
                self.grid.assign(snapshot);
                scan::indexed(snapshot, &self.grid)
            }
            _ => scan::classic(snapshot),
        };

        for &(i, j) in &scanned.links {
            let (a, b) = (snapshot[i].id, snapshot[j].id);
            if let Some(set) = self.adjacency.get_mut(&a) {
                set.insert(b);
            }
            if let Some(set) = self.adjacency.get_mut(&b) {
                set.insert(a);
            }
        }

        self.components = Components::flood_fill(&self.adjacency);
        self.last = self.summarize(mode, scanned.checked, started);
        debug!(
            vehicles = self.last.vehicles,
            links = self.last.direct_links,
            components = self.last.components,
            largest = self.last.largest_component,
            mode = %mode,
            pairs_checked = self.last.pairs_checked,
            elapsed_us = self.last.elapsed_us,
            "interference graph rebuilt"
        );
        self.last
    }

    /// Rebuild from `vehicles` and republish each one's neighbour list as
    /// its full reachable set.
    pub fn build<'a, I>(&mut self, vehicles: I) -> GraphStats
    where
        I: IntoIterator<Item = &'a mut Vehicle>,
    {
        let mut vehicles: Vec<&'a mut Vehicle> = vehicles.into_iter().collect();
        let snapshot: Vec<Transceiver> = vehicles.iter().map(|v| v.transceiver()).collect();
        let stats = self.rebuild(&snapshot);
        for v in vehicles.iter_mut() {
            let reachable = self.reachable_sorted(v.id());
            v.set_neighbors(reachable);
        }
        stats
    }

    fn resolve_mode(&mut self, snapshot: &[Transceiver]) -> ScanMode {
        // An unbounded range cannot be covered by any cell neighbourhood.
        if snapshot.is_empty() || snapshot.iter().any(|t| !t.range_m.is_finite()) {
            return ScanMode::Classic;
        }
        match self.config.mode {
            ScanMode::Classic => ScanMode::Classic,
            ScanMode::Auto if snapshot.len() < self.config.min_fleet => ScanMode::Classic,
            ScanMode::Auto | ScanMode::Indexed => {
                if !self.grid.is_initialized() {
                    self.grid.initialize(snapshot);
                }
                if self.grid.is_initialized() { ScanMode::Indexed } else { ScanMode::Classic }
            }
        }
    }

    fn summarize(&self, mode: ScanMode, pairs_checked: usize, started: Instant) -> GraphStats {
        let degree_sum: usize = self.adjacency.values().map(IdSet::len).sum();
        let groups = &self.components.groups;
        GraphStats {
            vehicles:          self.adjacency.len(),
            direct_links:      degree_sum / 2,
            reachable_pairs:   groups.iter().map(|g| g.len() * (g.len() - 1) / 2).sum(),
            components:        groups.len(),
            largest_component: groups.iter().map(Vec::len).max().unwrap_or(0),
            isolated:          self.adjacency.values().filter(|s| s.is_empty()).count(),
            mode,
            pairs_checked,
            elapsed_us:        u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` iff `b` is reachable from `a` over direct links.  Symmetric;
    /// never true for `a == b`.
    pub fn can_communicate(&self, a: VehicleId, b: VehicleId) -> bool {
        a != b && self.components.same(a, b)
    }

    /// Every vehicle reachable from `id`, excluding `id` itself.
    pub fn reachable_vehicles(&self, id: VehicleId) -> IdSet<VehicleId> {
        self.components
            .group_of(id)
            .map(|g| g.iter().copied().filter(|&v| v != id).collect())
            .unwrap_or_default()
    }

    /// Like [`reachable_vehicles`](Self::reachable_vehicles), ascending.
    pub fn reachable_sorted(&self, id: VehicleId) -> Vec<VehicleId> {
        self.components
            .group_of(id)
            .map(|g| g.iter().copied().filter(|&v| v != id).collect())
            .unwrap_or_default()
    }

    /// Vehicles within mutual range of `id`.
    pub fn direct_neighbors(&self, id: VehicleId) -> &IdSet<VehicleId> {
        self.adjacency.get(&id).unwrap_or(&self.empty)
    }

    /// Number of vehicles in the last snapshot.
    pub fn vehicle_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.adjacency.contains_key(&id)
    }

    /// Every direct link as `(low, high)`, ascending.
    pub fn direct_links(&self) -> Vec<(VehicleId, VehicleId)> {
        let mut links: Vec<(VehicleId, VehicleId)> = self
            .adjacency
            .iter()
            .flat_map(|(&a, set)| set.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect();
        links.sort_unstable();
        links
    }

    /// Connected components, each ascending, ordered by smallest member.
    pub fn components(&self) -> &[Vec<VehicleId>] {
        &self.components.groups
    }

    /// Statistics of the last rebuild.
    pub fn stats(&self) -> GraphStats {
        self.last
    }

    // ── Maintenance ───────────────────────────────────────────────────────

    /// Remove a vehicle from the graph and the grid.  Its links vanish and
    /// the components are recomputed, so a retired relay immediately splits
    /// the vehicles it was connecting.
    pub fn forget(&mut self, id: VehicleId) {
        self.grid.forget(id);
        let Some(neighbors) = self.adjacency.remove(&id) else {
            return;
        };
        for n in neighbors {
            if let Some(set) = self.adjacency.get_mut(&n) {
                set.remove(&id);
            }
        }
        self.components = Components::flood_fill(&self.adjacency);
    }

    /// Drop the graph and the antenna layout.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.components = Components::default();
        self.grid.clear();
        self.last = GraphStats::default();
    }
}
