//! `AntennaGrid`: the two-level cell structure and per-rebuild assignment.

use tracing::{debug, info};

use v2v_core::{GeoPoint, MacroCellId, MicroCellId, Transceiver, VehicleId};

use crate::collections::IdMap;
use crate::config::GridConfig;
use crate::placement;

/// Added to the micro-neighbour bound to absorb floating-point noise in the
/// distance computations.
const NEIGHBOR_SLACK_M: f64 = 1.0;

// ── Cells ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct MacroAntenna {
    pub id:        MacroCellId,
    pub center:    GeoPoint,
    pub radius_m:  f64,
    /// Child micro cells, ascending.
    pub micros:    Vec<MicroCellId>,
    /// Neighbouring macro cells, ascending.  Never contains `id`.
    pub neighbors: Vec<MacroCellId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MicroAntenna {
    pub id:        MicroCellId,
    pub parent:    MacroCellId,
    pub center:    GeoPoint,
    pub radius_m:  f64,
    /// Vehicles assigned here at the last `assign`, ascending.  Strays are
    /// not listed.
    pub members:   Vec<VehicleId>,
    /// Micro cells whose members may be in link range of ours, ascending.
    /// Never contains `id`.
    pub neighbors: Vec<MicroCellId>,
}

/// Occupancy summary, logged after each assignment pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStats {
    pub macro_cells:         usize,
    pub micro_cells:         usize,
    pub assigned:            usize,
    pub strays:              usize,
    pub occupied_micros:     usize,
    pub max_micro_load:      usize,
    pub mean_micro_neighbors: f64,
    pub link_range_m:        f64,
}

#[derive(Copy, Clone, Debug)]
struct Slot {
    micro: MicroCellId,
    stray: bool,
}

// ── AntennaGrid ───────────────────────────────────────────────────────────────

/// Macro/micro spatial index.
///
/// Layout ([`initialize`](Self::initialize)) happens once per instance;
/// [`assign`](Self::assign) is cheap and runs on every interference rebuild.
#[derive(Clone, Debug)]
pub struct AntennaGrid {
    config:       GridConfig,
    initialized:  bool,
    link_range_m: f64,
    macros:       Vec<MacroAntenna>,
    micros:       Vec<MicroAntenna>,
    slots:        IdMap<VehicleId, Slot>,
    strays:       Vec<VehicleId>,
}

impl Default for AntennaGrid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl AntennaGrid {
    pub fn new(config: GridConfig) -> Self {
        let config = config.sanitized();
        let link_range_m = config.nominal_range_m;
        Self {
            config,
            initialized: false,
            link_range_m,
            macros: Vec::new(),
            micros: Vec::new(),
            slots: IdMap::default(),
            strays: Vec::new(),
        }
    }

    #[inline] pub fn config(&self) -> &GridConfig { &self.config }
    #[inline] pub fn is_initialized(&self) -> bool { self.initialized }
    #[inline] pub fn macros(&self) -> &[MacroAntenna] { &self.macros }
    #[inline] pub fn micros(&self) -> &[MicroAntenna] { &self.micros }
    /// Range the micro neighbourhoods currently guarantee.
    #[inline] pub fn link_range_m(&self) -> f64 { self.link_range_m }

    // ── Layout ────────────────────────────────────────────────────────────

    /// Lay the grid out around `vehicles`, compute neighbourhoods and assign
    /// the vehicles.
    ///
    /// Runs at most once per instance; later calls return `false` and change
    /// nothing.  An empty fleet leaves the grid uninitialised so a later
    /// call can still lay it out.
    pub fn initialize(&mut self, vehicles: &[Transceiver]) -> bool {
        if self.initialized || vehicles.is_empty() {
            return false;
        }

        let positions: Vec<GeoPoint> = vehicles.iter().map(|t| t.position).collect();
        let sample = placement::sample_positions(&positions, self.config.sample_cap);
        let centres = placement::kmeans_centres(
            &sample,
            self.config.macro_cells,
            self.config.kmeans_iterations,
        );
        let radius = placement::macro_radius_m(
            &sample,
            self.config.macro_cells,
            self.config.macro_radius_margin,
            self.config.min_macro_radius_m,
        );

        self.macros.clear();
        self.micros.clear();
        for (m, centre) in centres.into_iter().enumerate() {
            let macro_id = MacroCellId(m as u32);
            let (micro_centres, micro_radius) =
                placement::micro_layout(centre, radius, self.config.micro_per_macro);
            let mut children = Vec::with_capacity(micro_centres.len());
            for c in micro_centres {
                let id = MicroCellId(self.micros.len() as u32);
                self.micros.push(MicroAntenna {
                    id,
                    parent:    macro_id,
                    center:    c,
                    radius_m:  micro_radius,
                    members:   Vec::new(),
                    neighbors: Vec::new(),
                });
                children.push(id);
            }
            self.macros.push(MacroAntenna {
                id:        macro_id,
                center:    centre,
                radius_m:  radius,
                micros:    children,
                neighbors: Vec::new(),
            });
        }

        let max_range = max_range_m(vehicles);
        self.compute_neighborhoods(self.config.nominal_range_m.max(max_range));
        self.initialized = true;

        info!(
            vehicles = vehicles.len(),
            sampled = sample.len(),
            macro_cells = self.macros.len(),
            micro_cells = self.micros.len(),
            macro_radius_m = radius,
            link_range_m = self.link_range_m,
            "antenna grid initialised"
        );

        self.assign(vehicles);
        true
    }

    /// Recompute macro and micro neighbourhoods for `link_range_m`.
    ///
    /// Micro cells are neighbours when their centres are at most
    /// `link_range_m + r1 + r2` apart.  A non-finite or negative range falls
    /// back to the configured nominal range.
    pub fn compute_neighborhoods(&mut self, link_range_m: f64) {
        self.link_range_m = if link_range_m.is_finite() && link_range_m >= 0.0 {
            link_range_m
        } else {
            self.config.nominal_range_m
        };

        for m in &mut self.macros {
            m.neighbors.clear();
        }
        for i in 0..self.macros.len() {
            for j in (i + 1)..self.macros.len() {
                let (a, b) = (&self.macros[i], &self.macros[j]);
                let d = a.center.distance_m(b.center);
                if d < (a.radius_m + b.radius_m) * self.config.macro_neighbor_margin {
                    let (ia, ib) = (a.id, b.id);
                    self.macros[i].neighbors.push(ib);
                    self.macros[j].neighbors.push(ia);
                }
            }
        }

        for m in &mut self.micros {
            m.neighbors.clear();
        }
        for i in 0..self.micros.len() {
            for j in (i + 1)..self.micros.len() {
                let (a, b) = (&self.micros[i], &self.micros[j]);
                let bound = self.link_range_m + a.radius_m + b.radius_m + NEIGHBOR_SLACK_M;
                if a.center.distance_m(b.center) <= bound {
                    let (ia, ib) = (a.id, b.id);
                    self.micros[i].neighbors.push(ib);
                    self.micros[j].neighbors.push(ia);
                }
            }
        }
    }

    /// Grow the micro neighbourhoods so they cover `max_range_m`.
    ///
    /// Returns `true` when the neighbourhoods were recomputed.  Ranges at or
    /// below the current link range are already covered.
    pub fn ensure_link_range(&mut self, max_range_m: f64) -> bool {
        if !self.initialized || !max_range_m.is_finite() || max_range_m <= self.link_range_m {
            return false;
        }
        debug!(from = self.link_range_m, to = max_range_m, "widening micro neighbourhoods");
        self.compute_neighborhoods(max_range_m);
        true
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Replace all assignments with one for each of `vehicles`.
    ///
    /// Each vehicle goes to the nearest micro cell among the children of its
    /// nearest macro cell and of that macro cell's neighbours.  Vehicles
    /// outside that cell's radius become strays.  No-op before
    /// initialisation.
    pub fn assign(&mut self, vehicles: &[Transceiver]) {
        if !self.initialized || self.micros.is_empty() {
            return;
        }
        self.slots.clear();
        self.strays.clear();
        for m in &mut self.micros {
            m.members.clear();
        }

        for t in vehicles {
            let (micro, dist) = self.nearest_micro(t.position);
            let stray = !(dist <= self.micros[micro.index()].radius_m);
            if stray {
                self.strays.push(t.id);
            } else {
                self.micros[micro.index()].members.push(t.id);
            }
            self.slots.insert(t.id, Slot { micro, stray });
        }

        self.strays.sort_unstable();
        for m in &mut self.micros {
            m.members.sort_unstable();
        }

        debug!(
            assigned = self.slots.len(),
            strays = self.strays.len(),
            "vehicles assigned to antennas"
        );
    }

    fn nearest_micro(&self, p: GeoPoint) -> (MicroCellId, f64) {
        let home = self
            .macros
            .iter()
            .map(|m| (m, p.distance_m(m.center)))
            .fold(None, |best: Option<(&MacroAntenna, f64)>, (m, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((m, d)),
            })
            .map(|(m, _)| m)
            .unwrap_or(&self.macros[0]);

        let mut best = (home.micros[0], f64::INFINITY);
        let candidates = std::iter::once(home.id)
            .chain(home.neighbors.iter().copied())
            .flat_map(|m| self.macros[m.index()].micros.iter().copied());
        for id in candidates {
            let d = p.distance_m(self.micros[id.index()].center);
            if d < best.1 {
                best = (id, d);
            }
        }
        best
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Candidate partners for `id`: a superset of every vehicle that can be
    /// in link range of it.  Never contains `id`; empty for unknown ids.
    pub fn nearby_vehicle_ids(&self, id: VehicleId) -> Vec<VehicleId> {
        let Some(slot) = self.slots.get(&id) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        if slot.stray {
            for m in &self.micros {
                out.extend_from_slice(&m.members);
            }
        } else {
            let home = &self.micros[slot.micro.index()];
            out.extend_from_slice(&home.members);
            for n in &home.neighbors {
                out.extend_from_slice(&self.micros[n.index()].members);
            }
        }
        out.extend_from_slice(&self.strays);
        out.retain(|&v| v != id);
        out
    }

    /// Micro cell `id` was last assigned to (strays included).
    pub fn micro_cell_of(&self, id: VehicleId) -> Option<MicroCellId> {
        self.slots.get(&id).map(|s| s.micro)
    }

    pub fn macro_cell_of(&self, id: VehicleId) -> Option<MacroCellId> {
        self.micro_cell_of(id).map(|m| self.micros[m.index()].parent)
    }

    pub fn is_stray(&self, id: VehicleId) -> bool {
        self.slots.get(&id).is_some_and(|s| s.stray)
    }

    pub fn assigned_count(&self) -> usize {
        self.slots.len()
    }

    pub fn stats(&self) -> GridStats {
        let neighbor_total: usize = self.micros.iter().map(|m| m.neighbors.len()).sum();
        GridStats {
            macro_cells:     self.macros.len(),
            micro_cells:     self.micros.len(),
            assigned:        self.slots.len(),
            strays:          self.strays.len(),
            occupied_micros: self.micros.iter().filter(|m| !m.members.is_empty()).count(),
            max_micro_load:  self.micros.iter().map(|m| m.members.len()).max().unwrap_or(0),
            mean_micro_neighbors: if self.micros.is_empty() {
                0.0
            } else {
                neighbor_total as f64 / self.micros.len() as f64
            },
            link_range_m:    self.link_range_m,
        }
    }

    // ── Maintenance ───────────────────────────────────────────────────────

    /// Drop one vehicle's assignment.
    pub fn forget(&mut self, id: VehicleId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };
        if slot.stray {
            self.strays.retain(|&v| v != id);
        } else if let Some(m) = self.micros.get_mut(slot.micro.index()) {
            m.members.retain(|&v| v != id);
        }
    }

    /// Drop every cell and assignment.  The next `initialize` lays the grid
    /// out afresh.
    pub fn clear(&mut self) {
        self.initialized = false;
        self.link_range_m = self.config.nominal_range_m;
        self.macros.clear();
        self.micros.clear();
        self.slots.clear();
        self.strays.clear();
    }
}

/// Largest finite transmission range among `vehicles` (0 when empty).
pub(crate) fn max_range_m(vehicles: &[Transceiver]) -> f64 {
    vehicles
        .iter()
        .map(|t| t.range_m)
        .filter(|r| r.is_finite())
        .fold(0.0, f64::max)
}
