//! A single vehicle: kinematics, route intent, and radio parameters.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use v2v_core::{EdgeId, GeoPoint, NodeId, Transceiver, VehicleId, VehicleRng};
use v2v_road::RoadNetwork;

use crate::motion;
use crate::{VehicleError, VehicleResult};

/// Upper bound on intersections crossed in a single `update`.  Only reached
/// on pathological graphs (cycles of zero-length edges); the vehicle simply
/// resumes on the next update.
const MAX_HOPS_PER_UPDATE: u32 = 10_000;

// ── VehicleParams ─────────────────────────────────────────────────────────────

/// Creation parameters for a [`Vehicle`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleParams {
    pub start:                NodeId,
    pub destination:          NodeId,
    /// Cruise speed, metres per second.
    pub speed_mps:            f64,
    /// Radio transmission range, metres.
    pub range_m:              f64,
    /// Neighbours at or closer than this make the vehicle slow down.
    pub collision_distance_m: f64,
    /// Avoid half-edges that run against a one-way tag whenever a legal
    /// exit exists.
    pub enforce_oneway:       bool,
}

impl VehicleParams {
    /// Parameters with a 10 m/s cruise speed, 500 m range and a 5 m
    /// collision distance.
    pub fn new(start: NodeId, destination: NodeId) -> Self {
        Self {
            start,
            destination,
            speed_mps:            10.0,
            range_m:              500.0,
            collision_distance_m: 5.0,
            enforce_oneway:       false,
        }
    }

    pub fn speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = speed_mps;
        self
    }

    pub fn range(mut self, range_m: f64) -> Self {
        self.range_m = range_m;
        self
    }

    pub fn collision_distance(mut self, collision_distance_m: f64) -> Self {
        self.collision_distance_m = collision_distance_m;
        self
    }

    pub fn enforce_oneway(mut self, enforce: bool) -> Self {
        self.enforce_oneway = enforce;
        self
    }

    fn validate(&self, network: &RoadNetwork) -> VehicleResult<()> {
        for node in [self.start, self.destination] {
            if !network.contains_node(node) {
                return Err(VehicleError::NodeNotFound(node));
            }
        }
        for (what, value) in [
            ("speed", self.speed_mps),
            ("transmission range", self.range_m),
            ("collision distance", self.collision_distance_m),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(VehicleError::InvalidParameter { what, value });
            }
        }
        Ok(())
    }
}

// ── UpdateOutcome ─────────────────────────────────────────────────────────────

/// What happened during one [`Vehicle::update`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct UpdateOutcome {
    /// Metres actually travelled.
    pub advanced_m:           f64,
    /// Intersections reached.
    pub edges_completed:      u32,
    /// Times the destination was reached (and intent reversed).
    pub destinations_reached: u32,
    /// The vehicle stood at a vertex with no eligible edge and reversed its
    /// intent instead of moving.
    pub stuck:                bool,
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// An agent bound to the shared road network.
///
/// The vehicle's position is derived on demand from its current half-edge
/// and the distance already covered on it.  `neighbors` is written by the
/// interference graph and is only meaningful until its next rebuild.
pub struct Vehicle {
    id:      VehicleId,
    network: Arc<RoadNetwork>,

    // ── Kinematics ────────────────────────────────────────────────────────
    current_node:  NodeId,
    next_node:     NodeId,
    current_edge:  Option<EdgeId>,
    previous_node: Option<NodeId>,
    progress_m:    f64,
    edge_length_m: f64,
    speed_mps:     f64,
    cruise_speed_mps: f64,
    odometer_m:    f64,

    // ── Route intent ──────────────────────────────────────────────────────
    origin:      NodeId,
    destination: NodeId,

    // ── Radio ─────────────────────────────────────────────────────────────
    range_m:              f64,
    collision_distance_m: f64,

    enforce_oneway: bool,
    neighbors:      Vec<VehicleId>,
    rng:            VehicleRng,
}

impl Vehicle {
    /// Create a vehicle parked at `params.start`.
    ///
    /// Edge choices are drawn from an RNG seeded by `seed` and `id`, so two
    /// runs with the same seed move identically.
    pub fn new(
        id:      VehicleId,
        network: Arc<RoadNetwork>,
        params:  VehicleParams,
        seed:    u64,
    ) -> VehicleResult<Self> {
        params.validate(&network)?;
        Ok(Self {
            id,
            network,
            current_node:     params.start,
            next_node:        params.start,
            current_edge:     None,
            previous_node:    None,
            progress_m:       0.0,
            edge_length_m:    0.0,
            speed_mps:        params.speed_mps,
            cruise_speed_mps: params.speed_mps,
            odometer_m:       0.0,
            origin:           params.start,
            destination:      params.destination,
            range_m:          params.range_m,
            collision_distance_m: params.collision_distance_m,
            enforce_oneway:   params.enforce_oneway,
            neighbors:        Vec::new(),
            rng:              VehicleRng::new(seed, id),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline] pub fn id(&self) -> VehicleId { self.id }
    #[inline] pub fn network(&self) -> &Arc<RoadNetwork> { &self.network }
    #[inline] pub fn current_node(&self) -> NodeId { self.current_node }
    #[inline] pub fn next_node(&self) -> NodeId { self.next_node }
    #[inline] pub fn current_edge(&self) -> Option<EdgeId> { self.current_edge }
    #[inline] pub fn previous_node(&self) -> Option<NodeId> { self.previous_node }
    #[inline] pub fn progress_m(&self) -> f64 { self.progress_m }
    #[inline] pub fn edge_length_m(&self) -> f64 { self.edge_length_m }
    #[inline] pub fn speed_mps(&self) -> f64 { self.speed_mps }
    #[inline] pub fn cruise_speed_mps(&self) -> f64 { self.cruise_speed_mps }
    #[inline] pub fn odometer_m(&self) -> f64 { self.odometer_m }
    #[inline] pub fn origin(&self) -> NodeId { self.origin }
    #[inline] pub fn destination(&self) -> NodeId { self.destination }
    #[inline] pub fn range_m(&self) -> f64 { self.range_m }
    #[inline] pub fn collision_distance_m(&self) -> f64 { self.collision_distance_m }

    /// Every vehicle reachable over the interference graph at its last
    /// rebuild, ascending by id.
    #[inline]
    pub fn neighbors(&self) -> &[VehicleId] {
        &self.neighbors
    }

    /// Replace the neighbour list.  The list is sorted and deduplicated, and
    /// the vehicle's own id is dropped.
    pub fn set_neighbors(&mut self, mut neighbors: Vec<VehicleId>) {
        neighbors.sort_unstable();
        neighbors.dedup();
        neighbors.retain(|&n| n != self.id);
        self.neighbors = neighbors;
    }

    pub fn clear_neighbors(&mut self) {
        self.neighbors.clear();
    }

    /// Drop `id` from the neighbour list (used when a vehicle is retired).
    pub fn forget_neighbor(&mut self, id: VehicleId) {
        if let Ok(pos) = self.neighbors.binary_search(&id) {
            self.neighbors.remove(pos);
        }
    }

    /// Change the transmission range.  Non-finite or negative values are
    /// ignored.
    pub fn set_range_m(&mut self, range_m: f64) {
        if range_m.is_finite() && range_m >= 0.0 {
            self.range_m = range_m;
        }
    }

    /// Change the cruise speed (and the current speed with it).  Non-finite
    /// or negative values are ignored.
    pub fn set_cruise_speed_mps(&mut self, speed_mps: f64) {
        if speed_mps.is_finite() && speed_mps >= 0.0 {
            self.cruise_speed_mps = speed_mps;
            self.speed_mps = speed_mps;
        }
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    /// Current position, interpolated along the current half-edge.
    ///
    /// A vehicle between edges (or stuck) sits on its current intersection.
    pub fn position(&self) -> GeoPoint {
        let from = self.network.node_pos[self.current_node.index()];
        if self.current_edge.is_none() {
            return from;
        }
        let to = self.network.node_pos[self.next_node.index()];
        let t = if self.edge_length_m > 0.0 {
            self.progress_m / self.edge_length_m
        } else {
            0.0
        };
        from.lerp(to, t)
    }

    /// Great-circle distance between the two vehicles' current positions.
    #[inline]
    pub fn calculate_distance(&self, other: &Vehicle) -> f64 {
        self.position().distance_m(other.position())
    }

    /// Radio snapshot for the interference graph.
    #[inline]
    pub fn transceiver(&self) -> Transceiver {
        Transceiver::new(self.id, self.position(), self.range_m)
    }

    // ── Motion ────────────────────────────────────────────────────────────

    /// Advance by `speed * dt_secs` metres.
    ///
    /// Any distance left after reaching the end of an edge carries onto the
    /// next one, across as many intersections as the step covers.
    /// Non-positive or non-finite `dt_secs` is a no-op.
    pub fn update(&mut self, dt_secs: f64) -> UpdateOutcome {
        let mut outcome = UpdateOutcome::default();
        if !dt_secs.is_finite() || dt_secs <= 0.0 || self.speed_mps <= 0.0 {
            return outcome;
        }

        let mut remaining = self.speed_mps * dt_secs;
        let mut hops = 0;
        while hops < MAX_HOPS_PER_UPDATE {
            if self.current_edge.is_none() && !self.enter_next_edge() {
                trace!(vehicle = %self.id, node = %self.current_node, "dead end, reversing intent");
                self.reverse_intent();
                outcome.stuck = true;
                break;
            }

            let left = (self.edge_length_m - self.progress_m).max(0.0);
            if remaining < left {
                self.progress_m += remaining;
                outcome.advanced_m += remaining;
                break;
            }

            remaining -= left;
            outcome.advanced_m += left;
            self.arrive();
            outcome.edges_completed += 1;
            hops += 1;

            if self.current_node == self.destination {
                trace!(vehicle = %self.id, node = %self.current_node, "destination reached");
                self.reverse_intent();
                outcome.destinations_reached += 1;
            }
        }

        self.odometer_m += outcome.advanced_m;
        outcome
    }

    /// Slow down for every neighbour within the collision distance.
    ///
    /// The speed is set to `cruise * factor^close`, where `close` counts the
    /// neighbours at or inside the collision distance and `factor` is
    /// `slow_down_factor` clamped to `[0, 1]`.  It is always derived from the
    /// cruise speed, so a neighbour that stays close holds the vehicle at a
    /// fixed reduced speed instead of braking it further every tick.  With
    /// no close neighbour the vehicle returns to cruise speed.  Returns the
    /// number of close neighbours.
    pub fn avoid_collision<I>(&mut self, neighbor_positions: I, slow_down_factor: f64) -> usize
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let here = self.position();
        let close = neighbor_positions
            .into_iter()
            .filter(|&p| here.distance_m(p) <= self.collision_distance_m)
            .count();

        let factor = if slow_down_factor.is_finite() { slow_down_factor.clamp(0.0, 1.0) } else { 1.0 };
        let exponent = i32::try_from(close).unwrap_or(i32::MAX);
        self.speed_mps = self.cruise_speed_mps * factor.powi(exponent);
        close
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Pick and enter the next edge.  Returns `false` at a dead end.
    fn enter_next_edge(&mut self) -> bool {
        let chosen = motion::select_edge(
            &self.network,
            self.current_node,
            self.previous_node,
            self.enforce_oneway,
            &mut self.rng,
        );
        match chosen {
            Some(edge) => {
                self.current_edge  = Some(edge);
                self.next_node     = self.network.edge_to[edge.index()];
                self.edge_length_m = self.network.edge_length_m[edge.index()];
                self.progress_m    = 0.0;
                true
            }
            None => false,
        }
    }

    /// Step onto `next_node`, leaving no edge selected.
    fn arrive(&mut self) {
        self.previous_node = Some(self.current_node);
        self.current_node  = self.next_node;
        self.clear_edge();
    }

    fn reverse_intent(&mut self) {
        std::mem::swap(&mut self.origin, &mut self.destination);
        self.clear_edge();
    }

    fn clear_edge(&mut self) {
        self.current_edge  = None;
        self.next_node     = self.current_node;
        self.progress_m    = 0.0;
        self.edge_length_m = 0.0;
    }
}

impl fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("id", &self.id)
            .field("current_node", &self.current_node)
            .field("next_node", &self.next_node)
            .field("current_edge", &self.current_edge)
            .field("progress_m", &self.progress_m)
            .field("speed_mps", &self.speed_mps)
            .field("origin", &self.origin)
            .field("destination", &self.destination)
            .field("range_m", &self.range_m)
            .finish_non_exhaustive()
    }
}
