//! The `Engine` and its tick loop.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use v2v_core::{GeoPoint, SimClock, Tick, TimeSource, Transceiver, VehicleId};
use v2v_interference::{GraphStats, IdMap, InterferenceGraph};
use v2v_road::RoadNetwork;
use v2v_vehicle::{Vehicle, VehicleError, VehicleFleet, VehicleParams};

use crate::config::{clamp_speed_multiplier, EngineConfig};
use crate::snapshot::{Snapshot, VehicleView};
use crate::{SimError, SimObserver, SimResult, TickReport};

// ── EngineState ───────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EngineState::Stopped => "stopped",
            EngineState::Running => "running",
            EngineState::Paused  => "paused",
        })
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Owns the fleet, the interference graph and the clock, and drives ticks.
///
/// The engine never schedules itself: a driver (GUI timer, headless loop,
/// test) calls [`tick`](Self::tick) or [`step_once`](Self::step_once).
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct Engine<O: SimObserver> {
    pub(crate) config:       EngineConfig,
    pub(crate) fleet:        VehicleFleet,
    pub(crate) interference: InterferenceGraph,
    pub(crate) clock:        SimClock,
    pub(crate) time:         Box<dyn TimeSource + Send>,
    pub(crate) observer:     O,
    pub(crate) state:        EngineState,
}

impl<O: SimObserver> Engine<O> {
    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// `Stopped → Running`.
    ///
    /// Lays out the spatial index (once per engine, and only for a fleet
    /// large enough to use it) and builds the interference graph so readers
    /// see connectivity before the first tick.  `tick_interval_ms` is
    /// clamped to at least 1.
    pub fn start(&mut self, tick_interval_ms: u64) -> SimResult<()> {
        self.require(EngineState::Stopped, "start")?;
        self.config.tick_interval_ms = tick_interval_ms.max(1);

        if !self.fleet.is_empty() {
            let snapshot: Vec<Transceiver> = self.fleet.transceivers();
            self.interference.initialize_spatial_index(&snapshot);
            self.rebuild();
        }

        self.clock.restart(self.time.now());
        self.state = EngineState::Running;
        info!(
            vehicles = self.fleet.len(),
            tick_interval_ms = self.config.tick_interval_ms,
            speed_multiplier = self.config.speed_multiplier,
            "simulation started"
        );
        self.observer.on_started();
        Ok(())
    }

    /// `Running → Paused`.  Vehicle and graph state are kept as they are.
    pub fn pause(&mut self) -> SimResult<()> {
        self.require(EngineState::Running, "pause")?;
        self.clock.freeze();
        self.state = EngineState::Paused;
        info!(tick = %self.clock.current_tick, "simulation paused");
        self.observer.on_paused();
        Ok(())
    }

    /// `Paused → Running`.  The paused interval is not charged to the next
    /// tick.
    pub fn resume(&mut self) -> SimResult<()> {
        self.require(EngineState::Paused, "resume")?;
        self.clock.restart(self.time.now());
        self.state = EngineState::Running;
        info!(tick = %self.clock.current_tick, "simulation resumed");
        self.observer.on_resumed();
        Ok(())
    }

    /// `Running | Paused → Stopped`.
    pub fn stop(&mut self) -> SimResult<()> {
        if self.state == EngineState::Stopped {
            return Err(SimError::InvalidTransition { from: self.state, action: "stop" });
        }
        self.clock.freeze();
        self.state = EngineState::Stopped;
        info!(tick = %self.clock.current_tick, elapsed = %self.clock, "simulation stopped");
        self.observer.on_stopped();
        Ok(())
    }

    fn require(&self, expected: EngineState, action: &'static str) -> SimResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SimError::InvalidTransition { from: self.state, action })
        }
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Advance by the wall time elapsed since the previous tick (or since
    /// `start`/`resume`), scaled by the speed multiplier.  Only valid while
    /// running.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        self.require(EngineState::Running, "tick")?;
        let wall = self.clock.lap(self.time.now());
        Ok(self.advance(wall * self.config.speed_multiplier))
    }

    /// Advance by one nominal tick interval, scaled by the speed multiplier,
    /// without consulting the wall clock.  Allowed in any state; the state
    /// does not change.
    pub fn step_once(&mut self) -> TickReport {
        let dt = self.config.tick_interval_ms as f64 / 1_000.0 * self.config.speed_multiplier;
        self.advance(dt)
    }

    /// `n` calls to [`step_once`](Self::step_once).
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.step_once();
        }
    }

    fn advance(&mut self, dt_secs: f64) -> TickReport {
        let mut report = TickReport { dt_secs, vehicles: self.fleet.len(), ..TickReport::default() };

        // Every update lands before the rebuild reads positions.
        for v in self.fleet.iter_mut() {
            let outcome = v.update(dt_secs);
            report.distance_m += outcome.advanced_m;
            report.destinations_reached += outcome.destinations_reached;
            if outcome.stuck {
                report.stuck += 1;
            }
        }

        self.clock.advance(dt_secs);
        report.tick = self.clock.current_tick;

        let interval = self.config.cadence.interval_for(self.fleet.len());
        if self.clock.current_tick.is_multiple_of(interval) {
            report.rebuilt = Some(self.rebuild());
        }

        if self.config.collision.enabled {
            report.slowed = self.avoid_collisions();
        }

        self.observer.on_tick(&report);
        report
    }

    fn rebuild(&mut self) -> GraphStats {
        let stats = self.interference.build(self.fleet.iter_mut());
        debug!(tick = %self.clock.current_tick, %stats, "rebuild");
        self.observer.on_graph_rebuilt(&stats);
        stats
    }

    /// One collision-avoidance pass.  Only direct neighbours (vehicles in
    /// mutual radio range, see `InterferenceGraph::direct_neighbors`) are
    /// checked, not the multi-hop reachable set published through
    /// `Vehicle::neighbors`.  Returns the number of vehicles slowed.
    fn avoid_collisions(&mut self) -> usize {
        let positions: IdMap<VehicleId, GeoPoint> =
            self.fleet.iter().map(|v| (v.id(), v.position())).collect();
        let factor = self.config.collision.slow_down_factor;
        let interference = &self.interference;

        let mut slowed = 0;
        for v in self.fleet.iter_mut() {
            let close = interference
                .direct_neighbors(v.id())
                .iter()
                .filter_map(|id| positions.get(id).copied());
            if v.avoid_collision(close, factor) > 0 {
                slowed += 1;
            }
        }
        slowed
    }

    // ── Fleet ─────────────────────────────────────────────────────────────

    /// Add a vehicle.  It joins the interference graph at the next rebuild.
    pub fn add_vehicle(&mut self, params: VehicleParams) -> SimResult<VehicleId> {
        let id = self.fleet.spawn(params)?;
        debug!(vehicle = %id, "vehicle added");
        Ok(id)
    }

    /// Remove a vehicle from the fleet, the graph and the spatial index, and
    /// drop it from every neighbour list.
    pub fn retire_vehicle(&mut self, id: VehicleId) -> SimResult<Vehicle> {
        let vehicle = self.fleet.retire(id).ok_or(VehicleError::NotFound(id))?;
        self.interference.forget(id);
        for v in self.fleet.iter_mut() {
            let reachable = self.interference.reachable_sorted(v.id());
            v.set_neighbors(reachable);
        }
        debug!(vehicle = %id, "vehicle retired");
        Ok(vehicle)
    }

    /// Set the simulated-seconds-per-wall-second factor.  Clamped to
    /// `[0, 1000]`; non-finite values reset it to 1.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        self.config.speed_multiplier = clamp_speed_multiplier(multiplier);
    }

    // ── Read access ───────────────────────────────────────────────────────

    #[inline] pub fn state(&self) -> EngineState { self.state }
    #[inline] pub fn config(&self) -> &EngineConfig { &self.config }
    #[inline] pub fn clock(&self) -> &SimClock { &self.clock }
    #[inline] pub fn fleet(&self) -> &VehicleFleet { &self.fleet }
    #[inline] pub fn interference(&self) -> &InterferenceGraph { &self.interference }
    #[inline] pub fn network(&self) -> &Arc<RoadNetwork> { self.fleet.network() }
    #[inline] pub fn observer(&self) -> &O { &self.observer }
    #[inline] pub fn observer_mut(&mut self) -> &mut O { &mut self.observer }
    #[inline] pub fn speed_multiplier(&self) -> f64 { self.config.speed_multiplier }

    /// Ticks processed so far.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.clock.current_tick.0
    }

    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Live vehicles, ascending by id.
    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.fleet.iter()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.fleet.get(id)
    }

    /// Owned, read-only picture of the fleet and its connectivity.
    pub fn snapshot(&self) -> Snapshot {
        let vehicles = self
            .fleet
            .iter()
            .map(|v| {
                let mut direct: Vec<VehicleId> =
                    self.interference.direct_neighbors(v.id()).iter().copied().collect();
                direct.sort_unstable();
                VehicleView {
                    id:        v.id(),
                    position:  v.position(),
                    range_m:   v.range_m(),
                    speed_mps: v.speed_mps(),
                    direct,
                    reachable: v.neighbors().to_vec(),
                }
            })
            .collect();
        Snapshot {
            tick:             self.clock.current_tick,
            sim_elapsed_secs: self.clock.sim_elapsed_secs,
            state:            self.state,
            vehicles,
            graph:            self.interference.stats(),
        }
    }
}
