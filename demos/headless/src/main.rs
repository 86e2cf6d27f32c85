//! headless — drive the V2V simulator without a GUI.
//!
//! Builds a synthetic street grid (or loads one from CSV), spawns a random
//! fleet on drivable intersections, and runs the engine on a manually
//! advanced clock so runs are reproducible.  Connectivity statistics are
//! logged through `tracing`; set `RUST_LOG` to adjust verbosity.

mod config;
mod network;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use v2v_core::{ManualTimeSource, SimRng};
use v2v_interference::GraphStats;
use v2v_sim::{EngineBuilder, SimObserver, TickReport};
use v2v_vehicle::{VehicleParams, random_drivable_node};

use config::{Args, DemoConfig};

// ── Observer ──────────────────────────────────────────────────────────────────

/// Logs lifecycle events and rebuild statistics, and keeps run totals.
#[derive(Default)]
struct LoggingObserver {
    report_every:  u64,
    rebuilds:      u64,
    distance_m:    f64,
    arrivals:      u64,
    last_graph:    Option<GraphStats>,
}

impl SimObserver for LoggingObserver {
    fn on_started(&mut self) {
        info!("engine started");
    }

    fn on_stopped(&mut self) {
        info!(rebuilds = self.rebuilds, "engine stopped");
    }

    fn on_tick(&mut self, report: &TickReport) {
        self.distance_m += report.distance_m;
        self.arrivals += u64::from(report.destinations_reached);
        if self.report_every > 0 && report.tick.is_multiple_of(self.report_every) {
            info!(
                tick = %report.tick,
                dt = report.dt_secs,
                slowed = report.slowed,
                stuck = report.stuck,
                fleet_km = self.distance_m / 1_000.0,
                arrivals = self.arrivals,
                "progress"
            );
        }
    }

    fn on_graph_rebuilt(&mut self, stats: &GraphStats) {
        self.rebuilds += 1;
        debug!(%stats, "graph rebuilt");
        self.last_graph = Some(*stats);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = DemoConfig::resolve(&args)?;

    // 1. Road network.
    let network = Arc::new(network::load(&cfg.network)?);
    info!(
        nodes = network.node_count(),
        half_edges = network.edge_count(),
        "road network ready"
    );

    // 2. Engine on a manual clock.
    let time = ManualTimeSource::new();
    let observer = LoggingObserver { report_every: cfg.run.report_every, ..LoggingObserver::default() };
    let mut engine = EngineBuilder::new(Arc::clone(&network))
        .config(cfg.engine.clone())
        .observer(observer)
        .time_source(time.clone())
        .build()?;

    // 3. Fleet.
    let mut rng = SimRng::new(cfg.engine.seed);
    let fleet = &cfg.fleet;
    let (min_speed, max_speed) = ordered(fleet.min_speed_mps, fleet.max_speed_mps);
    let (min_range, max_range) = ordered(fleet.min_range_m, fleet.max_range_m);
    for _ in 0..fleet.vehicles {
        let start = random_drivable_node(&network, &mut rng, fleet.spawn_attempts)
            .context("road network has no drivable intersection")?;
        let destination = random_drivable_node(&network, &mut rng, fleet.spawn_attempts)
            .context("road network has no drivable intersection")?;
        let params = VehicleParams::new(start, destination)
            .speed(rng.gen_range(min_speed..=max_speed))
            .range(rng.gen_range(min_range..=max_range))
            .collision_distance(fleet.collision_distance_m)
            .enforce_oneway(fleet.enforce_oneway);
        engine.add_vehicle(params)?;
    }
    info!(vehicles = engine.fleet().len(), "fleet spawned");

    // 4. Run.
    let wall = Instant::now();
    engine.start(cfg.run.tick_ms)?;
    for _ in 0..cfg.run.ticks {
        time.advance_ms(cfg.run.tick_ms);
        engine.tick()?;
    }
    engine.stop()?;

    // 5. Summary.
    let snapshot = engine.snapshot();
    let best = snapshot
        .vehicles
        .iter()
        .max_by_key(|v| v.reachable.len())
        .map(|v| (v.id, v.reachable.len()));
    info!(
        ticks = engine.tick_count(),
        simulated = %engine.clock(),
        wall_ms = wall.elapsed().as_millis() as u64,
        "run complete"
    );
    if let Some(stats) = engine.observer().last_graph {
        info!(%stats, "final graph");
    }
    if let Some((id, reach)) = best {
        info!(vehicle = %id, reachable = reach, "best-connected vehicle");
    }
    Ok(())
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
