//! Engine observer trait for rendering, logging and data collection.

use v2v_core::Tick;
use v2v_interference::GraphStats;

/// What one tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Tick number after this tick completed (the first tick reports 1).
    pub tick:                 Tick,
    /// Simulated seconds applied to every vehicle.
    pub dt_secs:              f64,
    pub vehicles:             usize,
    /// Metres travelled by the whole fleet.
    pub distance_m:           f64,
    pub destinations_reached: u32,
    /// Vehicles that hit a dead end and reversed.
    pub stuck:                usize,
    /// Vehicles slowed by collision avoidance.
    pub slowed:               usize,
    /// Present on rebuild ticks.
    pub rebuilt:              Option<GraphStats>,
}

/// Callbacks invoked by the [`Engine`][crate::Engine] at lifecycle
/// transitions and tick boundaries.
///
/// All methods default to no-ops.
///
/// # Example: rebuild logger
///
/// ```rust,ignore
/// struct RebuildLog;
///
/// impl SimObserver for RebuildLog {
///     fn on_graph_rebuilt(&mut self, stats: &GraphStats) {
///         println!("{stats}");
///     }
/// }
/// ```
pub trait SimObserver {
    fn on_started(&mut self) {}
    fn on_paused(&mut self) {}
    fn on_resumed(&mut self) {}
    fn on_stopped(&mut self) {}

    /// Called at the end of every tick, after any rebuild.
    fn on_tick(&mut self, _report: &TickReport) {}

    /// Called after every interference rebuild, including the one `start`
    /// performs.
    fn on_graph_rebuilt(&mut self, _stats: &GraphStats) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
