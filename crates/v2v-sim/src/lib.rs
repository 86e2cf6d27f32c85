//! `v2v-sim` — the simulation engine.
//!
//! # Tick
//!
//! ```text
//! tick():
//!   ① Clock    — wall seconds since the previous tick × speed multiplier.
//!   ② Move     — Vehicle::update(dt) for every vehicle.
//!   ③ Rebuild  — on cadence ticks only: InterferenceGraph::build, which
//!                also republishes every vehicle's neighbour list.
//!   ④ Avoid    — collision avoidance against direct neighbours.
//!   ⑤ Notify   — SimObserver::on_tick.
//! ```
//!
//! All vehicle updates of a tick complete before the rebuild starts.
//!
//! # Lifecycle
//!
//! ```text
//!            start            pause
//! Stopped ─────────► Running ◄─────► Paused
//!    ▲                  │    resume     │
//!    └──────── stop ────┴───────────────┘
//! ```
//!
//! While paused no wall time is charged: `resume` restarts the clock mark,
//! so the first tick afterwards does not see the paused interval.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use v2v_sim::{EngineBuilder, EngineConfig};
//! use v2v_vehicle::VehicleParams;
//!
//! let mut engine = EngineBuilder::new(network).config(EngineConfig::default()).build()?;
//! engine.add_vehicle(VehicleParams::new(a, b))?;
//! engine.start(100)?;
//! loop {
//!     engine.tick()?;
//! }
//! ```

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod observer;
pub mod snapshot;


pub use builder::EngineBuilder;
pub use config::{CadenceBand, CollisionConfig, EngineConfig, RebuildCadence};
pub use engine::{Engine, EngineState};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickReport};
pub use snapshot::{Snapshot, VehicleView};

pub use v2v_interference::GraphStats;
