//! Engine configuration.
//!
//! Every struct has a usable `Default`.  With the `serde` feature they all
//! deserialize with missing fields filled from those defaults, so a config
//! file only needs to name what it changes.

use v2v_interference::IndexConfig;

// ── RebuildCadence ────────────────────────────────────────────────────────────

/// Fleets of at most `max_fleet` vehicles rebuild every `interval` ticks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CadenceBand {
    pub max_fleet: usize,
    pub interval:  u64,
}

/// Ticks between interference rebuilds, as a function of fleet size.
///
/// Small fleets rebuild every tick; larger ones less often, bounding the
/// per-tick cost.  The first band (in order) whose `max_fleet` covers the
/// fleet wins; fleets beyond every band use `fallback`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RebuildCadence {
    pub bands:    Vec<CadenceBand>,
    pub fallback: u64,
}

impl Default for RebuildCadence {
    fn default() -> Self {
        Self {
            bands: vec![
                CadenceBand { max_fleet: 100,   interval: 1 },
                CadenceBand { max_fleet: 500,   interval: 10 },
                CadenceBand { max_fleet: 1_000, interval: 20 },
                CadenceBand { max_fleet: 2_000, interval: 40 },
            ],
            fallback: 100,
        }
    }
}

impl RebuildCadence {
    /// Rebuild on every tick regardless of fleet size.
    pub fn every_tick() -> Self {
        Self { bands: Vec::new(), fallback: 1 }
    }

    /// Interval for a fleet of `fleet` vehicles; never below 1.
    pub fn interval_for(&self, fleet: usize) -> u64 {
        self.bands
            .iter()
            .find(|b| fleet <= b.max_fleet)
            .map_or(self.fallback, |b| b.interval)
            .max(1)
    }
}

// ── CollisionConfig ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollisionConfig {
    pub enabled:          bool,
    /// Speed multiplier applied per close neighbour, clamped to `[0, 1]`.
    pub slow_down_factor: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { enabled: true, slow_down_factor: 0.8 }
    }
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Upper bound for the speed multiplier.
pub const MAX_SPEED_MULTIPLIER: f64 = 1_000.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Seeds every vehicle's edge choices.
    pub seed:             u64,
    /// Nominal tick length; also the `dt` used by `step_once`.
    pub tick_interval_ms: u64,
    /// Simulated seconds per wall second.
    pub speed_multiplier: f64,
    pub cadence:          RebuildCadence,
    pub collision:        CollisionConfig,
    pub index:            IndexConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed:             0,
            tick_interval_ms: 100,
            speed_multiplier: 1.0,
            cadence:          RebuildCadence::default(),
            collision:        CollisionConfig::default(),
            index:            IndexConfig::default(),
        }
    }
}

/// Clamp a speed multiplier into `[0, MAX_SPEED_MULTIPLIER]`; non-finite
/// values become 1.
pub(crate) fn clamp_speed_multiplier(m: f64) -> f64 {
    if m.is_finite() { m.clamp(0.0, MAX_SPEED_MULTIPLIER) } else { 1.0 }
}
