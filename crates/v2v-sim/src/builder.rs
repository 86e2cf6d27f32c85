//! Fluent builder for constructing an [`Engine`].

use std::sync::Arc;

use v2v_core::{MonotonicTimeSource, SimClock, TimeSource};
use v2v_interference::InterferenceGraph;
use v2v_road::RoadNetwork;
use v2v_vehicle::VehicleFleet;

use crate::config::clamp_speed_multiplier;
use crate::{Engine, EngineConfig, EngineState, NoopObserver, SimError, SimObserver, SimResult};

/// Fluent builder for [`Engine<O>`].
///
/// # Optional inputs (have defaults)
///
/// | Method              | Default                   |
/// |---------------------|---------------------------|
/// | `.config(c)`        | `EngineConfig::default()` |
/// | `.observer(o)`      | `NoopObserver`            |
/// | `.time_source(t)`   | `MonotonicTimeSource`     |
///
/// # Example
///
/// ```rust,ignore
/// let clock = ManualTimeSource::new();
/// let mut engine = EngineBuilder::new(network)
///     .config(config)
///     .time_source(clock.clone())
///     .build()?;
/// ```
pub struct EngineBuilder<O: SimObserver = NoopObserver> {
    network:  Arc<RoadNetwork>,
    config:   EngineConfig,
    observer: O,
    time:     Option<Box<dyn TimeSource + Send>>,
}

impl EngineBuilder<NoopObserver> {
    pub fn new(network: Arc<RoadNetwork>) -> Self {
        Self { network, config: EngineConfig::default(), observer: NoopObserver, time: None }
    }
}

impl<O: SimObserver> EngineBuilder<O> {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the observer (and with it the engine's observer type).
    pub fn observer<P: SimObserver>(self, observer: P) -> EngineBuilder<P> {
        EngineBuilder { network: self.network, config: self.config, observer, time: self.time }
    }

    /// Wall-clock source used by [`Engine::tick`].
    pub fn time_source<T: TimeSource + Send + 'static>(mut self, time: T) -> Self {
        self.time = Some(Box::new(time));
        self
    }

    /// Clamp the configuration and return a stopped engine with an empty
    /// fleet.
    ///
    /// Fails only for a network without nodes, on which no vehicle could
    /// ever be placed.
    pub fn build(self) -> SimResult<Engine<O>> {
        if self.network.is_empty() {
            return Err(SimError::Config("road network has no nodes".into()));
        }

        let mut config = self.config;
        config.tick_interval_ms = config.tick_interval_ms.max(1);
        config.speed_multiplier = clamp_speed_multiplier(config.speed_multiplier);

        Ok(Engine {
            fleet:        VehicleFleet::new(self.network, config.seed),
            interference: InterferenceGraph::new(config.index.clone()),
            clock:        SimClock::new(),
            time:         self.time.unwrap_or_else(|| Box::new(MonotonicTimeSource::new())),
            observer:     self.observer,
            state:        EngineState::Stopped,
            config,
        })
    }
}
