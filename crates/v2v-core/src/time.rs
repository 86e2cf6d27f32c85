//! Simulation time model.
//!
//! # Design
//!
//! Two clocks meet here:
//!
//! - **Ticks** count how many times the external scheduler has fired the
//!   engine.  `Tick` is the canonical unit for rebuild cadence arithmetic.
//! - **Wall time** is read through a [`TimeSource`] and converted into the
//!   per-tick `Δt` (seconds) that vehicles advance by.
//!
//! `SimClock` owns the mark between consecutive wall-time reads.  Pausing
//! clears the mark, so the paused interval is never attributed to the next
//! tick; resuming sets a fresh mark.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    /// `true` when this tick falls on a multiple of `interval` (clamped to
    /// at least 1, so every tick matches an interval of 0 or 1).
    #[inline]
    pub fn is_multiple_of(self, interval: u64) -> bool {
        self.0 % interval.max(1) == 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── TimeSource ────────────────────────────────────────────────────────────────

/// Monotonic wall-clock reader.
///
/// The origin is arbitrary; only differences between readings matter.
pub trait TimeSource {
    fn now(&self) -> Duration;
}

/// Reads `std::time::Instant`.  The default for interactive drivers.
#[derive(Clone, Debug)]
pub struct MonotonicTimeSource {
    origin: Instant,
}

impl MonotonicTimeSource {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Explicitly advanced time source for tests and deterministic drivers.
///
/// Clones share the same underlying counter, so a test can keep one handle
/// and hand another to the engine.
#[derive(Clone, Debug, Default)]
pub struct ManualTimeSource {
    micros: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `by`.
    pub fn advance(&self, by: Duration) {
        let us = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.micros.fetch_add(us, Ordering::Relaxed);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Relaxed))
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus wall-time accounting between ticks.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    /// Ticks processed so far.
    pub current_tick: Tick,
    /// Total simulated seconds applied to vehicles.
    pub sim_elapsed_secs: f64,
    /// Wall-time reading of the previous lap; `None` while frozen.
    mark: Option<Duration>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring from `now`, discarding any previous mark.
    #[inline]
    pub fn restart(&mut self, now: Duration) {
        self.mark = Some(now);
    }

    /// Stop measuring.  The next [`lap`](Self::lap) returns zero until
    /// [`restart`](Self::restart) is called.
    #[inline]
    pub fn freeze(&mut self) {
        self.mark = None;
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.mark.is_none()
    }

    /// Wall seconds since the previous mark; moves the mark to `now`.
    ///
    /// A time source that goes backwards yields zero rather than a
    /// negative step.
    pub fn lap(&mut self, now: Duration) -> f64 {
        match self.mark {
            Some(prev) => {
                self.mark = Some(now);
                now.saturating_sub(prev).as_secs_f64()
            }
            None => 0.0,
        }
    }

    /// Count one processed tick that applied `dt_secs` of simulated time.
    #[inline]
    pub fn advance(&mut self, dt_secs: f64) {
        self.current_tick = Tick(self.current_tick.0 + 1);
        self.sim_elapsed_secs += dt_secs;
    }

    /// Break simulated time into (hours, minutes, seconds).
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total = self.sim_elapsed_secs.max(0.0) as u64;
        (total / 3_600, ((total % 3_600) / 60) as u32, (total % 60) as u32)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "{} ({:02}:{:02}:{:02} simulated)", self.current_tick, h, m, s)
    }
}
