//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing millisecond counter, `SimTime`.  The
//! host advances a `SimClock` by a fixed tick length and passes `now` into
//! every engine call, so all timers are evaluated against the same instant
//! within one tick and runs are reproducible.
//!
//! Durations in configuration are `f32`/`f64` seconds; conversions happen at
//! the edges (`SimTime::secs_since`, `SimTime::from_secs_f64`).
//!
//! `Stopwatch` replaces wall-clock stopwatches: it never reads a system clock,
//! it only records the `SimTime` it was started at.

use std::fmt;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation instant, in milliseconds since simulation start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn from_secs(secs: u64) -> SimTime {
        SimTime(secs * 1_000)
    }

    /// Round a fractional second count to the nearest millisecond.
    /// Negative inputs clamp to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> SimTime {
        SimTime((secs.max(0.0) * 1_000.0).round() as u64)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Seconds elapsed from `earlier` to `self`.  Saturates at zero if
    /// `earlier` is in the future.
    #[inline]
    pub fn secs_since(self, earlier: SimTime) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / 1_000.0
    }
}

impl std::ops::Add<u64> for SimTime {
    type Output = SimTime;
    /// Add `rhs` milliseconds.
    #[inline]
    fn add(self, rhs: u64) -> SimTime {
        SimTime(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Fixed-cadence simulation clock.
///
/// `SimClock` is cheap to copy and holds no heap data.  Elapsed simulation
/// time doubles as the "elapsed raid time" that quests gate on.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Milliseconds one tick represents.
    pub tick_ms: u64,
    /// Number of ticks processed so far.
    pub ticks: u64,
    /// The current instant — advanced by [`SimClock::advance`].
    pub now: SimTime,
}

impl SimClock {
    pub fn new(tick_ms: u64) -> Self {
        Self { tick_ms, ticks: 0, now: SimTime::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.ticks += 1;
        self.now = self.now + self.tick_ms;
    }

    /// Elapsed simulated seconds since the clock started.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.now.as_secs_f64()
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.now.0 / 1_000;
        write!(f, "tick {} ({:02}:{:02})", self.ticks, total / 60, total % 60)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run parameters for the scheduler loop.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Milliseconds per tick.  Must be non-zero.
    pub tick_ms: u64,

    /// Total ticks to simulate.
    pub total_ticks: u64,
}

impl SimConfig {
    /// The instant at which the run ends (exclusive upper bound).
    #[inline]
    pub fn end_time(&self) -> SimTime {
        SimTime(self.tick_ms.saturating_mul(self.total_ticks))
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.tick_ms)
    }
}

// ── Stopwatch ─────────────────────────────────────────────────────────────────

/// A pausable elapsed-time accumulator driven by caller-supplied instants.
///
/// Semantics follow the usual stopwatch contract:
///
/// - `start` resumes accumulation; no-op if already running.
/// - `stop` freezes the accumulated time.
/// - `reset` stops and zeroes.
/// - `restart` zeroes and starts running from `now`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Stopwatch {
    running_since: Option<SimTime>,
    accumulated_ms: u64,
}

impl Stopwatch {
    /// A stopped stopwatch at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// A stopwatch already running from `now`.
    pub fn started(now: SimTime) -> Self {
        Self { running_since: Some(now), accumulated_ms: 0 }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn start(&mut self, now: SimTime) {
        if self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    pub fn stop(&mut self, now: SimTime) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ms += now.0.saturating_sub(since.0);
        }
    }

    pub fn reset(&mut self) {
        self.running_since = None;
        self.accumulated_ms = 0;
    }

    pub fn restart(&mut self, now: SimTime) {
        self.running_since = Some(now);
        self.accumulated_ms = 0;
    }

    /// Total elapsed seconds as of `now`.
    pub fn elapsed_secs(&self, now: SimTime) -> f64 {
        let running = self
            .running_since
            .map_or(0, |since| now.0.saturating_sub(since.0));
        (self.accumulated_ms + running) as f64 / 1_000.0
    }
}
