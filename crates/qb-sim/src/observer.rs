//! Simulation observer trait for progress reporting and data collection.

use qb_core::{AgentId, SimTime};
use qb_engine::{Decision, EngineEvent};
use qb_quest::Assignment;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — stuck reporter
///
/// ```rust,ignore
/// struct StuckReporter;
///
/// impl SimObserver for StuckReporter {
///     fn on_event(&mut self, now: SimTime, agent: AgentId, event: &EngineEvent) {
///         if let EngineEvent::Stuck { path } = event {
///             println!("{now}: {agent} stuck on {path:?}");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _now: SimTime) {}

    /// Called whenever an agent is handed a new assignment.
    fn on_assignment(&mut self, _agent: AgentId, _assignment: &Assignment) {}

    /// Called for every event an agent's gate chain raised, in ascending
    /// agent order.
    fn on_event(&mut self, _now: SimTime, _agent: AgentId, _event: &EngineEvent) {}

    /// Called with every agent's decision before it is applied.
    fn on_decision(&mut self, _now: SimTime, _agent: AgentId, _decision: &Decision) {}

    /// Called at the end of each tick.
    ///
    /// `questing` is the number of agents whose decision this tick was not
    /// `Inactive`.
    fn on_tick_end(&mut self, _now: SimTime, _questing: usize) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
