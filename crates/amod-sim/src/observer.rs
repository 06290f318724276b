//! Simulation observer trait for progress reporting and data collection.

use amod_world::{Event, World};

/// Per-tick counters handed to [`SimObserver::on_tick_end`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Events reported through [`SimObserver::on_events`] this tick.
    pub events:    usize,
    /// Vehicles the manager could assign after its update.
    pub available: usize,
    /// Bookings queued or pooled but not yet handed to the simulator.
    pub pending:   usize,
}

/// Callbacks invoked by [`AmodContext::run`][crate::AmodContext::run] at key
/// points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: event counter
///
/// ```rust,ignore
/// struct Dispatches(usize);
///
/// impl SimObserver for Dispatches {
///     fn on_events(&mut self, events: &[Event]) {
///         self.0 += events.iter().filter(|e| e.kind == EventKind::Dispatch).count();
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before the manager runs.
    fn on_tick_start(&mut self, _tick: u64, _time: f64) {}

    /// Called once per tick with every event emitted since the previous call:
    /// the simulator's events from the last tick followed by the manager's
    /// events from this one.  The log is cleared afterwards.
    fn on_events(&mut self, _events: &[Event]) {}

    /// Called at the end of each tick, after the simulator has advanced.
    fn on_tick_end(&mut self, _tick: u64, _time: f64, _stats: TickStats) {}

    /// Called every `config.output_interval_ticks` ticks with the whole world.
    fn on_snapshot(&mut self, _tick: u64, _world: &World) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _world: &World) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
