//! The `AmodContext` struct and its tick loop.

use amod_core::SimConfig;
use amod_fleet::FleetManager;
use amod_motion::VehicleMotionSimulator;
use amod_world::World;

use crate::{SimObserver, SimResult, TickStats};

/// Owns everything a run needs and drives the tick loop:
///
/// 1. **Manager**: react to last tick's events, take in due bookings, match
///    and rebalance.
/// 2. **Events**: hand the event log to the observer, then clear it.
/// 3. **Simulator**: advance motion, pickups, drop-offs and teleports by one
///    resolution step.
///
/// Create via [`AmodContextBuilder`][crate::AmodContextBuilder].
pub struct AmodContext<S: VehicleMotionSimulator> {
    /// Run configuration (resolution, end time, seed, ...).
    pub config: SimConfig,

    /// Shared entity state and event log.
    pub world: World,

    /// Moves vehicles and customers.
    pub simulator: S,

    /// Decides who serves which booking.
    pub manager: Box<dyn FleetManager>,

    tick: u64,
}

impl<S: VehicleMotionSimulator> AmodContext<S> {
    pub(crate) fn new(
        config:    SimConfig,
        world:     World,
        simulator: S,
        manager:   Box<dyn FleetManager>,
    ) -> Self {
        Self { config, world, simulator, manager, tick: 0 }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn current_time(&self) -> f64 {
        self.world.current_time()
    }

    /// Nothing left to do: no pending bookings and no simulator tasks.
    pub fn is_idle(&self) -> bool {
        self.manager.num_pending_bookings() == 0 && self.simulator.pending_tasks() == 0
    }

    /// Run from the current tick to `config.total_ticks()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let total = self.config.total_ticks();
        while self.tick < total {
            self.step(observer)?;
        }
        self.finish(observer);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores the end time).
    ///
    /// Does not call `on_sim_end`, so it can be used for incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Run until [`is_idle`](Self::is_idle) or `max_ticks` have passed, then
    /// finish the run.  Returns the number of ticks executed.
    pub fn run_until_idle<O: SimObserver>(&mut self, max_ticks: u64, observer: &mut O) -> SimResult<u64> {
        let mut n = 0;
        while n < max_ticks {
            self.step(observer)?;
            n += 1;
            if self.is_idle() {
                break;
            }
        }
        self.finish(observer);
        Ok(n)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let tick = self.tick;
        observer.on_tick_start(tick, self.world.current_time());

        if let Err(e) = self.manager.update(&mut self.world, &mut self.simulator) {
            log::error!("fleet manager failed at t={:.1}: {e}", self.world.current_time());
            return Err(e.into());
        }

        let events = self.world.num_events();
        observer.on_events(self.world.events());
        self.world.clear_events();
        let stats = TickStats {
            events,
            available: self.manager.num_available_vehicles(&self.world),
            pending:   self.manager.num_pending_bookings(),
        };

        if let Err(e) = self.simulator.update(&mut self.world) {
            log::error!("simulator failed at t={:.1}: {e}", self.world.current_time());
            return Err(e.into());
        }

        observer.on_tick_end(tick, self.world.current_time(), stats);
        if self.config.output_interval_ticks > 0
            && tick.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(tick, &self.world);
        }
        self.tick += 1;
        Ok(())
    }

    /// Flush the simulator's events from the final tick and close the run.
    fn finish<O: SimObserver>(&mut self, observer: &mut O) {
        if self.world.num_events() > 0 {
            observer.on_events(self.world.events());
            self.world.clear_events();
        }
        log::info!(
            "run finished at t={:.1} after {} ticks, {} bookings pending",
            self.world.current_time(),
            self.tick,
            self.manager.num_pending_bookings()
        );
        observer.on_sim_end(&self.world);
    }
}
