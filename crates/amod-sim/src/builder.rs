//! Fluent builder for constructing an [`AmodContext`].

use std::io::Read;

use amod_core::SimConfig;
use amod_demand::DemandEstimator;
use amod_fleet::{FleetConfig, FleetManager, ManagerBasic, ManagerKind, ManagerMatchRebalance};
use amod_motion::{MotionParams, SimulatorBasic, VehicleMotionSimulator};
use amod_schedule::BookingFeed;
use amod_spatial::{DistanceOracle, EuclideanOracle};
use amod_world::{Booking, Location, World};

use crate::{AmodContext, SimError, SimResult};

/// Fluent builder for [`AmodContext<S>`].
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                     |
/// |--------------------------|---------------------------------------------|
/// | `.world(w)`              | empty `World`                               |
/// | `.motion_params(p)`      | `MotionParams::default()`                   |
/// | `.fleet_config(c)`       | `FleetConfig::default()` (match/rebalance)  |
/// | `.stations(v)`           | every location of the world                 |
/// | `.demand_estimator(e)`   | none: rebalancing only in current-queue mode|
/// | `.bookings(v)`           | none                                        |
/// | `.booking_feed(f)`       | none                                        |
///
/// # Example
///
/// ```rust,ignore
/// let mut ctx = AmodContextBuilder::new(config)
///     .world(world)
///     .bookings(load_bookings_path(&path)?)
///     .build()?;
/// ctx.run(&mut NoopObserver)?;
/// ```
pub struct AmodContextBuilder {
    config:    SimConfig,
    params:    MotionParams,
    fleet:     FleetConfig,
    world:     World,
    stations:  Option<Vec<Location>>,
    estimator: Option<Box<dyn DemandEstimator>>,
    bookings:  Vec<Booking>,
    feed:      Option<BookingFeed<Box<dyn Read>>>,
}

impl AmodContextBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            params:    MotionParams::default(),
            fleet:     FleetConfig::default(),
            world:     World::new(),
            stations:  None,
            estimator: None,
            bookings:  Vec::new(),
            feed:      None,
        }
    }

    /// Initial vehicles, customers and locations.
    pub fn world(mut self, world: World) -> Self {
        self.world = world;
        self
    }

    pub fn motion_params(mut self, params: MotionParams) -> Self {
        self.params = params;
        self
    }

    pub fn fleet_config(mut self, fleet: FleetConfig) -> Self {
        self.fleet = fleet;
        self
    }

    /// Rebalancing stations.  Ignored by the basic manager.
    pub fn stations(mut self, stations: Vec<Location>) -> Self {
        self.stations = Some(stations);
        self
    }

    /// Demand model for rebalancing.  Ignored by the basic manager.
    pub fn demand_estimator(mut self, estimator: Box<dyn DemandEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Bookings handed to the manager up front.
    pub fn bookings(mut self, bookings: Vec<Booking>) -> Self {
        self.bookings = bookings;
        self
    }

    /// Bookings streamed from a reader as they come due.
    pub fn booking_feed(mut self, feed: BookingFeed<Box<dyn Read>>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Build with the straight-line basic simulator.
    pub fn build(self) -> SimResult<AmodContext<SimulatorBasic<EuclideanOracle>>> {
        self.build_with_oracle(EuclideanOracle)
    }

    /// Build with the basic simulator over a custom distance oracle.
    pub fn build_with_oracle<O: DistanceOracle>(
        self,
        oracle: O,
    ) -> SimResult<AmodContext<SimulatorBasic<O>>> {
        self.validate()?;
        let simulator = SimulatorBasic::new(&self.config, self.params, oracle)?;
        self.build_with_simulator(simulator)
    }

    /// Validate inputs, initialise `simulator` and the manager on the world
    /// and return a ready-to-run context.
    pub fn build_with_simulator<S: VehicleMotionSimulator>(
        self,
        mut simulator: S,
    ) -> SimResult<AmodContext<S>> {
        self.validate()?;

        let mut world = self.world;
        world.set_current_time(self.config.start_time);
        simulator.init(&mut world)?;

        let mut manager: Box<dyn FleetManager> = match self.fleet.manager {
            ManagerKind::Basic => {
                if self.stations.is_some() || self.estimator.is_some() {
                    log::warn!("basic manager ignores stations and demand estimator");
                }
                Box::new(ManagerBasic::new())
            }
            ManagerKind::MatchRebalance => {
                let mut m = ManagerMatchRebalance::new(self.fleet.clone())?;
                match &self.stations {
                    Some(stations) => m.load_stations(stations, &world)?,
                    None => {
                        let stations: Vec<Location> = world.locations().cloned().collect();
                        m.load_stations(&stations, &world)?;
                    }
                }
                if let Some(estimator) = self.estimator {
                    m.set_demand_estimator(estimator);
                }
                Box::new(m)
            }
        };
        manager.load_bookings(self.bookings);
        if let Some(feed) = self.feed {
            manager.set_booking_feed(feed);
        }
        manager.init(&mut world, &mut simulator)?;

        log::info!(
            "context ready: {} ticks of {}s from t={}, {:?} manager",
            self.config.total_ticks(),
            self.config.resolution,
            self.config.start_time,
            self.fleet.manager
        );
        Ok(AmodContext::new(self.config, world, simulator, manager))
    }

    fn validate(&self) -> SimResult<()> {
        self.config.validate().map_err(|e| SimError::Config(e.to_string()))?;
        self.params.validate().map_err(|e| SimError::Config(e.to_string()))?;
        self.fleet.validate().map_err(|e| SimError::Config(e.to_string()))?;
        Ok(())
    }
}
