//! `ManagerMatchRebalance`: batch matching and station rebalancing.
//!
//! # Tick
//!
//! 1. Vehicles that finished a trip or a rebalancing move since the last
//!    call (ARRIVAL/DROPOFF events, vehicle now idle) become available.
//! 2. Due bookings are received.  Unserviceable ones are discarded with a
//!    [`DiscardReason`]; teleports go straight to the simulator; the rest
//!    enter the pool and are attached to their nearest station.
//! 3. Every `matching_interval` seconds the pool is matched against the
//!    available vehicles, greedily or by optimal assignment.
//! 4. Every `rebalancing_interval` seconds idle vehicles are moved between
//!    stations by solving a min-cost flow LP.
//!
//! # Stations
//!
//! Each vehicle is owned by one station.  Ownership moves to the station
//! nearest the destination when a vehicle takes a booking, and to the target
//! station when it is rebalanced, so ownership reflects where the vehicle
//! will next be idle.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use pathfinding::kuhn_munkres::{Weights, kuhn_munkres};

use amod_core::{BookingId, EventId, LocationId, Position, ReturnCode, VehicleId};
use amod_demand::DemandEstimator;
use amod_motion::VehicleMotionSimulator;
use amod_schedule::{BookingFeed, BookingQueue};
use amod_spatial::KdTree;
use amod_world::{Booking, CustomerStatus, EventKind, Location, TravelMode, VehicleStatus, World};

use crate::lp::{LinearProgram, Relation};
use crate::manager::{DiscardReason, admit_customer, announce, discard, feed_backlog, location_index};
use crate::{FleetConfig, FleetError, FleetManager, FleetResult, MatchMethod};

/// Seed for the station index; tree shape never changes query results.
const STATION_TREE_SEED: u64 = 0x57a7;

/// Flow cost between stations with no path.
pub const UNREACHABLE_COST: f64 = 1e11;

/// Fixed-point scale for assignment scores.
const SCORE_SCALE: f64 = 1_000_000.0;

// ── Assignment weights ────────────────────────────────────────────────────────

/// Row-major score matrix for `kuhn_munkres`; 0 marks an excluded pair.
struct ScoreMatrix(Vec<Vec<i64>>);

impl Weights<i64> for ScoreMatrix {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        ScoreMatrix(self.0.iter().map(|r| r.iter().map(|&x| -x).collect()).collect())
    }
}

// ── ManagerMatchRebalance ─────────────────────────────────────────────────────

pub struct ManagerMatchRebalance {
    config:           FleetConfig,
    queue:            BookingQueue,
    feed:             Option<BookingFeed<Box<dyn Read>>>,
    pool:             BTreeMap<BookingId, Booking>,
    available:        BTreeSet<VehicleId>,
    stations:         BTreeMap<LocationId, Location>,
    station_tree:     KdTree<Location>,
    locations:        KdTree<Location>,
    home:             BTreeMap<VehicleId, LocationId>,
    booking_station:  BTreeMap<BookingId, LocationId>,
    estimator:        Option<Box<dyn DemandEstimator>>,
    next_matching:    f64,
    next_rebalancing: f64,
    event_cursor:     EventId,
}

impl ManagerMatchRebalance {
    pub fn new(config: FleetConfig) -> FleetResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            queue:            BookingQueue::new(),
            feed:             None,
            pool:             BTreeMap::new(),
            available:        BTreeSet::new(),
            stations:         BTreeMap::new(),
            station_tree:     KdTree::default(),
            locations:        KdTree::default(),
            home:             BTreeMap::new(),
            booking_station:  BTreeMap::new(),
            estimator:        None,
            next_matching:    0.0,
            next_rebalancing: 0.0,
            event_cursor:     EventId::NONE,
        })
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Use `stations` for rebalancing and hand every vehicle in `world` to
    /// its nearest station.
    ///
    /// Only the stations' ids, names, positions and capacities are kept; the
    /// manager tracks ownership and waiting customers in its own copies.
    pub fn load_stations<'a>(
        &mut self,
        stations: impl IntoIterator<Item = &'a Location>,
        world:    &World,
    ) -> FleetResult<()> {
        self.stations = stations
            .into_iter()
            .map(|s| (s.id, Location::new(s.id, s.name.clone(), s.position, s.capacity)))
            .collect();
        self.station_tree =
            KdTree::build_seeded(self.stations.values().cloned().collect(), STATION_TREE_SEED)?;
        self.home.clear();
        self.booking_station.clear();

        let vehicles: Vec<(VehicleId, Position)> = world.vehicles().map(|v| (v.id, v.position)).collect();
        for (vehicle, position) in vehicles {
            if let Some(station) = self.closest_station(position) {
                self.transfer(vehicle, station);
            }
        }
        log::info!(
            "loaded {} stations owning {} vehicles",
            self.stations.len(),
            self.home.len()
        );
        Ok(())
    }

    pub fn set_demand_estimator(&mut self, estimator: Box<dyn DemandEstimator>) {
        self.estimator = Some(estimator);
    }

    pub fn stations(&self) -> impl Iterator<Item = &Location> {
        self.stations.values()
    }

    pub fn station(&self, id: LocationId) -> Option<&Location> {
        self.stations.get(&id)
    }

    /// Station that currently owns `vehicle`.
    pub fn home_station(&self, vehicle: VehicleId) -> Option<LocationId> {
        self.home.get(&vehicle).copied()
    }

    /// Station nearest to `position`, if any stations are loaded.
    pub fn closest_station(&self, position: Position) -> Option<LocationId> {
        self.station_tree.find_nn(&position, 0.0).ok().map(|s| s.id)
    }

    pub fn available_vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.available.iter().copied()
    }

    pub fn is_available(&self, vehicle: VehicleId) -> bool {
        self.available.contains(&vehicle)
    }

    /// Received fleet bookings not yet matched.
    pub fn pooled_bookings(&self) -> impl Iterator<Item = &Booking> {
        self.pool.values()
    }

    pub fn next_matching_time(&self) -> f64 {
        self.next_matching
    }

    pub fn next_rebalancing_time(&self) -> f64 {
        self.next_rebalancing
    }

    // ── Intake ────────────────────────────────────────────────────────────

    fn return_vehicles(&mut self, world: &World) {
        for e in world.events().iter().filter(|e| e.id >= self.event_cursor) {
            if !matches!(e.kind, EventKind::Arrival | EventKind::Dropoff) {
                continue;
            }
            let Some(&raw) = e.entity_ids.first() else { continue };
            let vehicle = VehicleId(raw as _);
            if world.vehicle(vehicle).is_some_and(|v| v.status.is_idle()) {
                self.available.insert(vehicle);
            }
        }
        self.event_cursor = world.next_event_id();
    }

    fn receive(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator, booking: Booking) {
        announce(world, &booking);
        admit_customer(world, &self.locations, &booking);

        if !self.is_booking_valid(world, sim, &booking) {
            discard(world, &booking, DiscardReason::NoSuitablePath);
            return;
        }
        let Some(customer) = world.customer(booking.customer_id) else { return };
        if !customer.status.is_matchable() {
            discard(world, &booking, DiscardReason::CustomerNotFree);
            return;
        }
        let position = customer.position;

        if booking.mode == TravelMode::Teleport {
            if let Err(code) = sim.service_booking(world, &booking) {
                log::warn!("booking {}: teleport rejected: {code}", booking.id.0);
            }
            return;
        }
        if self.pool.contains_key(&booking.id) {
            log::warn!("booking {} received twice; keeping the first", booking.id.0);
            return;
        }

        if let Err(code) =
            sim.set_customer_status(world, booking.customer_id, CustomerStatus::WaitingForAssignment)
        {
            log::warn!("booking {}: customer not marked waiting: {code}", booking.id.0);
        }
        if let Some(station) = self.closest_station(position) {
            if let Some(s) = self.stations.get_mut(&station) {
                s.add_customer_id(booking.customer_id);
            }
            self.booking_station.insert(booking.id, station);
        }
        log::debug!("booking {} pooled", booking.id.0);
        self.pool.insert(booking.id, booking);
    }

    /// The trip has a path, and some station can reach the customer.
    fn is_booking_valid(&self, world: &World, sim: &dyn VehicleMotionSimulator, booking: &Booking) -> bool {
        if sim.driving_distance(booking.source, booking.destination).is_none() {
            return false;
        }
        if self.stations.is_empty() {
            return true;
        }
        let Some(customer) = world.customer(booking.customer_id) else { return false };
        let at = (customer.location_id, customer.position);
        self.stations
            .values()
            .any(|s| distance(world, sim, (s.id, s.position), at).is_some())
    }

    // ── Matching ──────────────────────────────────────────────────────────

    /// Run one matching pass with the configured method.  Returns the number
    /// of bookings handed to the simulator.
    pub fn solve_matching(
        &mut self,
        world: &mut World,
        sim:   &mut dyn VehicleMotionSimulator,
    ) -> FleetResult<usize> {
        if self.pool.is_empty() || self.available.is_empty() {
            return Ok(0);
        }
        let pooled = self.pool.len();
        let assigned = match self.config.match_method {
            MatchMethod::Greedy => self.match_greedy(world, sim),
            MatchMethod::Assignment => self.match_assignment(world, sim),
        };
        log::info!(
            "t={:.1}: matched {assigned} of {pooled} bookings, {} vehicles still available",
            world.current_time(),
            self.available.len()
        );
        Ok(assigned)
    }

    fn match_greedy(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> usize {
        let mut assigned = 0;
        let ids: Vec<BookingId> = self.pool.keys().copied().collect();
        for id in ids {
            if self.available.is_empty() {
                break;
            }
            let Some(booking) = self.pool.get(&id).cloned() else { continue };
            let w: &World = world;
            let s: &dyn VehicleMotionSimulator = sim;
            let Some(customer) = w.customer(booking.customer_id) else { continue };
            let target = (customer.location_id, customer.position);

            // Scan whichever side is smaller.
            let candidate = if self.available.len() < w.num_locations() || w.num_locations() == 0 {
                self.available
                    .iter()
                    .filter(|&&v| !s.is_dispatched(v))
                    .filter_map(|&v| {
                        let veh = w.vehicle(v)?;
                        distance(w, s, (veh.location_id, veh.position), target).map(|d| (v, d))
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            } else {
                w.locations()
                    .filter_map(|l| {
                        let v = l
                            .vehicle_ids()
                            .find(|v| self.available.contains(v) && !s.is_dispatched(*v))?;
                        distance(w, s, (l.id, l.position), target).map(|d| (v, d))
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            };

            if let Some((vehicle, _)) = candidate {
                if self.commit(world, sim, booking, vehicle) {
                    assigned += 1;
                }
            }
        }
        assigned
    }

    fn match_assignment(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> usize {
        let w: &World = world;
        let s: &dyn VehicleMotionSimulator = sim;
        let now = w.current_time();
        let bookings: Vec<Booking> = self.pool.values().cloned().collect();
        let vehicles: Vec<VehicleId> = self
            .available
            .iter()
            .copied()
            .filter(|&v| w.vehicle(v).is_some() && !s.is_dispatched(v))
            .collect();
        if bookings.is_empty() || vehicles.is_empty() {
            return 0;
        }

        // ── Score every pair ──────────────────────────────────────────────
        let dcf = self.config.distance_cost_factor;
        let wcf = self.config.waiting_time_cost_factor;
        let mut scores = vec![vec![0_i64; vehicles.len()]; bookings.len()];
        let mut any = false;
        for (i, b) in bookings.iter().enumerate() {
            let Some(customer) = w.customer(b.customer_id) else { continue };
            let target = (customer.location_id, customer.position);
            let waited = (now - b.time).max(0.0);
            for (j, &v) in vehicles.iter().enumerate() {
                let Some(veh) = w.vehicle(v) else { continue };
                let Some(d) = distance(w, s, (veh.location_id, veh.position), target) else {
                    continue;
                };
                let score = 1.0 / (1.0 + dcf * d + wcf * waited);
                scores[i][j] = ((score * SCORE_SCALE).round() as i64).max(1);
                any = true;
            }
        }
        if !any {
            return 0;
        }

        // ── Solve; kuhn_munkres needs rows <= columns ─────────────────────
        let pairs: Vec<(usize, usize)> = if bookings.len() <= vehicles.len() {
            let (_, cols) = kuhn_munkres(&ScoreMatrix(scores.clone()));
            cols.into_iter().enumerate().collect()
        } else {
            let transposed: Vec<Vec<i64>> = (0..vehicles.len())
                .map(|j| scores.iter().map(|row| row[j]).collect())
                .collect();
            let (_, cols) = kuhn_munkres(&ScoreMatrix(transposed));
            cols.into_iter().enumerate().map(|(j, i)| (i, j)).collect()
        };

        let mut assigned = 0;
        for (i, j) in pairs {
            if scores[i][j] == 0 {
                continue;
            }
            if self.commit(world, sim, bookings[i].clone(), vehicles[j]) {
                assigned += 1;
            }
        }
        assigned
    }

    /// Hand `booking` to the simulator with `vehicle`.  The booking leaves
    /// the pool whatever the outcome.
    fn commit(
        &mut self,
        world:   &mut World,
        sim:     &mut dyn VehicleMotionSimulator,
        mut booking: Booking,
        vehicle: VehicleId,
    ) -> bool {
        booking.vehicle_id = vehicle;
        self.pool.remove(&booking.id);
        if let Some(station) = self.booking_station.remove(&booking.id) {
            if let Some(s) = self.stations.get_mut(&station) {
                s.remove_customer_id(booking.customer_id);
            }
        }

        match sim.service_booking(world, &booking) {
            Ok(()) => {
                self.available.remove(&vehicle);
                if let Some(station) = self.closest_station(booking.destination) {
                    self.transfer(vehicle, station);
                }
                log::debug!("booking {} assigned to {vehicle}", booking.id.0);
                true
            }
            Err(code) => {
                log::warn!("booking {} with {vehicle} failed: {code}", booking.id.0);
                discard(world, &booking, DiscardReason::ServiceBookingFailure);
                if world
                    .customer(booking.customer_id)
                    .is_some_and(|c| c.status == CustomerStatus::WaitingForAssignment)
                {
                    if let Err(code) =
                        sim.set_customer_status(world, booking.customer_id, CustomerStatus::Free)
                    {
                        log::warn!("booking {}: customer not released: {code}", booking.id.0);
                    }
                }
                false
            }
        }
    }

    /// Make `station` the owner of `vehicle`.
    fn transfer(&mut self, vehicle: VehicleId, station: LocationId) {
        if let Some(old) = self.home.insert(vehicle, station) {
            if let Some(s) = self.stations.get_mut(&old) {
                s.remove_vehicle_id(vehicle);
            }
        }
        if let Some(s) = self.stations.get_mut(&station) {
            s.add_vehicle_id(vehicle);
        }
    }

    // ── Rebalancing ───────────────────────────────────────────────────────

    /// Run one rebalancing pass.  Returns the number of vehicles sent.
    ///
    /// An infeasible or unbounded program moves nothing.
    ///
    /// # Errors
    ///
    /// [`FleetError::Invariant`] if the simulator rejects a move the program
    /// allowed.
    pub fn solve_rebalancing(
        &mut self,
        world: &mut World,
        sim:   &mut dyn VehicleMotionSimulator,
    ) -> FleetResult<usize> {
        if self.stations.len() < 2 || self.available.is_empty() {
            return Ok(0);
        }
        let now = world.current_time();
        let ids: Vec<LocationId> = self.stations.keys().copied().collect();
        let n = ids.len();

        // ── Excess demand and idle supply per station ─────────────────────
        let excess: Vec<i64> = ids
            .iter()
            .map(|id| {
                let station = &self.stations[id];
                let predicted = if self.config.use_current_queue {
                    station.num_customers() as i64
                } else {
                    self.estimator
                        .as_ref()
                        .map_or(0, |e| e.predict(*id, world, now).0.ceil() as i64)
                };
                predicted - station.num_vehicles() as i64
            })
            .collect();
        let idle: Vec<i64> = ids
            .iter()
            .map(|id| {
                self.available.iter().filter(|v| self.home.get(v) == Some(id)).count() as i64
            })
            .collect();
        let total_excess: i64 = excess.iter().sum();
        let total_idle: i64 = idle.iter().sum();
        let served = excess.iter().filter(|&&e| e > 0).count() as i64;

        // ── Program ───────────────────────────────────────────────────────
        let pairs: Vec<(usize, usize)> =
            (0..n).flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j))).collect();
        let var = |i: usize, j: usize| i * (n - 1) + if j < i { j } else { j - 1 };

        let mut lp = LinearProgram::new(pairs.len());
        for (k, &(i, j)) in pairs.iter().enumerate() {
            let from = self.stations[&ids[i]].position;
            let to = self.stations[&ids[j]].position;
            let cost = sim.driving_distance(from, to).unwrap_or(UNREACHABLE_COST);
            lp.set_cost(k, cost).map_err(lp_bug)?;
        }

        // Demand cannot all be met: aim for an even share of idle vehicles.
        let share = (total_excess > 0).then(|| total_idle / served.max(1));
        for i in 0..n {
            let others = (0..n).filter(|&j| j != i);
            let net_in: Vec<(usize, f64)> =
                others.clone().flat_map(|j| [(var(j, i), 1.0), (var(i, j), -1.0)]).collect();
            let target = match share {
                Some(s) => excess[i].min(s),
                None => excess[i],
            };
            lp.add_constraint(net_in, Relation::Ge, target as f64).map_err(lp_bug)?;

            let out: Vec<(usize, f64)> = others.map(|j| (var(i, j), 1.0)).collect();
            lp.add_constraint(out.clone(), Relation::Le, idle[i] as f64).map_err(lp_bug)?;
            if share.is_some() {
                let surplus = idle[i].min((-excess[i]).max(0));
                lp.add_constraint(out, Relation::Ge, surplus as f64).map_err(lp_bug)?;
            }
        }

        let solution = match lp.solve() {
            Ok(s) => s,
            Err(e) => {
                log::info!("t={now:.1}: rebalancing skipped: {e}");
                return Ok(0);
            }
        };

        // ── Dispatch ──────────────────────────────────────────────────────
        let mut moved = 0;
        for (k, &(i, j)) in pairs.iter().enumerate() {
            let count = (solution.values[k] + 1e-6).floor() as i64;
            if count <= 0 {
                continue;
            }
            if let Err(code) = self.inter_station_dispatch(world, sim, ids[i], ids[j], count) {
                log::error!(
                    "rebalancing {count} vehicles from station {} to {} failed: {code}",
                    ids[i].0,
                    ids[j].0
                );
                return Err(FleetError::Invariant {
                    task:   "rebalancing dispatch",
                    entity: ids[i].into(),
                    code,
                });
            }
            moved += count as usize;
        }
        log::info!(
            "t={now:.1}: rebalanced {moved} vehicles (excess {total_excess}, idle {total_idle})"
        );
        Ok(moved)
    }

    /// Send `count` available vehicles owned by station `from` to station
    /// `to`, moving their ownership and emitting one REBALANCE event.
    ///
    /// # Errors
    ///
    /// - [`ReturnCode::Failed`] if `count <= 0` or `from` owns fewer than
    ///   `count` available vehicles.
    /// - [`ReturnCode::InvalidStationId`] for an unknown station.
    /// - [`ReturnCode::SourceEqualsDestination`] if `from == to`.
    /// - Any code the simulator returns for a dispatch.
    pub fn inter_station_dispatch(
        &mut self,
        world: &mut World,
        sim:   &mut dyn VehicleMotionSimulator,
        from:  LocationId,
        to:    LocationId,
        count: i64,
    ) -> Result<(), ReturnCode> {
        if count <= 0 {
            return Err(ReturnCode::Failed);
        }
        if !self.stations.contains_key(&from) {
            return Err(ReturnCode::InvalidStationId);
        }
        let Some(target) = self.stations.get(&to).map(|s| s.position) else {
            return Err(ReturnCode::InvalidStationId);
        };
        if from == to {
            return Err(ReturnCode::SourceEqualsDestination);
        }

        let idle: Vec<VehicleId> = self
            .available
            .iter()
            .copied()
            .filter(|v| self.home.get(v) == Some(&from))
            .take(count as usize)
            .collect();
        if (idle.len() as i64) < count {
            return Err(ReturnCode::Failed);
        }

        for vehicle in idle {
            sim.dispatch_vehicle(
                world,
                vehicle,
                target,
                VehicleStatus::MovingToRebalance,
                VehicleStatus::Free,
                BookingId::NONE,
            )?;
            self.transfer(vehicle, to);
            self.available.remove(&vehicle);
        }
        world.push_event(
            EventKind::Rebalance,
            format!("rebalancing {count} vehicles from station {} to {}", from.0, to.0),
            vec![from.into(), to.into(), count as u64],
        );
        Ok(())
    }
}

impl FleetManager for ManagerMatchRebalance {
    fn init(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> FleetResult<()> {
        let now = world.current_time();
        self.locations = location_index(world)?;
        self.available = world
            .vehicles()
            .filter(|v| v.status.is_idle() && !sim.is_dispatched(v.id))
            .map(|v| v.id)
            .collect();
        self.next_matching = now + self.config.matching_interval;
        self.next_rebalancing = now;
        self.event_cursor = world.next_event_id();
        log::info!(
            "match/rebalance manager ({:?}): {} vehicles available, {} stations, estimator {}",
            self.config.match_method,
            self.available.len(),
            self.stations.len(),
            if self.estimator.is_some() { "set" } else { "unset" }
        );
        Ok(())
    }

    fn update(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> FleetResult<()> {
        let now = world.current_time();
        self.return_vehicles(world);

        let mut due = self.queue.drain_due(now);
        if let Some(feed) = self.feed.as_mut() {
            due.extend(feed.due(now)?);
        }
        for booking in due {
            self.receive(world, sim, booking);
        }

        if now >= self.next_matching {
            self.solve_matching(world, sim)?;
            self.next_matching = now + self.config.matching_interval;
        }

        if now >= self.next_rebalancing {
            if !self.stations.is_empty() && (self.estimator.is_some() || self.config.use_current_queue) {
                self.solve_rebalancing(world, sim)?;
            }
            self.next_rebalancing = now + self.config.rebalancing_interval;
        }
        Ok(())
    }

    fn load_bookings(&mut self, bookings: Vec<Booking>) {
        self.queue.extend(bookings);
    }

    fn set_booking_feed(&mut self, feed: BookingFeed<Box<dyn Read>>) {
        self.feed = Some(feed);
    }

    fn num_pending_bookings(&self) -> usize {
        self.queue.len() + self.pool.len() + feed_backlog(&self.feed)
    }

    fn num_available_vehicles(&self, _world: &World) -> usize {
        self.available.len()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Location-to-location distance when both ends sit at known locations,
/// position-to-position otherwise.
fn distance(
    world: &World,
    sim:   &dyn VehicleMotionSimulator,
    from:  (LocationId, Position),
    to:    (LocationId, Position),
) -> Option<f64> {
    let known = |id: LocationId| id.is_some() && world.location(id).is_some();
    if known(from.0) && known(to.0) {
        sim.driving_distance_between(world, from.0, to.0)
    } else {
        sim.driving_distance(from.1, to.1)
    }
}

fn lp_bug(e: crate::lp::LpError) -> FleetError {
    FleetError::Config(format!("rebalancing program: {e}"))
}
