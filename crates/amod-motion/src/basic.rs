//! `SimulatorBasic`: straight-line motion with truncated-normal timings.
//!
//! # Tick phases
//!
//! Each [`update`](VehicleMotionSimulator::update) works on a private copy of
//! the world, advanced by one `resolution`:
//!
//! | Phase     | Effect                                                        |
//! |-----------|---------------------------------------------------------------|
//! | motion    | every dispatch moves `speed * resolution`; MOVE or ARRIVAL    |
//! | pickups   | due pickups board the customer; bookings head to drop-off     |
//! | drop-offs | due drop-offs free vehicle and customer at the location       |
//! | teleports | due teleports land the customer at the target location        |
//!
//! The copy replaces the caller's world only when every phase succeeds, so a
//! failed tick leaves the caller's world as it was.  The simulator's own
//! task queues, booking table and RNG are not rolled back: tasks the tick
//! had already completed are gone, and the simulator must not be stepped
//! again after an error.
//!
//! # Locations
//!
//! When the world has locations at `init`, every position the simulator
//! deals in (dispatch endpoints, pickup and drop-off points, teleport
//! targets) is snapped to the nearest one.  Without locations, vehicles
//! drive to the raw coordinates given.

use std::collections::BTreeMap;

use amod_core::{
    BookingId, CustomerId, LocationId, Position, ReturnCode, SimConfig, SimRng, VehicleId,
};
use amod_spatial::{DistanceOracle, EuclideanOracle, KdTree};
use amod_world::{
    Booking, CustomerStatus, EventKind, Location, TravelMode, VehicleStatus, World,
};

use crate::{
    Dispatch, Handover, MotionError, MotionParams, MotionResult, TaskStore, Teleport,
    VehicleMotionSimulator,
};

/// Stream offset for the location tree's RNG, kept apart from the sampling
/// stream so building the index never shifts a run's random draws.
const LOCATION_TREE_STREAM: u64 = 0x10c;

#[derive(Debug)]
pub struct SimulatorBasic<O: DistanceOracle = EuclideanOracle> {
    oracle:     O,
    params:     MotionParams,
    resolution: f64,
    seed:       u64,
    rng:        SimRng,
    shadow:     World,
    locations:  Option<KdTree<Location>>,
    bookings:   BTreeMap<BookingId, Booking>,
    tasks:      TaskStore,
}

impl SimulatorBasic<EuclideanOracle> {
    /// A simulator measuring straight-line distances.
    pub fn euclidean(config: &SimConfig, params: MotionParams) -> MotionResult<Self> {
        Self::new(config, params, EuclideanOracle)
    }
}

impl<O: DistanceOracle> SimulatorBasic<O> {
    /// # Errors
    ///
    /// [`MotionError::Config`] if the resolution or any distribution is
    /// unusable.
    pub fn new(config: &SimConfig, params: MotionParams, oracle: O) -> MotionResult<Self> {
        config.validate().map_err(|e| MotionError::Config(e.to_string()))?;
        params.validate()?;
        Ok(Self {
            oracle,
            params,
            resolution: config.resolution,
            seed:       config.seed,
            rng:        SimRng::new(config.seed),
            shadow:     World::new(),
            locations:  None,
            bookings:   BTreeMap::new(),
            tasks:      TaskStore::default(),
        })
    }

    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The in-flight dispatch of `vehicle`, if any.
    pub fn dispatch(&self, vehicle: VehicleId) -> Option<&Dispatch> {
        self.tasks.dispatch(vehicle)
    }

    /// A booking accepted by `service_booking` and not yet completed.
    pub fn booking(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.get(&id)
    }

    pub fn num_dispatches(&self) -> usize {
        self.tasks.num_dispatches()
    }

    pub fn num_pickups(&self) -> usize {
        self.tasks.pickups.len()
    }

    pub fn num_dropoffs(&self) -> usize {
        self.tasks.dropoffs.len()
    }

    pub fn num_teleports(&self) -> usize {
        self.tasks.teleports.len()
    }

    fn nearest_location(&self, p: Position) -> Option<(LocationId, Position)> {
        let tree = self.locations.as_ref()?;
        tree.find_nn(&p, 0.0).ok().map(|l| (l.id, l.position))
    }

    // ── Commands ──────────────────────────────────────────────────────────

    fn start_dispatch(
        &mut self,
        state:      &mut World,
        vehicle_id: VehicleId,
        to:         Position,
        start:      VehicleStatus,
        end:        VehicleStatus,
        booking_id: BookingId,
    ) -> Result<(), ReturnCode> {
        if self.tasks.is_dispatched(vehicle_id) {
            return Err(ReturnCode::VehicleCannotBeDispatched);
        }
        let position = state.vehicle(vehicle_id).ok_or(ReturnCode::CannotGetVehicle)?.position;
        let customer_id = if booking_id.is_some() {
            let booking = self.bookings.get(&booking_id).ok_or(ReturnCode::Failed)?;
            state.customer(booking.customer_id).ok_or(ReturnCode::CannotGetCustomer)?;
            booking.customer_id
        } else {
            CustomerId::NONE
        };

        let (from_location, from) = self.nearest_location(position).unwrap_or((LocationId::NONE, position));
        let (to_location, to) = self.nearest_location(to).unwrap_or((LocationId::NONE, to));
        let direction = from.direction_to(to).unwrap_or(Position::new(1.0, 1.0));
        self.tasks
            .insert_dispatch(Dispatch {
                booking_id,
                vehicle_id,
                from_location,
                to_location,
                from,
                to,
                direction,
                current: from,
                end_status: end,
            })
            .ok_or(ReturnCode::VehicleCannotBeDispatched)?;

        if let Some(v) = state.vehicle_mut(vehicle_id) {
            v.status = start;
            if customer_id.is_some() {
                v.customer_id = customer_id;
            }
        }
        unpark_vehicle(state, vehicle_id);

        let aboard = match state.customer_mut(customer_id) {
            Some(c) => {
                c.vehicle_id = vehicle_id;
                let aboard = c.status.is_aboard();
                c.status = if aboard {
                    CustomerStatus::InVehicle
                } else {
                    CustomerStatus::WaitingForPickup
                };
                aboard
            }
            None => false,
        };
        if aboard {
            unpark_customer(state, customer_id);
        }

        state.push_event(
            EventKind::Dispatch,
            format!("vehicle {} dispatched to {to}", vehicle_id.0),
            vec![vehicle_id.into(), booking_id.into()],
        );
        Ok(())
    }

    fn schedule_pickup(
        &mut self,
        state:       &mut World,
        vehicle_id:  VehicleId,
        customer_id: CustomerId,
        booking_id:  BookingId,
        start:       VehicleStatus,
        end:         VehicleStatus,
    ) -> Result<(), ReturnCode> {
        if state.vehicle(vehicle_id).is_none() {
            return Err(ReturnCode::CannotGetVehicle);
        }
        let position = state.customer(customer_id).ok_or(ReturnCode::CannotGetCustomer)?.position;
        let location_id = self.nearest_location(position).map_or(LocationId::NONE, |(id, _)| id);
        let due = state.current_time() + self.rng.trunc_normal(&self.params.pickup);
        self.tasks.pickups.push(due, Handover {
            booking_id,
            vehicle_id,
            customer_id,
            location_id,
            due,
            end_status: end,
        });

        if let Some(v) = state.vehicle_mut(vehicle_id) {
            v.status = start;
            v.customer_id = customer_id;
        }
        if let Some(c) = state.customer_mut(customer_id) {
            c.status = CustomerStatus::WaitingForPickup;
            c.vehicle_id = vehicle_id;
        }
        Ok(())
    }

    fn schedule_dropoff(
        &mut self,
        state:       &mut World,
        vehicle_id:  VehicleId,
        customer_id: CustomerId,
        booking_id:  BookingId,
        start:       VehicleStatus,
        end:         VehicleStatus,
    ) -> Result<(), ReturnCode> {
        let vehicle = state.vehicle(vehicle_id).ok_or(ReturnCode::CannotGetVehicle)?;
        if vehicle.customer_id != customer_id {
            return Err(ReturnCode::VehicleDoesNotHaveCustomer);
        }
        let position = state.customer(customer_id).ok_or(ReturnCode::CannotGetCustomer)?.position;
        let location_id = self.nearest_location(position).map_or(LocationId::NONE, |(id, _)| id);
        let due = state.current_time() + self.rng.trunc_normal(&self.params.dropoff);
        self.tasks.dropoffs.push(due, Handover {
            booking_id,
            vehicle_id,
            customer_id,
            location_id,
            due,
            end_status: end,
        });

        if let Some(v) = state.vehicle_mut(vehicle_id) {
            v.status = start;
        }
        if let Some(c) = state.customer_mut(customer_id) {
            c.status = CustomerStatus::WaitingForDropoff;
        }
        Ok(())
    }

    fn schedule_teleport(
        &mut self,
        state:       &mut World,
        customer_id: CustomerId,
        to:          Position,
        start:       CustomerStatus,
        end:         CustomerStatus,
        booking_id:  BookingId,
    ) -> Result<(), ReturnCode> {
        let customer = state.customer(customer_id).ok_or(ReturnCode::CannotGetCustomer)?;
        let from_location = if customer.location_id.is_some() {
            customer.location_id
        } else {
            self.nearest_location(customer.position).map_or(LocationId::NONE, |(id, _)| id)
        };
        let (location_id, to) = self.nearest_location(to).unwrap_or((LocationId::NONE, to));
        let due = state.current_time() + self.rng.trunc_normal(&self.params.teleport);
        self.tasks.teleports.push(due, Teleport {
            booking_id,
            customer_id,
            location_id,
            to,
            due,
            end_status: end,
        });

        if let Some(c) = state.customer_mut(customer_id) {
            c.status = start;
        }
        state.push_event(
            EventKind::Teleport,
            format!("customer {} teleporting", customer_id.0),
            vec![customer_id.into(), from_location.into()],
        );
        unpark_customer(state, customer_id);
        Ok(())
    }

    fn start_booking(&mut self, state: &mut World, booking: &Booking) -> Result<(), ReturnCode> {
        let customer = state.customer(booking.customer_id).ok_or(ReturnCode::CannotGetCustomer)?;
        if !customer.status.is_matchable() {
            return Err(ReturnCode::CustomerIsNotFree);
        }
        let position = customer.position;
        match booking.mode {
            TravelMode::Teleport => self.schedule_teleport(
                state,
                booking.customer_id,
                booking.destination,
                CustomerStatus::Teleporting,
                CustomerStatus::Free,
                booking.id,
            ),
            TravelMode::FleetTravel => {
                if self.oracle.distance(position, booking.destination).is_none() {
                    return Err(ReturnCode::NoPathToDestination);
                }
                self.start_dispatch(
                    state,
                    booking.vehicle_id,
                    position,
                    VehicleStatus::MovingToPickup,
                    VehicleStatus::Hired,
                    booking.id,
                )
            }
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    fn simulate_vehicles(&mut self, state: &mut World) -> MotionResult<()> {
        for vehicle_id in self.tasks.dispatched_vehicles() {
            let step = self.rng.trunc_normal(&self.params.speed) * self.resolution;
            let Some(d) = self.tasks.dispatch_mut(vehicle_id) else { continue };
            d.advance(step);
            let arrived = d.has_arrived();
            let position = if arrived { d.to } else { d.current };

            let vehicle = state
                .vehicle_mut(vehicle_id)
                .ok_or_else(|| invariant("move", vehicle_id.into(), ReturnCode::CannotGetVehicle))?;
            vehicle.position = position;
            let customer_id = vehicle.customer_id;
            let aboard = match state.customer_mut(customer_id) {
                Some(c) if c.status.is_aboard() => {
                    c.position = position;
                    true
                }
                _ => false,
            };

            let mut ids: Vec<u64> = vec![vehicle_id.into()];
            if aboard {
                ids.push(customer_id.into());
            }
            if !arrived {
                state.push_event(EventKind::Move, format!("vehicle {} moved", vehicle_id.0), ids);
                continue;
            }

            let Some(d) = self.tasks.remove_dispatch(vehicle_id) else { continue };
            if d.booking_id.is_some() {
                ids.push(d.booking_id.into());
            }
            state.push_event(
                EventKind::Arrival,
                format!("vehicle {} arrived at {}", vehicle_id.0, d.to),
                ids,
            );
            log::debug!("{vehicle_id} arrived at {} (t={:.1})", d.to, state.current_time());
            if let Some(v) = state.vehicle_mut(vehicle_id) {
                v.status = d.end_status;
            }

            if d.booking_id.is_none() {
                if d.end_status.is_idle() {
                    park_vehicle(state, vehicle_id, d.to_location);
                }
                continue;
            }
            let result = if aboard {
                self.schedule_dropoff(
                    state,
                    vehicle_id,
                    customer_id,
                    d.booking_id,
                    VehicleStatus::DroppingOff,
                    VehicleStatus::Free,
                )
            } else {
                let customer_id = self
                    .bookings
                    .get(&d.booking_id)
                    .map_or(CustomerId::NONE, |b| b.customer_id);
                self.schedule_pickup(
                    state,
                    vehicle_id,
                    customer_id,
                    d.booking_id,
                    VehicleStatus::PickingUp,
                    VehicleStatus::Hired,
                )
            };
            result.map_err(|code| invariant("arrival", vehicle_id.into(), code))?;
        }
        Ok(())
    }

    fn simulate_pickups(&mut self, state: &mut World) -> MotionResult<()> {
        let now = state.current_time();
        while let Some(p) = self.tasks.pickups.pop_due(now) {
            let mut ids: Vec<u64> = vec![p.vehicle_id.into(), p.customer_id.into()];
            if p.booking_id.is_some() {
                ids.push(p.booking_id.into());
            }
            state.push_event(
                EventKind::Pickup,
                format!("vehicle {} picked up customer {}", p.vehicle_id.0, p.customer_id.0),
                ids,
            );

            let vehicle = state
                .vehicle_mut(p.vehicle_id)
                .ok_or_else(|| invariant("pickup", p.vehicle_id.into(), ReturnCode::CannotGetVehicle))?;
            vehicle.customer_id = p.customer_id;
            vehicle.status = p.end_status;
            let customer = state
                .customer_mut(p.customer_id)
                .ok_or_else(|| invariant("pickup", p.customer_id.into(), ReturnCode::CannotGetCustomer))?;
            customer.vehicle_id = p.vehicle_id;
            customer.status = CustomerStatus::InVehicle;
            unpark_customer(state, p.customer_id);

            if p.booking_id.is_some() {
                let destination = self
                    .bookings
                    .get(&p.booking_id)
                    .map(|b| b.destination)
                    .ok_or_else(|| invariant("pickup", p.booking_id.into(), ReturnCode::Failed))?;
                self.start_dispatch(
                    state,
                    p.vehicle_id,
                    destination,
                    VehicleStatus::MovingToDropoff,
                    VehicleStatus::Hired,
                    p.booking_id,
                )
                .map_err(|code| invariant("dispatch to drop-off", p.vehicle_id.into(), code))?;
            }
        }
        Ok(())
    }

    fn simulate_dropoffs(&mut self, state: &mut World) -> MotionResult<()> {
        let now = state.current_time();
        while let Some(d) = self.tasks.dropoffs.pop_due(now) {
            let mut ids: Vec<u64> = vec![d.vehicle_id.into(), d.customer_id.into()];
            if d.booking_id.is_some() {
                ids.push(d.booking_id.into());
            }
            state.push_event(
                EventKind::Dropoff,
                format!("vehicle {} dropped off customer {}", d.vehicle_id.0, d.customer_id.0),
                ids,
            );

            let vehicle = state
                .vehicle_mut(d.vehicle_id)
                .ok_or_else(|| invariant("drop-off", d.vehicle_id.into(), ReturnCode::CannotGetVehicle))?;
            vehicle.customer_id = CustomerId::NONE;
            vehicle.status = d.end_status;
            let customer = state
                .customer_mut(d.customer_id)
                .ok_or_else(|| invariant("drop-off", d.customer_id.into(), ReturnCode::CannotGetCustomer))?;
            customer.vehicle_id = VehicleId::NONE;
            customer.status = CustomerStatus::Free;

            park_vehicle(state, d.vehicle_id, d.location_id);
            park_customer(state, d.customer_id, d.location_id);
            self.complete_booking(state, d.booking_id);
        }
        Ok(())
    }

    fn simulate_teleports(&mut self, state: &mut World) -> MotionResult<()> {
        let now = state.current_time();
        while let Some(t) = self.tasks.teleports.pop_due(now) {
            state.push_event(
                EventKind::TeleportArrival,
                format!("customer {} arrived by teleport", t.customer_id.0),
                vec![t.customer_id.into()],
            );
            let customer = state
                .customer_mut(t.customer_id)
                .ok_or_else(|| invariant("teleport", t.customer_id.into(), ReturnCode::CannotGetCustomer))?;
            customer.status = t.end_status;
            customer.position = t.to;
            park_customer(state, t.customer_id, t.location_id);
            self.complete_booking(state, t.booking_id);
        }
        Ok(())
    }

    fn complete_booking(&mut self, state: &mut World, booking_id: BookingId) {
        if booking_id.is_none() {
            return;
        }
        self.bookings.remove(&booking_id);
        state.push_event(
            EventKind::BookingServiced,
            format!("booking {} serviced", booking_id.0),
            vec![booking_id.into()],
        );
    }
}

// ── VehicleMotionSimulator ────────────────────────────────────────────────────

impl<O: DistanceOracle> VehicleMotionSimulator for SimulatorBasic<O> {
    fn init(&mut self, world: &mut World) -> MotionResult<()> {
        self.locations = None;
        if world.num_locations() > 0 {
            let mut tree_rng = SimRng::new(self.seed).child(LOCATION_TREE_STREAM);
            let tree = KdTree::build(world.locations().cloned().collect(), &mut tree_rng)?;

            let customers: Vec<(CustomerId, Position)> =
                world.customers().map(|c| (c.id, c.position)).collect();
            for (id, position) in customers {
                let site = tree.find_nn(&position, 0.0)?;
                if let Some(c) = world.customer_mut(id) {
                    c.position = site.position;
                }
                rehome_customer(world, id, site.id);
            }

            let vehicles: Vec<(VehicleId, Position)> =
                world.vehicles().map(|v| (v.id, v.position)).collect();
            for (id, position) in vehicles {
                let site = tree.find_nn(&position, 0.0)?;
                if let Some(v) = world.vehicle_mut(id) {
                    v.position = site.position;
                }
                rehome_vehicle(world, id, site.id);
            }
            self.locations = Some(tree);
        }

        self.shadow.clone_from(world);
        log::info!(
            "motion simulator initialised: {} vehicles, {} customers, {} locations",
            world.num_vehicles(),
            world.num_customers(),
            world.num_locations()
        );
        Ok(())
    }

    fn update(&mut self, world: &mut World) -> MotionResult<()> {
        let mut state = std::mem::take(&mut self.shadow);
        state.clone_from(world);
        state.set_current_time(world.current_time() + self.resolution);

        let outcome = self
            .simulate_vehicles(&mut state)
            .and_then(|()| self.simulate_pickups(&mut state))
            .and_then(|()| self.simulate_dropoffs(&mut state))
            .and_then(|()| self.simulate_teleports(&mut state));

        if outcome.is_ok() {
            std::mem::swap(world, &mut state);
        }
        self.shadow = state;
        outcome
    }

    fn dispatch_vehicle(
        &mut self,
        world:   &mut World,
        vehicle: VehicleId,
        to:      Position,
        start:   VehicleStatus,
        end:     VehicleStatus,
        booking: BookingId,
    ) -> Result<(), ReturnCode> {
        self.start_dispatch(world, vehicle, to, start, end, booking)
    }

    fn pickup_customer(
        &mut self,
        world:    &mut World,
        vehicle:  VehicleId,
        customer: CustomerId,
        booking:  BookingId,
        start:    VehicleStatus,
        end:      VehicleStatus,
    ) -> Result<(), ReturnCode> {
        self.schedule_pickup(world, vehicle, customer, booking, start, end)
    }

    fn dropoff_customer(
        &mut self,
        world:    &mut World,
        vehicle:  VehicleId,
        customer: CustomerId,
        booking:  BookingId,
        start:    VehicleStatus,
        end:      VehicleStatus,
    ) -> Result<(), ReturnCode> {
        self.schedule_dropoff(world, vehicle, customer, booking, start, end)
    }

    fn teleport_customer(
        &mut self,
        world:    &mut World,
        customer: CustomerId,
        to:       Position,
        start:    CustomerStatus,
        end:      CustomerStatus,
    ) -> Result<(), ReturnCode> {
        let status = world.customer(customer).ok_or(ReturnCode::CannotGetCustomer)?.status;
        if status != CustomerStatus::Free {
            return Err(ReturnCode::CustomerIsNotFree);
        }
        self.schedule_teleport(world, customer, to, start, end, BookingId::NONE)
    }

    fn set_customer_status(
        &mut self,
        world:    &mut World,
        customer: CustomerId,
        status:   CustomerStatus,
    ) -> Result<(), ReturnCode> {
        let c = world.customer_mut(customer).ok_or(ReturnCode::CannotGetCustomer)?;
        c.status = status;
        Ok(())
    }

    fn service_booking(&mut self, world: &mut World, booking: &Booking) -> Result<(), ReturnCode> {
        let result = if self.bookings.contains_key(&booking.id) {
            Err(ReturnCode::Failed)
        } else {
            self.bookings.insert(booking.id, booking.clone());
            let result = self.start_booking(world, booking);
            if result.is_err() {
                self.bookings.remove(&booking.id);
            }
            result
        };

        if let Err(code) = result {
            log::debug!("{} cannot be serviced: {code}", booking.id);
            world.push_event(
                EventKind::BookingCannotBeServiced,
                format!("booking {} cannot be serviced: {code}", booking.id.0),
                vec![booking.id.into(), booking.customer_id.into()],
            );
        }
        result
    }

    fn driving_distance(&self, from: Position, to: Position) -> Option<f64> {
        self.oracle.distance(from, to)
    }

    fn driving_distance_between(
        &self,
        world: &World,
        from:  LocationId,
        to:    LocationId,
    ) -> Option<f64> {
        let a = world.location(from)?;
        let b = world.location(to)?;
        self.oracle.location_distance(from, a.position, to, b.position)
    }

    fn is_dispatched(&self, vehicle: VehicleId) -> bool {
        self.tasks.is_dispatched(vehicle)
    }

    fn pending_tasks(&self) -> usize {
        self.tasks.pending()
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}

// ── Location bookkeeping ──────────────────────────────────────────────────────

fn invariant(task: &'static str, entity: u64, code: ReturnCode) -> MotionError {
    log::error!("{task} for entity {entity} failed: {code}");
    MotionError::Invariant { task, entity, code }
}

/// Take a vehicle out of the location it is parked at, if any.
fn unpark_vehicle(state: &mut World, vehicle: VehicleId) {
    let Some(loc) = state.vehicle_mut(vehicle).map(|v| std::mem::take(&mut v.location_id)) else {
        return;
    };
    if state.location_mut(loc).is_some_and(|l| l.remove_vehicle_id(vehicle)) {
        state.push_event(
            EventKind::LocationVehiclesSizeChange,
            format!("location {} vehicles changed", loc.0),
            vec![loc.into()],
        );
    }
}

/// Park a vehicle at `loc`.  Unknown locations leave it in transit.
fn park_vehicle(state: &mut World, vehicle: VehicleId, loc: LocationId) {
    let Some(l) = state.location_mut(loc) else { return };
    let added = l.add_vehicle_id(vehicle);
    if let Some(v) = state.vehicle_mut(vehicle) {
        v.location_id = loc;
    }
    if added {
        state.push_event(
            EventKind::LocationVehiclesSizeChange,
            format!("location {} vehicles changed", loc.0),
            vec![loc.into()],
        );
    }
}

fn unpark_customer(state: &mut World, customer: CustomerId) {
    let Some(loc) = state.customer_mut(customer).map(|c| std::mem::take(&mut c.location_id)) else {
        return;
    };
    if state.location_mut(loc).is_some_and(|l| l.remove_customer_id(customer)) {
        state.push_event(
            EventKind::LocationCustomersSizeChange,
            format!("location {} customers changed", loc.0),
            vec![loc.into()],
        );
    }
}

fn park_customer(state: &mut World, customer: CustomerId, loc: LocationId) {
    let Some(l) = state.location_mut(loc) else { return };
    let added = l.add_customer_id(customer);
    if let Some(c) = state.customer_mut(customer) {
        c.location_id = loc;
    }
    if added {
        state.push_event(
            EventKind::LocationCustomersSizeChange,
            format!("location {} customers changed", loc.0),
            vec![loc.into()],
        );
    }
}

/// Move an entity's location membership without emitting events.  Used while
/// setting up, before anyone is listening.
fn rehome_vehicle(world: &mut World, vehicle: VehicleId, loc: LocationId) {
    let Some(old) = world.vehicle_mut(vehicle).map(|v| std::mem::replace(&mut v.location_id, loc)) else {
        return;
    };
    if let Some(l) = world.location_mut(old) {
        l.remove_vehicle_id(vehicle);
    }
    if let Some(l) = world.location_mut(loc) {
        l.add_vehicle_id(vehicle);
    }
}

fn rehome_customer(world: &mut World, customer: CustomerId, loc: LocationId) {
    let Some(old) = world.customer_mut(customer).map(|c| std::mem::replace(&mut c.location_id, loc)) else {
        return;
    };
    if let Some(l) = world.location_mut(old) {
        l.remove_customer_id(customer);
    }
    if let Some(l) = world.location_mut(loc) {
        l.add_customer_id(customer);
    }
}
