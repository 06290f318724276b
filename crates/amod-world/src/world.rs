//! The shared `World` store.
//!
//! `World` owns every vehicle, customer, location and pending event, keyed
//! by id, plus the simulated clock.  It is pure data access: no component
//! logic lives here.  `BTreeMap` storage makes every bulk iteration ascend by
//! id, which keeps runs deterministic for a fixed seed.
//!
//! Missing ids are reported as `None` rather than errors; callers that have
//! already validated existence can treat `None` as an invariant violation.

use std::collections::BTreeMap;

use amod_core::{CustomerId, EventId, LocationId, VehicleId};

use crate::{Customer, Event, EventKind, Location, Vehicle};

/// Single source of truth for simulation state.
#[derive(Clone, Debug)]
pub struct World {
    current_time:  f64,
    vehicles:      BTreeMap<VehicleId, Vehicle>,
    customers:     BTreeMap<CustomerId, Customer>,
    locations:     BTreeMap<LocationId, Location>,
    events:        Vec<Event>,
    next_event_id: u64,
}

impl Default for World {
    fn default() -> Self {
        Self {
            current_time:  0.0,
            vehicles:      BTreeMap::new(),
            customers:     BTreeMap::new(),
            locations:     BTreeMap::new(),
            events:        Vec::new(),
            next_event_id: 1,
        }
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all entities with the given collections.
    ///
    /// Later entries win when ids repeat.  Pending events and the clock are
    /// left untouched.
    pub fn populate(
        &mut self,
        locations: impl IntoIterator<Item = Location>,
        vehicles:  impl IntoIterator<Item = Vehicle>,
        customers: impl IntoIterator<Item = Customer>,
    ) {
        self.locations = locations.into_iter().map(|l| (l.id, l)).collect();
        self.vehicles = vehicles.into_iter().map(|v| (v.id, v)).collect();
        self.customers = customers.into_iter().map(|c| (c.id, c)).collect();
    }

    // ── Clock ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline]
    pub fn set_current_time(&mut self, t: f64) {
        self.current_time = t;
    }

    // ── Vehicles ──────────────────────────────────────────────────────────

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(&id)
    }

    /// Insert or overwrite a vehicle.
    pub fn set_vehicle(&mut self, vehicle: Vehicle) {
        self.vehicles.insert(vehicle.id, vehicle);
    }

    /// Insert a new vehicle; returns `false` (and changes nothing) if the id
    /// is already taken.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> bool {
        if self.vehicles.contains_key(&vehicle.id) {
            return false;
        }
        self.vehicles.insert(vehicle.id, vehicle);
        true
    }

    pub fn remove_vehicle(&mut self, id: VehicleId) -> Option<Vehicle> {
        self.vehicles.remove(&id)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn vehicles_mut(&mut self) -> impl Iterator<Item = &mut Vehicle> {
        self.vehicles.values_mut()
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    // ── Customers ─────────────────────────────────────────────────────────

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers.get(&id)
    }

    pub fn customer_mut(&mut self, id: CustomerId) -> Option<&mut Customer> {
        self.customers.get_mut(&id)
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    pub fn add_customer(&mut self, customer: Customer) -> bool {
        if self.customers.contains_key(&customer.id) {
            return false;
        }
        self.customers.insert(customer.id, customer);
        true
    }

    pub fn remove_customer(&mut self, id: CustomerId) -> Option<Customer> {
        self.customers.remove(&id)
    }

    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    pub fn customers_mut(&mut self) -> impl Iterator<Item = &mut Customer> {
        self.customers.values_mut()
    }

    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    // ── Locations ─────────────────────────────────────────────────────────

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(&id)
    }

    pub fn set_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    pub fn add_location(&mut self, location: Location) -> bool {
        if self.locations.contains_key(&location.id) {
            return false;
        }
        self.locations.insert(location.id, location);
        true
    }

    pub fn remove_location(&mut self, id: LocationId) -> Option<Location> {
        self.locations.remove(&id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn locations_mut(&mut self) -> impl Iterator<Item = &mut Location> {
        self.locations.values_mut()
    }

    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }

    /// Customers at `loc` still waiting for a vehicle assignment.  Passing
    /// `LocationId::NONE` counts across every location.
    pub fn num_waiting_customers(&self, loc: LocationId) -> usize {
        let count_at = |l: &Location| {
            l.customer_ids()
                .filter_map(|c| self.customers.get(&c))
                .filter(|c| c.status == crate::CustomerStatus::WaitingForAssignment)
                .count()
        };
        if loc.is_none() {
            self.locations.values().map(count_at).sum()
        } else {
            self.locations.get(&loc).map(count_at).unwrap_or(0)
        }
    }

    // ── Events ────────────────────────────────────────────────────────────

    /// Append an event stamped with the current time and the next id.
    pub fn push_event(
        &mut self,
        kind:       EventKind,
        message:    impl Into<String>,
        entity_ids: Vec<u64>,
    ) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        self.events.push(Event {
            id,
            kind,
            time: self.current_time,
            message: message.into(),
            entity_ids,
        });
        id
    }

    /// Pending events in emission order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drop all pending events.  Ids keep increasing afterwards.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Remove and return all pending events.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    /// Id the next pushed event will receive.
    pub fn next_event_id(&self) -> EventId {
        EventId(self.next_event_id)
    }
}
