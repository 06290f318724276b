//! `ManagerBasic`: first come, first served.

use std::collections::VecDeque;
use std::io::Read;

use amod_core::{Position, VehicleId};
use amod_motion::VehicleMotionSimulator;
use amod_schedule::{BookingFeed, BookingQueue};
use amod_spatial::KdTree;
use amod_world::{Booking, CustomerStatus, Location, TravelMode, World};

use crate::manager::{admit_customer, announce, feed_backlog, location_index};
use crate::{FleetManager, FleetResult};

/// Serves due bookings in arrival order, each with the closest idle vehicle.
///
/// A booking that finds no idle vehicle, or whose customer is still busy
/// with an earlier trip, waits at its place in the line for the next tick.
#[derive(Default)]
pub struct ManagerBasic {
    queue:     BookingQueue,
    feed:      Option<BookingFeed<Box<dyn Read>>>,
    waiting:   VecDeque<Booking>,
    locations: KdTree<Location>,
}

impl ManagerBasic {
    pub fn new() -> Self {
        Self::default()
    }

    fn closest_idle_vehicle(
        world: &World,
        sim:   &dyn VehicleMotionSimulator,
        to:    Position,
    ) -> Option<VehicleId> {
        world
            .vehicles()
            .filter(|v| v.status.is_idle() && !sim.is_dispatched(v.id))
            .filter_map(|v| sim.driving_distance(v.position, to).map(|d| (v.id, d)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }
}

impl FleetManager for ManagerBasic {
    fn init(&mut self, world: &mut World, _sim: &mut dyn VehicleMotionSimulator) -> FleetResult<()> {
        self.locations = location_index(world)?;
        log::info!(
            "basic manager: {} vehicles, {} bookings queued",
            world.num_vehicles(),
            self.queue.len()
        );
        Ok(())
    }

    fn update(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> FleetResult<()> {
        let now = world.current_time();
        let mut due = self.queue.drain_due(now);
        if let Some(feed) = self.feed.as_mut() {
            due.extend(feed.due(now)?);
        }
        for booking in due {
            announce(world, &booking);
            admit_customer(world, &self.locations, &booking);
            self.waiting.push_back(booking);
        }

        let mut still_waiting = VecDeque::new();
        while let Some(mut booking) = self.waiting.pop_front() {
            let Some(customer) = world.customer(booking.customer_id) else {
                log::warn!("booking {}: customer {} vanished", booking.id.0, booking.customer_id.0);
                continue;
            };
            if !customer.status.is_matchable() {
                still_waiting.push_back(booking);
                continue;
            }
            if booking.mode == TravelMode::Teleport {
                if let Err(code) = sim.service_booking(world, &booking) {
                    log::warn!("booking {}: teleport rejected: {code}", booking.id.0);
                }
                continue;
            }

            let pickup = customer.position;
            match Self::closest_idle_vehicle(world, sim, pickup) {
                Some(vehicle) => {
                    booking.vehicle_id = vehicle;
                    match sim.service_booking(world, &booking) {
                        Ok(()) => log::debug!("booking {} -> {vehicle}", booking.id.0),
                        Err(code) => log::warn!("booking {} dropped: {code}", booking.id.0),
                    }
                }
                None => {
                    if let Err(code) = sim.set_customer_status(
                        world,
                        booking.customer_id,
                        CustomerStatus::WaitingForAssignment,
                    ) {
                        log::warn!("booking {}: customer not marked waiting: {code}", booking.id.0);
                    }
                    still_waiting.push_back(booking);
                }
            }
        }
        self.waiting = still_waiting;
        Ok(())
    }

    fn load_bookings(&mut self, bookings: Vec<Booking>) {
        self.queue.extend(bookings);
    }

    fn set_booking_feed(&mut self, feed: BookingFeed<Box<dyn Read>>) {
        self.feed = Some(feed);
    }

    fn num_pending_bookings(&self) -> usize {
        self.queue.len() + self.waiting.len() + feed_backlog(&self.feed)
    }
}
