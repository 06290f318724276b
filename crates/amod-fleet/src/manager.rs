//! The `FleetManager` trait and the bookkeeping both managers share.

use std::io::Read;

use amod_motion::VehicleMotionSimulator;
use amod_schedule::BookingFeed;
use amod_spatial::KdTree;
use amod_world::{Booking, Customer, EventKind, Location, World};

use crate::FleetResult;

/// Seed for the location index; tree shape never changes query results.
const LOCATION_TREE_SEED: u64 = 0x10ca;

/// Decides which vehicle serves which booking, and where idle vehicles wait.
///
/// The manager never moves anything itself; it issues commands through the
/// simulator it is handed on every call.  `update` runs once per tick,
/// before the simulator advances the clock.
pub trait FleetManager {
    /// Prepare internal state from the initial world.  Called once, after
    /// the simulator's own `init`.
    fn init(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> FleetResult<()>;

    /// React to last tick's events, take in due bookings and issue commands.
    fn update(&mut self, world: &mut World, sim: &mut dyn VehicleMotionSimulator) -> FleetResult<()>;

    /// Queue bookings for intake once their time comes.
    fn load_bookings(&mut self, bookings: Vec<Booking>);

    /// Stream further bookings from a reader as they come due.
    fn set_booking_feed(&mut self, feed: BookingFeed<Box<dyn Read>>);

    /// Bookings received or queued but not yet handed to the simulator,
    /// plus one while a booking feed still has unread lines.
    fn num_pending_bookings(&self) -> usize;

    /// Vehicles the manager may assign right now.
    fn num_available_vehicles(&self, world: &World) -> usize {
        world.vehicles().filter(|v| v.status.is_idle()).count()
    }

    /// Customers waiting for a vehicle assignment across all locations.
    fn num_waiting_customers(&self, world: &World) -> usize {
        world.num_waiting_customers(amod_core::LocationId::NONE)
    }
}

// ── Discards ──────────────────────────────────────────────────────────────────

/// Why the manager dropped a booking.  The numeric value is the second
/// entity id of the `BookingCannotBeServiced` event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiscardReason {
    CustomerNotFree       = 1,
    ServiceBookingFailure = 2,
    NoSuitablePath        = 3,
}

impl DiscardReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DiscardReason::CustomerNotFree       => "customer not free",
            DiscardReason::ServiceBookingFailure => "service booking failure",
            DiscardReason::NoSuitablePath        => "no suitable path",
        }
    }
}

pub(crate) fn discard(world: &mut World, booking: &Booking, reason: DiscardReason) {
    log::info!("discarding booking {}: {}", booking.id.0, reason.as_str());
    world.push_event(
        EventKind::BookingCannotBeServiced,
        format!("booking {} discarded: {}", booking.id.0, reason.as_str()),
        vec![booking.id.into(), reason as u64],
    );
}

pub(crate) fn announce(world: &mut World, booking: &Booking) {
    world.push_event(
        EventKind::BookingReceived,
        format!("booking {} received", booking.id.0),
        vec![booking.id.into(), booking.customer_id.into()],
    );
}

/// Index over every location in `world`, for placing new customers.
pub(crate) fn location_index(world: &World) -> FleetResult<KdTree<Location>> {
    Ok(KdTree::build_seeded(world.locations().cloned().collect(), LOCATION_TREE_SEED)?)
}

/// Make sure the booking's customer exists in `world`.
///
/// A customer seen for the first time is created at the booking's source,
/// snapped to the nearest location in `locations` and added to its waiting
/// set.  With an empty index the customer keeps the raw source position.
pub(crate) fn admit_customer(world: &mut World, locations: &KdTree<Location>, booking: &Booking) {
    if world.customer(booking.customer_id).is_some() {
        return;
    }
    let mut customer =
        Customer::new(booking.customer_id, format!("customer {}", booking.customer_id.0), booking.source);
    let nearest = locations.find_nn(&booking.source, 0.0).ok().map(|l| (l.id, l.position));
    if let Some((loc, position)) = nearest {
        customer.location_id = loc;
        customer.position = position;
    }
    let id = customer.id;
    world.add_customer(customer);
    if let Some((loc, _)) = nearest {
        if let Some(l) = world.location_mut(loc) {
            l.add_customer_id(id);
        }
    }
}

pub(crate) fn feed_backlog(feed: &Option<BookingFeed<Box<dyn Read>>>) -> usize {
    feed.as_ref().is_some_and(|f| !f.is_exhausted()) as usize
}

