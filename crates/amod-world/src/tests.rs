//! Unit tests for amod-world.

use amod_core::{CustomerId, LocationId, Position, VehicleId};

use crate::{Customer, CustomerStatus, EventKind, Location, Vehicle, VehicleStatus, World};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn small_world() -> World {
    let mut w = World::new();
    w.populate(
        vec![
            Location::new(LocationId(1), "depot", Position::new(0.0, 0.0), 10),
            Location::new(LocationId(2), "mall", Position::new(100.0, 0.0), 10),
        ],
        vec![
            Vehicle::new(VehicleId(1), "v1", Position::new(0.0, 0.0), 4),
            Vehicle::new(VehicleId(2), "v2", Position::new(100.0, 0.0), 4),
        ],
        vec![Customer::new(CustomerId(1), "c1", Position::new(1.0, 1.0))],
    );
    w
}

#[cfg(test)]
mod crud {
    use super::*;

    #[test]
    fn populate_and_count() {
        let w = small_world();
        assert_eq!(w.num_vehicles(), 2);
        assert_eq!(w.num_customers(), 1);
        assert_eq!(w.num_locations(), 2);
    }

    #[test]
    fn missing_ids_are_none() {
        let w = small_world();
        assert!(w.vehicle(VehicleId(99)).is_none());
        assert!(w.customer(CustomerId(99)).is_none());
        assert!(w.location(LocationId(99)).is_none());
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut w = small_world();
        assert!(!w.add_vehicle(Vehicle::new(VehicleId(1), "dup", Position::default(), 1)));
        assert_eq!(w.vehicle(VehicleId(1)).unwrap().name, "v1");
        assert!(w.add_vehicle(Vehicle::new(VehicleId(3), "v3", Position::default(), 1)));
        assert_eq!(w.num_vehicles(), 3);
    }

    #[test]
    fn set_overwrites_and_remove_returns() {
        let mut w = small_world();
        let mut v = w.vehicle(VehicleId(2)).unwrap().clone();
        v.status = VehicleStatus::Parked;
        w.set_vehicle(v);
        assert_eq!(w.vehicle(VehicleId(2)).unwrap().status, VehicleStatus::Parked);
        assert!(w.remove_vehicle(VehicleId(2)).is_some());
        assert!(w.vehicle(VehicleId(2)).is_none());
    }

    #[test]
    fn iteration_ascends_by_id() {
        let mut w = World::new();
        for id in [5, 1, 3] {
            w.add_vehicle(Vehicle::new(VehicleId(id), "v", Position::default(), 1));
        }
        let ids: Vec<_> = w.vehicles().map(|v| v.id.0).collect();
        assert_eq!(ids, [1, 3, 5]);
    }

    #[test]
    fn entity_equality_is_by_id() {
        let a = Vehicle::new(VehicleId(1), "a", Position::new(0.0, 0.0), 1);
        let b = Vehicle::new(VehicleId(1), "b", Position::new(5.0, 5.0), 9);
        assert_eq!(a, b);
    }
}

#[cfg(test)]
mod locations {
    use super::*;

    #[test]
    fn id_sets() {
        let mut l = Location::new(LocationId(1), "l", Position::default(), 2);
        assert!(l.add_vehicle_id(VehicleId(4)));
        assert!(!l.add_vehicle_id(VehicleId(4)));
        assert_eq!(l.num_vehicles(), 1);
        assert!(l.remove_vehicle_id(VehicleId(4)));
        assert_eq!(l.num_vehicles(), 0);

        l.add_customer_id(CustomerId(2));
        assert!(l.has_customer(CustomerId(2)));
    }

    #[test]
    fn waiting_customers() {
        let mut w = small_world();
        w.customer_mut(CustomerId(1)).unwrap().status = CustomerStatus::WaitingForAssignment;
        w.location_mut(LocationId(1)).unwrap().add_customer_id(CustomerId(1));
        assert_eq!(w.num_waiting_customers(LocationId(1)), 1);
        assert_eq!(w.num_waiting_customers(LocationId(2)), 0);
        assert_eq!(w.num_waiting_customers(LocationId::NONE), 1);

        w.customer_mut(CustomerId(1)).unwrap().status = CustomerStatus::WaitingForPickup;
        assert_eq!(w.num_waiting_customers(LocationId::NONE), 0);
    }
}

#[cfg(test)]
mod events {
    use super::*;

    #[test]
    fn ids_are_monotonic_across_clears() {
        let mut w = World::new();
        w.set_current_time(12.5);
        let a = w.push_event(EventKind::Dispatch, "Dispatch", vec![1, 0]);
        let b = w.push_event(EventKind::Arrival, "Arrival", vec![1]);
        assert!(b > a);
        assert_eq!(w.events()[0].time, 12.5);

        w.clear_events();
        assert_eq!(w.num_events(), 0);
        let c = w.push_event(EventKind::Move, "Move", vec![1]);
        assert!(c > b);
    }

    #[test]
    fn take_events_drains() {
        let mut w = World::new();
        w.push_event(EventKind::Pickup, "Pickup", vec![1, 2]);
        let taken = w.take_events();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].kind, EventKind::Pickup);
        assert!(w.events().is_empty());
    }
}

#[cfg(test)]
mod statuses {
    use super::*;

    #[test]
    fn customer_carrying_states() {
        assert!(VehicleStatus::MovingToPickup.carries_customer());
        assert!(VehicleStatus::Hired.carries_customer());
        assert!(!VehicleStatus::MovingToRebalance.carries_customer());
        assert!(!VehicleStatus::Free.carries_customer());
        assert_eq!(VehicleStatus::default(), VehicleStatus::Unknown);
        assert_eq!(CustomerStatus::default(), CustomerStatus::Free);
    }
}
