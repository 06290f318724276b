//! Integration tests for amod-sim.

use std::io::{Cursor, Read};

use amod_core::{
    BookingId, CustomerId, DistParams, LocationId, Position, ReturnCode, SimConfig, VehicleId,
};
use amod_fleet::{FleetConfig, FleetError, ManagerKind, MatchMethod};
use amod_motion::MotionParams;
use amod_schedule::BookingFeed;
use amod_world::{
    Booking, Customer, Event, EventKind, Location, TravelMode, Vehicle, VehicleStatus, World,
};

use crate::{AmodContextBuilder, NoopObserver, SimError, SimObserver, TickStats};

// ── Helpers ───────────────────────────────────────────────────────────────────

const V1: VehicleId = VehicleId(1);
const L1: LocationId = LocationId(1);
const L2: LocationId = LocationId(2);

fn fixed_params() -> MotionParams {
    MotionParams {
        speed:    DistParams::constant(10.0),
        pickup:   DistParams::constant(5.0),
        dropoff:  DistParams::constant(3.0),
        teleport: DistParams::constant(4.0),
    }
}

fn config(end_time: f64) -> SimConfig {
    SimConfig { end_time, ..SimConfig::default() }
}

fn world_with(locations: &[(u32, f64)], vehicles: &[(u32, f64)]) -> World {
    let mut world = World::new();
    world.populate(
        locations
            .iter()
            .map(|&(id, x)| Location::new(LocationId(id), format!("l{id}"), Position::new(x, 0.0), 10)),
        vehicles
            .iter()
            .map(|&(id, x)| Vehicle::new(VehicleId(id), format!("v{id}"), Position::new(x, 0.0), 1)),
        Vec::<Customer>::new(),
    );
    world
}

fn fleet_booking(id: u32, time: f64, from: f64, to: f64) -> Booking {
    Booking {
        id: BookingId(id),
        customer_id: CustomerId(id),
        vehicle_id: VehicleId::NONE,
        source: Position::new(from, 0.0),
        destination: Position::new(to, 0.0),
        time,
        mode: TravelMode::FleetTravel,
    }
}

/// Records every callback and checks vehicle/customer consistency on every
/// snapshot.
#[derive(Default)]
struct Recorder {
    events:    Vec<Event>,
    started:   u64,
    ended:     Vec<TickStats>,
    snapshots: Vec<u64>,
    finished:  usize,
}

impl Recorder {
    fn kinds(&self, keep: &[EventKind]) -> Vec<EventKind> {
        self.events.iter().map(|e| e.kind).filter(|k| keep.contains(k)).collect()
    }
}

impl SimObserver for Recorder {
    fn on_tick_start(&mut self, _tick: u64, _time: f64) {
        self.started += 1;
    }

    fn on_events(&mut self, events: &[Event]) {
        self.events.extend_from_slice(events);
    }

    fn on_tick_end(&mut self, _tick: u64, _time: f64, stats: TickStats) {
        self.ended.push(stats);
    }

    fn on_snapshot(&mut self, tick: u64, world: &World) {
        for v in world.vehicles() {
            assert_eq!(
                v.customer_id.is_some(),
                v.status.carries_customer(),
                "tick {tick}: {} is {:?} with customer {}",
                v.id,
                v.status,
                v.customer_id
            );
        }
        self.snapshots.push(tick);
    }

    fn on_sim_end(&mut self, _world: &World) {
        self.finished += 1;
    }
}

const TRIP: [EventKind; 6] = [
    EventKind::BookingReceived,
    EventKind::Dispatch,
    EventKind::Arrival,
    EventKind::Pickup,
    EventKind::Dropoff,
    EventKind::BookingServiced,
];

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let ctx = AmodContextBuilder::new(config(10.0))
            .world(world_with(&[(1, 0.0)], &[(1, 3.0)]))
            .build()
            .unwrap();
        assert_eq!(ctx.tick(), 0);
        assert_eq!(ctx.current_time(), 0.0);
        assert!(ctx.is_idle());
        // The simulator snapped the vehicle onto its location.
        assert_eq!(ctx.world.vehicle(V1).unwrap().location_id, L1);
        assert_eq!(ctx.manager.num_available_vehicles(&ctx.world), 1);
    }

    #[test]
    fn starts_the_clock_at_start_time() {
        let ctx = AmodContextBuilder::new(SimConfig { start_time: 3_600.0, end_time: 7_200.0, ..SimConfig::default() })
            .build()
            .unwrap();
        assert_eq!(ctx.current_time(), 3_600.0);
    }

    #[test]
    fn rejects_bad_sim_config() {
        let result = AmodContextBuilder::new(SimConfig { resolution: 0.0, ..SimConfig::default() }).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn rejects_bad_motion_params() {
        let mut params = fixed_params();
        params.speed = DistParams::new(10.0, 1.0, 20.0, 5.0);
        let result = AmodContextBuilder::new(config(10.0)).motion_params(params).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn rejects_bad_fleet_config() {
        let fleet = FleetConfig { matching_interval: -1.0, ..FleetConfig::default() };
        let result = AmodContextBuilder::new(config(10.0)).fleet_config(fleet).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn errors_map_to_return_codes() {
        let e = SimError::Fleet(FleetError::Invariant {
            task:   "rebalancing dispatch",
            entity: 3,
            code:   ReturnCode::VehicleCannotBeDispatched,
        });
        assert_eq!(ReturnCode::from(&e), ReturnCode::VehicleCannotBeDispatched);
        assert_eq!(ReturnCode::from(&SimError::Config("x".into())), ReturnCode::Failed);
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loop_tests {
    use super::*;

    #[test]
    fn run_stops_at_end_time() {
        let cfg = SimConfig { resolution: 0.5, end_time: 5.0, output_interval_ticks: 5, ..SimConfig::default() };
        let mut ctx = AmodContextBuilder::new(cfg)
            .world(world_with(&[(1, 0.0)], &[(1, 0.0)]))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        ctx.run(&mut rec).unwrap();

        assert_eq!(ctx.tick(), 10);
        assert_eq!(rec.started, 10);
        assert_eq!(rec.ended.len(), 10);
        assert_eq!(rec.snapshots, vec![0, 5]);
        assert_eq!(rec.finished, 1);
        assert!((ctx.current_time() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn run_ticks_does_not_finish() {
        let mut ctx = AmodContextBuilder::new(config(100.0)).build().unwrap();
        let mut rec = Recorder::default();
        ctx.run_ticks(3, &mut rec).unwrap();
        ctx.run_ticks(2, &mut rec).unwrap();
        assert_eq!(ctx.tick(), 5);
        assert_eq!(rec.finished, 0);
        assert!(rec.snapshots.is_empty());
    }

    #[test]
    fn tick_stats_track_pool_and_fleet() {
        let mut ctx = AmodContextBuilder::new(config(100.0))
            .world(world_with(&[(1, 0.0), (2, 50.0)], &[(1, 0.0)]))
            .motion_params(fixed_params())
            .bookings(vec![fleet_booking(1, 0.0, 50.0, 0.0)])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        ctx.run_ticks(2, &mut rec).unwrap();
        assert_eq!(rec.ended[0], TickStats { events: 1, available: 1, pending: 1 });
        assert_eq!(rec.ended[1].events, 0);
    }
}

// ── End to end ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn single_trip_event_sequence() {
        let mut ctx = AmodContextBuilder::new(config(1_000.0))
            .world(world_with(&[(1, 0.0)], &[(1, 0.0)]))
            .motion_params(fixed_params())
            .bookings(vec![fleet_booking(1, 0.0, 0.0, 10.0)])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        let ticks = ctx.run_until_idle(5_000, &mut rec).unwrap();
        assert!(ticks < 5_000);

        assert_eq!(
            rec.kinds(&TRIP),
            vec![
                EventKind::BookingReceived,
                EventKind::Dispatch,
                EventKind::Arrival,
                EventKind::Pickup,
                EventKind::Dispatch,
                EventKind::Arrival,
                EventKind::Dropoff,
                EventKind::BookingServiced,
            ]
        );
        let v = ctx.world.vehicle(V1).unwrap();
        assert_eq!(v.status, VehicleStatus::Free);
        assert_eq!(v.location_id, L1);
        assert!(v.customer_id.is_none());
        assert_eq!(rec.finished, 1);
    }

    #[test]
    fn assignment_trip_across_stations_keeps_consistency() {
        let cfg = SimConfig { end_time: 1_000.0, output_interval_ticks: 1, ..SimConfig::default() };
        let fleet = FleetConfig {
            match_method:      MatchMethod::Assignment,
            matching_interval: 5.0,
            ..FleetConfig::default()
        };
        let mut ctx = AmodContextBuilder::new(cfg)
            .world(world_with(&[(1, 0.0), (2, 50.0)], &[(1, 0.0)]))
            .motion_params(fixed_params())
            .fleet_config(fleet)
            .bookings(vec![fleet_booking(1, 0.0, 50.0, 0.0)])
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        ctx.run_until_idle(5_000, &mut rec).unwrap();

        assert_eq!(rec.kinds(&[EventKind::BookingServiced]).len(), 1);
        assert!(!rec.snapshots.is_empty());
        let v = ctx.world.vehicle(V1).unwrap();
        assert_eq!(v.status, VehicleStatus::Free);
        assert_eq!(v.location_id, L1);
        assert_eq!(ctx.world.customer(CustomerId(1)).unwrap().location_id, L1);
    }

    #[test]
    fn basic_manager_serves_streamed_bookings() {
        let text = "# id time cust sx sy dx dy mode\n\
                    1 0 1 50 0 0 0 1\n\
                    2 1 2 0 0 50 0 0\n";
        let reader: Box<dyn Read> = Box::new(Cursor::new(text.as_bytes().to_vec()));
        let fleet = FleetConfig { manager: ManagerKind::Basic, ..FleetConfig::default() };
        let mut ctx = AmodContextBuilder::new(config(1_000.0))
            .world(world_with(&[(1, 0.0), (2, 50.0)], &[(1, 0.0)]))
            .motion_params(fixed_params())
            .fleet_config(fleet)
            .booking_feed(BookingFeed::from_reader(reader))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        ctx.run_until_idle(5_000, &mut rec).unwrap();

        let serviced: Vec<Vec<u64>> = rec
            .events
            .iter()
            .filter(|e| e.kind == EventKind::BookingServiced)
            .map(|e| e.entity_ids.clone())
            .collect();
        assert_eq!(serviced.len(), 2);
        assert!(serviced.contains(&vec![1]) && serviced.contains(&vec![2]));
        assert_eq!(rec.kinds(&[EventKind::Teleport]).len(), 1);
        assert_eq!(ctx.world.customer(CustomerId(2)).unwrap().location_id, L2);
    }

    #[test]
    fn same_seed_same_event_log() {
        let run = || {
            let mut ctx = AmodContextBuilder::new(config(1_000.0))
                .world(world_with(&[(1, 0.0), (2, 80.0)], &[(1, 0.0), (2, 80.0)]))
                .bookings(vec![fleet_booking(1, 0.0, 80.0, 0.0), fleet_booking(2, 10.0, 0.0, 80.0)])
                .build()
                .unwrap();
            let mut rec = Recorder::default();
            ctx.run_until_idle(20_000, &mut rec).unwrap();
            rec.events
        };
        let a = run();
        assert!(!a.is_empty());
        assert_eq!(a, run());
    }

    #[test]
    fn contexts_are_independent() {
        let mut a = AmodContextBuilder::new(config(10.0))
            .world(world_with(&[(1, 0.0)], &[(1, 0.0)]))
            .build()
            .unwrap();
        let b = AmodContextBuilder::new(config(10.0)).build().unwrap();
        a.run(&mut NoopObserver).unwrap();
        assert_eq!(b.tick(), 0);
        assert_eq!(b.world.num_vehicles(), 0);
        assert_eq!(a.world.num_vehicles(), 1);
    }
}
