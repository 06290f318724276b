//! Integration tests for amod-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;

    use crate::csv::CsvWriter;
    use crate::row::{EventRow, TickSummaryRow, VehicleSnapshotRow};
    use crate::writer::OutputWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn event_row(id: u64, message: &str) -> EventRow {
        EventRow {
            id,
            time:       1.5,
            kind:       "BOOKING_RECEIVED",
            entity_ids: "4 9".into(),
            message:    message.into(),
        }
    }

    fn read_all(path: &std::path::Path) -> (Vec<String>, Vec<csv::StringRecord>) {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let headers = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        let rows = rdr.records().map(|r| r.unwrap()).collect();
        (headers, rows)
    }

    #[test]
    fn csv_files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let (events, _) = read_all(&dir.path().join("events.csv"));
        assert_eq!(events, ["id", "time", "type", "entity_ids", "message"]);
        let (summaries, _) = read_all(&dir.path().join("tick_summaries.csv"));
        assert_eq!(summaries, ["time", "events", "available"]);
        let (snapshots, _) = read_all(&dir.path().join("vehicle_snapshots.csv"));
        assert_eq!(
            snapshots,
            ["time", "vehicle_id", "x", "y", "status", "customer_id", "location_id"]
        );
    }

    #[test]
    fn csv_events_round_trip() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_events(&[event_row(1, "plain"), event_row(2, "with, a comma")]).unwrap();
        w.finish().unwrap();

        let (_, rows) = read_all(&dir.path().join("events.csv"));
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][1], "1.5");
        assert_eq!(&rows[0][2], "BOOKING_RECEIVED");
        assert_eq!(&rows[0][3], "4 9");
        assert_eq!(&rows[1][4], "with, a comma");
    }

    #[test]
    fn csv_tick_summary_and_snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_tick_summary(&TickSummaryRow { time: 0.5, events: 3, available: 2 }).unwrap();
        w.write_snapshots(&[VehicleSnapshotRow {
            time:        0.5,
            vehicle_id:  7,
            x:           10.0,
            y:           -2.5,
            status:      "MOVING_TO_PICKUP",
            customer_id: 4,
            location_id: 0,
        }])
        .unwrap();
        w.finish().unwrap();

        let (_, rows) = read_all(&dir.path().join("tick_summaries.csv"));
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "0.5");
        assert_eq!(&rows[0][1], "3");
        assert_eq!(&rows[0][2], "2");

        let (_, rows) = read_all(&dir.path().join("vehicle_snapshots.csv"));
        assert_eq!(&rows[0][1], "7");
        assert_eq!(&rows[0][3], "-2.5");
        assert_eq!(&rows[0][4], "MOVING_TO_PICKUP");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_missing_directory_errors() {
        let dir = tmp();
        assert!(CsvWriter::new(&dir.path().join("missing")).is_err());
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use amod_core::{EventId, LocationId, Position, VehicleId};
    use amod_sim::{SimObserver, TickStats};
    use amod_world::{Event, EventKind, Location, Vehicle, VehicleStatus, World};

    use crate::{
        EventRow, OutputError, OutputResult, OutputWriter, SimOutputObserver, TickSummaryRow,
        VehicleSnapshotRow,
    };

    /// Keeps rows in memory; fails every summary write when `fail` is set.
    #[derive(Default)]
    struct MemoryWriter {
        events:    Vec<EventRow>,
        summaries: Vec<TickSummaryRow>,
        snapshots: Vec<VehicleSnapshotRow>,
        fail:      bool,
        failures:  usize,
        finished:  bool,
    }

    impl OutputWriter for MemoryWriter {
        fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
            self.events.extend_from_slice(rows);
            Ok(())
        }

        fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
            if self.fail {
                self.failures += 1;
                return Err(OutputError::Io(std::io::Error::other(format!("failure {}", self.failures))));
            }
            self.summaries.push(*row);
            Ok(())
        }

        fn write_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
            self.snapshots.extend_from_slice(rows);
            Ok(())
        }

        fn finish(&mut self) -> OutputResult<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn converts_events_to_rows() {
        let mut obs = SimOutputObserver::new(MemoryWriter::default());
        obs.on_events(&[Event {
            id:         EventId(5),
            kind:       EventKind::Rebalance,
            time:       300.0,
            message:    "rebalancing".into(),
            entity_ids: vec![1, 2, 3],
        }]);
        obs.on_events(&[]);
        let w = obs.into_writer();
        assert_eq!(w.events.len(), 1);
        assert_eq!(w.events[0].id, 5);
        assert_eq!(w.events[0].kind, "REBALANCE");
        assert_eq!(w.events[0].entity_ids, "1 2 3");
    }

    #[test]
    fn snapshots_every_vehicle() {
        let mut world = World::new();
        world.populate(
            [Location::new(LocationId(1), "l1", Position::new(0.0, 0.0), 5)],
            [
                Vehicle::new(VehicleId(1), "v1", Position::new(0.0, 0.0), 1),
                Vehicle::new(VehicleId(2), "v2", Position::new(3.0, 4.0), 1),
            ],
            Vec::<amod_world::Customer>::new(),
        );
        world.vehicle_mut(VehicleId(2)).unwrap().status = VehicleStatus::MovingToRebalance;
        world.set_current_time(12.5);

        let mut obs = SimOutputObserver::new(MemoryWriter::default());
        obs.on_snapshot(0, &world);
        obs.on_sim_end(&world);
        let w = obs.into_writer();
        assert!(w.finished);
        assert_eq!(w.snapshots.len(), 2);
        assert_eq!(w.snapshots[1].status, "MOVING_TO_REBALANCE");
        assert_eq!(w.snapshots[1].x, 3.0);
        assert_eq!(w.snapshots[1].time, 12.5);
    }

    #[test]
    fn keeps_first_error() {
        let writer = MemoryWriter { fail: true, ..MemoryWriter::default() };
        let mut obs = SimOutputObserver::new(writer);
        let stats = TickStats { events: 0, available: 1, pending: 0 };
        obs.on_tick_end(0, 0.1, stats);
        obs.on_tick_end(1, 0.2, stats);

        let err = obs.take_error().expect("error stored");
        assert!(err.to_string().contains("failure 1"), "{err}");
        assert!(obs.take_error().is_none());
        assert_eq!(obs.into_writer().failures, 2);
    }
}

// ── Full run ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod integration_tests {
    use amod_core::{BookingId, CustomerId, LocationId, Position, SimConfig, VehicleId};
    use amod_fleet::{FleetConfig, ManagerKind};
    use amod_motion::MotionParams;
    use amod_sim::AmodContextBuilder;
    use amod_world::{Booking, Customer, Location, TravelMode, Vehicle, World};

    use crate::{CsvWriter, SimOutputObserver};

    #[test]
    fn integration_csv() {
        let mut world = World::new();
        world.populate(
            [
                Location::new(LocationId(1), "l1", Position::new(0.0, 0.0), 5),
                Location::new(LocationId(2), "l2", Position::new(100.0, 0.0), 5),
            ],
            [
                Vehicle::new(VehicleId(1), "v1", Position::new(0.0, 0.0), 1),
                Vehicle::new(VehicleId(2), "v2", Position::new(100.0, 0.0), 1),
            ],
            Vec::<Customer>::new(),
        );
        let booking = Booking {
            id:          BookingId(1),
            customer_id: CustomerId(1),
            vehicle_id:  VehicleId::NONE,
            source:      Position::new(0.0, 0.0),
            destination: Position::new(100.0, 0.0),
            time:        0.0,
            mode:        TravelMode::FleetTravel,
        };
        let config = SimConfig {
            resolution:            0.5,
            end_time:              5.0,
            output_interval_ticks: 2,
            ..SimConfig::default()
        };
        let mut ctx = AmodContextBuilder::new(config)
            .world(world)
            .motion_params(MotionParams::default())
            .fleet_config(FleetConfig { manager: ManagerKind::Basic, ..FleetConfig::default() })
            .bookings(vec![booking])
            .build()
            .unwrap();

        let dir = tempfile::tempdir().expect("create temp dir");
        let mut obs = SimOutputObserver::new(CsvWriter::new(dir.path()).unwrap());
        ctx.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");

        let mut rdr = csv::Reader::from_path(dir.path().join("tick_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 10);

        // output_interval = 2 → snapshots at ticks 0, 2, 4, 6, 8 for two vehicles.
        let mut rdr = csv::Reader::from_path(dir.path().join("vehicle_snapshots.csv")).unwrap();
        assert_eq!(rdr.records().count(), 10);

        let mut rdr = csv::Reader::from_path(dir.path().join("events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][2], "BOOKING_RECEIVED");
        assert_eq!(&rows[0][3], "1 1");
        assert!(rows.iter().any(|r| &r[2] == "DISPATCH"));
        let ids: Vec<u64> = rows.iter().map(|r| r[0].parse().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
