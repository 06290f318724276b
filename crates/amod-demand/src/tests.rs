//! Unit tests for amod-demand.

use std::io::Cursor;

use amod_core::{BookingId, LocationId, Position, ReturnCode, SECONDS_PER_DAY};
use amod_world::{Booking, Location, World};

use crate::{
    DemandError, DemandEstimator, SimpleDemandEstimator, load_hist_path, load_hist_reader,
    save_hist_path, save_hist_writer,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn stations() -> Vec<Location> {
    vec![
        Location::new(LocationId(1), "west", Position::new(0.0, 0.0), 10),
        Location::new(LocationId(2), "east", Position::new(1_000.0, 0.0), 10),
    ]
}

fn booking_at(id: u32, x: f64, time: f64) -> Booking {
    Booking {
        id: BookingId(id),
        source: Position::new(x, 0.0),
        time,
        ..Booking::default()
    }
}

/// Two days: day 0 has three bookings near "west" in hour 0, day 1 has one.
fn two_day_history() -> Vec<Booking> {
    vec![
        booking_at(1, 5.0, 10.0),
        booking_at(2, -3.0, 100.0),
        booking_at(3, 40.0, 3_599.0),
        booking_at(4, 0.0, SECONDS_PER_DAY + 20.0),
        booking_at(5, 990.0, SECONDS_PER_DAY + 7_300.0),
    ]
}

// ── Histogram ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod histogram_tests {
    use super::*;

    #[test]
    fn averages_over_distinct_days() {
        let est = SimpleDemandEstimator::from_bookings(&two_day_history(), &stations(), 3_600.0).unwrap();
        let world = World::new();
        assert_eq!(est.num_bins(), 24);
        assert_eq!(est.days_observed(), 2);

        // west, hour 0: counts [3, 1] -> mean 2, population variance 1.
        let (m, v) = est.predict(LocationId(1), &world, 1_800.0);
        assert_eq!((m, v), (2.0, 1.0));

        // east, hour 2: counts [0, 1] -> mean 0.5, variance 0.25.
        let (m, v) = est.predict(LocationId(2), &world, 2.0 * 3_600.0 + 1.0);
        assert_eq!((m, v), (0.5, 0.25));

        // Same time of day on a later day hits the same bin.
        assert_eq!(est.predict(LocationId(1), &world, 3.0 * SECONDS_PER_DAY + 5.0).0, 2.0);
    }

    #[test]
    fn empty_cells_fall_back_to_global() {
        let est = SimpleDemandEstimator::from_bookings(&two_day_history(), &stations(), 3_600.0).unwrap();
        assert_eq!(est.mean(LocationId(1), 12), Some(0.0));
        assert_eq!(est.mean(LocationId(9), 0), None);

        let world = World::new();
        let global = est.global();
        assert!(global.0 > 0.0);
        assert_eq!(est.predict(LocationId(2), &world, 12.0 * 3_600.0), global);
        assert_eq!(est.predict(LocationId(1), &world, 12.0 * 3_600.0), global);
        assert_eq!(est.predict(LocationId(2), &world, 0.0), global);
    }

    #[test]
    fn unknown_location_gets_global_figures() {
        let est = SimpleDemandEstimator::from_bookings(&two_day_history(), &stations(), 3_600.0).unwrap();
        let (gm, gv) = est.global();
        // Cell means sum to 2 + 0.5 over 48 cells.
        assert!((gm - 2.5 / 48.0).abs() < 1e-12);
        assert!((gv - 1.25 / 48.0).abs() < 1e-12);
        assert_eq!(est.predict(LocationId(77), &World::new(), 0.0), (gm, gv));
    }

    #[test]
    fn predict_at_snaps_to_nearest_location() {
        let est = SimpleDemandEstimator::from_bookings(&two_day_history(), &stations(), 3_600.0).unwrap();
        let world = World::new();
        assert_eq!(est.predict_at(Position::new(200.0, 50.0), &world, 10.0).0, 2.0);
        // East never saw a booking in hour 0.
        assert_eq!(est.predict_at(Position::new(800.0, 0.0), &world, 10.0), est.global());
        assert_eq!(est.predict_at(Position::new(800.0, 0.0), &world, 7_300.0).0, 0.5);
    }

    #[test]
    fn no_bookings_gives_zero_global() {
        let est = SimpleDemandEstimator::from_bookings(&[], &stations(), 3_600.0).unwrap();
        assert_eq!(est.days_observed(), 0);
        assert_eq!(est.global(), (0.0, 0.0));
        assert_eq!(est.predict(LocationId(1), &World::new(), 0.0), (0.0, 0.0));
    }

    #[test]
    fn rejects_bad_bin_width() {
        for w in [0.0, -5.0, 7_000.0, f64::NAN] {
            let err = SimpleDemandEstimator::from_bookings(&[], &stations(), w).unwrap_err();
            assert!(matches!(err, DemandError::InvalidBinWidth(_)), "width {w}");
        }
    }

    #[test]
    fn rejects_empty_locations() {
        let err = SimpleDemandEstimator::from_bookings(&[], &Vec::<Location>::new(), 3_600.0).unwrap_err();
        assert!(matches!(err, DemandError::NoLocations));
    }
}

// ── Histogram file ────────────────────────────────────────────────────────────

#[cfg(test)]
mod io_tests {
    use super::*;

    const TABLE: &str = "2 21600\n1 0.5 2 3.25 1\n2   0 0 1 0\n";

    #[test]
    fn loads_table_with_poisson_variance() {
        let est = load_hist_reader(Cursor::new(TABLE), &stations(), 21_600.0).unwrap();
        assert_eq!(est.num_bins(), 4);
        let world = World::new();
        assert_eq!(est.predict(LocationId(1), &world, 12.0 * 3_600.0), (3.25, 3.25));
        // Zero cell: falls back to the table average, 7.75 over 8 cells.
        assert_eq!(est.global(), (0.96875, 0.96875));
        assert_eq!(est.predict(LocationId(2), &world, 0.0), (0.96875, 0.96875));
    }

    #[test]
    fn loads_tab_separated_table() {
        let table = "2\t21600\n1\t0.5\t2 \t3.25\t1\n\n2\t0\t0\t1\t0\n";
        let est = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap();
        assert_eq!(est.mean(LocationId(1), 3), Some(1.0));
        assert_eq!(est.mean(LocationId(2), 2), Some(1.0));
    }

    #[test]
    fn tab_separated_errors_keep_line_numbers() {
        let table = "2\t21600\n\n1\t0\tx\t0\t0\n";
        let err = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::Parse { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn save_then_load_preserves_predictions() {
        let est = SimpleDemandEstimator::from_bookings(&two_day_history(), &stations(), 3_600.0).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hist.txt");
        save_hist_path(&est, &path).unwrap();

        let loaded = load_hist_path(&path, &stations(), 3_600.0).unwrap();
        let world = World::new();
        for t in [0.0, 1_800.0, 7_500.0, 50_000.0] {
            for id in [LocationId(1), LocationId(2)] {
                assert_eq!(loaded.predict(id, &world, t).0, est.predict(id, &world, t).0);
            }
        }
    }

    #[test]
    fn writer_output_matches_format() {
        let est = load_hist_reader(Cursor::new(TABLE), &stations(), 21_600.0).unwrap();
        let mut buf = Vec::new();
        save_hist_writer(&est, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "2 21600\n1 0.5 2 3.25 1\n2 0 0 1 0\n");
    }

    #[test]
    fn station_count_mismatch() {
        let err = load_hist_reader(Cursor::new("3 21600\n"), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::StationCountMismatch { expected: 2, got: 3 }));
        assert_eq!(ReturnCode::from(&err), ReturnCode::ErrorReadingDemandHistFile);
    }

    #[test]
    fn bin_width_mismatch() {
        let err = load_hist_reader(Cursor::new(TABLE), &stations(), 3_600.0).unwrap_err();
        assert!(matches!(err, DemandError::BinWidthMismatch { .. }));
    }

    #[test]
    fn unknown_location_names_line() {
        let table = "2 21600\n1 0 0 0 0\n5 0 0 0 0\n";
        let err = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::UnknownLocation { id: LocationId(5), line: 3 }));
    }

    #[test]
    fn duplicate_location() {
        let table = "2 21600\n1 0 0 0 0\n1 0 0 0 0\n";
        let err = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::DuplicateLocation { id: LocationId(1), line: 3 }));
    }

    #[test]
    fn short_row() {
        let table = "2 21600\n1 0 0 0\n";
        let err = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::BinCountMismatch { line: 2, expected: 4, got: 3 }));
    }

    #[test]
    fn missing_rows() {
        let table = "2 21600\n1 0 0 0 0\n";
        let err = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::StationCountMismatch { expected: 2, got: 1 }));
    }

    #[test]
    fn bad_number() {
        let table = "2 21600\n1 0 x 0 0\n";
        let err = load_hist_reader(Cursor::new(table), &stations(), 21_600.0).unwrap_err();
        assert!(matches!(err, DemandError::Parse { line: 2, .. }));
    }
}
