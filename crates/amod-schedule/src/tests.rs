//! Unit tests for amod-schedule.

use std::io::Cursor;

use amod_core::{BookingId, CustomerId, Position, ReturnCode};
use amod_world::{Booking, TravelMode};

use crate::{BookingFeed, BookingQueue, ScheduleError, load_bookings_path, load_bookings_reader};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SAMPLE: &str = "\
# id time cust sx sy dx dy mode
1 0.0 1 0.0 0.0 10.0 0.0 1
0 5.0 9 0.0 0.0 0.0 0.0 1

2   30.5  7  120.0 40.0  -3.0 88.0   0
3 60 8 1 2 3 4 1
";

fn booking(id: u32, time: f64) -> Booking {
    Booking {
        id: BookingId(id),
        customer_id: CustomerId(id),
        time,
        ..Booking::default()
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader_tests {
    use super::*;

    #[test]
    fn parses_sample() {
        let bookings = load_bookings_reader(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(bookings.len(), 3, "id 0 line, comment and blank line are skipped");

        let b = &bookings[0];
        assert_eq!(b.id, BookingId(1));
        assert_eq!(b.customer_id, CustomerId(1));
        assert_eq!(b.destination, Position::new(10.0, 0.0));
        assert_eq!(b.mode, TravelMode::FleetTravel);

        let b = &bookings[1];
        assert_eq!(b.id, BookingId(2));
        assert_eq!(b.time, 30.5);
        assert_eq!(b.source, Position::new(120.0, 40.0));
        assert_eq!(b.destination, Position::new(-3.0, 88.0));
        assert_eq!(b.mode, TravelMode::Teleport);

        assert_eq!(bookings[2].time, 60.0);
    }

    #[test]
    fn wrong_field_count_names_line() {
        let err = load_bookings_reader(Cursor::new("1 0.0 1 0 0 1 1 1\n2 5.0 1 0 0\n")).unwrap_err();
        match err {
            ScheduleError::Parse { line, ref reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("expected 8 fields"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(ReturnCode::from(&err), ReturnCode::ErrorReadingBookingsFile);
    }

    #[test]
    fn bad_number_is_parse_error() {
        let err = load_bookings_reader(Cursor::new("1 soon 1 0 0 1 1 1\n")).unwrap_err();
        assert!(matches!(err, ScheduleError::Parse { line: 1, .. }));
    }

    #[test]
    fn bad_mode_is_parse_error() {
        let err = load_bookings_reader(Cursor::new("1 0 1 0 0 1 1 7\n")).unwrap_err();
        match err {
            ScheduleError::Parse { reason, .. } => assert!(reason.contains("travel mode 7")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn tabs_separate_fields() {
        let text = "1\t0.0\t1\t0.0\t0.0\t10.0\t0.0\t1\n\t# indented comment\n2 \t 5.5\t2\t1 2\t3\t4\t0\n";
        let bookings = load_bookings_reader(Cursor::new(text)).unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].destination, Position::new(10.0, 0.0));
        assert_eq!(bookings[0].mode, TravelMode::FleetTravel);
        assert_eq!(bookings[1].time, 5.5);
        assert_eq!(bookings[1].source, Position::new(1.0, 2.0));
        assert_eq!(bookings[1].mode, TravelMode::Teleport);
    }

    #[test]
    fn tab_separated_error_names_line() {
        let text = "# header\n\n1\t0.0\t1\t0.0\t0.0\t10.0\n";
        let err = load_bookings_reader(Cursor::new(text)).unwrap_err();
        match err {
            ScheduleError::Parse { line, ref reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("got 6"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_bookings_path(std::path::Path::new("/nonexistent/bookings.txt")).unwrap_err();
        assert!(matches!(err, ScheduleError::Io(_)));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookings.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(load_bookings_path(&path).unwrap().len(), 3);
    }
}

// ── BookingFeed ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod feed_tests {
    use super::*;

    #[test]
    fn yields_only_due_bookings() {
        let mut feed = BookingFeed::from_reader(Cursor::new(SAMPLE));

        let due: Vec<_> = feed.due(0.0).unwrap().iter().map(|b| b.id.0).collect();
        assert_eq!(due, [1]);

        assert!(feed.due(30.0).unwrap().is_empty());

        let due: Vec<_> = feed.due(100.0).unwrap().iter().map(|b| b.id.0).collect();
        assert_eq!(due, [2, 3]);
        assert!(feed.is_exhausted());
        assert!(feed.due(1e9).unwrap().is_empty());
    }

    #[test]
    fn lookahead_survives_between_calls() {
        let mut feed = BookingFeed::from_reader(Cursor::new(SAMPLE));
        assert!(feed.due(-1.0).unwrap().is_empty());
        assert!(!feed.is_exhausted());
        assert_eq!(feed.next_booking().unwrap().map(|b| b.id), Some(BookingId(1)));
    }
}

// ── BookingQueue ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue_tests {
    use super::*;

    #[test]
    fn drains_in_time_order() {
        let mut q = BookingQueue::new();
        q.extend([booking(3, 20.0), booking(1, 5.0), booking(2, 10.0), booking(4, 10.0)]);
        assert_eq!(q.len(), 4);
        assert_eq!(q.next_time(), Some(5.0));

        let ids: Vec<_> = q.drain_due(10.0).iter().map(|b| b.id.0).collect();
        assert_eq!(ids, [1, 2, 4], "bookings exactly at now are due, ties keep insertion order");
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_time(), Some(20.0));
    }

    #[test]
    fn negative_zero_booking_is_due_at_zero() {
        let mut q = BookingQueue::new();
        q.push(booking(1, -0.0));
        q.push(booking(2, 0.0));
        let ids: Vec<_> = q.drain_due(0.0).iter().map(|b| b.id.0).collect();
        assert_eq!(ids, [1, 2]);
        assert!(q.is_empty());
    }

    #[test]
    fn nothing_due_leaves_queue_intact() {
        let mut q = BookingQueue::new();
        q.push(booking(1, 50.0));
        assert!(q.drain_due(49.9).is_empty());
        assert_eq!(q.len(), 1);
        assert_eq!(q.drain_due(50.0).len(), 1);
        assert!(q.is_empty());
    }
}
