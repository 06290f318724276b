//! `BookingQueue`: bookings waiting for their booking time.
//!
//! A `BTreeMap<TimeKey, Vec<Booking>>` multimap: O(log T) insert and drain
//! where T is the number of distinct pending booking times.  Bookings sharing
//! a time keep their insertion order.

use std::collections::BTreeMap;

use amod_core::{OrderedFloat, TimeKey};
use amod_world::Booking;

#[derive(Default, Debug, Clone)]
pub struct BookingQueue {
    inner: BTreeMap<TimeKey, Vec<Booking>>,
    /// Cached total booking count for O(1) `len()`.
    total: usize,
}

impl BookingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a booking under its own `time`.
    pub fn push(&mut self, booking: Booking) {
        self.inner.entry(OrderedFloat(booking.time)).or_default().push(booking);
        self.total += 1;
    }

    /// Remove and return every booking with `time <= now`, earliest first.
    pub fn drain_due(&mut self, now: f64) -> Vec<Booking> {
        let later = self.inner.split_off(&OrderedFloat(now));
        let mut due = std::mem::replace(&mut self.inner, later);

        // `split_off` keeps keys >= now on the right; move the exact-now
        // bucket back to the due side.
        if let Some(at_now) = self.inner.remove(&OrderedFloat(now)) {
            due.insert(OrderedFloat(now), at_now);
        }

        let out: Vec<Booking> = due.into_values().flatten().collect();
        self.total -= out.len();
        out
    }

    /// Earliest pending booking time, or `None` if empty.
    pub fn next_time(&self) -> Option<f64> {
        self.inner.keys().next().map(|k| k.0)
    }

    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Extend<Booking> for BookingQueue {
    fn extend<I: IntoIterator<Item = Booking>>(&mut self, iter: I) {
        for b in iter {
            self.push(b);
        }
    }
}
