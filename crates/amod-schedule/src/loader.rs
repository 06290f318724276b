//! Bookings-file reader.
//!
//! # File format
//!
//! One booking per line, fields separated by whitespace, ascending by time:
//!
//! ```text
//! # id  time  cust  sx     sy     dx      dy     mode
//! 1     0.0   1     0.0    0.0    10.0    0.0    1
//! 2     30.5  7     120.0  40.0   -3.0    88.0   0
//! ```
//!
//! | Column | Meaning                                      |
//! |--------|----------------------------------------------|
//! | `id`   | booking id; `0` lines are skipped            |
//! | `time` | booking time in simulated seconds            |
//! | `cust` | customer id                                  |
//! | `sx sy`| source position                              |
//! | `dx dy`| destination position                         |
//! | `mode` | `0` = teleport, `1` = fleet travel           |
//!
//! Any run of spaces or tabs separates fields. Blank lines and `#` comments
//! are ignored.
//!
//! [`load_bookings_path`] reads everything eagerly; [`BookingFeed`] streams
//! the file and hands out only the bookings that have come due, so very long
//! booking logs never sit in memory at once.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use csv::StringRecord;
use serde::Deserialize;

use amod_core::{BookingId, CustomerId, Position, VehicleId};
use amod_world::{Booking, TravelMode};

use crate::{ScheduleError, ScheduleResult};

const FIELD_COUNT: usize = 8;

// ── Record ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BookingRecord {
    id:          u32,
    time:        f64,
    customer_id: u32,
    sx:          f64,
    sy:          f64,
    dx:          f64,
    dy:          f64,
    mode:        i64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every booking from a file.
pub fn load_bookings_path(path: &Path) -> ScheduleResult<Vec<Booking>> {
    let file = File::open(path).map_err(ScheduleError::Io)?;
    load_bookings_reader(file)
}

/// Like [`load_bookings_path`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or embedded scenarios.
pub fn load_bookings_reader<R: Read>(reader: R) -> ScheduleResult<Vec<Booking>> {
    let mut feed = BookingFeed::from_reader(reader);
    let mut out = Vec::new();
    while let Some(b) = feed.next_booking()? {
        out.push(b);
    }
    Ok(out)
}

// ── BookingFeed ───────────────────────────────────────────────────────────────

/// Incremental bookings reader with one booking of lookahead.
pub struct BookingFeed<R: Read> {
    lines:     Lines<BufReader<R>>,
    line:      u64,
    lookahead: Option<Booking>,
    exhausted: bool,
}

impl BookingFeed<File> {
    pub fn from_path(path: &Path) -> ScheduleResult<Self> {
        let file = File::open(path).map_err(ScheduleError::Io)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> BookingFeed<R> {
    pub fn from_reader(reader: R) -> Self {
        Self { lines: BufReader::new(reader).lines(), line: 0, lookahead: None, exhausted: false }
    }

    /// Bookings whose time is `<= now`, in file order.
    ///
    /// Reading stops at the first booking that is not yet due; it is kept as
    /// lookahead for the next call.
    pub fn due(&mut self, now: f64) -> ScheduleResult<Vec<Booking>> {
        let mut out = Vec::new();
        loop {
            if self.lookahead.is_none() {
                self.lookahead = self.read_next()?;
            }
            match self.lookahead.take() {
                Some(b) if b.time <= now => out.push(b),
                Some(b) => {
                    self.lookahead = Some(b);
                    break;
                }
                None => break,
            }
        }
        Ok(out)
    }

    /// Next booking regardless of time, or `None` at end of file.
    pub fn next_booking(&mut self) -> ScheduleResult<Option<Booking>> {
        match self.lookahead.take() {
            Some(b) => Ok(Some(b)),
            None => self.read_next(),
        }
    }

    /// `true` once the file is fully consumed and no lookahead remains.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.lookahead.is_none()
    }

    fn read_next(&mut self) -> ScheduleResult<Option<Booking>> {
        while !self.exhausted {
            let Some(text) = self.lines.next() else {
                self.exhausted = true;
                break;
            };
            let text = text?;
            self.line += 1;
            let line = self.line;
            if text.trim_start().starts_with('#') {
                continue;
            }
            let fields: StringRecord = text.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != FIELD_COUNT {
                return Err(ScheduleError::Parse {
                    line,
                    reason: format!("expected {FIELD_COUNT} fields, got {}", fields.len()),
                });
            }
            let rec: BookingRecord = fields
                .deserialize(None)
                .map_err(|e| ScheduleError::Parse { line, reason: e.to_string() })?;

            if rec.id == 0 {
                log::debug!("bookings file line {line}: skipping booking with id 0");
                continue;
            }
            let mode = TravelMode::try_from(rec.mode).map_err(|m| ScheduleError::Parse {
                line,
                reason: format!("invalid travel mode {m}: expected 0 (teleport) or 1 (fleet)"),
            })?;

            return Ok(Some(Booking {
                id:          BookingId(rec.id),
                customer_id: CustomerId(rec.customer_id),
                vehicle_id:  VehicleId::NONE,
                source:      Position::new(rec.sx, rec.sy),
                destination: Position::new(rec.dx, rec.dy),
                time:        rec.time,
                mode,
            }));
        }
        Ok(None)
    }
}
