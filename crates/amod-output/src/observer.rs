//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use amod_sim::{SimObserver, TickStats};
use amod_world::{Event, World};

use crate::row::{EventRow, TickSummaryRow, VehicleSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes the event log, tick summaries and vehicle
/// snapshots to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `ctx.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// Take the stored write error (if any) after `ctx.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_events(&mut self, events: &[Event]) {
        if events.is_empty() {
            return;
        }
        let rows: Vec<EventRow> = events.iter().map(EventRow::from).collect();
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn on_tick_end(&mut self, _tick: u64, time: f64, stats: TickStats) {
        let row = TickSummaryRow {
            time,
            events:    stats.events as u64,
            available: stats.available as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, _tick: u64, world: &World) {
        let time = world.current_time();
        let rows: Vec<VehicleSnapshotRow> =
            world.vehicles().map(|v| VehicleSnapshotRow::new(time, v)).collect();
        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _world: &World) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
