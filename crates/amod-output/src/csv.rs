//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `events.csv`: `id,time,type,entity_ids,message`
//! - `tick_summaries.csv`: `time,events,available`
//! - `vehicle_snapshots.csv`: `time,vehicle_id,x,y,status,customer_id,location_id`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{EventRow, OutputResult, TickSummaryRow, VehicleSnapshotRow};

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    events:    Writer<File>,
    summaries: Writer<File>,
    snapshots: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the CSV files in `dir` (which must exist) and write the headers.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut events = Writer::from_path(dir.join("events.csv"))?;
        events.write_record(["id", "time", "type", "entity_ids", "message"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["time", "events", "available"])?;

        let mut snapshots = Writer::from_path(dir.join("vehicle_snapshots.csv"))?;
        snapshots.write_record(["time", "vehicle_id", "x", "y", "status", "customer_id", "location_id"])?;

        Ok(Self { events, summaries, snapshots, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record([
                row.id.to_string().as_str(),
                row.time.to_string().as_str(),
                row.kind,
                row.entity_ids.as_str(),
                row.message.as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.time.to_string(),
            row.events.to_string(),
            row.available.to_string(),
        ])?;
        Ok(())
    }

    fn write_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.time.to_string(),
                row.vehicle_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.status.to_string(),
                row.customer_id.to_string(),
                row.location_id.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.events.flush()?;
        self.summaries.flush()?;
        self.snapshots.flush()?;
        Ok(())
    }
}
