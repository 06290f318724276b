//! Plain data row types written by output backends.

use amod_world::{Event, Vehicle};

/// One entry of the event log.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub id:         u64,
    pub time:       f64,
    /// `EventKind::as_str`, e.g. `BOOKING_RECEIVED`.
    pub kind:       &'static str,
    /// Entity ids separated by single spaces, in event order.
    pub entity_ids: String,
    pub message:    String,
}

impl From<&Event> for EventRow {
    fn from(e: &Event) -> Self {
        let ids: Vec<String> = e.entity_ids.iter().map(u64::to_string).collect();
        Self {
            id:         e.id.0,
            time:       e.time,
            kind:       e.kind.as_str(),
            entity_ids: ids.join(" "),
            message:    e.message.clone(),
        }
    }
}

/// Summary statistics for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    /// Simulated time at the end of the tick.
    pub time:      f64,
    pub events:    u64,
    pub available: u64,
}

/// Where one vehicle is and what it is doing.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshotRow {
    pub time:        f64,
    pub vehicle_id:  u32,
    pub x:           f64,
    pub y:           f64,
    pub status:      &'static str,
    /// `0` when the vehicle carries nobody.
    pub customer_id: u32,
    /// `0` while in transit.
    pub location_id: u32,
}

impl VehicleSnapshotRow {
    pub fn new(time: f64, v: &Vehicle) -> Self {
        Self {
            time,
            vehicle_id:  v.id.0,
            x:           v.position.x,
            y:           v.position.y,
            status:      v.status.as_str(),
            customer_id: v.customer_id.0,
            location_id: v.location_id.0,
        }
    }
}
