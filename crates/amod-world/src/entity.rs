//! Simulated entities: vehicles, customers and locations.
//!
//! All three share the [`Entity`] capability (id, display name, position)
//! and can be indexed by a k-d tree through [`KdPoint`].

use std::collections::BTreeSet;

use amod_core::{CustomerId, LocationId, Position, VehicleId};
use amod_spatial::KdPoint;

use crate::{CustomerStatus, VehicleStatus};

// ── Entity ────────────────────────────────────────────────────────────────────

/// Identity, name and position shared by every simulated object.
///
/// Equality between entities is identity equality: two values with the same
/// id describe the same object, possibly at different instants.
pub trait Entity {
    type Id: Copy + Ord + std::hash::Hash + std::fmt::Debug;

    fn id(&self) -> Self::Id;
    fn name(&self) -> &str;
    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);
}

macro_rules! impl_entity {
    ($ty:ty, $id:ty) => {
        impl Entity for $ty {
            type Id = $id;

            #[inline]
            fn id(&self) -> $id {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            #[inline]
            fn position(&self) -> Position {
                self.position
            }

            #[inline]
            fn set_position(&mut self, position: Position) {
                self.position = position;
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl KdPoint for $ty {
            #[inline]
            fn dims(&self) -> usize {
                2
            }

            #[inline]
            fn coord(&self, axis: usize) -> f64 {
                self.position.coord(axis)
            }
        }
    };
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// A fleet vehicle.  Created at fleet initialisation and recycled, never
/// destroyed, during a run.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub id:          VehicleId,
    pub name:        String,
    pub position:    Position,
    pub capacity:    u32,
    pub status:      VehicleStatus,
    /// Customer the vehicle is committed to; `NONE` when idle or rebalancing.
    pub customer_id: CustomerId,
    /// Location the vehicle is parked at; `NONE` while in transit.
    pub location_id: LocationId,
    pub waypoints:   Vec<Position>,
}

impl Vehicle {
    pub fn new(id: VehicleId, name: impl Into<String>, position: Position, capacity: u32) -> Self {
        Self {
            id,
            name: name.into(),
            position,
            capacity,
            status: VehicleStatus::Free,
            ..Self::default()
        }
    }
}

impl_entity!(Vehicle, VehicleId);

// ── Customer ──────────────────────────────────────────────────────────────────

/// A trip requester.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Customer {
    pub id:          CustomerId,
    pub name:        String,
    pub position:    Position,
    pub status:      CustomerStatus,
    pub vehicle_id:  VehicleId,
    pub location_id: LocationId,
}

impl Customer {
    pub fn new(id: CustomerId, name: impl Into<String>, position: Position) -> Self {
        Self { id, name: name.into(), position, ..Self::default() }
    }
}

impl_entity!(Customer, CustomerId);

// ── Location ──────────────────────────────────────────────────────────────────

/// A place where vehicles park and customers wait.
///
/// Stations are ordinary `Location`s that the fleet manager additionally
/// uses as units of account for rebalancing.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub id:       LocationId,
    pub name:     String,
    pub position: Position,
    pub capacity: u32,
    vehicle_ids:  BTreeSet<VehicleId>,
    customer_ids: BTreeSet<CustomerId>,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>, position: Position, capacity: u32) -> Self {
        Self { id, name: name.into(), position, capacity, ..Self::default() }
    }

    /// Returns `true` if the vehicle was not already present.
    pub fn add_vehicle_id(&mut self, id: VehicleId) -> bool {
        self.vehicle_ids.insert(id)
    }

    pub fn remove_vehicle_id(&mut self, id: VehicleId) -> bool {
        self.vehicle_ids.remove(&id)
    }

    pub fn has_vehicle(&self, id: VehicleId) -> bool {
        self.vehicle_ids.contains(&id)
    }

    pub fn vehicle_ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicle_ids.iter().copied()
    }

    pub fn num_vehicles(&self) -> usize {
        self.vehicle_ids.len()
    }

    pub fn clear_vehicle_ids(&mut self) {
        self.vehicle_ids.clear();
    }

    pub fn add_customer_id(&mut self, id: CustomerId) -> bool {
        self.customer_ids.insert(id)
    }

    pub fn remove_customer_id(&mut self, id: CustomerId) -> bool {
        self.customer_ids.remove(&id)
    }

    pub fn has_customer(&self, id: CustomerId) -> bool {
        self.customer_ids.contains(&id)
    }

    pub fn customer_ids(&self) -> impl Iterator<Item = CustomerId> + '_ {
        self.customer_ids.iter().copied()
    }

    pub fn num_customers(&self) -> usize {
        self.customer_ids.len()
    }

    pub fn clear_customer_ids(&mut self) {
        self.customer_ids.clear();
    }
}

impl_entity!(Location, LocationId);
