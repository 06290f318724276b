//! Arena-backed task bookkeeping.
//!
//! Every in-flight task lives in a generation-checked [`SlotMap`]; the maps
//! around it only hold keys.  A stale key (its task already completed) can
//! never resolve to a newer task that reused the slot.

use std::collections::BTreeMap;

use slotmap::{Key, SlotMap, new_key_type};

use amod_core::{OrderedFloat, TimeKey, VehicleId};

use crate::{Dispatch, Handover, Teleport};

new_key_type! {
    pub struct DispatchKey;
    pub struct PickupKey;
    pub struct DropoffKey;
    pub struct TeleportKey;
}

// ── TimedQueue ────────────────────────────────────────────────────────────────

/// Tasks keyed by completion time.
///
/// Entries due at the same instant complete in scheduling order.
#[derive(Debug)]
pub struct TimedQueue<K: Key, V> {
    arena:   SlotMap<K, V>,
    by_time: BTreeMap<TimeKey, Vec<K>>,
}

impl<K: Key, V> Default for TimedQueue<K, V> {
    fn default() -> Self {
        Self { arena: SlotMap::with_key(), by_time: BTreeMap::new() }
    }
}

impl<K: Key, V> TimedQueue<K, V> {
    pub fn push(&mut self, due: f64, task: V) -> K {
        let key = self.arena.insert(task);
        self.by_time.entry(OrderedFloat(due)).or_default().push(key);
        key
    }

    /// Remove and return the earliest task with completion time `<= now`.
    pub fn pop_due(&mut self, now: f64) -> Option<V> {
        loop {
            let mut entry = self.by_time.first_entry()?;
            if entry.key().0 > now {
                return None;
            }
            let key = entry.get_mut().remove(0);
            if entry.get().is_empty() {
                entry.remove();
            }
            if let Some(task) = self.arena.remove(key) {
                return Some(task);
            }
        }
    }

    /// Earliest pending completion time.
    pub fn next_due(&self) -> Option<f64> {
        self.by_time.keys().next().map(|t| t.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.arena.values()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}

// ── TaskStore ─────────────────────────────────────────────────────────────────

/// All tasks the simulator has committed to.
///
/// At most one dispatch exists per vehicle; `by_vehicle` is the index that
/// enforces it.
#[derive(Debug, Default)]
pub struct TaskStore {
    dispatches: SlotMap<DispatchKey, Dispatch>,
    by_vehicle: BTreeMap<VehicleId, DispatchKey>,
    pub pickups:   TimedQueue<PickupKey, Handover>,
    pub dropoffs:  TimedQueue<DropoffKey, Handover>,
    pub teleports: TimedQueue<TeleportKey, Teleport>,
}

impl TaskStore {
    /// Record a dispatch.  Returns `None`, storing nothing, if the vehicle
    /// already has one.
    pub fn insert_dispatch(&mut self, dispatch: Dispatch) -> Option<DispatchKey> {
        if self.by_vehicle.contains_key(&dispatch.vehicle_id) {
            return None;
        }
        let vehicle = dispatch.vehicle_id;
        let key = self.dispatches.insert(dispatch);
        self.by_vehicle.insert(vehicle, key);
        Some(key)
    }

    pub fn dispatch(&self, vehicle: VehicleId) -> Option<&Dispatch> {
        self.by_vehicle.get(&vehicle).and_then(|&k| self.dispatches.get(k))
    }

    pub fn dispatch_mut(&mut self, vehicle: VehicleId) -> Option<&mut Dispatch> {
        let key = *self.by_vehicle.get(&vehicle)?;
        self.dispatches.get_mut(key)
    }

    pub fn remove_dispatch(&mut self, vehicle: VehicleId) -> Option<Dispatch> {
        let key = self.by_vehicle.remove(&vehicle)?;
        self.dispatches.remove(key)
    }

    pub fn is_dispatched(&self, vehicle: VehicleId) -> bool {
        self.by_vehicle.contains_key(&vehicle)
    }

    /// Dispatched vehicles in ascending id order.
    pub fn dispatched_vehicles(&self) -> Vec<VehicleId> {
        self.by_vehicle.keys().copied().collect()
    }

    pub fn num_dispatches(&self) -> usize {
        self.dispatches.len()
    }

    /// Number of tasks of any kind still in flight.
    pub fn pending(&self) -> usize {
        self.dispatches.len() + self.pickups.len() + self.dropoffs.len() + self.teleports.len()
    }
}
