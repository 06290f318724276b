//! Synthetic grid city: stations on a square lattice, vehicles spread across
//! them and random trips between stations.

use amod_core::{BookingId, CustomerId, LocationId, Position, SimRng, VehicleId};
use amod_world::{Booking, Customer, Location, TravelMode, Vehicle, World};
use serde::Deserialize;

/// Stream offsets so each generator draws independently of the others.
const TRIP_STREAM:    u64 = 11;
const HISTORY_STREAM: u64 = 12;

/// Shape of the generated city.  Every field has a default, so a config file
/// only needs the ones it changes.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Stations per side of the lattice.
    pub grid:              u32,
    /// Metres between neighbouring stations.
    pub spacing:           f64,
    pub station_capacity:  u32,
    pub vehicles:          u32,
    /// Trips generated when no bookings file is given.
    pub bookings:          u32,
    /// Share of generated trips that use the external mode.
    pub teleport_share:    f64,
    /// Bookings file (`id time cust sx sy dx dy mode`) replacing the
    /// generated trips.
    pub bookings_path:     Option<String>,
    /// Days of synthetic history fed to the demand estimator.  0 disables
    /// the estimator.
    pub history_days:      u32,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            grid:             4,
            spacing:          1_000.0,
            station_capacity: 20,
            vehicles:         12,
            bookings:         60,
            teleport_share:   0.1,
            bookings_path:    None,
            history_days:     3,
        }
    }
}

impl Scenario {
    pub fn stations(&self) -> Vec<Location> {
        let mut out = Vec::with_capacity((self.grid * self.grid) as usize);
        for row in 0..self.grid {
            for col in 0..self.grid {
                let id = LocationId(row * self.grid + col + 1);
                let pos = Position::new(col as f64 * self.spacing, row as f64 * self.spacing);
                out.push(Location::new(id, format!("station {}", id.0), pos, self.station_capacity));
            }
        }
        out
    }

    /// Stations plus a fleet dealt round-robin over them.
    pub fn world(&self) -> World {
        let stations = self.stations();
        let vehicles: Vec<Vehicle> = (0..self.vehicles)
            .map(|i| {
                let home = &stations[i as usize % stations.len()];
                Vehicle::new(VehicleId(i + 1), format!("vehicle {}", i + 1), home.position, 1)
            })
            .collect();
        let mut world = World::new();
        world.populate(stations, vehicles, Vec::<Customer>::new());
        world
    }

    /// `self.bookings` trips spread uniformly over `[start, end)`, sorted by
    /// time.
    pub fn trips(&self, start: f64, end: f64, rng: &mut SimRng) -> Vec<Booking> {
        let mut rng = rng.child(TRIP_STREAM);
        let mut out = self.random_trips(self.bookings, start, end, &mut rng);
        out.sort_by(|a, b| a.time.total_cmp(&b.time));
        for (i, b) in out.iter_mut().enumerate() {
            b.id = BookingId(i as u32 + 1);
            b.customer_id = CustomerId(i as u32 + 1);
        }
        out
    }

    /// Past trips, one batch per day before `start`, for building a demand
    /// histogram.
    pub fn history(&self, start: f64, end: f64, rng: &mut SimRng) -> Vec<Booking> {
        let mut rng = rng.child(HISTORY_STREAM);
        let mut out = Vec::new();
        for day in 1..=self.history_days {
            let shift = f64::from(day) * amod_core::SECONDS_PER_DAY;
            out.extend(self.random_trips(self.bookings, start - shift, end - shift, &mut rng));
        }
        out
    }

    fn random_trips(&self, n: u32, start: f64, end: f64, rng: &mut SimRng) -> Vec<Booking> {
        let stations = self.stations();
        if stations.len() < 2 || end <= start {
            return Vec::new();
        }
        (0..n)
            .map(|_| {
                let from = rng.gen_range(0..stations.len());
                let mut to = rng.gen_range(0..stations.len() - 1);
                if to >= from {
                    to += 1;
                }
                let mode = if rng.gen_range(0.0..1.0) < self.teleport_share {
                    TravelMode::Teleport
                } else {
                    TravelMode::FleetTravel
                };
                Booking {
                    id:          BookingId::NONE,
                    customer_id: CustomerId::NONE,
                    vehicle_id:  VehicleId::NONE,
                    source:      stations[from].position,
                    destination: stations[to].position,
                    time:        rng.gen_range(start..end),
                    mode,
                }
            })
            .collect()
    }
}
