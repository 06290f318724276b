//! small: a few hours of an autonomous taxi fleet on a synthetic grid city.
//!
//! Usage: `small [config.json]`.  Without a config file the built-in
//! scenario runs with the match/rebalance manager.  Output lands in
//! `output/small` (or `output_dir` from the config):
//!
//! - `events.csv`, `tick_summaries.csv`, `vehicle_snapshots.csv`
//! - `histogram.txt`, the demand histogram used for rebalancing

mod scenario;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Deserialize;

use amod_core::{SimConfig, SimRng};
use amod_demand::{DEFAULT_BIN_WIDTH, SimpleDemandEstimator, save_hist_path};
use amod_fleet::{FleetConfig, ManagerKind};
use amod_motion::MotionParams;
use amod_output::{CsvWriter, OutputWriter, SimOutputObserver};
use amod_schedule::load_bookings_path;
use amod_sim::{AmodContextBuilder, SimObserver, TickStats};
use amod_world::{Event, EventKind, World};

use scenario::Scenario;

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    sim:        SimConfig,
    motion:     MotionParams,
    fleet:      FleetConfig,
    scenario:   Scenario,
    output_dir: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig {
                resolution:            1.0,
                end_time:              4.0 * 3_600.0,
                output_interval_ticks: 300, // every five simulated minutes
                ..SimConfig::default()
            },
            motion:     MotionParams::default(),
            fleet:      FleetConfig::default(),
            scenario:   Scenario::default(),
            output_dir: PathBuf::from("output/small"),
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ── Observer wrapper to tally trips ──────────────────────────────────────────

struct TripCounter<W: OutputWriter> {
    inner:      SimOutputObserver<W>,
    received:   usize,
    serviced:   usize,
    discarded:  usize,
    rebalances: usize,
    busiest:    usize,
}

impl<W: OutputWriter> TripCounter<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, received: 0, serviced: 0, discarded: 0, rebalances: 0, busiest: 0 }
    }
}

impl<W: OutputWriter> SimObserver for TripCounter<W> {
    fn on_events(&mut self, events: &[Event]) {
        for e in events {
            match e.kind {
                EventKind::BookingReceived         => self.received += 1,
                EventKind::BookingServiced         => self.serviced += 1,
                EventKind::BookingCannotBeServiced => self.discarded += 1,
                EventKind::Rebalance               => self.rebalances += 1,
                _ => {}
            }
        }
        self.inner.on_events(events);
    }

    fn on_tick_end(&mut self, tick: u64, time: f64, stats: TickStats) {
        self.busiest = self.busiest.max(stats.pending);
        self.inner.on_tick_end(tick, time, stats);
    }

    fn on_snapshot(&mut self, tick: u64, world: &World) {
        self.inner.on_snapshot(tick, world);
    }

    fn on_sim_end(&mut self, world: &World) {
        self.inner.on_sim_end(world);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    let sc = &config.scenario;

    println!("=== small: AMOD fleet on a {0}x{0} grid ===", sc.grid);
    println!(
        "Vehicles: {}  |  Sim: {}s to {}s at {}s/tick  |  Seed: {}",
        sc.vehicles, config.sim.start_time, config.sim.end_time, config.sim.resolution, config.sim.seed
    );
    println!();

    // 1. World and trips.
    let world = sc.world();
    let stations = sc.stations();
    let mut rng = SimRng::new(config.sim.seed);
    let bookings = match &sc.bookings_path {
        Some(path) => load_bookings_path(Path::new(path))
            .with_context(|| format!("loading bookings from {path}"))?,
        None => sc.trips(config.sim.start_time, config.sim.end_time, &mut rng),
    };
    println!("{} stations, {} bookings", stations.len(), bookings.len());

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    // 2. Context, with a demand histogram from synthetic history when the
    //    manager rebalances.
    let mut builder = AmodContextBuilder::new(config.sim.clone())
        .world(world)
        .motion_params(config.motion)
        .fleet_config(config.fleet.clone())
        .bookings(bookings);
    if config.fleet.manager == ManagerKind::MatchRebalance {
        if sc.history_days > 0 {
            let history = sc.history(config.sim.start_time, config.sim.end_time, &mut rng);
            let estimator = SimpleDemandEstimator::from_bookings(&history, &stations, DEFAULT_BIN_WIDTH)?;
            save_hist_path(&estimator, &config.output_dir.join("histogram.txt"))?;
            println!("Demand histogram from {} past trips over {} days", history.len(), sc.history_days);
            builder = builder.demand_estimator(Box::new(estimator));
        }
        builder = builder.stations(stations);
    }
    let mut ctx = builder.build()?;

    // 3. Output.
    let writer = CsvWriter::new(&config.output_dir)?;
    let mut obs = TripCounter::new(SimOutputObserver::new(writer));

    // 4. Run.
    let t0 = Instant::now();
    ctx.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!("Simulation complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), ctx.tick());
    println!("  bookings received    : {}", obs.received);
    println!("  bookings serviced    : {}", obs.serviced);
    println!("  bookings discarded   : {}", obs.discarded);
    println!("  rebalancing moves    : {}", obs.rebalances);
    println!("  peak pending bookings: {}", obs.busiest);
    println!("  output               : {}", config.output_dir.display());
    println!();

    // 6. Final fleet table.
    println!("{:<10} {:<20} {:<10} {:>10} {:>10}", "Vehicle", "Status", "Station", "x", "y");
    println!("{}", "-".repeat(64));
    for v in ctx.world.vehicles() {
        println!(
            "{:<10} {:<20} {:<10} {:>10.1} {:>10.1}",
            v.id.0,
            v.status.as_str(),
            v.location_id.0,
            v.position.x,
            v.position.y,
        );
    }

    Ok(())
}
