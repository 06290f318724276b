//! Time-of-day booking histogram.
//!
//! # Model
//!
//! Each historical booking is snapped to its nearest location and counted in
//! the bin `floor(time_of_day / bin_width)` of the calendar day it falls on.
//! For every (location, bin) the estimator keeps the mean and population
//! variance of that count over all distinct days observed, with days that
//! saw no booking at the cell counting as zero.
//!
//! Cells without history are answered with the global figures, the average
//! of every cell's mean and variance.  That covers locations the estimator
//! has never heard of and bins in which a known location never saw a
//! booking.  Counts are non-negative, so a zero mean marks such a bin both
//! for histograms built from bookings and for loaded tables.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use amod_core::time::{day_index, time_of_day};
use amod_core::{LocationId, Position, SECONDS_PER_DAY};
use amod_spatial::{KdPoint, KdTree};
use amod_world::{Booking, Location, World};

use crate::{DemandError, DemandEstimator, DemandResult};

/// Default bin width: one hour.
pub const DEFAULT_BIN_WIDTH: f64 = 3_600.0;

/// Seed for the location index; tree shape never changes query results.
pub(crate) const SITE_TREE_SEED: u64 = 0x5eed;

// ── Site ──────────────────────────────────────────────────────────────────────

/// Location id and coordinate, the only parts of a `Location` snapping needs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Site {
    pub id:       LocationId,
    pub position: Position,
}

impl KdPoint for Site {
    fn dims(&self) -> usize {
        2
    }

    fn coord(&self, axis: usize) -> f64 {
        self.position.coord(axis)
    }
}

impl From<&Location> for Site {
    fn from(l: &Location) -> Site {
        Site { id: l.id, position: l.position }
    }
}

// ── SimpleDemandEstimator ─────────────────────────────────────────────────────

/// Histogram-based [`DemandEstimator`].
#[derive(Clone, Debug)]
pub struct SimpleDemandEstimator {
    bin_width:     f64,
    num_bins:      usize,
    means:         BTreeMap<LocationId, Vec<f64>>,
    variances:     BTreeMap<LocationId, Vec<f64>>,
    sites:         KdTree<Site>,
    global:        (f64, f64),
    days_observed: usize,
}

impl SimpleDemandEstimator {
    /// Build the histogram from historical bookings.
    ///
    /// # Errors
    ///
    /// - [`DemandError::InvalidBinWidth`] unless `bin_width` divides a day.
    /// - [`DemandError::NoLocations`] if `locations` is empty.
    pub fn from_bookings<'a>(
        bookings:  &[Booking],
        locations: impl IntoIterator<Item = &'a Location>,
        bin_width: f64,
    ) -> DemandResult<Self> {
        let num_bins = bins_per_day(bin_width)?;
        let sites: Vec<Site> = locations.into_iter().map(Site::from).collect();
        if sites.is_empty() {
            return Err(DemandError::NoLocations);
        }
        let tree = KdTree::build_seeded(sites.clone(), SITE_TREE_SEED)?;

        // ── Count bookings per (location, bin, day) ───────────────────────
        let mut counts: HashMap<(LocationId, usize, i64), u32> = HashMap::new();
        let mut days: BTreeSet<i64> = BTreeSet::new();
        for b in bookings {
            let site = tree.find_nn(&b.source, 0.0)?;
            let bin = bin_of(b.time, bin_width, num_bins);
            let day = day_index(b.time);
            *counts.entry((site.id, bin, day)).or_default() += 1;
            days.insert(day);
        }

        // ── Average over observed days ────────────────────────────────────
        let ndays = days.len();
        let mut means = BTreeMap::new();
        let mut variances = BTreeMap::new();
        for site in &sites {
            let mut m = vec![0.0; num_bins];
            let mut v = vec![0.0; num_bins];
            if ndays > 0 {
                for bin in 0..num_bins {
                    let daily: Vec<f64> = days
                        .iter()
                        .map(|&d| counts.get(&(site.id, bin, d)).copied().unwrap_or(0) as f64)
                        .collect();
                    let mean = daily.iter().sum::<f64>() / ndays as f64;
                    let var = daily.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / ndays as f64;
                    m[bin] = mean;
                    v[bin] = var;
                }
            }
            means.insert(site.id, m);
            variances.insert(site.id, v);
        }

        log::debug!(
            "demand histogram built from {} bookings over {} day(s), {} locations x {} bins",
            bookings.len(),
            ndays,
            sites.len(),
            num_bins
        );
        Ok(Self::assemble(bin_width, num_bins, means, variances, tree, ndays))
    }

    pub(crate) fn assemble(
        bin_width:     f64,
        num_bins:      usize,
        means:         BTreeMap<LocationId, Vec<f64>>,
        variances:     BTreeMap<LocationId, Vec<f64>>,
        sites:         KdTree<Site>,
        days_observed: usize,
    ) -> Self {
        let cells = (means.len() * num_bins).max(1) as f64;
        let global_mean = means.values().flatten().sum::<f64>() / cells;
        let global_var = variances.values().flatten().sum::<f64>() / cells;
        Self {
            bin_width,
            num_bins,
            means,
            variances,
            sites,
            global: (global_mean, global_var),
            days_observed,
        }
    }

    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Number of distinct calendar days seen in the source bookings (0 when
    /// loaded from a histogram table).
    pub fn days_observed(&self) -> usize {
        self.days_observed
    }

    /// Bin index for an absolute time.
    pub fn bin(&self, time: f64) -> usize {
        bin_of(time, self.bin_width, self.num_bins)
    }

    /// Mean count for a (location, bin) cell, if the location is covered.
    pub fn mean(&self, location: LocationId, bin: usize) -> Option<f64> {
        self.means.get(&location).and_then(|m| m.get(bin)).copied()
    }

    /// Covered locations in ascending id order.
    pub fn locations(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.means.keys().copied()
    }

    /// `(mean, variance)` used for cells without history.
    pub fn global(&self) -> (f64, f64) {
        self.global
    }

    pub(crate) fn means(&self) -> &BTreeMap<LocationId, Vec<f64>> {
        &self.means
    }
}

impl DemandEstimator for SimpleDemandEstimator {
    fn predict(&self, location: LocationId, _world: &World, time: f64) -> (f64, f64) {
        let bin = self.bin(time);
        match (self.means.get(&location), self.variances.get(&location)) {
            (Some(m), Some(v)) if m[bin] > 0.0 => (m[bin], v[bin]),
            _ => self.global,
        }
    }

    fn predict_at(&self, position: Position, world: &World, time: f64) -> (f64, f64) {
        match self.sites.find_nn(&position, 0.0) {
            Ok(site) => self.predict(site.id, world, time),
            Err(_) => self.global,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Number of bins in a day, validating that `bin_width` divides it exactly.
pub(crate) fn bins_per_day(bin_width: f64) -> DemandResult<usize> {
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(DemandError::InvalidBinWidth(bin_width));
    }
    let n = (SECONDS_PER_DAY / bin_width).round();
    if n < 1.0 || (n * bin_width - SECONDS_PER_DAY).abs() > 1e-6 {
        return Err(DemandError::InvalidBinWidth(bin_width));
    }
    Ok(n as usize)
}

fn bin_of(time: f64, bin_width: f64, num_bins: usize) -> usize {
    ((time_of_day(time) / bin_width).floor() as usize).min(num_bins - 1)
}
