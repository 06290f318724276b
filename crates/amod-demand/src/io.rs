//! Demand histogram table I/O.
//!
//! # File format
//!
//! Whitespace separated (spaces or tabs).  The first line holds the station count and the bin
//! width in seconds; each following line holds a location id and its
//! `86400 / binWidth` mean counts:
//!
//! ```text
//! 2 21600
//! 1 0.5 2 3.25 1
//! 2 0 0 1 0
//! ```
//!
//! A table must describe exactly the currently loaded locations at the
//! configured bin width, otherwise loading fails before anything is used.
//! Variances are not stored; a loaded table assumes Poisson counts
//! (variance equal to the mean).

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read, Write};
use std::path::Path;

use csv::{StringRecord, WriterBuilder};

use amod_core::LocationId;
use amod_spatial::KdTree;
use amod_world::Location;

use crate::histogram::{SITE_TREE_SEED, Site, bins_per_day};
use crate::{DemandError, DemandResult, SimpleDemandEstimator};

// ── Load ──────────────────────────────────────────────────────────────────────

/// Load a histogram table from a file.  See [`load_hist_reader`].
pub fn load_hist_path<'a>(
    path:      &Path,
    locations: impl IntoIterator<Item = &'a Location>,
    bin_width: f64,
) -> DemandResult<SimpleDemandEstimator> {
    let file = File::open(path)?;
    load_hist_reader(file, locations, bin_width)
}

/// Load a histogram table, validating it against `locations`.
///
/// # Errors
///
/// - [`DemandError::StationCountMismatch`] if the header's station count is
///   not the number of `locations`.
/// - [`DemandError::BinWidthMismatch`] if the header's bin width differs
///   from `bin_width`.
/// - [`DemandError::UnknownLocation`], [`DemandError::DuplicateLocation`],
///   [`DemandError::BinCountMismatch`] or [`DemandError::Parse`] for a bad
///   station line, naming the line.
pub fn load_hist_reader<'a, R: Read>(
    reader:    R,
    locations: impl IntoIterator<Item = &'a Location>,
    bin_width: f64,
) -> DemandResult<SimpleDemandEstimator> {
    let num_bins = bins_per_day(bin_width)?;
    let sites: Vec<Site> = locations.into_iter().map(Site::from).collect();
    if sites.is_empty() {
        return Err(DemandError::NoLocations);
    }

    let mut lines = LineFields::new(reader);

    // ── Header ────────────────────────────────────────────────────────────
    let (line, header) = match lines.next_fields()? {
        Some(h) => h,
        None => return Err(DemandError::Parse { line: 1, reason: "empty histogram file".into() }),
    };
    if header.len() != 2 {
        return Err(DemandError::Parse {
            line,
            reason: format!("header must be `numStations binWidth`, got {} fields", header.len()),
        });
    }
    let count: usize = parse_field(&header[0], line, "station count")?;
    let width: f64 = parse_field(&header[1], line, "bin width")?;
    if count != sites.len() {
        return Err(DemandError::StationCountMismatch { expected: sites.len(), got: count });
    }
    if (width - bin_width).abs() > 1e-9 {
        return Err(DemandError::BinWidthMismatch { expected: bin_width, got: width });
    }

    // ── Station rows ──────────────────────────────────────────────────────
    let mut means: BTreeMap<LocationId, Vec<f64>> = BTreeMap::new();
    while let Some((line, fields)) = lines.next_fields()? {
        let id = LocationId(parse_field(&fields[0], line, "location id")?);
        if !sites.iter().any(|s| s.id == id) {
            return Err(DemandError::UnknownLocation { id, line });
        }
        if means.contains_key(&id) {
            return Err(DemandError::DuplicateLocation { id, line });
        }
        let values = fields.len() - 1;
        if values != num_bins {
            return Err(DemandError::BinCountMismatch { line, expected: num_bins, got: values });
        }
        let row = (1..fields.len())
            .map(|i| parse_field::<f64>(&fields[i], line, "bin mean"))
            .collect::<DemandResult<Vec<f64>>>()?;
        means.insert(id, row);
    }
    if means.len() != sites.len() {
        return Err(DemandError::StationCountMismatch { expected: sites.len(), got: means.len() });
    }

    let variances = means.clone();
    let tree = KdTree::build_seeded(sites, SITE_TREE_SEED)?;
    Ok(SimpleDemandEstimator::assemble(bin_width, num_bins, means, variances, tree, 0))
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write the estimator's mean table to a file.
pub fn save_hist_path(est: &SimpleDemandEstimator, path: &Path) -> DemandResult<()> {
    let file = File::create(path)?;
    save_hist_writer(est, file)
}

/// Write the estimator's mean table in the format read by
/// [`load_hist_reader`].
///
/// Values are written in Rust's shortest round-trip float form, so a
/// save/load cycle reproduces every mean bit for bit.
pub fn save_hist_writer<W: Write>(est: &SimpleDemandEstimator, writer: W) -> DemandResult<()> {
    let mut w = WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    w.write_record([est.means().len().to_string(), est.bin_width().to_string()])?;
    for (id, row) in est.means() {
        let mut rec = Vec::with_capacity(row.len() + 1);
        rec.push(id.0.to_string());
        rec.extend(row.iter().map(|v| v.to_string()));
        w.write_record(&rec)?;
    }
    w.flush()?;
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Non-empty lines of a reader split on any run of whitespace, with
/// 1-based line numbers.
struct LineFields<R: Read> {
    lines: Lines<BufReader<R>>,
    line:  u64,
}

impl<R: Read> LineFields<R> {
    fn new(reader: R) -> Self {
        Self { lines: BufReader::new(reader).lines(), line: 0 }
    }

    fn next_fields(&mut self) -> DemandResult<Option<(u64, StringRecord)>> {
        for text in self.lines.by_ref() {
            let text = text?;
            self.line += 1;
            let fields: StringRecord = text.split_whitespace().collect();
            if !fields.is_empty() {
                return Ok(Some((self.line, fields)));
            }
        }
        Ok(None)
    }
}

fn parse_field<T: std::str::FromStr>(s: &str, line: u64, what: &str) -> DemandResult<T> {
    s.parse::<T>().map_err(|_| DemandError::Parse {
        line,
        reason: format!("invalid {what} {s:?}"),
    })
}
