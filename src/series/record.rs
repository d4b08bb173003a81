//! The normalized per-borehole record and the keyed collection of them.
//!
//! Invariant throughout: `depths`, `elevations` and every measurement column
//! have the same length, and index `i` of any column belongs to `depths[i]`.
//! Records are assembled once and never mutated afterwards except through
//! [`SeriesSet::insert`], which re-establishes the invariant after merging.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::series::report::Warning;

/// A measured or derived data category carried by a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Measurement {
    /// Undisturbed shear strength from the fall-cone test (kPa).
    Undisturbed,
    /// Remoulded shear strength from the fall-cone test (kPa).
    Remoulded,
    /// Sensitivity, undisturbed / remoulded. Derived.
    Sensitivity,
    /// Shear strength from the uniaxial compression test (kPa).
    EnaksStrength,
    /// Strain at failure from the uniaxial compression test (%).
    Deformation,
    /// Water content (%).
    WaterContent,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Measurement::Undisturbed => "undisturbed strength",
            Measurement::Remoulded => "remoulded strength",
            Measurement::Sensitivity => "sensitivity",
            Measurement::EnaksStrength => "enaks strength",
            Measurement::Deformation => "deformation at break",
            Measurement::WaterContent => "water content",
        };
        f.write_str(name)
    }
}

/// One borehole's filtered readings, position-aligned across all sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct BoreholeSeries {
    /// Identifier in original case, for display.
    pub borehole: String,
    /// Normalized identifier (trimmed, lowercased); the map key.
    pub key: String,
    /// Reference terrain elevation Z.
    pub z: f64,
    /// Sample depths, one per retained row.
    pub depths: Vec<f64>,
    /// Z minus depth, per row.
    pub elevations: Vec<f64>,
    columns: BTreeMap<Measurement, Vec<Option<f64>>>,
}

impl BoreholeSeries {
    pub(crate) fn new(
        borehole: String,
        key: String,
        z: f64,
        depths: Vec<f64>,
        elevations: Vec<f64>,
        columns: BTreeMap<Measurement, Vec<Option<f64>>>,
    ) -> Self {
        debug_assert_eq!(depths.len(), elevations.len());
        debug_assert!(columns.values().all(|c| c.len() == depths.len()));
        Self {
            borehole,
            key,
            z,
            depths,
            elevations,
            columns,
        }
    }

    /// Number of retained rows.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Positional values for one data category, if the series carries it.
    pub fn column(&self, measurement: Measurement) -> Option<&[Option<f64>]> {
        self.columns.get(&measurement).map(Vec::as_slice)
    }

    /// Data categories present on this series, in a fixed order.
    pub fn measurements(&self) -> impl Iterator<Item = Measurement> + '_ {
        self.columns.keys().copied()
    }

    /// Append another contribution for the same borehole, then restore depth
    /// order. Returns the number of rows dropped as exact-depth duplicates.
    fn merge(&mut self, other: BoreholeSeries) -> usize {
        let old_len = self.depths.len();
        let new_len = old_len + other.depths.len();

        for (measurement, column) in other.columns {
            self.columns
                .entry(measurement)
                .or_insert_with(|| vec![None; old_len])
                .extend(column);
        }
        // columns the other side did not carry
        for column in self.columns.values_mut() {
            column.resize(new_len, None);
        }

        self.depths.extend(other.depths);
        self.elevations.extend(other.elevations);
        self.sort_by_depth_and_dedup()
    }

    /// Stable sort on depth with all sequences permuted identically, then
    /// drop rows whose depth exactly repeats an earlier one (first
    /// contribution in processing order wins).
    fn sort_by_depth_and_dedup(&mut self) -> usize {
        let mut order: Vec<usize> = (0..self.depths.len()).collect();
        order.sort_by(|&a, &b| self.depths[a].total_cmp(&self.depths[b]));

        let mut keep = Vec::with_capacity(order.len());
        let mut last_depth: Option<f64> = None;
        for idx in order {
            let depth = self.depths[idx];
            if last_depth == Some(depth) {
                continue;
            }
            last_depth = Some(depth);
            keep.push(idx);
        }

        let dropped = self.depths.len() - keep.len();
        self.depths = keep.iter().map(|&i| self.depths[i]).collect();
        self.elevations = keep.iter().map(|&i| self.elevations[i]).collect();
        for column in self.columns.values_mut() {
            *column = keep.iter().map(|&i| column[i]).collect();
        }
        dropped
    }
}

/// Ordered collection of series, keyed by normalized borehole identifier.
#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
    series: BTreeMap<String, BoreholeSeries>,
}

impl SeriesSet {
    /// Insert a contribution. A repeated borehole key merges into the
    /// existing record: sequences are concatenated in processing order,
    /// re-sorted by ascending depth, and exact-depth duplicates dropped
    /// (with a warning).
    pub(crate) fn insert(&mut self, series: BoreholeSeries, warnings: &mut Vec<Warning>) {
        match self.series.entry(series.key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(series);
            }
            Entry::Occupied(mut slot) => {
                let dropped = slot.get_mut().merge(series);
                if dropped > 0 {
                    let warning = Warning::DuplicateDepths {
                        borehole: slot.get().borehole.clone(),
                        dropped,
                    };
                    warn!("{warning}");
                    warnings.push(warning);
                }
            }
        }
    }

    /// Series for a raw (not yet normalized) identifier.
    pub fn get(&self, raw_id: &str) -> Option<&BoreholeSeries> {
        self.series.get(&crate::terrain::normalize_key(raw_id))
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Normalized keys, ascending.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoreholeSeries> {
        self.series.values()
    }
}
