//! Terrain-level lookup: borehole identifier to reference elevation.
//!
//! Built once per run from a two-column elevation table (identifier,
//! elevation). Malformed or empty input never fails the build; rows that do
//! not carry both values are dropped, and downstream code treats a missing
//! key as "terrain level unknown". A header row falls out naturally because
//! its elevation cell is not numeric.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use tracing::{debug, warn};

use crate::series::Warning;
use crate::workbook::{cell_to_f64, cell_to_string};

/// Normalized lookup key: trimmed, lowercased. Idempotent.
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One terrain table entry, keeping the original-case identifier for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainEntry {
    pub borehole: String,
    pub elevation: f64,
}

/// Immutable mapping from normalized borehole key to reference elevation.
#[derive(Debug, Clone, Default)]
pub struct TerrainLookup {
    entries: HashMap<String, TerrainEntry>,
    warnings: Vec<Warning>,
}

impl TerrainLookup {
    /// Build from raw (identifier, elevation) pairs. Rows missing either
    /// value are dropped. On duplicate normalized keys the last value wins
    /// and a warning is recorded.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<String>, Option<f64>)>,
    {
        let mut entries = HashMap::new();
        let mut warnings = Vec::new();

        for (borehole, elevation) in rows {
            let (Some(borehole), Some(elevation)) = (borehole, elevation) else {
                continue;
            };
            let borehole = borehole.trim().to_string();
            if borehole.is_empty() {
                continue;
            }
            let key = normalize_key(&borehole);
            let previous = entries.insert(
                key.clone(),
                TerrainEntry {
                    borehole,
                    elevation,
                },
            );
            if previous.is_some() {
                let warning = Warning::DuplicateTerrainLevel { key };
                warn!("{warning}");
                warnings.push(warning);
            }
        }

        Self { entries, warnings }
    }

    /// Build from the first two columns of an elevation workbook.
    ///
    /// Reads the named worksheet, or the first worksheet when `sheet` is
    /// `None`. An unreadable workbook yields an empty lookup, not an error;
    /// callers detect that case by checking [`TerrainLookup::is_empty`].
    pub fn from_workbook(path: &Path, sheet: Option<&str>) -> Self {
        let mut workbook = match open_workbook_auto(path) {
            Ok(wb) => wb,
            Err(e) => {
                warn!("failed to open terrain workbook {}: {e}", path.display());
                return Self::default();
            }
        };

        let sheet_name = match sheet {
            Some(name) => name.to_string(),
            None => match workbook.sheet_names().first() {
                Some(name) => name.clone(),
                None => {
                    warn!("terrain workbook {} has no worksheets", path.display());
                    return Self::default();
                }
            },
        };

        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(range) => range,
            Err(e) => {
                warn!(
                    "failed to read sheet '{sheet_name}' of terrain workbook {}: {e}",
                    path.display()
                );
                return Self::default();
            }
        };

        let rows = range.rows().map(|row| {
            let borehole = row.first().and_then(cell_to_string);
            let elevation = row.get(1).and_then(cell_to_f64);
            (borehole, elevation)
        });
        let lookup = Self::from_rows(rows.collect::<Vec<_>>());

        debug!(
            "terrain lookup built from {}: {} boreholes",
            path.display(),
            lookup.len()
        );
        lookup
    }

    /// Elevation for a raw (not yet normalized) identifier.
    pub fn get(&self, raw_id: &str) -> Option<f64> {
        self.entry(raw_id).map(|e| e.elevation)
    }

    pub fn entry(&self, raw_id: &str) -> Option<&TerrainEntry> {
        self.entries.get(&normalize_key(raw_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Warnings collected while building (currently only duplicate keys).
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TerrainEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
