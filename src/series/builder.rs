/// Series Builder
///
/// Walks a collection of laboratory workbooks and assembles one
/// [`BoreholeSeries`] per borehole: configured single-column ranges are read
/// positionally, rows without a depth are dropped whole, elevations are
/// derived from the terrain lookup, and sensitivity is derived where both
/// fall-cone strengths are configured.
///
/// Configuration problems fail fast before any file is opened; everything
/// data-related is a per-file outcome that becomes a warning, never an error.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EnaksRanges, KonusRanges, RangeConfig, WaterContentRanges};
use crate::ranges::RangeRef;
use crate::series::record::{BoreholeSeries, Measurement};
use crate::series::report::{BuildReport, FileOutcome, Warning};
use crate::terrain::{normalize_key, TerrainLookup};
use crate::workbook::{find_worksheet, read_cell_text, read_column};

/// Header cell holding the borehole label in the standard sheet layout.
pub const DEFAULT_HEADER_CELL: &str = "B6";

/// How a source file maps to a borehole identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// The file's base name (without extension) is the identifier.
    FileStem,
    /// A fixed cell inside the matched worksheet holds the identifier.
    HeaderCell(RangeRef),
}

/// Resolved ranges plus derivation flags for one builder run.
#[derive(Debug, Clone)]
pub struct ProfileRanges {
    pub depth: RangeRef,
    pub columns: Vec<(Measurement, RangeRef)>,
    pub derive_sensitivity: bool,
}

impl From<&KonusRanges> for ProfileRanges {
    fn from(ranges: &KonusRanges) -> Self {
        Self {
            depth: ranges.depth,
            columns: vec![
                (Measurement::Undisturbed, ranges.undisturbed),
                (Measurement::Remoulded, ranges.remoulded),
            ],
            derive_sensitivity: true,
        }
    }
}

impl From<&EnaksRanges> for ProfileRanges {
    fn from(ranges: &EnaksRanges) -> Self {
        Self {
            depth: ranges.depth,
            columns: vec![
                (Measurement::EnaksStrength, ranges.strength),
                (Measurement::Deformation, ranges.deformation),
            ],
            derive_sensitivity: false,
        }
    }
}

impl From<&WaterContentRanges> for ProfileRanges {
    fn from(ranges: &WaterContentRanges) -> Self {
        Self {
            depth: ranges.depth,
            columns: vec![(Measurement::WaterContent, ranges.water_content)],
            derive_sensitivity: false,
        }
    }
}

pub struct SeriesBuilder<'a> {
    terrain: &'a TerrainLookup,
    sheet_candidates: String,
    identity: IdentityPolicy,
}

impl<'a> SeriesBuilder<'a> {
    /// `sheet_candidates` is a comma-separated list of worksheet names; the
    /// first one present in a workbook is used.
    pub fn new(
        terrain: &'a TerrainLookup,
        sheet_candidates: impl Into<String>,
        identity: IdentityPolicy,
    ) -> Self {
        Self {
            terrain,
            sheet_candidates: sheet_candidates.into(),
            identity,
        }
    }

    /// Fall-cone series: undisturbed + remoulded strengths with derived
    /// sensitivity.
    pub fn build_konus(
        &self,
        files: &[PathBuf],
        config: &RangeConfig,
    ) -> Result<BuildReport, ConfigError> {
        let ranges = KonusRanges::resolve(config)?;
        Ok(self.run(files, &ProfileRanges::from(&ranges)))
    }

    /// Uniaxial-compression series: strength and strain at failure.
    pub fn build_enaks(
        &self,
        files: &[PathBuf],
        config: &RangeConfig,
    ) -> Result<BuildReport, ConfigError> {
        let ranges = EnaksRanges::resolve(config)?;
        Ok(self.run(files, &ProfileRanges::from(&ranges)))
    }

    /// Water-content series.
    pub fn build_water_content(
        &self,
        files: &[PathBuf],
        config: &RangeConfig,
    ) -> Result<BuildReport, ConfigError> {
        let ranges = WaterContentRanges::resolve(config)?;
        Ok(self.run(files, &ProfileRanges::from(&ranges)))
    }

    /// Process every file and aggregate contributions and warnings.
    pub fn run(&self, files: &[PathBuf], profile: &ProfileRanges) -> BuildReport {
        let mut report = BuildReport::default();

        for path in files {
            match self.process_file(path, profile) {
                FileOutcome::Built(series) => {
                    info!(
                        "{}: {} readings from {}",
                        series.borehole,
                        series.len(),
                        path.display()
                    );
                    report.series.insert(series, &mut report.warnings);
                }
                FileOutcome::Skipped(warning) | FileOutcome::Failed(warning) => {
                    warn!("{warning}");
                    report.warnings.push(warning);
                }
            }
        }

        info!(
            "assembled {} borehole series from {} file(s), {} warning(s)",
            report.series.len(),
            files.len(),
            report.warnings.len()
        );
        report
    }

    /// One source file's contribution, as a value rather than an exception.
    pub fn process_file(&self, path: &Path, profile: &ProfileRanges) -> FileOutcome {
        let file = path.display().to_string();

        let mut workbook = match open_workbook_auto(path) {
            Ok(workbook) => workbook,
            Err(e) => {
                return FileOutcome::Failed(Warning::UnreadableWorkbook {
                    file,
                    detail: e.to_string(),
                })
            }
        };

        let sheet_names = workbook.sheet_names().to_owned();
        let Some(sheet) = find_worksheet(&sheet_names, &self.sheet_candidates) else {
            return FileOutcome::Skipped(Warning::SheetNotFound {
                candidates: self.sheet_candidates.clone(),
                file,
            });
        };

        let range = match workbook.worksheet_range(&sheet) {
            Ok(range) => range,
            Err(e) => {
                return FileOutcome::Failed(Warning::UnreadableWorkbook {
                    file,
                    detail: e.to_string(),
                })
            }
        };

        let Some(borehole) = self.identify(path, &range) else {
            return FileOutcome::Skipped(Warning::MissingIdentifier { file });
        };

        let Some(z) = self.terrain.get(&borehole) else {
            return FileOutcome::Skipped(Warning::MissingTerrainLevel { borehole, file });
        };

        let depth_raw = read_column(&range, &profile.depth);
        let value_raw: Vec<(Measurement, Vec<Option<f64>>)> = profile
            .columns
            .iter()
            .map(|(measurement, rref)| (*measurement, read_column(&range, rref)))
            .collect();

        // zip semantics: rows beyond the shortest configured range are ignored
        let row_count = value_raw
            .iter()
            .map(|(_, values)| values.len())
            .fold(depth_raw.len(), usize::min);

        let mut depths = Vec::new();
        let mut elevations = Vec::new();
        let mut value_cols: Vec<(Measurement, Vec<Option<f64>>)> = value_raw
            .iter()
            .map(|(measurement, _)| (*measurement, Vec::new()))
            .collect();

        for i in 0..row_count {
            // a row without a depth is dropped from every sequence
            let Some(depth) = depth_raw[i] else {
                continue;
            };
            depths.push(depth);
            elevations.push(z - depth);
            for ((_, out), (_, values)) in value_cols.iter_mut().zip(&value_raw) {
                out.push(values[i]);
            }
        }

        let mut columns: BTreeMap<Measurement, Vec<Option<f64>>> =
            value_cols.into_iter().collect();

        if profile.derive_sensitivity {
            let sensitivity = derive_sensitivity_column(
                columns.get(&Measurement::Undisturbed).map(Vec::as_slice),
                columns.get(&Measurement::Remoulded).map(Vec::as_slice),
                depths.len(),
            );
            columns.insert(Measurement::Sensitivity, sensitivity);
        }

        debug!(
            "{borehole}: {} of {row_count} row(s) retained from sheet '{sheet}'",
            depths.len()
        );

        let key = normalize_key(&borehole);
        FileOutcome::Built(BoreholeSeries::new(
            borehole, key, z, depths, elevations, columns,
        ))
    }

    fn identify(&self, path: &Path, range: &Range<Data>) -> Option<String> {
        match &self.identity {
            IdentityPolicy::FileStem => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(|stem| stem.trim().to_string())
                .filter(|stem| !stem.is_empty()),
            IdentityPolicy::HeaderCell(cell) => read_cell_text(range, cell),
        }
    }
}

/// Sensitivity for one row: undisturbed / remoulded, only when both values
/// are present, the remoulded strength is nonzero, and the ratio is finite
/// and strictly positive. Anything else is null, never zero.
pub fn sensitivity(undisturbed: Option<f64>, remoulded: Option<f64>) -> Option<f64> {
    let undisturbed = undisturbed?;
    let remoulded = remoulded?;
    if remoulded == 0.0 {
        return None;
    }
    let ratio = undisturbed / remoulded;
    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

fn derive_sensitivity_column(
    undisturbed: Option<&[Option<f64>]>,
    remoulded: Option<&[Option<f64>]>,
    len: usize,
) -> Vec<Option<f64>> {
    match (undisturbed, remoulded) {
        (Some(undisturbed), Some(remoulded)) => undisturbed
            .iter()
            .zip(remoulded)
            .map(|(u, r)| sensitivity(*u, *r))
            .collect(),
        _ => vec![None; len],
    }
}
