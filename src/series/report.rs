use thiserror::Error;

use crate::series::record::{BoreholeSeries, SeriesSet};

/// Non-fatal problems collected over a run. These are user-visible: a report
/// generated from partial input lists exactly what was left out and why.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Warning {
    #[error("no terrain level for '{borehole}' ({file}), skipping")]
    MissingTerrainLevel { borehole: String, file: String },

    #[error("no sheet named '{candidates}' in {file}, skipping")]
    SheetNotFound { candidates: String, file: String },

    #[error("failed to read {file}: {detail}")]
    UnreadableWorkbook { file: String, detail: String },

    #[error("no borehole identifier in {file}, skipping")]
    MissingIdentifier { file: String },

    #[error("duplicate depth readings for '{borehole}', dropped {dropped} row(s)")]
    DuplicateDepths { borehole: String, dropped: usize },

    #[error("duplicate terrain level for '{key}', keeping the last value")]
    DuplicateTerrainLevel { key: String },
}

/// What became of one source file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// The file produced a series contribution.
    Built(BoreholeSeries),
    /// The file was skipped for an expected reason (missing sheet, missing
    /// terrain level, no identifier).
    Skipped(Warning),
    /// Reading the file failed; its contribution is dropped.
    Failed(Warning),
}

/// Aggregated result of one builder run: the records that could be
/// assembled plus every warning raised on the way. Data problems never fail
/// the run, so an all-bad input yields an empty set and a full warning list.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub series: SeriesSet,
    pub warnings: Vec<Warning>,
}

impl BuildReport {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
