//! Combined table export: one flat row per (borehole, depth index).
//!
//! Outer-joins the Konus and Enaks series sets by borehole. Per borehole the
//! row count is the longer of the two depth sequences; the depth and
//! elevation columns come from that sequence, and every measured column is
//! filled positionally with nulls past its end. Column order matches the
//! workbook the engineers expect.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::series::{BoreholeSeries, Measurement, SeriesSet};

/// Header row of the exported workbook.
pub const COMBINED_HEADERS: [&str; 8] = [
    "Borhull",
    "Dybde",
    "Kote",
    "Omrørt skjærstyrke",
    "Uforstyrret skjærstyrke konus",
    "Sensitivitet",
    "Skjærstyrke enaks",
    "Bruddtøyning",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write combined table: {0}")]
    Xlsx(#[from] XlsxError),
}

/// One exported row. Fields that originate from the same series index stay
/// mutually consistent: Konus values always sit next to a depth that exists
/// in the Konus record, and likewise for Enaks when it is the longer series.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedRow {
    pub borehole: String,
    pub depth: f64,
    pub elevation: f64,
    pub remoulded: Option<f64>,
    pub undisturbed: Option<f64>,
    pub sensitivity: Option<f64>,
    pub enaks_strength: Option<f64>,
    pub deformation: Option<f64>,
}

/// Flatten two series sets into export rows, boreholes in key order.
pub fn combined_rows(konus: &SeriesSet, enaks: &SeriesSet) -> Vec<CombinedRow> {
    let mut keys: Vec<&str> = konus.keys().chain(enaks.keys()).collect();
    keys.sort_unstable();
    keys.dedup();

    let mut rows = Vec::new();
    for key in keys {
        let kdata = konus.get(key);
        let edata = enaks.get(key);

        // depth/elevation backbone = the longer series, Konus on a tie
        let klen = kdata.map_or(0, BoreholeSeries::len);
        let elen = edata.map_or(0, BoreholeSeries::len);
        let Some(primary) = (if klen >= elen { kdata.or(edata) } else { edata }) else {
            continue;
        };

        let borehole = kdata.or(edata).map(|s| s.borehole.clone()).unwrap_or_default();

        for i in 0..primary.len() {
            rows.push(CombinedRow {
                borehole: borehole.clone(),
                depth: primary.depths[i],
                elevation: primary.elevations[i],
                remoulded: column_at(kdata, Measurement::Remoulded, i),
                undisturbed: column_at(kdata, Measurement::Undisturbed, i),
                sensitivity: column_at(kdata, Measurement::Sensitivity, i),
                enaks_strength: column_at(edata, Measurement::EnaksStrength, i),
                deformation: column_at(edata, Measurement::Deformation, i),
            });
        }
    }
    rows
}

fn column_at(series: Option<&BoreholeSeries>, measurement: Measurement, i: usize) -> Option<f64> {
    series
        .and_then(|s| s.column(measurement))
        .and_then(|col| col.get(i).copied())
        .flatten()
}

/// Write the rows as a single-sheet xlsx workbook.
pub fn write_combined_xlsx(rows: &[CombinedRow], path: &Path) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sammenstilling")?;

    for (col, header) in COMBINED_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, row.borehole.as_str())?;
        worksheet.write_number(r, 1, row.depth)?;
        worksheet.write_number(r, 2, row.elevation)?;
        write_optional(worksheet, r, 3, row.remoulded)?;
        write_optional(worksheet, r, 4, row.undisturbed)?;
        write_optional(worksheet, r, 5, row.sensitivity)?;
        write_optional(worksheet, r, 6, row.enaks_strength)?;
        write_optional(worksheet, r, 7, row.deformation)?;
    }

    workbook.save(path)?;
    info!("combined table written to {} ({} rows)", path.display(), rows.len());
    Ok(())
}

fn write_optional(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
) -> Result<(), XlsxError> {
    if let Some(value) = value {
        worksheet.write_number(row, col, value)?;
    }
    Ok(())
}
