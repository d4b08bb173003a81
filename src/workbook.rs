//! Worksheet access helpers shared by the terrain and series builders.
//!
//! Everything here converts calamine's typed cells into the two shapes the
//! pipeline works with: optional numbers for measurement columns, and display
//! strings for identifier cells. A missing or non-numeric measurement cell
//! becomes `None`; it is never substituted with zero.

use std::path::{Path, PathBuf};

use calamine::Data;

use crate::ranges::RangeRef;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm"];

/// First candidate worksheet name present in the workbook.
///
/// `candidates` is a comma-separated list; matching is exact after trimming
/// the candidate text.
pub fn find_worksheet(sheet_names: &[String], candidates: &str) -> Option<String> {
    candidates
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .find(|name| sheet_names.iter().any(|s| s == name))
        .map(str::to_string)
}

/// Read a single-column range as positional optional values.
///
/// The result always has one entry per row in the range, so positions line
/// up across ranges read from the same sheet.
pub fn read_column(range: &calamine::Range<Data>, rref: &RangeRef) -> Vec<Option<f64>> {
    rref.rows()
        .map(|row| range.get_value((row, rref.col())).and_then(cell_to_f64))
        .collect()
}

/// Read the first cell of a range as a trimmed display string.
pub fn read_cell_text(range: &calamine::Range<Data>, rref: &RangeRef) -> Option<String> {
    range.get_value(rref.start()).and_then(cell_to_string)
}

/// Numeric view of a cell. Numeric strings count; everything else is `None`,
/// including non-finite values.
pub fn cell_to_f64(cell: &Data) -> Option<f64> {
    let value = match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|f| f.is_finite())
}

/// Display view of a cell. Integral floats lose their ".0" so numeric
/// borehole labels match their text form.
pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                Some((*f as i64).to_string())
            } else {
                Some(f.to_string())
            }
        }
        _ => None,
    }
}

/// Workbook files in a directory, sorted by name.
///
/// Only `.xlsx`/`.xls`/`.xlsm` files are kept; Office lock files (`~$...`)
/// are skipped.
pub fn collect_workbook_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if !is_workbook_file(&path) {
            continue;
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

pub fn is_workbook_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with("~$") {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
