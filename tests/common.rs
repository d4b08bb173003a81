// Shared fixture helpers: real xlsx workbooks written with rust_xlsxwriter
// and read back through the production calamine code path.
//
// Fixtures follow the standard laboratory sheet layout: borehole label in
// B6, depth in F6:F30, Konus strengths in L6:L30 / M6:M30, Enaks strength
// and deformation in G6:G30 / H6:H30.

#![allow(dead_code)]

use std::path::Path;

use rust_xlsxwriter::Workbook;

/// (depth, undisturbed, remoulded) per data row, starting at sheet row 6.
pub type KonusRow = (Option<f64>, Option<f64>, Option<f64>);

/// (depth, strength, deformation) per data row, starting at sheet row 6.
pub type EnaksRow = (Option<f64>, Option<f64>, Option<f64>);

pub fn write_konus_workbook(
    path: &Path,
    sheet_name: &str,
    header: Option<&str>,
    rows: &[KonusRow],
) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();

    if let Some(label) = header {
        worksheet.write_string(5, 1, label).unwrap(); // B6
    }
    for (i, (depth, undisturbed, remoulded)) in rows.iter().enumerate() {
        let row = 5 + i as u32;
        write_opt(worksheet, row, 5, *depth); // F
        write_opt(worksheet, row, 11, *undisturbed); // L
        write_opt(worksheet, row, 12, *remoulded); // M
    }

    workbook.save(path).unwrap();
}

pub fn write_enaks_workbook(
    path: &Path,
    sheet_name: &str,
    header: Option<&str>,
    rows: &[EnaksRow],
) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();

    if let Some(label) = header {
        worksheet.write_string(5, 1, label).unwrap(); // B6
    }
    for (i, (depth, strength, deformation)) in rows.iter().enumerate() {
        let row = 5 + i as u32;
        write_opt(worksheet, row, 5, *depth); // F
        write_opt(worksheet, row, 6, *strength); // G
        write_opt(worksheet, row, 7, *deformation); // H
    }

    workbook.save(path).unwrap();
}

/// Two-column terrain table with the usual header row.
pub fn write_terrain_workbook(path: &Path, rows: &[(&str, Option<f64>)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, "Borhull").unwrap();
    worksheet.write_string(0, 1, "Kote").unwrap();
    for (i, (borehole, elevation)) in rows.iter().enumerate() {
        let row = 1 + i as u32;
        worksheet.write_string(row, 0, *borehole).unwrap();
        if let Some(z) = elevation {
            worksheet.write_number(row, 1, *z).unwrap();
        }
    }

    workbook.save(path).unwrap();
}

/// A file with an xlsx extension that is not a workbook.
pub fn write_corrupt_workbook(path: &Path) {
    std::fs::write(path, b"this is not a zip archive").unwrap();
}

fn write_opt(worksheet: &mut rust_xlsxwriter::Worksheet, row: u32, col: u16, value: Option<f64>) {
    if let Some(value) = value {
        worksheet.write_number(row, col, value).unwrap();
    }
}
