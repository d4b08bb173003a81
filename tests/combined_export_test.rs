// Tests for the combined-table exporter: join shape and xlsx round trip

use calamine::{open_workbook_auto, Data, Reader};
use geolab_report::config::RangeConfig;
use geolab_report::export::{combined_rows, write_combined_xlsx, COMBINED_HEADERS};
use geolab_report::series::{IdentityPolicy, SeriesBuilder, SeriesSet};
use geolab_report::terrain::TerrainLookup;

mod common;
use common::{write_enaks_workbook, write_konus_workbook};

const SHEET: &str = "Sheet 001";

struct Fixture {
    konus: SeriesSet,
    enaks: SeriesSet,
    _dir: tempfile::TempDir,
}

/// BH01: Konus (3 rows) + Enaks (2 rows). BH02: Konus only. BH03: Enaks
/// only, and longer than any Konus series for the same borehole.
fn build_fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let konus_dir = dir.path().join("konus");
    let enaks_dir = dir.path().join("enaks");
    std::fs::create_dir_all(&konus_dir).unwrap();
    std::fs::create_dir_all(&enaks_dir).unwrap();

    write_konus_workbook(
        &konus_dir.join("BH01.xlsx"),
        SHEET,
        None,
        &[
            (Some(1.0), Some(10.0), Some(2.0)),
            (Some(2.0), Some(20.0), Some(4.0)),
            (Some(3.0), Some(30.0), None),
        ],
    );
    write_konus_workbook(
        &konus_dir.join("BH02.xlsx"),
        SHEET,
        None,
        &[(Some(1.5), Some(12.0), Some(3.0))],
    );
    write_enaks_workbook(
        &enaks_dir.join("BH01.xlsx"),
        SHEET,
        None,
        &[(Some(1.0), Some(15.0), Some(5.0)), (Some(2.0), Some(25.0), None)],
    );
    write_enaks_workbook(
        &enaks_dir.join("BH03.xlsx"),
        SHEET,
        None,
        &[(Some(0.5), Some(8.0), Some(2.0)), (Some(1.5), Some(9.0), Some(2.5))],
    );

    let lookup = TerrainLookup::from_rows(
        [("BH01", 10.0), ("BH02", 20.0), ("BH03", 5.0)]
            .into_iter()
            .map(|(bh, z)| (Some(bh.to_string()), Some(z))),
    );
    let builder = SeriesBuilder::new(&lookup, SHEET, IdentityPolicy::FileStem);
    let config = RangeConfig::builtin_defaults();

    let konus = builder
        .build_konus(
            &geolab_report::workbook::collect_workbook_files(&konus_dir).unwrap(),
            &config,
        )
        .unwrap();
    let enaks = builder
        .build_enaks(
            &geolab_report::workbook::collect_workbook_files(&enaks_dir).unwrap(),
            &config,
        )
        .unwrap();

    Fixture {
        konus: konus.series,
        enaks: enaks.series,
        _dir: dir,
    }
}

#[test]
fn join_takes_union_of_boreholes_and_longer_depth_sequence() {
    let fixture = build_fixture();
    let rows = combined_rows(&fixture.konus, &fixture.enaks);

    // BH01: 3 rows (Konus longer), BH02: 1 row, BH03: 2 rows
    assert_eq!(rows.len(), 6);

    let bh01: Vec<_> = rows.iter().filter(|r| r.borehole == "BH01").collect();
    assert_eq!(bh01.len(), 3);
    assert_eq!(bh01[0].depth, 1.0);
    assert_eq!(bh01[0].elevation, 9.0);
    assert_eq!(bh01[0].undisturbed, Some(10.0));
    assert_eq!(bh01[0].remoulded, Some(2.0));
    assert_eq!(bh01[0].sensitivity, Some(5.0));
    assert_eq!(bh01[0].enaks_strength, Some(15.0));
    assert_eq!(bh01[0].deformation, Some(5.0));

    // Enaks has only 2 rows; the third row carries nulls for its fields
    assert_eq!(bh01[2].depth, 3.0);
    assert_eq!(bh01[2].enaks_strength, None);
    assert_eq!(bh01[2].deformation, None);
    // remoulded missing at row 3, so sensitivity is null as well
    assert_eq!(bh01[2].undisturbed, Some(30.0));
    assert_eq!(bh01[2].sensitivity, None);
}

#[test]
fn konus_only_and_enaks_only_boreholes_are_present() {
    let fixture = build_fixture();
    let rows = combined_rows(&fixture.konus, &fixture.enaks);

    let bh02: Vec<_> = rows.iter().filter(|r| r.borehole == "BH02").collect();
    assert_eq!(bh02.len(), 1);
    assert_eq!(bh02[0].undisturbed, Some(12.0));
    assert_eq!(bh02[0].enaks_strength, None);

    // Enaks-only borehole: depth/elevation come from the Enaks series
    let bh03: Vec<_> = rows.iter().filter(|r| r.borehole == "BH03").collect();
    assert_eq!(bh03.len(), 2);
    assert_eq!(bh03[0].depth, 0.5);
    assert_eq!(bh03[0].elevation, 4.5);
    assert_eq!(bh03[0].undisturbed, None);
    assert_eq!(bh03[0].enaks_strength, Some(8.0));
}

#[test]
fn rows_are_grouped_by_borehole_in_key_order() {
    let fixture = build_fixture();
    let rows = combined_rows(&fixture.konus, &fixture.enaks);

    let order: Vec<&str> = rows.iter().map(|r| r.borehole.as_str()).collect();
    assert_eq!(order, ["BH01", "BH01", "BH01", "BH02", "BH03", "BH03"]);
}

#[test]
fn depth_and_elevation_stay_consistent_per_row() {
    let fixture = build_fixture();
    let rows = combined_rows(&fixture.konus, &fixture.enaks);

    // both series of a borehole share the same reference elevation, so the
    // backbone choice cannot change this relation
    for row in &rows {
        let series = fixture
            .konus
            .get(&row.borehole)
            .or_else(|| fixture.enaks.get(&row.borehole))
            .unwrap();
        assert!((row.elevation - (series.z - row.depth)).abs() < 1e-9);
    }
}

#[test]
fn empty_inputs_export_no_rows() {
    let rows = combined_rows(&SeriesSet::default(), &SeriesSet::default());
    assert!(rows.is_empty());
}

#[test]
fn written_workbook_round_trips_through_calamine() {
    let fixture = build_fixture();
    let rows = combined_rows(&fixture.konus, &fixture.enaks);

    let out_dir = tempfile::tempdir().unwrap();
    let out_path = out_dir.path().join("borehole_data.xlsx");
    write_combined_xlsx(&rows, &out_path).unwrap();

    let mut workbook = open_workbook_auto(&out_path).unwrap();
    let range = workbook.worksheet_range("Sammenstilling").unwrap();

    // header row
    for (col, expected) in COMBINED_HEADERS.iter().enumerate() {
        match range.get_value((0, col as u32)) {
            Some(Data::String(s)) => assert_eq!(s, expected),
            other => panic!("expected header string at column {col}, got {other:?}"),
        }
    }

    // one data row per combined row
    assert_eq!(range.height(), rows.len() + 1);

    // spot-check the first data row: BH01, depth 1.0, kote 9.0
    assert_eq!(
        range.get_value((1, 0)),
        Some(&Data::String("BH01".to_string()))
    );
    assert_eq!(range.get_value((1, 1)), Some(&Data::Float(1.0)));
    assert_eq!(range.get_value((1, 2)), Some(&Data::Float(9.0)));

    // a null cell stays empty rather than becoming zero
    let bh01_third_row = 3; // header + two rows
    match range.get_value((bh01_third_row, 6)) {
        None | Some(Data::Empty) => {}
        other => panic!("expected empty enaks cell, got {other:?}"),
    }
}
