use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use geolab_report::config::RangeConfig;
use geolab_report::export::{combined_rows, write_combined_xlsx};
use geolab_report::ranges::RangeRef;
use geolab_report::series::builder::DEFAULT_HEADER_CELL;
use geolab_report::series::{BuildReport, IdentityPolicy, SeriesBuilder};
use geolab_report::terrain::TerrainLookup;
use geolab_report::workbook::collect_workbook_files;

#[derive(Parser)]
#[command(name = "generate-report")]
#[command(about = "Assemble borehole strength series from laboratory workbooks and export the combined table", long_about = None)]
struct Cli {
    /// Terrain-level workbook (borehole IDs in column A, elevations in column B)
    #[arg(long, env = "TERRAIN_FILE")]
    terrain: PathBuf,

    /// Directory with Konus (fall-cone) workbooks
    #[arg(long, env = "KONUS_DIR")]
    konus_dir: PathBuf,

    /// Directory with Enaks (uniaxial compression) workbooks
    #[arg(long)]
    enaks_dir: Option<PathBuf>,

    /// Worksheet name, or a comma-separated list of candidates
    #[arg(long, default_value = "Sheet 001")]
    sheet_names: String,

    /// JSON file mapping range keys to A1 ranges (defaults to the standard sheet layout)
    #[arg(long)]
    ranges: Option<PathBuf>,

    /// Where the borehole identifier comes from
    #[arg(long, value_enum, default_value_t = IdentityArg::FileStem)]
    identity: IdentityArg,

    /// Header cell holding the identifier (only with --identity header-cell)
    #[arg(long, default_value = DEFAULT_HEADER_CELL)]
    header_cell: String,

    /// Output path for the combined xlsx table
    #[arg(long, default_value = "borehole_data.xlsx")]
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum IdentityArg {
    /// Use the workbook file name (without extension)
    FileStem,
    /// Read the identifier from a header cell in the worksheet
    HeaderCell,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    let identity = match cli.identity {
        IdentityArg::FileStem => IdentityPolicy::FileStem,
        IdentityArg::HeaderCell => IdentityPolicy::HeaderCell(RangeRef::parse(&cli.header_cell)?),
    };

    let config = match &cli.ranges {
        Some(path) => RangeConfig::from_json_file(path)?,
        None => RangeConfig::builtin_defaults(),
    };

    // Terrain levels
    info!("Reading terrain levels from {:?}", cli.terrain);
    let terrain = TerrainLookup::from_workbook(&cli.terrain, None);
    if terrain.is_empty() {
        error!("No terrain levels found in {:?}", cli.terrain);
        println!("⚠️  No terrain levels could be read; every borehole will be skipped.");
    } else {
        info!("Found terrain levels for {} boreholes", terrain.len());
    }

    let builder = SeriesBuilder::new(&terrain, cli.sheet_names.as_str(), identity);

    // Konus series
    let konus_files = collect_workbook_files(&cli.konus_dir)?;
    info!(
        "Found {} Konus workbook(s) in {:?}",
        konus_files.len(),
        cli.konus_dir
    );
    let konus = build_with_progress("Konus", &konus_files, |files| {
        builder.build_konus(files, &config)
    })?;

    // Enaks series (optional)
    let enaks = match &cli.enaks_dir {
        Some(dir) => {
            let enaks_files = collect_workbook_files(dir)?;
            info!("Found {} Enaks workbook(s) in {:?}", enaks_files.len(), dir);
            build_with_progress("Enaks", &enaks_files, |files| {
                builder.build_enaks(files, &config)
            })?
        }
        None => BuildReport::default(),
    };

    // Combined table
    let rows = combined_rows(&konus.series, &enaks.series);
    write_combined_xlsx(&rows, &cli.output)?;

    let warnings: Vec<String> = terrain
        .warnings()
        .iter()
        .map(ToString::to_string)
        .chain(konus.warnings.iter().map(ToString::to_string))
        .chain(enaks.warnings.iter().map(ToString::to_string))
        .collect();

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &warnings {
            println!("  ⚠️  {warning}");
        }
    }

    let total_duration = start_time.elapsed();
    println!("\n{}", "=".repeat(60));
    println!("Report Summary");
    println!("{}", "=".repeat(60));
    println!("Terrain levels:     {}", terrain.len());
    println!("Konus boreholes:    {}", konus.series.len());
    println!("Enaks boreholes:    {}", enaks.series.len());
    println!("Exported rows:      {}", rows.len());
    println!("Warnings:           {}", warnings.len());
    println!("{}", "-".repeat(60));
    println!("Output:             {}", cli.output.display());
    println!("Total Time:         {:.2}s", total_duration.as_secs_f64());
    println!("{}", "=".repeat(60));

    if rows.is_empty() {
        println!("⚠️  No usable data was found; the exported table is empty.");
    }

    Ok(())
}

/// Run one builder pass behind a progress bar.
fn build_with_progress<F>(
    label: &str,
    files: &[PathBuf],
    build: F,
) -> Result<BuildReport, Box<dyn std::error::Error>>
where
    F: FnOnce(&[PathBuf]) -> Result<BuildReport, geolab_report::config::ConfigError>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Reading {} workbook(s): {label}...", files.len()));

    let report = build(files)?;

    pb.finish_with_message(format!(
        "✓ {label}: {} borehole series, {} warning(s)",
        report.series.len(),
        report.warnings.len()
    ));
    Ok(report)
}
