use clap::Parser;
use igrf_nondipole::gridding::grid::{compute_grid, grid_path, year_sequence, GridSpec};
use igrf_nondipole::gridding::npy::write_grid;
use igrf_nondipole::{CoefficientStore, FieldComponent};
use std::path::PathBuf;

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {e}");
        if let Some(e) = e.source() {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

/// Computes grids of the non-dipole geomagnetic field and stores one .npy file per year
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct Args {
    /// IGRF coefficient table (CSV)
    #[arg()]
    coefficients: PathBuf,

    /// First year to compute
    #[arg(long, default_value_t = 1900)]
    start: i32,

    /// Last year to compute
    #[arg(long, default_value_t = 2020)]
    end: i32,

    /// Year step
    #[arg(long, default_value_t = 10)]
    step: u32,

    /// Altitude above the reference sphere in km
    #[arg(long, visible_alias = "alt", default_value_t = 0.0)]
    altitude: f64,

    /// Field component to store
    #[arg(long, value_enum, default_value_t = FieldComponent::Down)]
    component: FieldComponent,

    /// Directory the grid files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Southernmost latitude in degrees
    #[arg(long, default_value_t = -90.0, allow_negative_numbers = true)]
    lat_min: f64,

    /// Northernmost latitude in degrees
    #[arg(long, default_value_t = 90.0, allow_negative_numbers = true)]
    lat_max: f64,

    /// Latitude spacing in degrees
    #[arg(long, default_value_t = 5.0)]
    lat_step: f64,

    /// Westernmost longitude in degrees
    #[arg(long, default_value_t = -180.0, allow_negative_numbers = true)]
    lon_min: f64,

    /// Easternmost longitude in degrees
    #[arg(long, default_value_t = 180.0, allow_negative_numbers = true)]
    lon_max: f64,

    /// Longitude spacing in degrees
    #[arg(long, default_value_t = 10.0)]
    lon_step: f64,

    /// Verbose mode
    #[arg(short, long, action = clap::ArgAction::SetTrue)]
    verbose: bool,
}

fn bin_main() -> BinResult<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let spec = GridSpec {
        lat_min: args.lat_min,
        lat_max: args.lat_max,
        lat_step: args.lat_step,
        lon_min: args.lon_min,
        lon_max: args.lon_max,
        lon_step: args.lon_step,
    };
    spec.validate()?;
    let years = year_sequence(args.start, args.end, args.step)?;

    let store = CoefficientStore::from_path(&args.coefficients)?;
    std::fs::create_dir_all(&args.output_dir)?;

    log::info!(
        "Calculating non-dipole {} from {} to {} with a step of {}",
        args.component.tag(),
        args.start,
        args.end,
        args.step
    );
    for year in years {
        log::info!("Processing year: {year}");
        let grid = compute_grid(&store, year as f64, args.altitude, &spec, args.component)?;
        let path = grid_path(&args.output_dir, args.component, year);
        write_grid(&path, &grid)?;
        log::debug!("Wrote {}", path.display());
    }
    log::info!("Calculation complete");

    Ok(())
}
