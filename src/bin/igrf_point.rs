use clap::Parser;
use igrf_nondipole::igrf::non_dipole::dipole_from_coefficients;
use igrf_nondipole::utils::time::{decimal_year_from_date, parse_date};
use igrf_nondipole::{synthesize_field, CoefficientStore, FieldVector};
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

/// Evaluates the main field, its dipole part and the non-dipole residual at one location
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct Args {
    /// IGRF coefficient table (CSV)
    #[arg()]
    coefficients: PathBuf,

    /// Fractional year, e.g. 1987.5
    #[arg(long, required_unless_present = "date", conflicts_with = "date")]
    year: Option<f64>,

    /// Date in YYYY-MM-DD or YYYYMMDD format
    #[arg(long)]
    date: Option<String>,

    /// Geocentric latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Altitude above the reference sphere in km
    #[arg(long, visible_alias = "alt", default_value_t = 0.0)]
    altitude: f64,
}

fn print_vector(label: &str, field: &FieldVector) {
    println!(
        "{label:<11} X = {:>10.1} nT  Y = {:>10.1} nT  Z = {:>10.1} nT",
        field.north, field.east, field.down
    );
}

fn bin_main() -> BinResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let year = match (args.year, &args.date) {
        (Some(y), _) => y,
        (None, Some(d)) => {
            let date = parse_date(d)?;
            decimal_year_from_date(date).ok_or("Unable to convert date to a fractional year")?
        }
        (None, None) => Err("Either --year or --date is required")?,
    };

    let store = CoefficientStore::from_path(&args.coefficients)?;
    let (g, h) = store.resolve(year)?;
    let n_max = g.max_degree().unwrap_or(0);

    let full = synthesize_field(&g, &h, args.lat, args.lon, args.altitude, n_max);
    let dipole = dipole_from_coefficients(&g, &h, args.lat, args.lon, args.altitude);
    let non_dipole = full - dipole;

    println!(
        "Year {year:.3}, latitude {:.3}, longitude {:.3}, altitude {:.1} km (degree {n_max})",
        args.lat, args.lon, args.altitude
    );
    print_vector("Main field", &full);
    print_vector("Dipole", &dipole);
    print_vector("Non-dipole", &non_dipole);
    println!(
        "D = {:.2} deg  I = {:.2} deg  H = {:.1} nT  F = {:.1} nT",
        full.declination(),
        full.inclination(),
        full.horizontal_intensity(),
        full.total_intensity()
    );

    Ok(())
}
