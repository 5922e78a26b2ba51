use clap::Parser;
use igrf_nondipole::gridding::npy::read_npy;
use igrf_nondipole::gridding::statistics::{GridStatistics, Histogram};
use itertools::Itertools;
use std::path::PathBuf;

pub type BinResult<T, E = Box<dyn std::error::Error + Send + Sync>> = Result<T, E>;

const BAR_WIDTH: usize = 50;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {e}");
        if let Some(e) = e.source() {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

/// Prints summary statistics and a histogram for stored non-dipole grids
#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct Args {
    /// Grid file(s) to inspect
    #[arg(num_args = 1.., required = true)]
    infiles: Vec<PathBuf>,

    /// Number of histogram bins
    #[arg(short, long, default_value_t = 50)]
    bins: usize,
}

fn bin_main() -> BinResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    for infile in args.infiles.iter() {
        let array = match read_npy(infile) {
            Ok(a) => a,
            Err(e) => {
                log::error!("Unable to read {}: {e}", infile.display());
                continue;
            }
        };
        let stats = match GridStatistics::from_values(&array.data) {
            Some(s) => s,
            None => {
                log::error!("{} holds no values", infile.display());
                continue;
            }
        };

        println!("--- Inspection of {} ---", infile.display());
        println!("Data shape: ({})", array.shape.iter().join(", "));
        println!("Min value: {:.2} nT", stats.min);
        println!("Max value: {:.2} nT", stats.max);
        println!("Mean value: {:.2} nT", stats.mean);
        println!("Standard deviation: {:.2} nT", stats.std_dev);

        if let Some(hist) = Histogram::from_values(&array.data, args.bins) {
            let peak = hist.counts.iter().copied().max().unwrap_or(0).max(1);
            for (left, right, count) in hist.iter() {
                let bar = "#".repeat(count * BAR_WIDTH / peak);
                println!("{left:>12.2} .. {right:>12.2} | {count:>6} {bar}");
            }
        }
        println!("{}\n", "-".repeat(30));
    }

    Ok(())
}
