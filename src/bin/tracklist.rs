//! hepmc-tracklist - convert HepMC3 output into a PixelAV track list
//!
//! Keeps final-state particles produced between 30 and 130 mm from the
//! beam line and writes one `cota cotb p flp localx localy pT` row each.

use camino::Utf8PathBuf;
use clap::Parser;
use minbias::models::TrackListSettings;
use minbias::services::tracklist::convert_file;
use std::process::ExitCode;

/// Convert hepmc output to a track list input for PixelAV.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input HepMC3 file
    #[arg(short, long = "inFileName")]
    input: Utf8PathBuf,

    /// Output track list
    #[arg(short, long = "outFileName", default_value = "track_list.txt")]
    output: Utf8PathBuf,

    /// Number of particles to save in the track list (-1 = all)
    #[arg(short, long, default_value_t = 100, allow_negative_numbers = true)]
    nparticles: i64,

    /// Decimals written for floating-point columns
    #[arg(short = 'p', long, default_value_t = 5)]
    float_precision: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = minbias::logging::setup_console_logging(false) {
        eprintln!("warning: {:#}", e);
    }

    let settings = TrackListSettings {
        enabled: true,
        nparticles: args.nparticles,
        float_precision: args.float_precision,
    };

    match convert_file(&args.input, &args.output, &settings) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
