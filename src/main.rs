//! minbias - generate one pT-hat window of 13.6 TeV proton-proton collisions
//!
//! ```text
//! minbias <outFileName> <maxEvents> <pTHatMin> <pTHatMax>
//! ```
//!
//! Windows starting below 0.25 GeV run soft non-diffractive QCD, all others
//! hard 2→2 QCD. Events are written to `<outFileName>.hepmc` in HepMC3 ASCII
//! format. Exactly `maxEvents` generation attempts are made; attempts the
//! generator fails are skipped, so the file may hold fewer events.
//!
//! # Exit codes
//!
//! - `0`: run completed, including runs where every attempt failed
//! - `1`: wrong argument count (usage printed to stdout), unparsable number,
//!   generator initialization failure or I/O failure
//!
//! Log output goes to stderr.

use anyhow::{Context, Result};
use minbias::models::request::EXPECTED_ARGS;
use minbias::models::{GenerationRequest, USAGE};
use minbias::services::select_process;
use minbias::{APP_NAME, GenerationDriver, GenerationMetrics, HepMc3Writer, RunSummary, ToyGenerator, VERSION};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Nothing else happens on a wrong arity: no logging, no generator, no file
    if args.len() != EXPECTED_ARGS {
        println!("{}", USAGE);
        return ExitCode::FAILURE;
    }

    if let Err(e) = minbias::logging::setup_console_logging(false) {
        eprintln!("warning: {:#}", e);
    }

    match run(&args) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<RunSummary> {
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let request = GenerationRequest::from_args(args)?;

    let settings = select_process(&request)
        .into_settings()
        .context("Failed to configure generator")?;
    let mut generator = ToyGenerator::initialize(settings).context("Failed to initialize generator")?;

    let output_path = request.output_path();
    let mut sink = HepMc3Writer::create(&output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path))?;

    let metrics = Arc::new(GenerationMetrics::new());
    let driver = GenerationDriver::new(Arc::clone(&metrics));
    let summary = driver.run(request.max_events, &mut generator, &mut sink)?;

    metrics.log_summary();
    Ok(summary)
}
