//! minbias-launch - run a pT-hat binned production campaign
//!
//! Splits the configured pT-hat range into bins and runs one `minbias`
//! process per bin, at most `ncpu` at a time. Settings come from
//! `minbias-campaign.yaml`, `MINBIAS_*` environment variables and the flags
//! below, later sources winning.

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use minbias::models::CampaignConfig;
use minbias::services::{JobOutcome, run_campaign};
use minbias::{APP_NAME, ConfigManager, VERSION};
use std::process::ExitCode;

/// Run minbias over a grid of pT-hat bins.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output directory
    #[arg(short, long)]
    out_dir: Option<Utf8PathBuf>,

    /// Number of concurrent processes (-1 = all cores)
    #[arg(short = 'j', long, allow_negative_numbers = true)]
    ncpu: Option<i64>,

    /// Number of events per bin
    #[arg(short = 'n', long)]
    max_events: Option<u64>,

    /// Path to the minbias executable
    #[arg(long)]
    exe: Option<Utf8PathBuf>,

    /// Campaign configuration file
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Number of jobs to actually launch (-1 = all)
    #[arg(long, allow_negative_numbers = true)]
    njobs: Option<i64>,

    /// Convert each bin's output into a PixelAV track list
    #[arg(long)]
    tracklist: bool,

    /// Per-job time limit in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the merged configuration back to the configuration file
    #[arg(long)]
    save_config: bool,

    /// Directory for launcher log files
    #[arg(long, default_value = "logs")]
    log_dir: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut CampaignConfig) {
        if let Some(out_dir) = &self.out_dir {
            config.out_dir = out_dir.clone();
        }
        if let Some(ncpu) = self.ncpu {
            config.ncpu = ncpu;
        }
        if let Some(max_events) = self.max_events {
            config.max_events = max_events;
        }
        if let Some(exe) = &self.exe {
            config.executable = Some(exe.clone());
        }
        if let Some(njobs) = self.njobs {
            config.njobs = usize::try_from(njobs).ok();
        }
        if self.tracklist {
            config.tracklist.enabled = true;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = Some(timeout);
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match minbias::logging::setup_logging_with_console(
        &args.log_dir,
        "minbias-launch",
        args.debug,
        true,
    ) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    tracing::info!("Starting {} launcher v{}", APP_NAME, VERSION);

    let manager = match &args.config {
        Some(path) => ConfigManager::for_file(path),
        None => ConfigManager::new(".")?,
    };
    let mut config = manager.load_campaign_config()?;
    args.apply(&mut config);

    if args.save_config {
        manager.save_campaign_config(&config)?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("minbias-launch")
        .build()?;

    let report = runtime.block_on(run_campaign(&config))?;

    for job in &report.jobs {
        if job.outcome != JobOutcome::Completed && job.outcome != JobOutcome::NotLaunched {
            tracing::warn!(
                "Bin [{}, {}] GeV: {:?} (log: {})",
                job.job.pt_min,
                job.job.pt_max,
                job.outcome,
                job.job.log_path()
            );
        }
    }

    Ok(report.all_succeeded())
}
