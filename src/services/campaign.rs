use crate::models::{CampaignConfig, TrackListSettings};
use crate::services::tracklist;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Split `[min, max]` into `n_bins` consecutive pT-hat windows.
///
/// Edges come from an evenly spaced grid of `n_bins + 1` points, each
/// rounded to three decimals so that `0.1 * 3` style noise never reaches
/// file names or generator arguments.
pub fn pt_bins(min: f64, max: f64, n_bins: usize) -> Vec<(f64, f64)> {
    if n_bins == 0 {
        return Vec::new();
    }
    let step = (max - min) / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins)
        .map(|i| {
            let edge = if i == n_bins { max } else { min + step * i as f64 };
            (edge * 1000.0).round() / 1000.0
        })
        .collect();
    edges.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Output path (without extension) for one pT-hat window
pub fn output_stem(out_dir: &Utf8Path, pt_min: f64, pt_max: f64) -> Utf8PathBuf {
    out_dir.join(format!("minbias_{:.2}_{:.2}_GeV", pt_min, pt_max))
}

/// Locate the `minbias` binary next to the running executable.
pub fn default_executable() -> Result<Utf8PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate current executable")?;
    let exe = Utf8PathBuf::try_from(exe).context("Executable path is not valid UTF-8")?;
    let dir = exe
        .parent()
        .context("Executable has no parent directory")?;
    Ok(dir.join(format!("minbias{}", std::env::consts::EXE_SUFFIX)))
}

/// One generator invocation of a campaign
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignJob {
    pub index: usize,
    pub executable: Utf8PathBuf,
    pub stem: Utf8PathBuf,
    pub max_events: u64,
    pub pt_min: f64,
    pub pt_max: f64,
}

impl CampaignJob {
    /// Positional arguments: `<outFileName> <maxEvents> <pTHatMin> <pTHatMax>`
    pub fn args(&self) -> Vec<String> {
        vec![
            self.stem.to_string(),
            self.max_events.to_string(),
            self.pt_min.to_string(),
            self.pt_max.to_string(),
        ]
    }

    // The stem itself contains dots, so extensions are appended, never replaced
    pub fn hepmc_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}.hepmc", self.stem))
    }

    pub fn tracklist_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}.txt", self.stem))
    }

    /// Where the job's stderr (its log output) is captured
    pub fn log_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}.log", self.stem))
    }
}

/// Build one job per pT-hat bin.
pub fn build_jobs(config: &CampaignConfig, executable: &Utf8Path, out_dir: &Utf8Path) -> Vec<CampaignJob> {
    pt_bins(config.pt_min, config.pt_max, config.n_bins)
        .into_iter()
        .enumerate()
        .map(|(index, (lo, hi))| CampaignJob {
            index,
            executable: executable.to_path_buf(),
            stem: output_stem(out_dir, lo, hi),
            max_events: config.max_events,
            pt_min: lo,
            pt_max: hi,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    /// Non-zero exit, or the process could not be started (`None`)
    Failed { exit_code: Option<i32> },
    TimedOut,
    /// Excluded by `njobs`
    NotLaunched,
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub job: CampaignJob,
    pub outcome: JobOutcome,
    pub duration: Duration,
    /// Tracks written when track-list conversion ran and succeeded
    pub tracks: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct CampaignReport {
    /// One report per bin, in bin order
    pub jobs: Vec<JobReport>,
}

impl CampaignReport {
    fn count(&self, pred: impl Fn(&JobOutcome) -> bool) -> usize {
        self.jobs.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn completed(&self) -> usize {
        self.count(|o| *o == JobOutcome::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Failed { .. } | JobOutcome::TimedOut))
    }

    pub fn not_launched(&self) -> usize {
        self.count(|o| *o == JobOutcome::NotLaunched)
    }

    /// True when every launched job completed
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} completed, {} failed, {} not launched",
            self.completed(),
            self.failed(),
            self.not_launched()
        )
    }
}

/// Run a full campaign: one `minbias` process per pT-hat bin.
///
/// At most `ncpu` processes run at once. Jobs past `njobs` are reported as
/// not launched. A failing job does not stop the others.
pub async fn run_campaign(config: &CampaignConfig) -> Result<CampaignReport> {
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("Failed to create output directory: {}", config.out_dir))?;
    let out_dir = config
        .out_dir
        .canonicalize_utf8()
        .with_context(|| format!("Failed to resolve output directory: {}", config.out_dir))?;

    let executable = match &config.executable {
        Some(exe) => exe.clone(),
        None => default_executable()?,
    };

    let jobs = build_jobs(config, &executable, &out_dir);
    let launch_count = config.njobs.unwrap_or(jobs.len()).min(jobs.len());
    let ncpu = config.effective_ncpu();
    let job_timeout = config.timeout_secs.map(Duration::from_secs);
    let tracklist = config.tracklist.enabled.then(|| config.tracklist.clone());

    tracing::info!(
        "Launching {} of {} jobs on {} cores into {}",
        launch_count,
        jobs.len(),
        ncpu,
        out_dir
    );
    for (key, value) in &config.labels {
        tracing::info!("Campaign label {}: {}", key, value);
    }

    let semaphore = Arc::new(Semaphore::new(ncpu));
    let mut set = JoinSet::new();
    for job in jobs.iter().take(launch_count).cloned() {
        let semaphore = Arc::clone(&semaphore);
        let tracklist = tracklist.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            run_job(job, job_timeout, tracklist).await
        });
    }

    let mut finished: Vec<Option<JobReport>> = vec![None; jobs.len()];
    while let Some(result) = set.join_next().await {
        match result {
            Ok(report) => {
                let index = report.job.index;
                finished[index] = Some(report);
            }
            Err(e) => tracing::error!("Job task panicked: {}", e),
        }
    }

    let report = collect_reports(jobs, finished, launch_count);
    tracing::info!("Campaign finished: {}", report.summary());
    Ok(report)
}

/// Pair every job with its report.
///
/// Jobs are launched in index order, so the first `launch_count` were
/// started. A launched job without a report lost its task and counts as a
/// failure; the rest were never launched.
fn collect_reports(jobs: Vec<CampaignJob>, finished: Vec<Option<JobReport>>, launch_count: usize) -> CampaignReport {
    let jobs = jobs
        .into_iter()
        .zip(finished)
        .enumerate()
        .map(|(index, (job, report))| {
            report.unwrap_or_else(|| {
                let outcome = if index < launch_count {
                    JobOutcome::Failed { exit_code: None }
                } else {
                    JobOutcome::NotLaunched
                };
                JobReport {
                    job,
                    outcome,
                    duration: Duration::ZERO,
                    tracks: None,
                }
            })
        })
        .collect();
    CampaignReport { jobs }
}

async fn run_job(job: CampaignJob, job_timeout: Option<Duration>, tracklist: Option<TrackListSettings>) -> JobReport {
    let start = Instant::now();
    let outcome = execute(&job, job_timeout).await;
    let duration = start.elapsed();

    tracing::info!(
        "Job {} [{}, {}] GeV finished in {:.2}s: {:?}",
        job.index,
        job.pt_min,
        job.pt_max,
        duration.as_secs_f32(),
        outcome
    );

    let tracks = match (&outcome, tracklist) {
        (JobOutcome::Completed, Some(settings)) => convert_tracks(&job, settings).await,
        _ => None,
    };

    JobReport {
        job,
        outcome,
        duration,
        tracks,
    }
}

async fn execute(job: &CampaignJob, job_timeout: Option<Duration>) -> JobOutcome {
    let stderr = match File::create(job.log_path()) {
        Ok(file) => Stdio::from(file),
        Err(e) => {
            tracing::warn!("Cannot create {}: {}; discarding job output", job.log_path(), e);
            Stdio::null()
        }
    };

    tracing::debug!("Executing: {} {}", job.executable, job.args().join(" "));

    let mut child = match Command::new(job.executable.as_std_path())
        .args(job.args())
        .stdout(Stdio::null())
        .stderr(stderr)
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::error!("Failed to spawn {}: {}", job.executable, e);
            return JobOutcome::Failed { exit_code: None };
        }
    };

    let status = match job_timeout {
        Some(limit) => match timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!("Job {} timed out after {:?}", job.index, limit);
                if let Err(e) = child.kill().await {
                    tracing::warn!("Failed to kill job {}: {}", job.index, e);
                }
                return JobOutcome::TimedOut;
            }
        },
        None => child.wait().await,
    };

    match status {
        Ok(status) if status.success() => JobOutcome::Completed,
        Ok(status) => JobOutcome::Failed {
            exit_code: status.code(),
        },
        Err(e) => {
            tracing::error!("Failed to wait for job {}: {}", job.index, e);
            JobOutcome::Failed { exit_code: None }
        }
    }
}

async fn convert_tracks(job: &CampaignJob, settings: TrackListSettings) -> Option<usize> {
    let input = job.hepmc_path();
    let output = job.tracklist_path();
    let result =
        tokio::task::spawn_blocking(move || tracklist::convert_file(&input, &output, &settings)).await;

    match result {
        Ok(Ok(count)) => Some(count),
        Ok(Err(e)) => {
            tracing::warn!("Track list conversion failed for job {}: {:#}", job.index, e);
            None
        }
        Err(e) => {
            tracing::error!("Track list task for job {} panicked: {}", job.index, e);
            None
        }
    }
}
