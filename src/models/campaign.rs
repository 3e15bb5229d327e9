use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Settings for a pT-binned production campaign (`minbias-campaign.yaml`).
///
/// Every field has a default, so a partial file or a handful of
/// `MINBIAS_*` environment overrides is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: Utf8PathBuf,

    /// Concurrent generator processes; -1 uses every available core.
    #[serde(default = "default_ncpu")]
    pub ncpu: i64,

    /// Events requested per pT bin
    #[serde(default = "default_max_events")]
    pub max_events: u64,

    #[serde(default)]
    pub pt_min: f64,

    #[serde(default = "default_pt_max")]
    pub pt_max: f64,

    #[serde(default = "default_n_bins")]
    pub n_bins: usize,

    /// Launch only the first N jobs when set
    #[serde(default)]
    pub njobs: Option<usize>,

    /// Path to the `minbias` binary; resolved next to the launcher when unset
    #[serde(default)]
    pub executable: Option<Utf8PathBuf>,

    /// Per-job wall-clock limit in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub tracklist: TrackListSettings,

    /// Free-form notes recorded with the campaign, kept in file order
    #[serde(default)]
    pub labels: IndexMap<String, String>,
}

/// Post-processing of each bin's HepMC output into a PixelAV track list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackListSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Maximum number of tracks per file; -1 keeps all
    #[serde(default = "default_nparticles")]
    pub nparticles: i64,

    #[serde(default = "default_float_precision")]
    pub float_precision: usize,
}

impl Default for TrackListSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            nparticles: default_nparticles(),
            float_precision: default_float_precision(),
        }
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            ncpu: default_ncpu(),
            max_events: default_max_events(),
            pt_min: 0.0,
            pt_max: default_pt_max(),
            n_bins: default_n_bins(),
            njobs: None,
            executable: None,
            timeout_secs: None,
            tracklist: TrackListSettings::default(),
            labels: IndexMap::new(),
        }
    }
}

impl CampaignConfig {
    /// Resolve the effective concurrency limit (at least one process).
    pub fn effective_ncpu(&self) -> usize {
        if self.ncpu < 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            (self.ncpu as usize).max(1)
        }
    }
}

fn default_out_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("./")
}

fn default_ncpu() -> i64 {
    4
}

fn default_max_events() -> u64 {
    1000
}

fn default_pt_max() -> f64 {
    2.0
}

fn default_n_bins() -> usize {
    20
}

fn default_nparticles() -> i64 {
    100
}

fn default_float_precision() -> usize {
    5
}
