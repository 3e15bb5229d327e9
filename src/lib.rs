// minbias - minimum-bias and hard-QCD event production
//
// This is the library crate containing the generation pipeline and data structures.
// The binaries (main.rs, bin/) provide the generator, campaign launcher and
// track-list converter entry points.

pub mod config;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod physics;
pub mod services;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use generator::{EventGenerator, GeneratorError, GeneratorSettings, ToyGenerator};
pub use metrics::GenerationMetrics;
pub use models::{CampaignConfig, GeneratedEvent, GenerationRequest, ProcessConfiguration};
pub use services::{EventSink, GenerationDriver, HepMc3Writer, RunSummary};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
