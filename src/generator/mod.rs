//! Event generator collaborator.
//!
//! The driver only sees the [`EventGenerator`] trait: ask for the next
//! event, get `Some(event)` or `None` when the generator could not produce
//! one this time. Generators are built from a [`GeneratorSettings`] value
//! that is moved into their constructor, so nothing can change the physics
//! setup once initialization has happened.
//!
//! [`ToyGenerator`] is the bundled implementation: a small accept-reject
//! sampler for soft non-diffractive and hard 2→2 QCD events, sufficient to
//! exercise the full pipeline and produce well-formed HepMC output.

pub mod settings;
pub mod toy;

pub use settings::{GeneratorSettings, SettingValue, SettingsError};
pub use toy::ToyGenerator;

use crate::models::GeneratedEvent;
use thiserror::Error;

/// Errors raised while initializing a generator
#[derive(Error, Debug, PartialEq)]
pub enum GeneratorError {
    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("No process switched on; enable HardQCD:all or SoftQCD:nonDiffractive")]
    NoProcessSelected,

    #[error("Both HardQCD:all and SoftQCD:nonDiffractive are on")]
    ConflictingProcesses,

    #[error("Empty phase space: pTHatMin = {min} GeV, pTHatMax = {max} GeV at eCM = {e_cm} GeV")]
    EmptyPhaseSpace { min: f64, max: f64, e_cm: f64 },
}

/// Running statistics a generator keeps about its own sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationInfo {
    /// Calls to [`EventGenerator::next_event`]
    pub n_tried: u64,
    /// Calls that returned an event
    pub n_accepted: u64,
    /// Estimated cross section of the selected process, in mb
    pub sigma_gen_mb: f64,
    pub sigma_err_mb: f64,
}

/// A source of generated collision events.
#[cfg_attr(test, mockall::automock)]
pub trait EventGenerator {
    /// Produce the next event, or `None` if this attempt failed.
    fn next_event(&mut self) -> Option<GeneratedEvent>;

    /// Snapshot of the generator's sampling statistics.
    fn info(&self) -> GenerationInfo;
}
