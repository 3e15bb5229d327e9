//! Services module - the production pipeline around the generator.
//!
//! # Components
//!
//! - [`selector`]: maps a pT-hat window onto exactly one QCD process family
//!   and pushes it into the generator settings.
//! - [`GenerationDriver`]: the fixed-count event loop. Failed generator
//!   attempts are skipped; successful events go straight to the sink.
//! - [`EventSink`] / [`HepMc3Writer`]: HepMC3 ASCII serialization.
//! - [`HepMc3Reader`]: streaming reader for the same format.
//! - [`tracklist`]: PixelAV track-list extraction from HepMC files.
//! - [`campaign`]: runs one `minbias` process per pT-hat bin with bounded
//!   concurrency.
//!
//! # Usage Example
//!
//! ```ignore
//! use minbias::services::{GenerationDriver, HepMc3Writer, select_process};
//!
//! let settings = select_process(&request).into_settings()?;
//! let mut generator = ToyGenerator::initialize(settings)?;
//! let mut sink = HepMc3Writer::create(request.output_path())?;
//!
//! let summary = GenerationDriver::default().run(request.max_events, &mut generator, &mut sink)?;
//! ```

pub mod campaign;
pub mod driver;
pub mod hepmc_reader;
pub mod selector;
pub mod sink;
pub mod tracklist;

pub use campaign::{CampaignJob, CampaignReport, JobOutcome, JobReport, run_campaign};
pub use driver::{GenerationDriver, RunSummary};
pub use hepmc_reader::{HepMc3Reader, ReadError, ReadEvent, ReadParticle};
pub use selector::{select_process, select_process_with_threshold};
pub use sink::{EventSink, HepMc3Writer, SinkError};
pub use tracklist::{Track, extract_tracks, write_tracks};
