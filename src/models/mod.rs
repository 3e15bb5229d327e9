//! Data models for the minbias event-production driver.
//!
//! - [`GenerationRequest`]: the four positional CLI parameters, parsed once
//! - [`ProcessConfiguration`]: the process family chosen from the requested pT-hat window
//! - [`GeneratedEvent`]: one produced event with its particle/vertex [`EventRecord`]
//! - [`CampaignConfig`]: settings for the pT-binned campaign launcher
//!
//! # Architecture Note
//!
//! Request and configuration are immutable once built. Events are created
//! per loop iteration and dropped as soon as the sink has written them.

pub mod campaign;
pub mod event;
pub mod process;
pub mod request;

pub use campaign::{CampaignConfig, TrackListSettings};
pub use event::{CrossSection, EventRecord, GeneratedEvent, Particle, Vertex};
pub use process::{BEAM_ECM_GEV, GLOBAL_PT_HAT_MIN, ProcessConfiguration, ProcessFamily};
pub use request::{GenerationRequest, RequestError, USAGE};
