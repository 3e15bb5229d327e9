//! Kinematics primitives shared by the sampler, the HepMC codec and the
//! track-list extraction.

pub mod lorentz;
pub mod particle_data;

pub use lorentz::LorentzVector;
pub use particle_data::{ParticleSpecies, lookup, mass_of};
