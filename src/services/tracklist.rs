use crate::models::TrackListSettings;
use crate::models::event::status;
use crate::services::hepmc_reader::{HepMc3Reader, ReadError, ReadEvent, ReadParticle};
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Innermost radius of the pixel detector, in mm
pub const PIXEL_R_MIN: f64 = 30.0;

/// Outermost radius of the pixel detector, in mm
pub const PIXEL_R_MAX: f64 = 130.0;

/// One PixelAV track-list row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    /// cot(alpha) = 1/tan(phi)
    pub cota: f64,
    /// cot(beta) = 1/tan(theta)
    pub cotb: f64,
    pub p: f64,
    pub flp: i32,
    /// Production x in mm
    pub localx: f64,
    /// Production y in mm
    pub localy: f64,
    pub pt: f64,
}

impl Track {
    pub fn from_particle(particle: &ReadParticle) -> Self {
        let momentum = &particle.momentum;
        Self {
            cota: 1.0 / momentum.phi().tan(),
            cotb: 1.0 / momentum.theta().tan(),
            p: momentum.p3mod(),
            flp: 0,
            localx: particle.production.x,
            localy: particle.production.y,
            pt: momentum.pt(),
        }
    }

    /// Format as a space-separated line, floats with `precision` decimals
    pub fn format(&self, precision: usize) -> String {
        let f = |v: f64| fmt_fixed(v, precision);
        format!(
            "{} {} {} {} {} {} {}",
            f(self.cota),
            f(self.cotb),
            f(self.p),
            self.flp,
            f(self.localx),
            f(self.localy),
            f(self.pt)
        )
    }
}

/// Whether a particle would leave a track in the pixel layers: final state,
/// finite pseudorapidity and produced inside the detector radius.
pub fn accepts(particle: &ReadParticle) -> bool {
    let radius = particle.production.x.hypot(particle.production.y);
    particle.status == status::FINAL
        && particle.momentum.eta().is_finite()
        && (PIXEL_R_MIN..=PIXEL_R_MAX).contains(&radius)
}

/// Collect tracks from an event stream.
///
/// Stops reading as soon as `limit` tracks are collected, so a small limit
/// does not require the whole file. `None` keeps every accepted particle.
pub fn extract_tracks<I>(events: I, limit: Option<usize>) -> Result<Vec<Track>, ReadError>
where
    I: IntoIterator<Item = Result<ReadEvent, ReadError>>,
{
    let mut tracks = Vec::new();

    for event in events {
        if limit.is_some_and(|n| tracks.len() >= n) {
            break;
        }
        let event = event?;
        for particle in &event.particles {
            if limit.is_some_and(|n| tracks.len() >= n) {
                break;
            }
            if accepts(particle) {
                tracks.push(Track::from_particle(particle));
            }
        }
    }

    Ok(tracks)
}

pub fn write_tracks<W: Write>(out: &mut W, tracks: &[Track], precision: usize) -> std::io::Result<()> {
    for track in tracks {
        writeln!(out, "{}", track.format(precision))?;
    }
    Ok(())
}

/// Convert a HepMC3 file into a track list file.
///
/// # Arguments
/// * `input` - HepMC3 ASCII file
/// * `output` - Track list to create (truncated if present)
/// * `settings` - Track limit and float precision
///
/// # Returns
/// Number of tracks written
pub fn convert_file(input: &Utf8Path, output: &Utf8Path, settings: &TrackListSettings) -> Result<usize> {
    let reader = HepMc3Reader::open(input)
        .with_context(|| format!("Failed to open HepMC file: {}", input))?;

    let limit = usize::try_from(settings.nparticles).ok();
    let tracks = extract_tracks(reader, limit)
        .with_context(|| format!("Failed to read HepMC file: {}", input))?;

    let file = File::create(output)
        .with_context(|| format!("Failed to create track list: {}", output))?;
    let mut out = BufWriter::new(file);
    write_tracks(&mut out, &tracks, settings.float_precision)
        .and_then(|_| out.flush())
        .with_context(|| format!("Failed to write track list: {}", output))?;

    tracing::info!("Wrote {} tracks from {} to {}", tracks.len(), input, output);
    Ok(tracks.len())
}

fn fmt_fixed(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.*}", precision, value)
    }
}
