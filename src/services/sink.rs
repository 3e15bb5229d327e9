use crate::models::GeneratedEvent;
use camino::Utf8Path;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use thiserror::Error;

/// Version string written into the file header
pub const HEPMC_VERSION: &str = "3.02.05";

const START_LISTING: &str = "HepMC::Asciiv3-START_EVENT_LISTING";
const END_LISTING: &str = "HepMC::Asciiv3-END_EVENT_LISTING";

/// Errors that can occur while serializing events
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Sink already finished, cannot write event {0}")]
    Finished(u64),
}

/// Destination for produced events.
///
/// Events arrive one at a time in generation order and must be written in
/// that order. `finish` finalizes the stream; writing afterwards is an
/// error.
#[cfg_attr(test, mockall::automock)]
pub trait EventSink {
    fn write_event(&mut self, event: &GeneratedEvent) -> Result<(), SinkError>;

    fn finish(&mut self) -> Result<(), SinkError>;
}

/// HepMC3 ASCII (`Asciiv3`) event writer.
///
/// The header is written on construction and the run info (weight names
/// and tool line) ahead of the first event. The end-of-listing footer is
/// written by [`EventSink::finish`], or on drop if the writer was never
/// finished. Event numbers count written events from zero.
///
/// A vertex line is only emitted when needed: a vertex with a single
/// incoming particle and no position is encoded by giving its outgoing
/// particles that parent particle id directly.
pub struct HepMc3Writer<W: Write> {
    out: W,
    events_written: u64,
    run_info_written: bool,
    finished: bool,
}

impl HepMc3Writer<BufWriter<File>> {
    /// Create (or truncate) a file and write the HepMC header.
    pub fn create<P: AsRef<Utf8Path>>(path: P) -> Result<Self, SinkError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        tracing::info!("Writing HepMC3 events to {}", path);
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> HepMc3Writer<W> {
    pub fn new(mut out: W) -> Result<Self, SinkError> {
        writeln!(out, "HepMC::Version {}", HEPMC_VERSION)?;
        writeln!(out, "{}", START_LISTING)?;
        Ok(Self {
            out,
            events_written: 0,
            run_info_written: false,
            finished: false,
        })
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    fn write_run_info(&mut self) -> io::Result<()> {
        writeln!(self.out, "W Weight")?;
        writeln!(
            self.out,
            "T {}\\|{}\\|{}",
            crate::APP_NAME,
            crate::VERSION,
            "minimum-bias and hard-QCD event production"
        )
    }

    /// Render one event in Asciiv3 layout.
    fn format_event(&self, event: &GeneratedEvent) -> String {
        let record = &event.record;
        let mut text = String::new();

        // String formatting cannot fail; ignore the fmt::Result throughout.
        let _ = writeln!(
            text,
            "E {} {} {}",
            self.events_written,
            record.vertices().len(),
            record.particles().len()
        );
        let _ = writeln!(text, "U GEV MM");
        let _ = writeln!(text, "W {}", fmt_sci(event.weight));

        let xs = &event.cross_section;
        let _ = writeln!(
            text,
            "A 0 GenCrossSection {} {} {} {}",
            fmt_sci(xs.value_pb),
            fmt_sci(xs.error_pb),
            xs.accepted,
            xs.attempted
        );
        let _ = writeln!(text, "A 0 event_scale {}", fmt_sci(event.pt_hat));
        let _ = writeln!(text, "A 0 mpi {}", event.n_mpi);
        let _ = writeln!(text, "A 0 signal_process_id {}", event.process_code);

        let mut vertex_written = vec![false; record.vertices().len()];

        for (index, particle) in record.particles().iter().enumerate() {
            let id = index + 1;

            let parent: i64 = match particle.production_vertex {
                None => 0,
                Some(v) => match record.vertex(v) {
                    Some(vertex) if vertex.incoming.len() == 1 && vertex.position.is_zero() => {
                        vertex.incoming[0] as i64
                    }
                    Some(vertex) => {
                        if !vertex_written[v - 1] {
                            let incoming: Vec<String> =
                                vertex.incoming.iter().map(|p| p.to_string()).collect();
                            let _ = write!(
                                text,
                                "V -{} {} [{}]",
                                v,
                                vertex.status,
                                incoming.join(",")
                            );
                            if !vertex.position.is_zero() {
                                let pos = &vertex.position;
                                let _ = write!(
                                    text,
                                    " @ {} {} {} {}",
                                    fmt_sci(pos.x),
                                    fmt_sci(pos.y),
                                    fmt_sci(pos.z),
                                    fmt_sci(pos.t)
                                );
                            }
                            text.push('\n');
                            vertex_written[v - 1] = true;
                        }
                        -(v as i64)
                    }
                    None => 0,
                },
            };

            let p = &particle.momentum;
            let _ = writeln!(
                text,
                "P {} {} {} {} {} {} {} {} {}",
                id,
                parent,
                particle.pdg_id,
                fmt_sci(p.x),
                fmt_sci(p.y),
                fmt_sci(p.z),
                fmt_sci(p.t),
                fmt_sci(particle.mass),
                particle.status
            );
        }

        text
    }

    fn finish_inner(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", END_LISTING)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> EventSink for HepMc3Writer<W> {
    fn write_event(&mut self, event: &GeneratedEvent) -> Result<(), SinkError> {
        if self.finished {
            return Err(SinkError::Finished(event.number));
        }

        if !self.run_info_written {
            self.write_run_info()?;
            self.run_info_written = true;
        }

        let text = self.format_event(event);
        self.out.write_all(text.as_bytes())?;
        self.events_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.finish_inner()?;
        tracing::debug!("HepMC3 stream closed after {} events", self.events_written);
        Ok(())
    }
}

impl<W: Write> Drop for HepMc3Writer<W> {
    fn drop(&mut self) {
        if !self.finished {
            self.finished = true;
            if let Err(e) = self.finish_inner() {
                tracing::error!("Failed to finalize HepMC3 stream: {}", e);
            }
        }
    }
}

/// Format a float the way C's `%.16e` does (`1.0000000000000000e+00`).
pub fn fmt_sci(value: f64) -> String {
    let raw = format!("{:.16e}", value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let exp: i32 = exponent.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => raw.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::status;
    use crate::models::{CrossSection, EventRecord};
    use crate::physics::LorentzVector;

    fn sample_event() -> GeneratedEvent {
        let mut record = EventRecord::new();
        let origin = LorentzVector::new();
        let b1 = record.add_particle(
            2212,
            status::BEAM,
            LorentzVector::from_args(6800., 0., 0., 6800.),
            0.938272,
            None,
        );
        let b2 = record.add_particle(
            2212,
            status::BEAM,
            LorentzVector::from_args(6800., 0., 0., -6800.),
            0.938272,
            None,
        );
        let v1 = record.add_vertex(vec![b1, b2], origin);
        let ks = record.add_particle(
            310,
            status::FINAL,
            LorentzVector::on_shell(1., 0., 0., 0.497611),
            0.497611,
            Some(v1),
        );
        let v2 = record.add_vertex(vec![ks], LorentzVector::from_args(60., 50., 0., 0.));
        record.set_status(ks, status::DECAYED);
        record.add_particle(211, status::FINAL, LorentzVector::on_shell(0.5, 0.1, 0., 0.13957), 0.13957, Some(v2));

        GeneratedEvent {
            number: 0,
            process_code: 101,
            pt_hat: 0.,
            weight: 1.,
            n_mpi: 3,
            cross_section: CrossSection {
                value_pb: 5.6e10,
                error_pb: 1e9,
                accepted: 1,
                attempted: 1,
            },
            record,
        }
    }

    #[test]
    fn test_fmt_sci() {
        assert_eq!(fmt_sci(1.0), "1.0000000000000000e+00");
        assert_eq!(fmt_sci(-0.00025), "-2.5000000000000000e-04");
        assert_eq!(fmt_sci(13600.0), "1.3600000000000000e+04");
        assert_eq!(fmt_sci(0.0), "0.0000000000000000e+00");
        assert_eq!(fmt_sci(1e123), "1.0000000000000000e+123");
    }

    #[test]
    fn test_empty_stream_has_header_and_footer() {
        let mut buf = Vec::new();
        {
            let mut writer = HepMc3Writer::new(&mut buf).unwrap();
            writer.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "HepMC::Version 3.02.05");
        assert_eq!(lines[1], START_LISTING);
        assert_eq!(lines[2], END_LISTING);
        assert!(!text.contains("\nE "));
    }

    #[test]
    fn test_event_layout() {
        let mut buf = Vec::new();
        {
            let mut writer = HepMc3Writer::new(&mut buf).unwrap();
            writer.write_event(&sample_event()).unwrap();
            writer.finish().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[2], "W Weight");
        assert!(lines[3].starts_with("T minbias\\|"));
        assert_eq!(lines[4], "E 0 2 4");
        assert_eq!(lines[5], "U GEV MM");
        assert_eq!(lines[6], "W 1.0000000000000000e+00");
        assert!(lines[7].starts_with("A 0 GenCrossSection 5.6000000000000000e+10"));
        assert!(text.contains("A 0 signal_process_id 101"));

        // Beams have no production vertex
        assert!(text.contains("\nP 1 0 2212 "));
        // Two incoming particles require an explicit vertex line
        assert!(text.contains("\nV -1 0 [1,2]\nP 3 -1 310 "));
        // A displaced single-parent vertex still carries its position
        assert!(text.contains("\nV -2 0 [3] @ 5.0000000000000000e+01 0.0000000000000000e+00"));
        assert!(text.contains("\nP 4 -2 211 "));
        assert!(text.ends_with(&format!("{}\n\n", END_LISTING)));
    }

    #[test]
    fn test_single_parent_without_position_uses_parent_id() {
        let mut record = EventRecord::new();
        let parton = record.add_particle(21, status::HARD_OUTGOING, LorentzVector::new(), 0., None);
        let v = record.add_vertex(vec![parton], LorentzVector::new());
        record.add_particle(211, status::FINAL, LorentzVector::new(), 0.13957, Some(v));

        let mut event = sample_event();
        event.record = record;

        let mut buf = Vec::new();
        {
            let mut writer = HepMc3Writer::new(&mut buf).unwrap();
            writer.write_event(&event).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\nP 2 1 211 "));
        assert!(!text.contains("\nV "));
    }

    #[test]
    fn test_event_numbers_follow_write_order() {
        let mut buf = Vec::new();
        {
            let mut writer = HepMc3Writer::new(&mut buf).unwrap();
            for _ in 0..3 {
                writer.write_event(&sample_event()).unwrap();
            }
            assert_eq!(writer.events_written(), 3);
        }
        let text = String::from_utf8(buf).unwrap();
        let numbers: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("E "))
            .map(|l| l.split_whitespace().nth(1).unwrap())
            .collect();
        assert_eq!(numbers, vec!["0", "1", "2"]);
        // Run info only once
        assert_eq!(text.matches("W Weight").count(), 1);
    }

    #[test]
    fn test_write_after_finish_fails() {
        let mut buf = Vec::new();
        let mut writer = HepMc3Writer::new(&mut buf).unwrap();
        writer.finish().unwrap();
        assert!(matches!(
            writer.write_event(&sample_event()),
            Err(SinkError::Finished(0))
        ));
        // Finishing twice is harmless
        writer.finish().unwrap();
    }

    #[test]
    fn test_drop_writes_footer() {
        let mut buf = Vec::new();
        {
            let mut writer = HepMc3Writer::new(&mut buf).unwrap();
            writer.write_event(&sample_event()).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains(END_LISTING));
    }
}
