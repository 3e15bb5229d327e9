// HepMC3 ASCII reader
//
// Reads back the Asciiv3 files produced by `HepMc3Writer` (or by any other
// HepMC3 writer) one event at a time. Only what downstream tools need is
// kept: particles with their momenta and production positions.

use crate::physics::LorentzVector;
use camino::Utf8Path;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while reading a HepMC3 ASCII stream
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

/// A particle as read from a `P` line, with its production position resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadParticle {
    pub id: usize,
    pub pdg_id: i32,
    pub status: i32,
    /// Momentum in GeV
    pub momentum: LorentzVector,
    pub mass: f64,
    /// Production position in mm
    pub production: LorentzVector,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadEvent {
    pub number: u64,
    /// First event weight, 1.0 when the event carries none
    pub weight: f64,
    pub particles: Vec<ReadParticle>,
}

/// Streaming reader over a HepMC3 ASCII file.
///
/// Yields `Err` once for the first malformed line and then stops.
pub struct HepMc3Reader<R: BufRead> {
    lines: Lines<R>,
    line_no: usize,
    pending: Option<(usize, String)>,
    done: bool,
}

impl HepMc3Reader<BufReader<File>> {
    pub fn open<P: AsRef<Utf8Path>>(path: P) -> Result<Self, ReadError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> HepMc3Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            pending: None,
            done: false,
        }
    }

    fn next_line(&mut self) -> Option<io::Result<(usize, String)>> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.map(|l| (self.line_no, l)))
    }

    /// Skip the header and run info up to the next `E` line.
    fn find_event_start(&mut self) -> Result<Option<(usize, String)>, ReadError> {
        if let Some(pending) = self.pending.take() {
            return Ok(Some(pending));
        }
        while let Some(line) = self.next_line() {
            let (line_no, text) = line?;
            if text.starts_with("E ") {
                return Ok(Some((line_no, text)));
            }
            if text.starts_with("HepMC::Asciiv3-END") {
                return Ok(None);
            }
        }
        Ok(None)
    }

    fn read_event(&mut self, line_no: usize, header: &str) -> Result<ReadEvent, ReadError> {
        let mut fields = header.split_whitespace().skip(1);
        let number: u64 = parse_field(fields.next(), line_no, "event number")?;
        let vertex_count: u64 = parse_field(fields.next(), line_no, "vertex count")?;
        let mut builder = EventBuilder::new(number, vertex_count);

        while let Some(line) = self.next_line() {
            let (line_no, text) = line?;
            let text = text.trim_end();

            if text.starts_with("E ") {
                self.pending = Some((line_no, text.to_string()));
                return Ok(builder.finish());
            }
            if text.starts_with("HepMC::") {
                self.done = true;
                return Ok(builder.finish());
            }

            match text.split_whitespace().next() {
                Some("U") => builder.units(text, line_no)?,
                Some("W") => builder.weight(text, line_no)?,
                Some("V") => builder.vertex(text, line_no)?,
                Some("P") => builder.particle(text, line_no)?,
                // Attributes, tool and weight-name lines carry nothing we use
                _ => {}
            }
        }

        self.done = true;
        Ok(builder.finish())
    }
}

impl<R: BufRead> Iterator for HepMc3Reader<R> {
    type Item = Result<ReadEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = match self.find_event_start() {
            Ok(Some((line_no, header))) => self.read_event(line_no, &header),
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

struct EventBuilder {
    number: u64,
    weight: f64,
    momentum_scale: f64,
    length_scale: f64,
    particles: Vec<ReadParticle>,
    /// Vertex count declared on the `E` line; vertex ids run from -1 to -count
    vertex_count: u64,
    vertex_positions: HashMap<u64, LorentzVector>,
}

impl EventBuilder {
    fn new(number: u64, vertex_count: u64) -> Self {
        Self {
            number,
            weight: 1.0,
            momentum_scale: 1.0,
            length_scale: 1.0,
            particles: Vec::new(),
            vertex_count,
            vertex_positions: HashMap::new(),
        }
    }

    fn units(&mut self, text: &str, line: usize) -> Result<(), ReadError> {
        let mut fields = text.split_whitespace().skip(1);
        self.momentum_scale = match fields.next() {
            Some("GEV") => 1.0,
            Some("MEV") => 1e-3,
            other => return Err(malformed(line, format!("unknown momentum unit {:?}", other))),
        };
        self.length_scale = match fields.next() {
            Some("MM") => 1.0,
            Some("CM") => 10.0,
            other => return Err(malformed(line, format!("unknown length unit {:?}", other))),
        };
        Ok(())
    }

    fn weight(&mut self, text: &str, line: usize) -> Result<(), ReadError> {
        if let Some(first) = text.split_whitespace().nth(1) {
            self.weight = parse_field(Some(first), line, "weight")?;
        }
        Ok(())
    }

    /// Position of the production vertex of particle `id`, zero if unknown.
    fn production_of(&self, id: usize) -> LorentzVector {
        id.checked_sub(1)
            .and_then(|i| self.particles.get(i))
            .map(|p| p.production)
            .unwrap_or_default()
    }

    fn vertex(&mut self, text: &str, line: usize) -> Result<(), ReadError> {
        let mut fields = text.split_whitespace().skip(1);
        let vid: i64 = parse_field(fields.next(), line, "vertex id")?;
        if vid >= 0 {
            return Err(malformed(line, format!("vertex id must be negative, got {}", vid)));
        }
        let key = vid.unsigned_abs();
        if key > self.vertex_count {
            return Err(malformed(
                line,
                format!("vertex id {} outside the {} declared vertices", vid, self.vertex_count),
            ));
        }

        let open = text.find('[');
        let close = text.find(']');
        let (Some(open), Some(close)) = (open, close) else {
            return Err(malformed(line, "vertex line without incoming list".to_string()));
        };
        if close < open {
            return Err(malformed(line, "unbalanced incoming list".to_string()));
        }

        let incoming: Vec<usize> = text[open + 1..close]
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_field(Some(s.trim()), line, "incoming particle id"))
            .collect::<Result<_, _>>()?;

        let position = match text[close + 1..].trim().strip_prefix('@') {
            Some(rest) => {
                let mut coords = rest.split_whitespace();
                let x: f64 = parse_field(coords.next(), line, "vertex x")?;
                let y: f64 = parse_field(coords.next(), line, "vertex y")?;
                let z: f64 = parse_field(coords.next(), line, "vertex z")?;
                let t: f64 = parse_field(coords.next(), line, "vertex t")?;
                LorentzVector::from_args(t, x, y, z) * self.length_scale
            }
            // A vertex without its own position sits where its first parent was made
            None => incoming
                .first()
                .map(|&id| self.production_of(id))
                .unwrap_or_default(),
        };

        self.vertex_positions.insert(key, position);
        Ok(())
    }

    fn particle(&mut self, text: &str, line: usize) -> Result<(), ReadError> {
        let mut fields = text.split_whitespace().skip(1);
        let id: usize = parse_field(fields.next(), line, "particle id")?;
        let parent: i64 = parse_field(fields.next(), line, "parent")?;
        let pdg_id: i32 = parse_field(fields.next(), line, "pdg id")?;
        let px: f64 = parse_field(fields.next(), line, "px")?;
        let py: f64 = parse_field(fields.next(), line, "py")?;
        let pz: f64 = parse_field(fields.next(), line, "pz")?;
        let e: f64 = parse_field(fields.next(), line, "energy")?;
        let mass: f64 = parse_field(fields.next(), line, "mass")?;
        let status: i32 = parse_field(fields.next(), line, "status")?;

        let production = match parent {
            0 => LorentzVector::new(),
            p if p > 0 => {
                // Parents are always written before their children
                let parent_id = usize::try_from(p)
                    .ok()
                    .filter(|&id| id <= self.particles.len())
                    .ok_or_else(|| malformed(line, format!("unknown parent particle {}", p)))?;
                self.production_of(parent_id)
            }
            v => self
                .vertex_positions
                .get(&v.unsigned_abs())
                .copied()
                .ok_or_else(|| malformed(line, format!("unknown vertex {}", v)))?,
        };

        self.particles.push(ReadParticle {
            id,
            pdg_id,
            status,
            momentum: LorentzVector::from_args(e, px, py, pz) * self.momentum_scale,
            mass: mass * self.momentum_scale,
            production,
        });
        Ok(())
    }

    fn finish(self) -> ReadEvent {
        ReadEvent {
            number: self.number,
            weight: self.weight,
            particles: self.particles,
        }
    }
}

fn malformed(line: usize, reason: String) -> ReadError {
    ReadError::Malformed { line, reason }
}

fn parse_field<T: FromStr>(field: Option<&str>, line: usize, what: &str) -> Result<T, ReadError> {
    let field = field.ok_or_else(|| malformed(line, format!("missing {}", what)))?;
    field
        .parse()
        .map_err(|_| malformed(line, format!("invalid {} '{}'", what, field)))
}
