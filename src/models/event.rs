use crate::physics::LorentzVector;

/// Status codes carried into the event record (HepMC conventions, with
/// generator-specific codes for documentation particles).
pub mod status {
    pub const FINAL: i32 = 1;
    pub const DECAYED: i32 = 2;
    pub const BEAM: i32 = 4;
    pub const HARD_INCOMING: i32 = 21;
    pub const HARD_OUTGOING: i32 = 23;
}

/// 1-based particle id, as written to the event record.
pub type ParticleId = usize;

/// 1-based vertex id; serialized as its negative.
pub type VertexId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pdg_id: i32,
    pub status: i32,
    /// Momentum in GeV
    pub momentum: LorentzVector,
    pub mass: f64,
    pub production_vertex: Option<VertexId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub status: i32,
    pub incoming: Vec<ParticleId>,
    /// Space-time position in mm
    pub position: LorentzVector,
}

/// Particle/vertex graph of one generated event.
///
/// Particles must be added after the particles entering their production
/// vertex, so ids in [`Vertex::incoming`] are always lower than those of the
/// vertex's outgoing particles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a particle and return its id.
    pub fn add_particle(
        &mut self,
        pdg_id: i32,
        status: i32,
        momentum: LorentzVector,
        mass: f64,
        production_vertex: Option<VertexId>,
    ) -> ParticleId {
        debug_assert!(production_vertex.is_none_or(|v| v >= 1 && v <= self.vertices.len()));
        self.particles.push(Particle {
            pdg_id,
            status,
            momentum,
            mass,
            production_vertex,
        });
        self.particles.len()
    }

    /// Add a vertex fed by already-recorded particles and return its id.
    pub fn add_vertex(&mut self, incoming: Vec<ParticleId>, position: LorentzVector) -> VertexId {
        debug_assert!(incoming.iter().all(|&p| p >= 1 && p <= self.particles.len()));
        self.vertices.push(Vertex {
            status: 0,
            incoming,
            position,
        });
        self.vertices.len()
    }

    pub fn set_status(&mut self, particle: ParticleId, status: i32) {
        if let Some(p) = particle.checked_sub(1).and_then(|i| self.particles.get_mut(i)) {
            p.status = status;
        }
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        id.checked_sub(1).and_then(|i| self.particles.get(i))
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        id.checked_sub(1).and_then(|i| self.vertices.get(i))
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn final_state(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.status == status::FINAL)
    }
}

/// Generator cross-section estimate at the time an event was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CrossSection {
    /// Cross section in pb
    pub value_pb: f64,
    pub error_pb: f64,
    pub accepted: u64,
    pub attempted: u64,
}

/// One successfully generated event, handed straight to a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEvent {
    /// Index among the generator's successful events (0-based)
    pub number: u64,
    pub process_code: i32,
    /// Hard-process scale in GeV; zero for soft events
    pub pt_hat: f64,
    pub weight: f64,
    pub n_mpi: u32,
    pub cross_section: CrossSection,
    pub record: EventRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_one_based() {
        let mut record = EventRecord::new();
        let beam = record.add_particle(2212, status::BEAM, LorentzVector::new(), 0.938, None);
        let v = record.add_vertex(vec![beam], LorentzVector::new());
        let child = record.add_particle(211, status::FINAL, LorentzVector::new(), 0.1396, Some(v));

        assert_eq!(beam, 1);
        assert_eq!(v, 1);
        assert_eq!(child, 2);
        assert_eq!(record.particle(child).unwrap().production_vertex, Some(1));
        assert!(record.particle(0).is_none());
    }

    #[test]
    fn test_final_state_filter() {
        let mut record = EventRecord::new();
        record.add_particle(2212, status::BEAM, LorentzVector::new(), 0.938, None);
        let ks = record.add_particle(310, status::FINAL, LorentzVector::new(), 0.4976, None);
        record.add_particle(211, status::FINAL, LorentzVector::new(), 0.1396, None);
        record.set_status(ks, status::DECAYED);

        let finals: Vec<i32> = record.final_state().map(|p| p.pdg_id).collect();
        assert_eq!(finals, vec![211]);
    }

    #[test]
    fn test_set_status_ignores_unknown_ids() {
        let mut record = EventRecord::new();
        let pion = record.add_particle(211, status::FINAL, LorentzVector::new(), 0.1396, None);

        record.set_status(0, status::DECAYED);
        record.set_status(pion + 1, status::DECAYED);

        assert_eq!(record.particle(pion).unwrap().status, status::FINAL);
    }
}
