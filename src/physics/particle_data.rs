// Particle data for the species the event sampler emits.
//
// Masses in GeV, proper decay lengths in mm.

pub const PROTON: i32 = 2212;
pub const NEUTRON: i32 = 2112;
pub const PI_PLUS: i32 = 211;
pub const PI_ZERO: i32 = 111;
pub const K_PLUS: i32 = 321;
pub const K_SHORT: i32 = 310;
pub const GLUON: i32 = 21;

/// Static properties of one particle species.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpecies {
    pub pdg_id: i32,
    pub mass: f64,
    /// Three times the electric charge, as generator codes usually store it.
    pub charge3: i32,
    /// Proper decay length c*tau in mm; `None` for species treated as stable.
    pub ctau_mm: Option<f64>,
}

impl ParticleSpecies {
    pub fn is_charged(&self) -> bool {
        self.charge3 != 0
    }
}

const TABLE: &[ParticleSpecies] = &[
    ParticleSpecies { pdg_id: PROTON, mass: 0.938272, charge3: 3, ctau_mm: None },
    ParticleSpecies { pdg_id: NEUTRON, mass: 0.939565, charge3: 0, ctau_mm: None },
    ParticleSpecies { pdg_id: PI_PLUS, mass: 0.13957, charge3: 3, ctau_mm: None },
    ParticleSpecies { pdg_id: PI_ZERO, mass: 0.134977, charge3: 0, ctau_mm: None },
    ParticleSpecies { pdg_id: K_PLUS, mass: 0.493677, charge3: 3, ctau_mm: None },
    ParticleSpecies { pdg_id: K_SHORT, mass: 0.497611, charge3: 0, ctau_mm: Some(26.844) },
    ParticleSpecies { pdg_id: GLUON, mass: 0.0, charge3: 0, ctau_mm: None },
    ParticleSpecies { pdg_id: 1, mass: 0.33, charge3: -1, ctau_mm: None },
    ParticleSpecies { pdg_id: 2, mass: 0.33, charge3: 2, ctau_mm: None },
    ParticleSpecies { pdg_id: 3, mass: 0.5, charge3: -1, ctau_mm: None },
];

/// Look up a species by PDG code. Antiparticles share the entry of the
/// particle with the charge flipped.
pub fn lookup(pdg_id: i32) -> Option<ParticleSpecies> {
    let abs_id = pdg_id.abs();
    TABLE.iter().find(|s| s.pdg_id == abs_id).map(|s| {
        let mut species = *s;
        species.pdg_id = pdg_id;
        if pdg_id < 0 {
            species.charge3 = -species.charge3;
        }
        species
    })
}

/// Mass for a PDG code, zero for unknown codes.
pub fn mass_of(pdg_id: i32) -> f64 {
    lookup(pdg_id).map(|s| s.mass).unwrap_or(0.)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_antiparticle_flips_charge() {
        let pi_minus = lookup(-PI_PLUS).unwrap();
        assert_eq!(pi_minus.charge3, -3);
        assert_eq!(pi_minus.pdg_id, -211);
        assert!(pi_minus.is_charged());
    }

    #[test]
    fn test_k_short_is_unstable() {
        let ks = lookup(K_SHORT).unwrap();
        assert!(ks.ctau_mm.is_some());
        assert!(!ks.is_charged());
    }

    #[test]
    fn test_unknown_species() {
        assert!(lookup(999_999).is_none());
        assert_eq!(mass_of(999_999), 0.);
    }
}
