use super::settings::{
    BEAMS_ECM, DNDETA_SCALE, HARD_QCD_ALL, MAX_TRIES, PT_HAT_MAX, PT_HAT_MIN, RANDOM_SEED,
    SOFT_QCD_NON_DIFFRACTIVE,
};
use super::{EventGenerator, GenerationInfo, GeneratorError, GeneratorSettings};
use crate::models::event::{ParticleId, VertexId, status};
use crate::models::{CrossSection, EventRecord, GeneratedEvent};
use crate::physics::particle_data::{GLUON, K_PLUS, K_SHORT, PI_PLUS, PI_ZERO, PROTON};
use crate::physics::{LorentzVector, mass_of};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, Gamma, Poisson, StandardNormal};
use std::f64::consts::PI;

const MB_TO_PB: f64 = 1e9;

/// Normalisation of the toy dsigma/dpT^2 ~ 1/pT^4 spectrum, in mb GeV^2.
const HARD_QCD_NORM: f64 = 120.0;

/// Slope of the soft-hadron pT spectrum in GeV
const SOFT_TEMPERATURE: f64 = 0.16;

const ETA_MAX: f64 = 5.0;

/// Fraction of soft hadrons that are charged, given the species mix below
const CHARGED_FRACTION: f64 = 0.82;

/// Gaussian width of the fragmentation transverse kick in GeV
const FRAGMENTATION_KICK: f64 = 0.3;

const CODE_NON_DIFFRACTIVE: i32 = 101;
const CODE_GG_GG: i32 = 111;
const CODE_QG_QG: i32 = 113;
const CODE_QQ_QQ: i32 = 114;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Soft,
    Hard { pt_min: f64, pt_max: f64 },
}

/// Output of one successful accept-reject attempt.
struct Sample {
    record: EventRecord,
    process_code: i32,
    pt_hat: f64,
    n_mpi: u32,
}

/// Lightweight accept-reject event sampler for pp collisions.
///
/// It produces physically shaped but deliberately simple events:
///
/// - **Soft non-diffractive**: Poisson multiplicity with a logarithmically
///   rising plateau, Gamma(2) transverse momenta, flat pseudorapidity, two
///   beam remnants that close four-momentum conservation.
/// - **Hard QCD**: 2→2 parton scattering with pT-hat drawn from a 1/pT^4
///   spectrum, a toy parton-luminosity rejection, pion-jet fragmentation and
///   a reduced soft underlying event.
///
/// K0S mesons are decayed to π+π- at a displaced vertex in both modes.
///
/// Each call to [`EventGenerator::next_event`] makes up to `Next:maxTries`
/// attempts and returns `None` if none is accepted.
pub struct ToyGenerator {
    mode: Mode,
    e_cm: f64,
    max_tries: u32,
    dndeta_scale: f64,
    rng: StdRng,
    info: GenerationInfo,
    phase_space_tried: u64,
    phase_space_accepted: u64,
}

impl ToyGenerator {
    /// Validate the settings and build a ready-to-run generator.
    ///
    /// The settings are consumed: the generator keeps only the values it
    /// needs, and there is no way to reconfigure it afterwards.
    pub fn initialize(settings: GeneratorSettings) -> Result<Self, GeneratorError> {
        let hard = settings.flag(HARD_QCD_ALL)?;
        let soft = settings.flag(SOFT_QCD_NON_DIFFRACTIVE)?;
        let e_cm = settings.parm(BEAMS_ECM)?;
        let pt_min = settings.parm(PT_HAT_MIN)?;
        let pt_max_setting = settings.parm(PT_HAT_MAX)?;
        let seed = settings.mode(RANDOM_SEED)?;
        let max_tries = settings.mode(MAX_TRIES)?;
        let dndeta_scale = settings.parm(DNDETA_SCALE)?;

        for (key, value) in settings.changed() {
            tracing::debug!("Changed setting {} = {}", key, value);
        }

        let mode = match (soft, hard) {
            (false, false) => return Err(GeneratorError::NoProcessSelected),
            (true, true) => return Err(GeneratorError::ConflictingProcesses),
            (true, false) => Mode::Soft,
            (false, true) => {
                // An upper edge below the lower one means "no upper limit".
                let kinematic_max = e_cm / 2.;
                let pt_max = if pt_max_setting < pt_min {
                    kinematic_max
                } else {
                    pt_max_setting.min(kinematic_max)
                };
                if pt_min <= 0. || pt_min >= pt_max {
                    return Err(GeneratorError::EmptyPhaseSpace {
                        min: pt_min,
                        max: pt_max_setting,
                        e_cm,
                    });
                }
                Mode::Hard { pt_min, pt_max }
            }
        };

        tracing::info!(
            "Generator initialized: {:?}, eCM = {} GeV, seed = {}, max tries = {}",
            mode,
            e_cm,
            seed,
            max_tries
        );

        Ok(Self {
            mode,
            e_cm,
            max_tries: u32::try_from(max_tries).unwrap_or(u32::MAX),
            dndeta_scale,
            rng: StdRng::seed_from_u64(seed as u64),
            info: GenerationInfo::default(),
            phase_space_tried: 0,
            phase_space_accepted: 0,
        })
    }

    fn s(&self) -> f64 {
        self.e_cm * self.e_cm
    }

    /// Mean number of soft hadrons of all species over |eta| < ETA_MAX.
    fn soft_mean_multiplicity(&self) -> f64 {
        let dnch_deta = 0.75 * self.s().powf(0.11) * self.dndeta_scale;
        2. * ETA_MAX * dnch_deta / CHARGED_FRACTION
    }

    fn update_cross_section(&mut self) {
        let sigma = match self.mode {
            Mode::Soft => 0.55 * 21.7 * self.s().powf(0.0808),
            Mode::Hard { pt_min, pt_max } => {
                let acceptance = if self.phase_space_tried > 0 {
                    self.phase_space_accepted as f64 / self.phase_space_tried as f64
                } else {
                    0.
                };
                HARD_QCD_NORM * (1. / (pt_min * pt_min) - 1. / (pt_max * pt_max)) * acceptance
            }
        };
        self.info.sigma_gen_mb = sigma;
        self.info.sigma_err_mb = if self.info.n_accepted > 0 {
            sigma / (self.info.n_accepted as f64).sqrt()
        } else {
            0.
        };
    }

    fn beams(&self, record: &mut EventRecord) -> (ParticleId, ParticleId, LorentzVector, LorentzVector) {
        let m = mass_of(PROTON);
        let e_beam = self.e_cm / 2.;
        let pz = (e_beam * e_beam - m * m).sqrt();
        let p1 = LorentzVector::from_args(e_beam, 0., 0., pz);
        let p2 = LorentzVector::from_args(e_beam, 0., 0., -pz);
        let b1 = record.add_particle(PROTON, status::BEAM, p1, m, None);
        let b2 = record.add_particle(PROTON, status::BEAM, p2, m, None);
        (b1, b2, p1, p2)
    }

    fn try_soft(&mut self) -> Option<Sample> {
        let mut record = EventRecord::new();
        let (b1, b2, p1, p2) = self.beams(&mut record);
        let vertex = record.add_vertex(vec![b1, b2], LorentzVector::new());

        let mean = self.soft_mean_multiplicity();
        let (n_charged, total) = self.emit_soft_hadrons(&mut record, vertex, mean);
        if n_charged < 2 {
            return None;
        }

        // Two beam remnants take whatever four-momentum is left over.
        let remainder = p1 + p2 - total;
        let m = mass_of(PROTON);
        let m_system = remainder.mass();
        if remainder.t <= 0. || m_system <= 2. * m {
            return None;
        }
        let q = (m_system * m_system / 4. - m * m).sqrt();
        let frame = remainder.velocity();
        let r1 = LorentzVector::from_args(m_system / 2., 0., 0., q).boost(&frame);
        let r2 = LorentzVector::from_args(m_system / 2., 0., 0., -q).boost(&frame);
        record.add_particle(PROTON, status::FINAL, r1, m, Some(vertex));
        record.add_particle(PROTON, status::FINAL, r2, m, Some(vertex));

        Some(Sample {
            record,
            process_code: CODE_NON_DIFFRACTIVE,
            pt_hat: 0.,
            n_mpi: (n_charged / 8).max(1),
        })
    }

    fn try_hard(&mut self, pt_min: f64, pt_max: f64) -> Option<Sample> {
        self.phase_space_tried += 1;

        // Inverse CDF of dsigma/dpT^2 ~ 1/pT^4 on [pt_min, pt_max].
        let inv_min = 1. / (pt_min * pt_min);
        let inv_max = 1. / (pt_max * pt_max);
        let u: f64 = self.rng.random();
        let pt = 1. / (inv_min - u * (inv_min - inv_max)).sqrt();

        let y_max = (self.e_cm / (2. * pt)).acosh();
        let y3 = self.rng.random_range(-y_max..=y_max);
        let y4 = self.rng.random_range(-y_max..=y_max);
        let x1 = pt / self.e_cm * (y3.exp() + y4.exp());
        let x2 = pt / self.e_cm * ((-y3).exp() + (-y4).exp());
        if x1 >= 1. || x2 >= 1. {
            return None;
        }

        let luminosity = ((1. - x1) * (1. - x2)).powi(3);
        if self.rng.random::<f64>() > luminosity {
            return None;
        }
        self.phase_space_accepted += 1;

        let (process_code, flavours) = self.pick_flavours();

        let mut record = EventRecord::new();
        let (b1, b2, p1, p2) = self.beams(&mut record);
        let origin = LorentzVector::new();
        let e_beam = self.e_cm / 2.;

        let pa = LorentzVector::from_args(x1 * e_beam, 0., 0., x1 * e_beam);
        let pb = LorentzVector::from_args(x2 * e_beam, 0., 0., -x2 * e_beam);

        let va = record.add_vertex(vec![b1], origin);
        let a = record.add_particle(flavours[0], status::HARD_INCOMING, pa, 0., Some(va));
        let rem1 = p1 - pa;
        record.add_particle(PROTON, status::FINAL, rem1, rem1.mass(), Some(va));

        let vb = record.add_vertex(vec![b2], origin);
        let b = record.add_particle(flavours[1], status::HARD_INCOMING, pb, 0., Some(vb));
        let rem2 = p2 - pb;
        record.add_particle(PROTON, status::FINAL, rem2, rem2.mass(), Some(vb));

        let phi = self.rng.random_range(0.0..2. * PI);
        let (sin_phi, cos_phi) = phi.sin_cos();
        let p3 = LorentzVector::from_args(
            pt * y3.cosh(),
            pt * cos_phi,
            pt * sin_phi,
            pt * y3.sinh(),
        );
        let p4 = LorentzVector::from_args(
            pt * y4.cosh(),
            -pt * cos_phi,
            -pt * sin_phi,
            pt * y4.sinh(),
        );

        let hard_vertex = record.add_vertex(vec![a, b], origin);
        let c = record.add_particle(flavours[2], status::HARD_OUTGOING, p3, 0., Some(hard_vertex));
        let d = record.add_particle(flavours[3], status::HARD_OUTGOING, p4, 0., Some(hard_vertex));

        self.fragment(&mut record, c, p3);
        self.fragment(&mut record, d, p4);

        let ue_mean = 0.5 * self.soft_mean_multiplicity();
        self.emit_soft_hadrons(&mut record, hard_vertex, ue_mean);

        let n_mpi = 1 + poisson(&mut self.rng, 2.);

        Some(Sample {
            record,
            process_code,
            pt_hat: pt,
            n_mpi,
        })
    }

    /// Choose the 2→2 subprocess and the flavours `[a, b, c, d]` of `a b -> c d`.
    fn pick_flavours(&mut self) -> (i32, [i32; 4]) {
        let r: f64 = self.rng.random();
        if r < 0.6 {
            (CODE_GG_GG, [GLUON; 4])
        } else if r < 0.9 {
            let q = self.random_quark();
            if self.rng.random_bool(0.5) {
                (CODE_QG_QG, [q, GLUON, q, GLUON])
            } else {
                (CODE_QG_QG, [GLUON, q, GLUON, q])
            }
        } else {
            let qa = self.random_quark();
            let qb = self.random_quark();
            (CODE_QQ_QQ, [qa, qb, qa, qb])
        }
    }

    fn random_quark(&mut self) -> i32 {
        let flavour = self.rng.random_range(1..=3);
        if self.rng.random_bool(0.2) {
            -flavour
        } else {
            flavour
        }
    }

    /// Split a parton into a collimated pion jet attached to a new vertex.
    fn fragment(&mut self, record: &mut EventRecord, parton: ParticleId, momentum: LorentzVector) {
        let vertex = record.add_vertex(vec![parton], LorentzVector::new());
        let energy = momentum.t;
        let n_hadrons = 2 + poisson(&mut self.rng, 1.5 * energy.ln().max(0.)) as usize;

        let weights: Vec<f64> = (0..n_hadrons)
            .map(|_| self.rng.sample::<f64, _>(Exp1))
            .collect();
        let norm: f64 = weights.iter().sum();
        let (e1, e2) = transverse_basis(&momentum);

        for w in weights {
            let z = w / norm;
            let kick1 = FRAGMENTATION_KICK * gaussian(&mut self.rng);
            let kick2 = FRAGMENTATION_KICK * gaussian(&mut self.rng);
            let px = z * momentum.x + kick1 * e1[0] + kick2 * e2[0];
            let py = z * momentum.y + kick1 * e1[1] + kick2 * e2[1];
            let pz = z * momentum.z + kick1 * e1[2] + kick2 * e2[2];

            let pdg_id = self.random_pion();
            let m = mass_of(pdg_id);
            let p = LorentzVector::on_shell(px, py, pz, m);
            record.add_particle(pdg_id, status::FINAL, p, m, Some(vertex));
        }
    }

    fn random_pion(&mut self) -> i32 {
        let r: f64 = self.rng.random();
        if r < 1. / 3. {
            PI_ZERO
        } else if r < 2. / 3. {
            PI_PLUS
        } else {
            -PI_PLUS
        }
    }

    /// Emit a Poisson number of soft hadrons from `vertex`.
    ///
    /// Returns the number of charged final-state hadrons and the summed
    /// four-momentum of everything emitted.
    fn emit_soft_hadrons(
        &mut self,
        record: &mut EventRecord,
        vertex: VertexId,
        mean: f64,
    ) -> (u32, LorentzVector) {
        let n = poisson(&mut self.rng, mean);
        let mut n_charged = 0;
        let mut total = LorentzVector::new();

        for _ in 0..n {
            let pdg_id = self.random_soft_species();
            let m = mass_of(pdg_id);
            let pt = soft_pt(&mut self.rng);
            let eta = self.rng.random_range(-ETA_MAX..ETA_MAX);
            let phi = self.rng.random_range(0.0..2. * PI);
            let p = LorentzVector::from_pt_eta_phi_m(pt, eta, phi, m);

            let id = record.add_particle(pdg_id, status::FINAL, p, m, Some(vertex));
            if pdg_id == K_SHORT {
                n_charged += 2;
                self.decay_k_short(record, id, p, LorentzVector::new());
            } else if pdg_id != PI_ZERO {
                n_charged += 1;
            }
            total += p;
        }

        (n_charged, total)
    }

    fn random_soft_species(&mut self) -> i32 {
        let r: f64 = self.rng.random();
        let sign = if self.rng.random_bool(0.5) { 1 } else { -1 };
        if r < 0.70 {
            sign * PI_PLUS
        } else if r < 0.85 {
            PI_ZERO
        } else if r < 0.93 {
            sign * K_PLUS
        } else if r < 0.97 {
            sign * PROTON
        } else {
            K_SHORT
        }
    }

    /// Decay a K0S in flight to π+π- at a displaced vertex.
    fn decay_k_short(
        &mut self,
        record: &mut EventRecord,
        kaon: ParticleId,
        momentum: LorentzVector,
        origin: LorentzVector,
    ) {
        let m = mass_of(K_SHORT);
        let ctau = crate::physics::lookup(K_SHORT)
            .and_then(|s| s.ctau_mm)
            .unwrap_or(0.);

        let p = momentum.p3mod();
        let length = self.rng.sample::<f64, _>(Exp1) * ctau * p / m;
        let beta = p / momentum.t;
        let scale = if p > 0. { length / p } else { 0. };
        let position = origin
            + LorentzVector::from_args(
                if beta > 0. { length / beta } else { 0. },
                momentum.x * scale,
                momentum.y * scale,
                momentum.z * scale,
            );

        let vertex = record.add_vertex(vec![kaon], position);
        record.set_status(kaon, status::DECAYED);

        let m_pi = mass_of(PI_PLUS);
        let q = (m * m / 4. - m_pi * m_pi).sqrt();
        let cos_theta: f64 = self.rng.random_range(-1.0..=1.0);
        let sin_theta = (1. - cos_theta * cos_theta).sqrt();
        let phi = self.rng.random_range(0.0..2. * PI);
        let (sin_phi, cos_phi) = phi.sin_cos();
        let rest = LorentzVector::from_args(
            m / 2.,
            q * sin_theta * cos_phi,
            q * sin_theta * sin_phi,
            q * cos_theta,
        );
        let frame = momentum.velocity();
        let pi_plus = rest.boost(&frame);
        let pi_minus = LorentzVector::from_args(rest.t, -rest.x, -rest.y, -rest.z).boost(&frame);

        record.add_particle(PI_PLUS, status::FINAL, pi_plus, m_pi, Some(vertex));
        record.add_particle(-PI_PLUS, status::FINAL, pi_minus, m_pi, Some(vertex));
    }
}

impl EventGenerator for ToyGenerator {
    fn next_event(&mut self) -> Option<GeneratedEvent> {
        self.info.n_tried += 1;

        for _ in 0..self.max_tries {
            let attempt = match self.mode {
                Mode::Soft => self.try_soft(),
                Mode::Hard { pt_min, pt_max } => self.try_hard(pt_min, pt_max),
            };

            if let Some(sample) = attempt {
                self.info.n_accepted += 1;
                self.update_cross_section();
                return Some(GeneratedEvent {
                    number: self.info.n_accepted - 1,
                    process_code: sample.process_code,
                    pt_hat: sample.pt_hat,
                    weight: 1.0,
                    n_mpi: sample.n_mpi,
                    cross_section: CrossSection {
                        value_pb: self.info.sigma_gen_mb * MB_TO_PB,
                        error_pb: self.info.sigma_err_mb * MB_TO_PB,
                        accepted: self.info.n_accepted,
                        attempted: self.info.n_tried,
                    },
                    record: sample.record,
                });
            }
        }

        self.update_cross_section();
        None
    }

    fn info(&self) -> GenerationInfo {
        self.info
    }
}

/// Two unit vectors orthogonal to the momentum direction and to each other.
fn transverse_basis(p: &LorentzVector) -> ([f64; 3], [f64; 3]) {
    let norm = p.p3mod();
    if norm == 0. {
        return ([1., 0., 0.], [0., 1., 0.]);
    }
    let n = [p.x / norm, p.y / norm, p.z / norm];

    // n x z-hat, falling back to x-hat along the beam axis
    let mut e1 = [n[1], -n[0], 0.];
    let e1_norm = (e1[0] * e1[0] + e1[1] * e1[1]).sqrt();
    if e1_norm < 1e-12 {
        e1 = [1., 0., 0.];
    } else {
        e1 = [e1[0] / e1_norm, e1[1] / e1_norm, 0.];
    }
    let e2 = [
        n[1] * e1[2] - n[2] * e1[1],
        n[2] * e1[0] - n[0] * e1[2],
        n[0] * e1[1] - n[1] * e1[0],
    ];
    (e1, e2)
}

fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// Poisson deviate; zero for a non-positive or non-finite mean.
fn poisson<R: Rng>(rng: &mut R, mean: f64) -> u32 {
    match Poisson::new(mean) {
        Ok(dist) => {
            let k: f64 = dist.sample(rng);
            k as u32
        }
        Err(_) => 0,
    }
}

/// Soft-hadron transverse momentum, Gamma(2) with slope `SOFT_TEMPERATURE`.
fn soft_pt<R: Rng>(rng: &mut R) -> f64 {
    match Gamma::new(2., SOFT_TEMPERATURE) {
        Ok(dist) => dist.sample(rng),
        Err(_) => 0.,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BEAM_ECM_GEV, ProcessConfiguration, ProcessFamily};

    fn settings_for(family: ProcessFamily, pt_min: f64, pt_max: f64) -> GeneratorSettings {
        ProcessConfiguration {
            family,
            pt_hat_min: pt_min,
            pt_hat_max: pt_max,
            e_cm: BEAM_ECM_GEV,
        }
        .into_settings()
        .unwrap()
    }

    #[test]
    fn test_requires_a_process() {
        let err = ToyGenerator::initialize(GeneratorSettings::new()).err();
        assert_eq!(err, Some(GeneratorError::NoProcessSelected));
    }

    #[test]
    fn test_rejects_both_processes() {
        let mut settings = GeneratorSettings::new();
        settings.read_string("HardQCD:all = on").unwrap();
        settings.read_string("SoftQCD:nonDiffractive = on").unwrap();
        let err = ToyGenerator::initialize(settings).err();
        assert_eq!(err, Some(GeneratorError::ConflictingProcesses));
    }

    #[test]
    fn test_hard_window_beyond_kinematic_limit() {
        let settings = settings_for(ProcessFamily::HardQcd, 7000., 8000.);
        assert!(matches!(
            ToyGenerator::initialize(settings),
            Err(GeneratorError::EmptyPhaseSpace { .. })
        ));
    }

    #[test]
    fn test_inverted_hard_window_means_no_upper_limit() {
        let settings = settings_for(ProcessFamily::HardQcd, 20., 10.);
        let generator = ToyGenerator::initialize(settings).unwrap();
        assert_eq!(
            generator.mode,
            Mode::Hard {
                pt_min: 20.,
                pt_max: BEAM_ECM_GEV / 2.
            }
        );
    }

    #[test]
    fn test_hard_events_respect_pt_window() {
        let mut generator =
            ToyGenerator::initialize(settings_for(ProcessFamily::HardQcd, 20., 40.)).unwrap();

        let mut produced = 0;
        for _ in 0..50 {
            if let Some(event) = generator.next_event() {
                assert!(event.pt_hat >= 20. && event.pt_hat <= 40.);
                assert!(matches!(event.process_code, 111 | 113 | 114));
                assert_eq!(event.number, produced);
                produced += 1;
            }
        }
        assert!(produced > 0);
        assert_eq!(generator.info().n_tried, 50);
        assert_eq!(generator.info().n_accepted, produced);
        assert!(generator.info().sigma_gen_mb > 0.);
    }

    #[test]
    fn test_soft_events_conserve_momentum() {
        let mut generator = ToyGenerator::initialize(settings_for(
            ProcessFamily::SoftQcdNonDiffractive,
            0.1,
            0.25,
        ))
        .unwrap();

        let event = (0..10).find_map(|_| generator.next_event()).unwrap();
        assert_eq!(event.process_code, CODE_NON_DIFFRACTIVE);
        assert_eq!(event.pt_hat, 0.);

        // Final state plus the decayed K0S daughters replace the beams.
        let total = event
            .record
            .final_state()
            .fold(LorentzVector::new(), |acc, p| acc + p.momentum);
        assert!((total.t - BEAM_ECM_GEV).abs() < 1e-6 * BEAM_ECM_GEV);
        assert!(total.z.abs() < 1e-6 * BEAM_ECM_GEV);
    }

    #[test]
    fn test_same_seed_same_events() {
        let make = || {
            ToyGenerator::initialize(settings_for(ProcessFamily::HardQcd, 5., 10.)).unwrap()
        };
        let mut a = make();
        let mut b = make();
        for _ in 0..5 {
            assert_eq!(a.next_event(), b.next_event());
        }
    }

    #[test]
    fn test_failure_when_tries_exhausted() {
        // A window hugging the kinematic limit is almost never accepted.
        let mut settings = settings_for(ProcessFamily::HardQcd, 6790., 6800.);
        settings.set_mode(MAX_TRIES, 1).unwrap();
        let mut generator = ToyGenerator::initialize(settings).unwrap();

        let produced = (0..20).filter_map(|_| generator.next_event()).count();
        assert!(produced < 20);
        assert_eq!(generator.info().n_tried, 20);
    }

    #[test]
    fn test_poisson_zero_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(poisson(&mut rng, 0.), 0);
        assert_eq!(poisson(&mut rng, -3.), 0);
        assert_eq!(poisson(&mut rng, f64::NAN), 0);
    }

    #[test]
    fn test_poisson_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 4000;
        let total: u32 = (0..n).map(|_| poisson(&mut rng, 4.)).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 4.).abs() < 0.2, "sample mean {}", mean);
    }

    #[test]
    fn test_soft_pt_spectrum() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 4000;
        let samples: Vec<f64> = (0..n).map(|_| soft_pt(&mut rng)).collect();
        assert!(samples.iter().all(|&pt| pt > 0.));
        // Gamma(2) mean is twice the slope
        let mean = samples.iter().sum::<f64>() / n as f64;
        assert!((mean - 2. * SOFT_TEMPERATURE).abs() < 0.02, "sample mean {}", mean);
    }

    #[test]
    fn test_transverse_basis_is_orthonormal() {
        let p = LorentzVector::on_shell(3., -1., 2., 0.);
        let (e1, e2) = transverse_basis(&p);
        let n = [p.x / p.p3mod(), p.y / p.p3mod(), p.z / p.p3mod()];
        let dot = |a: [f64; 3], b: [f64; 3]| a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
        assert!(dot(e1, n).abs() < 1e-12);
        assert!(dot(e2, n).abs() < 1e-12);
        assert!(dot(e1, e2).abs() < 1e-12);
        assert!((dot(e2, e2) - 1.).abs() < 1e-12);
    }
}
