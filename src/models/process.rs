use std::fmt;

/// Lowest pT-hat (GeV) at which hard QCD is used; below it the run samples
/// soft non-diffractive events instead.
pub const GLOBAL_PT_HAT_MIN: f64 = 0.25;

/// Centre-of-mass energy of the colliding beams in GeV (LHC Run 3).
pub const BEAM_ECM_GEV: f64 = 13_600.0;

/// The two mutually exclusive process families the generator can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessFamily {
    SoftQcdNonDiffractive,
    HardQcd,
}

impl fmt::Display for ProcessFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessFamily::SoftQcdNonDiffractive => write!(f, "SoftQCD:nonDiffractive"),
            ProcessFamily::HardQcd => write!(f, "HardQCD:all"),
        }
    }
}

/// Physics-process selection derived once from a generation request.
///
/// The family is a single enum value, so the soft and hard switches can
/// never both be on or both be off. The configuration is consumed when it
/// is pushed into the generator settings (see
/// [`crate::services::selector`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessConfiguration {
    pub family: ProcessFamily,
    pub pt_hat_min: f64,
    pub pt_hat_max: f64,
    pub e_cm: f64,
}

impl ProcessConfiguration {
    pub fn use_soft_qcd_non_diffractive(&self) -> bool {
        self.family == ProcessFamily::SoftQcdNonDiffractive
    }

    pub fn use_hard_qcd(&self) -> bool {
        self.family == ProcessFamily::HardQcd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_follow_family() {
        let soft = ProcessConfiguration {
            family: ProcessFamily::SoftQcdNonDiffractive,
            pt_hat_min: 0.1,
            pt_hat_max: 0.2,
            e_cm: BEAM_ECM_GEV,
        };
        assert!(soft.use_soft_qcd_non_diffractive());
        assert!(!soft.use_hard_qcd());

        let hard = ProcessConfiguration {
            family: ProcessFamily::HardQcd,
            ..soft
        };
        assert!(hard.use_hard_qcd());
        assert!(!hard.use_soft_qcd_non_diffractive());
    }

    #[test]
    fn test_family_display_matches_setting_key() {
        assert_eq!(ProcessFamily::HardQcd.to_string(), "HardQCD:all");
        assert_eq!(
            ProcessFamily::SoftQcdNonDiffractive.to_string(),
            "SoftQCD:nonDiffractive"
        );
    }
}
