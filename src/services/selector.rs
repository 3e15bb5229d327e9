use crate::generator::GeneratorSettings;
use crate::generator::settings::{
    BEAMS_ECM, HARD_QCD_ALL, PT_HAT_MAX, PT_HAT_MIN, SOFT_QCD_NON_DIFFRACTIVE, SettingsError,
};
use crate::models::{
    BEAM_ECM_GEV, GLOBAL_PT_HAT_MIN, GenerationRequest, ProcessConfiguration, ProcessFamily,
};

/// Choose the process family for a request using the fixed soft/hard
/// boundary [`GLOBAL_PT_HAT_MIN`].
pub fn select_process(request: &GenerationRequest) -> ProcessConfiguration {
    select_process_with_threshold(request.pt_hat_min, request.pt_hat_max, GLOBAL_PT_HAT_MIN)
}

/// Map a pT-hat window onto exactly one process family.
///
/// Windows starting below `threshold` run soft non-diffractive QCD; all
/// others (NaN included) run hard QCD. The window itself is passed
/// through untouched.
pub fn select_process_with_threshold(
    pt_hat_min: f64,
    pt_hat_max: f64,
    threshold: f64,
) -> ProcessConfiguration {
    let family = if pt_hat_min < threshold {
        ProcessFamily::SoftQcdNonDiffractive
    } else {
        ProcessFamily::HardQcd
    };

    ProcessConfiguration {
        family,
        pt_hat_min,
        pt_hat_max,
        e_cm: BEAM_ECM_GEV,
    }
}

impl ProcessConfiguration {
    /// Push this configuration into a fresh settings database.
    ///
    /// Consumes the configuration: it is applied once, before the
    /// generator is initialized, and cannot be re-applied later.
    pub fn into_settings(self) -> Result<GeneratorSettings, SettingsError> {
        let mut settings = GeneratorSettings::new();

        let (hard, soft) = match self.family {
            ProcessFamily::HardQcd => ("on", "off"),
            ProcessFamily::SoftQcdNonDiffractive => ("off", "on"),
        };
        settings.read_string(&format!("{} = {}", HARD_QCD_ALL, hard))?;
        settings.read_string(&format!("{} = {}", SOFT_QCD_NON_DIFFRACTIVE, soft))?;
        settings.set_parm(PT_HAT_MIN, self.pt_hat_min)?;
        settings.set_parm(PT_HAT_MAX, self.pt_hat_max)?;
        settings.set_parm(BEAMS_ECM, self.e_cm)?;

        tracing::info!(
            "Selected {} for pTHat window [{}, {}] GeV at eCM = {} GeV",
            self.family,
            self.pt_hat_min,
            self.pt_hat_max,
            self.e_cm
        );

        Ok(settings)
    }
}
