use std::str::FromStr;
use thiserror::Error;

/// One-line usage message printed on an arity mismatch.
pub const USAGE: &str = "Usage: minbias <outFileName> <maxEvents> <pTHatMin> <pTHatMax>";

/// Number of positional arguments the generation binary expects.
pub const EXPECTED_ARGS: usize = 4;

/// Errors raised while turning command-line arguments into a request
#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("expected {EXPECTED_ARGS} arguments, found {found}")]
    Usage { found: usize },

    #[error("invalid value for {name}: {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// The user's generation intent, fixed for the whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Base path of the output artifact; the sink appends its extension.
    pub output_name: String,
    pub max_events: usize,
    /// Lower edge of the pT-hat window in GeV
    pub pt_hat_min: f64,
    /// Upper edge of the pT-hat window in GeV. Not checked against the lower edge.
    pub pt_hat_max: f64,
}

impl GenerationRequest {
    /// Build a request from the positional arguments (program name excluded).
    ///
    /// The argument count is checked before anything is parsed, so a wrong
    /// arity always reports [`RequestError::Usage`].
    ///
    /// A negative event count is accepted and yields an empty run.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, RequestError> {
        if args.len() != EXPECTED_ARGS {
            return Err(RequestError::Usage { found: args.len() });
        }

        let output_name = args[0].as_ref().to_string();
        let max_events: i64 = parse_number("maxEvents", args[1].as_ref())?;
        let pt_hat_min: f64 = parse_number("pTHatMin", args[2].as_ref())?;
        let pt_hat_max: f64 = parse_number("pTHatMax", args[3].as_ref())?;

        if max_events < 0 {
            tracing::warn!("maxEvents = {} is negative, no events will be generated", max_events);
        }

        Ok(Self {
            output_name,
            max_events: usize::try_from(max_events).unwrap_or(0),
            pt_hat_min,
            pt_hat_max,
        })
    }

    /// Path of the HepMC3 output artifact.
    pub fn output_path(&self) -> String {
        format!("{}.hepmc", self.output_name)
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, RequestError> {
    value.trim().parse().map_err(|_| RequestError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}
