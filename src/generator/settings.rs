use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use thiserror::Error;

pub const BEAMS_ECM: &str = "Beams:eCM";
pub const HARD_QCD_ALL: &str = "HardQCD:all";
pub const SOFT_QCD_NON_DIFFRACTIVE: &str = "SoftQCD:nonDiffractive";
pub const PT_HAT_MIN: &str = "PhaseSpace:pTHatMin";
pub const PT_HAT_MAX: &str = "PhaseSpace:pTHatMax";
pub const RANDOM_SEED: &str = "Random:seed";
pub const MAX_TRIES: &str = "Next:maxTries";
pub const DNDETA_SCALE: &str = "SoftQCD:dNdEtaScale";

/// Errors raised by the settings database
#[derive(Error, Debug, PartialEq)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Malformed setting line: {0:?}")]
    MalformedLine(String),

    #[error("Setting {key} is a {expected}, cannot assign {value:?}")]
    WrongType {
        key: String,
        expected: &'static str,
        value: String,
    },

    #[error("Setting {key} must be finite, got {value}")]
    NonFinite { key: String, value: f64 },
}

/// Typed value of one registered setting, with its allowed range.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Flag(bool),
    Mode {
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
    },
    Parm {
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },
}

impl SettingValue {
    fn kind(&self) -> &'static str {
        match self {
            SettingValue::Flag(_) => "flag",
            SettingValue::Mode { .. } => "mode",
            SettingValue::Parm { .. } => "parm",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Flag(true) => write!(f, "on"),
            SettingValue::Flag(false) => write!(f, "off"),
            SettingValue::Mode { value, .. } => write!(f, "{}", value),
            SettingValue::Parm { value, .. } => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    default: SettingValue,
    current: SettingValue,
}

/// Key/value settings database handed to the generator at initialization.
///
/// Keys are matched case-insensitively. Numeric values outside a key's
/// bounds are clamped into range rather than rejected, so a negative
/// `PhaseSpace:pTHatMin` becomes zero.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    entries: IndexMap<String, Entry>,
    line_pattern: Regex,
}

impl GeneratorSettings {
    /// Create the database with every supported key at its default.
    pub fn new() -> Self {
        let mut settings = Self {
            entries: IndexMap::new(),
            line_pattern: Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_]*:[A-Za-z0-9_]+)\s*=\s*(\S+)\s*$")
                .expect("Invalid settings line regex"),
        };

        settings.register_parm(BEAMS_ECM, 14_000.0, Some(10.0), None);
        settings.register_flag(HARD_QCD_ALL, false);
        settings.register_flag(SOFT_QCD_NON_DIFFRACTIVE, false);
        settings.register_parm(PT_HAT_MIN, 0.0, Some(0.0), None);
        settings.register_parm(PT_HAT_MAX, -1.0, None, None);
        settings.register_mode(RANDOM_SEED, 19_780_503, Some(0), Some(900_000_000));
        settings.register_mode(MAX_TRIES, 10, Some(1), None);
        settings.register_parm(DNDETA_SCALE, 1.0, Some(0.0), Some(10.0));

        settings
    }

    fn register_flag(&mut self, name: &str, default: bool) {
        self.register(name, SettingValue::Flag(default));
    }

    fn register_mode(&mut self, name: &str, default: i64, min: Option<i64>, max: Option<i64>) {
        self.register(
            name,
            SettingValue::Mode {
                value: default,
                min,
                max,
            },
        );
    }

    fn register_parm(&mut self, name: &str, default: f64, min: Option<f64>, max: Option<f64>) {
        self.register(
            name,
            SettingValue::Parm {
                value: default,
                min,
                max,
            },
        );
    }

    fn register(&mut self, name: &str, value: SettingValue) {
        self.entries.insert(
            name.to_lowercase(),
            Entry {
                name: name.to_string(),
                default: value.clone(),
                current: value,
            },
        );
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut Entry, SettingsError> {
        self.entries
            .get_mut(&key.to_lowercase())
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))
    }

    fn entry(&self, key: &str) -> Result<&Entry, SettingsError> {
        self.entries
            .get(&key.to_lowercase())
            .ok_or_else(|| SettingsError::UnknownKey(key.to_string()))
    }

    /// Apply one `Key:sub = value` line.
    pub fn read_string(&mut self, line: &str) -> Result<(), SettingsError> {
        let captures = self
            .line_pattern
            .captures(line)
            .ok_or_else(|| SettingsError::MalformedLine(line.to_string()))?;
        let key = captures[1].to_string();
        let raw = captures[2].to_string();

        let wrong_type = |expected: &'static str| SettingsError::WrongType {
            key: key.clone(),
            expected,
            value: raw.clone(),
        };

        let kind = self.entry(&key)?.current.kind();
        match kind {
            "flag" => {
                let value = parse_flag(&raw).ok_or_else(|| wrong_type("flag"))?;
                self.set_flag(&key, value)
            }
            "mode" => {
                let value: i64 = raw.parse().map_err(|_| wrong_type("mode"))?;
                self.set_mode(&key, value)
            }
            _ => {
                let value: f64 = raw.parse().map_err(|_| wrong_type("parm"))?;
                self.set_parm(&key, value)
            }
        }
    }

    pub fn set_flag(&mut self, key: &str, value: bool) -> Result<(), SettingsError> {
        let entry = self.entry_mut(key)?;
        match &mut entry.current {
            SettingValue::Flag(current) => {
                *current = value;
                Ok(())
            }
            other => Err(SettingsError::WrongType {
                key: key.to_string(),
                expected: other.kind(),
                value: value.to_string(),
            }),
        }
    }

    pub fn set_mode(&mut self, key: &str, value: i64) -> Result<(), SettingsError> {
        let entry = self.entry_mut(key)?;
        match &mut entry.current {
            SettingValue::Mode {
                value: current,
                min,
                max,
            } => {
                let mut v = value;
                if let Some(lo) = *min {
                    v = v.max(lo);
                }
                if let Some(hi) = *max {
                    v = v.min(hi);
                }
                *current = v;
                Ok(())
            }
            other => Err(SettingsError::WrongType {
                key: key.to_string(),
                expected: other.kind(),
                value: value.to_string(),
            }),
        }
    }

    pub fn set_parm(&mut self, key: &str, value: f64) -> Result<(), SettingsError> {
        if !value.is_finite() {
            return Err(SettingsError::NonFinite {
                key: key.to_string(),
                value,
            });
        }

        let entry = self.entry_mut(key)?;
        match &mut entry.current {
            SettingValue::Parm {
                value: current,
                min,
                max,
            } => {
                let mut v = value;
                if let Some(lo) = *min {
                    v = v.max(lo);
                }
                if let Some(hi) = *max {
                    v = v.min(hi);
                }
                *current = v;
                Ok(())
            }
            other => Err(SettingsError::WrongType {
                key: key.to_string(),
                expected: other.kind(),
                value: value.to_string(),
            }),
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool, SettingsError> {
        match self.entry(key)?.current {
            SettingValue::Flag(v) => Ok(v),
            ref other => Err(self.type_error(key, "flag", other)),
        }
    }

    pub fn mode(&self, key: &str) -> Result<i64, SettingsError> {
        match self.entry(key)?.current {
            SettingValue::Mode { value, .. } => Ok(value),
            ref other => Err(self.type_error(key, "mode", other)),
        }
    }

    pub fn parm(&self, key: &str) -> Result<f64, SettingsError> {
        match self.entry(key)?.current {
            SettingValue::Parm { value, .. } => Ok(value),
            ref other => Err(self.type_error(key, "parm", other)),
        }
    }

    fn type_error(&self, key: &str, expected: &'static str, found: &SettingValue) -> SettingsError {
        SettingsError::WrongType {
            key: key.to_string(),
            expected,
            value: found.to_string(),
        }
    }

    /// Settings whose value differs from the default, in registration order.
    pub fn changed(&self) -> Vec<(&str, &SettingValue)> {
        self.entries
            .values()
            .filter(|e| e.current != e.default)
            .map(|e| (e.name.as_str(), &e.current))
            .collect()
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
