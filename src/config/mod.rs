use crate::models::CampaignConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// Default campaign configuration file name
pub const CAMPAIGN_CONFIG_FILE: &str = "minbias-campaign.yaml";

/// Prefix of environment overrides (`MINBIAS_NCPU`, `MINBIAS_TRACKLIST__ENABLED`, ...)
pub const ENV_PREFIX: &str = "MINBIAS";

/// Configuration manager for the campaign launcher.
///
/// Sources, lowest precedence first:
/// - serde defaults of [`CampaignConfig`]
/// - the YAML file, if present
/// - `MINBIAS_*` environment variables, `__` separating nested keys
///
/// Command-line flags are applied on top by the launcher itself.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    campaign_config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager rooted at `config_dir`.
    ///
    /// # Arguments
    /// * `config_dir` - Directory holding `minbias-campaign.yaml`; created if missing
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            campaign_config_path: config_dir.join(CAMPAIGN_CONFIG_FILE),
            config_dir,
        })
    }

    /// Use an explicit configuration file instead of the default name.
    pub fn for_file<P: AsRef<Utf8Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let config_dir = match path.parent() {
            Some(dir) if !dir.as_str().is_empty() => dir.to_path_buf(),
            _ => Utf8PathBuf::from("."),
        };
        Self {
            config_dir,
            campaign_config_path: path,
        }
    }

    /// Load the campaign configuration, overlaying the process environment.
    ///
    /// # Returns
    /// The merged CampaignConfig; defaults when neither file nor variables exist
    pub fn load_campaign_config(&self) -> Result<CampaignConfig> {
        self.load_campaign_config_with_env(None)
    }

    /// Load the campaign configuration with an explicit environment.
    ///
    /// `env` replaces the process environment as the override source when
    /// given, which keeps tests independent of the caller's variables.
    pub fn load_campaign_config_with_env(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<CampaignConfig> {
        if self.campaign_config_path.exists() {
            tracing::info!("Loading campaign config from {}", self.campaign_config_path);
        } else {
            tracing::warn!(
                "Campaign config file not found at {}, using defaults",
                self.campaign_config_path
            );
        }

        let settings = Config::builder()
            .add_source(
                File::from(self.campaign_config_path.as_std_path())
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| {
                format!("Failed to read campaign config: {}", self.campaign_config_path)
            })?;

        let config: CampaignConfig = settings.try_deserialize().with_context(|| {
            format!("Failed to parse campaign config: {}", self.campaign_config_path)
        })?;

        tracing::debug!("Campaign config: {:?}", config);
        Ok(config)
    }

    /// Save the campaign configuration file.
    ///
    /// # Arguments
    /// * `config` - The CampaignConfig to save
    pub fn save_campaign_config(&self, config: &CampaignConfig) -> Result<()> {
        let yaml_string = serde_yaml_ng::to_string(config)
            .context("Failed to serialize campaign config to YAML")?;

        fs::write(&self.campaign_config_path, yaml_string).with_context(|| {
            format!("Failed to write campaign config: {}", self.campaign_config_path)
        })?;

        tracing::info!("Saved campaign config to {}", self.campaign_config_path);
        Ok(())
    }

    pub fn campaign_config_path(&self) -> &Utf8Path {
        &self.campaign_config_path
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        let config = manager.load_campaign_config_with_env(no_env()).unwrap();
        assert_eq!(config, CampaignConfig::default());
    }

    #[test]
    fn test_load_save_campaign_config() {
        let (manager, _temp_dir) = create_test_config_manager();

        let mut config = CampaignConfig {
            ncpu: 8,
            max_events: 250,
            njobs: Some(2),
            ..Default::default()
        };
        config.tracklist.enabled = true;
        config.labels.insert("tune".to_string(), "default".to_string());
        manager.save_campaign_config(&config).unwrap();

        let loaded = manager.load_campaign_config_with_env(no_env()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.campaign_config_path(), "ncpu: 2\npt_max: 1.0\n").unwrap();

        let config = manager.load_campaign_config_with_env(no_env()).unwrap();
        assert_eq!(config.ncpu, 2);
        assert_eq!(config.pt_max, 1.0);
        assert_eq!(config.max_events, 1000);
        assert_eq!(config.n_bins, 20);
    }

    #[test]
    fn test_environment_overrides_file() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.campaign_config_path(), "ncpu: 2\n").unwrap();

        let mut env = config::Map::new();
        env.insert("MINBIAS_NCPU".to_string(), "6".to_string());
        env.insert("MINBIAS_TRACKLIST__NPARTICLES".to_string(), "-1".to_string());

        let config = manager.load_campaign_config_with_env(Some(env)).unwrap();
        assert_eq!(config.ncpu, 6);
        assert_eq!(config.tracklist.nparticles, -1);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.campaign_config_path(), "ncpu: [not, a, number\n").unwrap();
        assert!(manager.load_campaign_config_with_env(no_env()).is_err());
    }

    #[test]
    fn test_for_file() {
        let manager = ConfigManager::for_file("runs/campaign.yaml");
        assert_eq!(manager.config_dir(), Utf8Path::new("runs"));
        assert_eq!(manager.campaign_config_path(), Utf8Path::new("runs/campaign.yaml"));

        let bare = ConfigManager::for_file("campaign.yaml");
        assert_eq!(bare.config_dir(), Utf8Path::new("."));
    }
}
