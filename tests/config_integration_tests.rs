// Integration tests for campaign configuration management

use camino::Utf8PathBuf;
use minbias::ConfigManager;
use minbias::models::CampaignConfig;
use std::fs;
use tempfile::TempDir;

fn manager_in(temp_dir: &TempDir) -> ConfigManager {
    let config_dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    ConfigManager::new(&config_dir).unwrap()
}

fn no_env() -> Option<config::Map<String, String>> {
    Some(config::Map::new())
}

#[test]
fn test_config_manager_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = Utf8PathBuf::try_from(temp_dir.path().join("a/b")).unwrap();

    let manager = ConfigManager::new(&nested).unwrap();

    assert!(nested.exists());
    assert_eq!(manager.config_dir(), nested);
    assert_eq!(manager.campaign_config_path(), nested.join("minbias-campaign.yaml"));
}

#[test]
fn test_full_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager_in(&temp_dir);

    let yaml = r#"
out_dir: /data/minbias
ncpu: -1
max_events: 5000
pt_min: 0.0
pt_max: 1.0
n_bins: 10
njobs: 3
timeout_secs: 600
tracklist:
  enabled: true
  nparticles: 500
  float_precision: 4
labels:
  campaign: smartpix
  detector: cms-phase2
"#;
    fs::write(manager.campaign_config_path(), yaml).unwrap();

    let config = manager.load_campaign_config_with_env(no_env()).unwrap();

    assert_eq!(config.out_dir, Utf8PathBuf::from("/data/minbias"));
    assert_eq!(config.ncpu, -1);
    assert_eq!(config.max_events, 5000);
    assert_eq!(config.n_bins, 10);
    assert_eq!(config.njobs, Some(3));
    assert_eq!(config.timeout_secs, Some(600));
    assert!(config.tracklist.enabled);
    assert_eq!(config.tracklist.nparticles, 500);
    assert_eq!(config.tracklist.float_precision, 4);
    assert_eq!(config.labels.get("detector").map(String::as_str), Some("cms-phase2"));
    assert!(config.effective_ncpu() >= 1);
}

#[test]
fn test_env_only_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager_in(&temp_dir);

    let mut env = config::Map::new();
    env.insert("MINBIAS_MAX_EVENTS".to_string(), "77".to_string());
    env.insert("MINBIAS_TRACKLIST__ENABLED".to_string(), "true".to_string());
    env.insert("OTHER_NCPU".to_string(), "99".to_string());

    let config = manager.load_campaign_config_with_env(Some(env)).unwrap();

    assert_eq!(config.max_events, 77);
    assert!(config.tracklist.enabled);
    assert_eq!(config.ncpu, 4);
}

#[test]
fn test_saved_file_is_plain_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager_in(&temp_dir);

    manager.save_campaign_config(&CampaignConfig::default()).unwrap();

    let text = fs::read_to_string(manager.campaign_config_path()).unwrap();
    let parsed: CampaignConfig = serde_yaml_ng::from_str(&text).unwrap();
    assert_eq!(parsed, CampaignConfig::default());
    assert!(text.contains("n_bins: 20"));
}

#[test]
fn test_explicit_file_location() {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().join("custom.yaml")).unwrap();
    fs::write(&path, "n_bins: 4\n").unwrap();

    let manager = ConfigManager::for_file(&path);
    let config = manager.load_campaign_config_with_env(no_env()).unwrap();

    assert_eq!(config.n_bins, 4);
}

#[test]
fn test_labels_keep_file_order() {
    let temp_dir = TempDir::new().unwrap();
    let manager = manager_in(&temp_dir);

    let order = ["zeta", "alpha", "mu", "beta", "omega", "gamma", "kappa", "delta"];
    let mut yaml = String::from("labels:\n");
    for (i, key) in order.iter().enumerate() {
        yaml.push_str(&format!("  {}: v{}\n", key, i));
    }
    fs::write(manager.campaign_config_path(), yaml).unwrap();

    let config = manager.load_campaign_config_with_env(no_env()).unwrap();

    let keys: Vec<&str> = config.labels.keys().map(String::as_str).collect();
    assert_eq!(keys, order);
    assert_eq!(config.labels.get("omega").map(String::as_str), Some("v4"));
}
