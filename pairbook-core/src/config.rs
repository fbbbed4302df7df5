use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "PAIRBOOK_CONFIG";
/// Environment variable overriding the contacts file location
pub const CONTACTS_FILE_ENV: &str = "PAIRBOOK_FILE";

const APP_DIR: &str = "pairbook";

/// User configuration, read from `config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Contacts file to use when neither `--file` nor PAIRBOOK_FILE is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts_path: Option<PathBuf>,

    /// Tracing filter directive used when RUST_LOG is not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Config {
    /// Loads the config from the provided path. A missing file gives the
    /// default config.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Save the config to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;

        // Ensure parent directories exist
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(config_dir.join(APP_DIR).join("config.yaml"))
}

/// Determines the contacts file to use
///
/// Priority: the `--file` option, then PAIRBOOK_FILE, then `contacts_path`
/// from the config, then `contacts.yaml` in the user's data directory.
pub fn determine_contacts_path(file_option: Option<&Path>, config: &Config) -> Result<PathBuf> {
    resolve_contacts_path(
        file_option,
        env::var(CONTACTS_FILE_ENV).ok(),
        config,
        dirs::data_dir(),
    )
}

fn resolve_contacts_path(
    file_option: Option<&Path>,
    env_value: Option<String>,
    config: &Config,
    data_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = file_option {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }
    if let Some(path) = &config.contacts_path {
        return Ok(path.clone());
    }
    let data_dir = data_dir.context("Failed to determine data directory")?;
    Ok(data_dir.join(APP_DIR).join("contacts.yaml"))
}
