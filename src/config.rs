use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 120;

/// TOML configuration file format
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub update: UpdateSection,
    #[serde(default)]
    pub run: RunSection,
}

/// `[update]` section of the configuration file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpdateSection {
    /// Check for new releases before running the wrapped command
    #[serde(default = "default_auto_update")]
    pub auto_update: bool,
    /// Minimum time between remote checks
    #[serde(default = "default_check_interval_minutes")]
    pub check_interval_minutes: u64,
    /// Update to this exact version instead of asking the release index
    pub pinned_version: Option<String>,
    /// Override the release index endpoint (mirrors)
    pub release_index_url: Option<String>,
    /// Override the artifact download base (mirrors)
    pub download_base_url: Option<String>,
}

/// `[run]` section: the command the launcher wraps
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RunSection {
    pub command: Option<String>,
    /// Arguments always passed before the invocation's own
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_auto_update() -> bool {
    true
}

fn default_check_interval_minutes() -> u64 {
    DEFAULT_CHECK_INTERVAL_MINUTES
}

impl Default for UpdateSection {
    fn default() -> Self {
        Self {
            auto_update: default_auto_update(),
            check_interval_minutes: default_check_interval_minutes(),
            pinned_version: None,
            release_index_url: None,
            download_base_url: None,
        }
    }
}

impl UpdateSection {
    /// Settle the file settings against the invocation's command line into
    /// the immutable per-invocation update configuration.
    pub fn to_update_config(
        &self,
        auto_update_override: Option<bool>,
        pinned_override: Option<String>,
    ) -> UpdateConfig {
        UpdateConfig {
            auto_update_override,
            auto_update: self.auto_update,
            check_interval: Duration::from_secs(self.check_interval_minutes * 60),
            pinned_version: pinned_override.or_else(|| self.pinned_version.clone()),
            release_index_url: self.release_index_url.clone(),
            download_base_url: self.download_base_url.clone(),
        }
    }
}

/// Update settings for one invocation. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct UpdateConfig {
    /// Command-line tri-state: unset, forced on, or forced off
    pub auto_update_override: Option<bool>,
    /// Config-level default
    pub auto_update: bool,
    pub check_interval: Duration,
    /// Use this version verbatim instead of querying the release index
    pub pinned_version: Option<String>,
    pub release_index_url: Option<String>,
    pub download_base_url: Option<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        UpdateSection::default().to_update_config(None, None)
    }
}

/// Default configuration file location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("uprun").join("uprun.toml"))
}

/// Load the configuration file.
///
/// An explicitly given path must exist; a missing file at the default
/// location just yields the defaults.
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    let path = match path {
        Some(explicit) => explicit.to_path_buf(),
        None => match default_config_path() {
            Some(default) if default.exists() => default,
            _ => return Ok(FileConfig::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config TOML: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[update]
auto_update = false
check_interval_minutes = 30
pinned_version = "1.2.3"
release_index_url = "https://mirror.example.com/releases/latest"
download_base_url = "https://mirror.example.com/releases/download"

[run]
command = "terraform"
args = ["plan"]
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.update.auto_update);
        assert_eq!(config.update.check_interval_minutes, 30);
        assert_eq!(config.update.pinned_version.as_deref(), Some("1.2.3"));
        assert_eq!(config.run.command.as_deref(), Some("terraform"));
        assert_eq!(config.run.args, vec!["plan".to_string()]);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert!(config.update.auto_update);
        assert_eq!(
            config.update.check_interval_minutes,
            DEFAULT_CHECK_INTERVAL_MINUTES
        );
        assert!(config.update.pinned_version.is_none());
        assert!(config.run.command.is_none());
        assert!(config.run.args.is_empty());
    }

    #[test]
    fn test_to_update_config_converts_interval() {
        let section = UpdateSection {
            check_interval_minutes: 30,
            ..Default::default()
        };
        let config = section.to_update_config(None, None);
        assert_eq!(config.check_interval, Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_command_line_pin_wins_over_file_pin() {
        let section = UpdateSection {
            pinned_version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let config = section.to_update_config(None, Some("2.0.0".to_string()));
        assert_eq!(config.pinned_version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_file_pin_used_without_command_line_pin() {
        let section = UpdateSection {
            pinned_version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let config = section.to_update_config(Some(true), None);
        assert_eq!(config.pinned_version.as_deref(), Some("1.0.0"));
        assert_eq!(config.auto_update_override, Some(true));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(load_file_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("uprun.toml");
        fs::write(&path, "[run]\ncommand = \"echo\"\n").unwrap();

        let config = load_file_config(Some(&path)).unwrap();
        assert_eq!(config.run.command.as_deref(), Some("echo"));
        assert!(config.update.auto_update);
    }
}
