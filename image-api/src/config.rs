//! Service configuration.
//!
//! Defaults are built in; an optional JSON file overrides them field by field.
//! The resulting [`Settings`] is loaded once at startup and shared read-only.
//! A missing or malformed file is not fatal; defaults are used instead.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Top-level settings, one section per concern.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub crictl_config: CrictlConfig,
    pub harbor_config: HarborConfig,
    pub app_config: AppConfig,
}

/// Local runtime (crictl) settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrictlConfig {
    pub ignore_file_path: String,
    /// Image listing command; the first element is the program.
    pub command: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for CrictlConfig {
    fn default() -> Self {
        Self {
            ignore_file_path: "images_to_ignore.txt".to_string(),
            command: vec!["sudo".into(), "crictl".into(), "images".into()],
            timeout_secs: 30,
        }
    }
}

impl CrictlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Harbor registry settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarborConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    /// Restricts the walk to a single project when non-empty.
    pub project_name: String,
    pub page_size: u32,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
}

impl Default for HarborConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            user: String::new(),
            password: String::new(),
            project_name: String::new(),
            page_size: 100,
            verify_ssl: true,
            timeout_secs: 30,
        }
    }
}

impl HarborConfig {
    /// True when url, user and password are all set.
    pub fn is_complete(&self) -> bool {
        !self.url.is_empty() && !self.user.is_empty() && !self.password.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP server and logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[serde(alias = "jsonify_prettyprint_regular")]
    pub pretty_json: bool,
    #[serde(alias = "log_level_app")]
    pub log_level: String,
    pub log_file: Option<String>,
    pub log_rotation: LogRotation,
    #[serde(alias = "log_backup_count")]
    pub log_max_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            pretty_json: true,
            log_level: "warn".to_string(),
            log_file: None,
            log_rotation: LogRotation::Daily,
            log_max_files: 3,
        }
    }
}

impl AppConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

impl Settings {
    /// Read and parse `path`.
    ///
    /// Callers fall back to [`Settings::default`] on error; the binary does so
    /// after logging is up so the warning is not lost.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.crictl_config.ignore_file_path, "images_to_ignore.txt");
        assert_eq!(settings.crictl_config.command, ["sudo", "crictl", "images"]);
        assert_eq!(settings.crictl_config.timeout(), Duration::from_secs(30));
        assert_eq!(settings.harbor_config.page_size, 100);
        assert!(settings.harbor_config.verify_ssl);
        assert!(!settings.harbor_config.is_complete());
        assert_eq!(settings.app_config.listen_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn test_partial_sections_merge_over_defaults() {
        let settings = Settings::from_json(
            r#"{
                "harbor_config": {"url": "https://harbor.local", "user": "admin", "password": "x"},
                "app_config": {"port": 8080, "jsonify_prettyprint_regular": false}
            }"#,
        )
        .unwrap();

        assert!(settings.harbor_config.is_complete());
        assert_eq!(settings.harbor_config.page_size, 100);
        assert_eq!(settings.app_config.port, 8080);
        assert_eq!(settings.app_config.host, "0.0.0.0");
        assert!(!settings.app_config.pretty_json);
        assert_eq!(settings.crictl_config.ignore_file_path, "images_to_ignore.txt");
    }

    #[test]
    fn test_legacy_keys_accepted() {
        let settings = Settings::from_json(
            r#"{"app_config": {"debug": true, "log_level_app": "INFO", "log_backup_count": 7, "log_max_bytes": 10}}"#,
        )
        .unwrap();
        assert_eq!(settings.app_config.log_level, "INFO");
        assert_eq!(settings.app_config.log_max_files, 7);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Settings::try_load("/nonexistent/config.json"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_malformed_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(
            Settings::try_load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"harbor_config": {"page_size": 25}}"#).unwrap();
        let settings = Settings::try_load(file.path()).unwrap();
        assert_eq!(settings.harbor_config.page_size, 25);
        assert!(settings.harbor_config.verify_ssl);
    }

    #[test]
    fn test_incomplete_harbor_config() {
        let mut cfg = HarborConfig {
            url: "https://harbor.local".into(),
            user: "admin".into(),
            ..Default::default()
        };
        assert!(!cfg.is_complete());
        cfg.password = "secret".into();
        assert!(cfg.is_complete());
    }
}
