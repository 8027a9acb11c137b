use crate::error::{Result, ReviewError};
use crate::i18n::Translator;
use crate::paths;
use crate::planner::{DEFAULT_UNDO_WINDOW_MS, MAX_UNDO_WINDOW_MS};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    250
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// BatchConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_undo_window_ms")]
    pub undo_window_ms: u64,
}

fn default_undo_window_ms() -> u64 {
    DEFAULT_UNDO_WINDOW_MS
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            undo_window_ms: default_undo_window_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// AssetSource
// ---------------------------------------------------------------------------

/// Where decisions go. `Local` is the demo mode: the board comes from
/// `.review/assets.yaml` (a built-in demo set until first saved) and
/// decisions are written back there without calling the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSource {
    #[default]
    Api,
    Local,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub asset_source: AssetSource,
}

fn default_version() -> u32 {
    1
}

fn default_locale() -> String {
    crate::i18n::DEFAULT_LOCALE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            batch: BatchConfig::default(),
            locale: default_locale(),
            asset_source: AssetSource::default(),
        }
    }
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                ..ApiConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn is_api_asset_source(&self) -> bool {
        self.asset_source == AssetSource::Api
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(ReviewError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("api.base_url '{url}' must start with http:// or https://"),
            });
        }

        if self.api.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "api.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.retry.max_attempts == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "retry.max_attempts must be at least 1".to_string(),
            });
        }

        if self.batch.undo_window_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "batch.undo_window_ms is 0: queued executions start immediately"
                    .to_string(),
            });
        }

        if self.batch.undo_window_ms > MAX_UNDO_WINDOW_MS {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "batch.undo_window_ms {} exceeds the {MAX_UNDO_WINDOW_MS} ms maximum",
                    self.batch.undo_window_ms
                ),
            });
        }

        if !Translator::default().has_locale(&self.locale) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "no catalog for locale '{}': messages fall back to '{}'",
                    self.locale,
                    crate::i18n::DEFAULT_LOCALE
                ),
            });
        }

        warnings
    }

    pub fn has_errors(&self) -> bool {
        self.validate().iter().any(|w| w.level == WarnLevel::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_yaml_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.api.base_url, "http://localhost:8080");
        assert_eq!(cfg.retry.max_attempts, 3);
        assert_eq!(cfg.batch.undo_window_ms, 6000);
        assert_eq!(cfg.locale, "en");
        assert!(cfg.is_api_asset_source());
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new("https://dam.example.com");
        cfg.asset_source = AssetSource::Local;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.api.base_url, "https://dam.example.com");
        assert_eq!(loaded.asset_source, AssetSource::Local);
    }

    #[test]
    fn load_without_file_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(ReviewError::NotInitialized)
        ));
    }

    #[test]
    fn validate_flags_bad_values() {
        let mut cfg = Config::new("ftp://dam");
        cfg.retry.max_attempts = 0;
        cfg.batch.undo_window_ms = 0;
        cfg.locale = "xx".into();
        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
        assert_eq!(warnings.len(), 4);
        assert!(cfg.has_errors());
    }

    #[test]
    fn validate_rejects_oversized_undo_window() {
        let mut cfg = Config::default();
        cfg.batch.undo_window_ms = MAX_UNDO_WINDOW_MS;
        assert!(!cfg.has_errors());
        cfg.batch.undo_window_ms = 1 << 62;
        assert!(cfg.has_errors());
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_empty());
    }
}
