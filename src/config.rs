use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding storage.json and logs/
    pub data: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idea2code")
        .to_string_lossy()
        .into_owned()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: default_data_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to log to file in TUI mode (false = stderr for debugging)
    #[serde(default = "default_log_to_file")]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: default_log_to_file(),
        }
    }
}

/// Simulated back end and retry policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Response delay of the simulated back end
    #[serde(default = "default_submission_delay")]
    pub delay_ms: u64,
    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,
    /// Number of initial calls the simulated back end fails
    #[serde(default)]
    pub simulate_failures: u32,
}

fn default_submission_delay() -> u64 {
    1500
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_base_delay() -> u64 {
    250
}

fn default_retry_max_delay() -> u64 {
    2000
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_submission_delay(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            retry_max_delay_ms: default_retry_max_delay(),
            simulate_failures: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// How long the login screen shows its progress state
    #[serde(default = "default_login_delay")]
    pub login_delay_ms: u64,
}

fn default_login_delay() -> u64 {
    1000
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_delay_ms: default_login_delay(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Check contact emails against an address pattern
    #[serde(default = "default_email_format")]
    pub email_format: bool,
}

fn default_email_format() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            email_format: default_email_format(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_tick_rate() -> u64 {
    250
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl Config {
    /// User config in ~/.config/idea2code/
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("idea2code").join("config.toml"))
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the app works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        // Environment variables with IDEA2CODE__ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("IDEA2CODE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to the user config location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path =
            Self::user_config_path().context("Could not determine user config directory")?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to the data directory
    pub fn data_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.data);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Path of the local key-value document
    pub fn storage_path(&self) -> PathBuf {
        self.data_path().join("storage.json")
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
            submission: SubmissionConfig::default(),
            auth: AuthConfig::default(),
            validation: ValidationConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.submission.delay_ms, 1500);
        assert_eq!(config.submission.max_retries, 3);
        assert_eq!(config.submission.retry_base_delay_ms, 250);
        assert_eq!(config.submission.retry_max_delay_ms, 2000);
        assert_eq!(config.auth.login_delay_ms, 1000);
        assert!(config.validation.email_format);
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert!(config.paths.data.ends_with("idea2code"));
    }

    #[test]
    fn test_paths_derive_from_data_dir() {
        let mut config = Config::default();
        config.paths.data = "/var/lib/idea2code".to_string();
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/var/lib/idea2code/storage.json")
        );
        assert_eq!(config.logs_path(), PathBuf::from("/var/lib/idea2code/logs"));
    }

    #[test]
    fn test_relative_data_dir_is_made_absolute() {
        let mut config = Config::default();
        config.paths.data = "profile".to_string();
        assert!(config.data_path().is_absolute());
        assert!(config.data_path().ends_with("profile"));
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[submission]\ndelay_ms = 10\nsimulate_failures = 2\n\n[validation]\nemail_format = false\n",
        )
        .unwrap();

        let config = Config::load(path.to_str()).unwrap();
        assert_eq!(config.submission.delay_ms, 10);
        assert_eq!(config.submission.simulate_failures, 2);
        assert_eq!(config.submission.max_retries, 3);
        assert!(!config.validation.email_format);
    }

    #[test]
    fn test_save_to_writes_loadable_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.paths.data = temp_dir.path().to_string_lossy().into_owned();
        config.ui.tick_rate_ms = 100;
        config.save_to(&path).unwrap();

        let loaded = Config::load(path.to_str()).unwrap();
        assert_eq!(loaded.ui.tick_rate_ms, 100);
        assert_eq!(loaded.paths.data, config.paths.data);
    }
}
