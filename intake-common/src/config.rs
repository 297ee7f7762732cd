//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a small TOML file. Every field has a
//! built-in default, so a missing file (or a missing section) still
//! yields a usable configuration.
//!
//! # Resolution priority
//!
//! 1. Command-line argument (`--config <path>`)
//! 2. Environment variable (`INTAKE_CONFIG`)
//! 3. User config file (`<config dir>/intake/config.toml`)
//! 4. Compiled defaults
//!
//! An explicitly requested file (priority 1 or 2) that cannot be read
//! or parsed is an error. The implicit user file is optional.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "INTAKE_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct IntakeConfig {
    pub survey: SurveyConfig,
    pub capture: CaptureConfig,
    pub speech: SpeechConfig,
    pub events: EventsConfig,
    pub logging: LoggingConfig,
}

/// Survey input rules
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurveyConfig {
    /// Inclusive lower bound for numeric answers (age)
    pub min_age: i64,
    /// Inclusive upper bound for numeric answers (age)
    pub max_age: i64,
    /// Minimum character count for long-text answers
    pub min_long_text_len: usize,
    /// Optional JSON catalog replacing the built-in questionnaire
    pub catalog_path: Option<PathBuf>,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 80,
            min_long_text_len: 5,
            catalog_path: None,
        }
    }
}

/// Photo capture timing and picker options
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    /// First value shown by the guided countdown (3 → "3, 2, 1")
    pub countdown_from: u8,
    /// Countdown cadence in milliseconds
    pub tick_ms: u64,
    /// Delay before re-opening the gallery picker for the next step
    pub gallery_reprompt_ms: u64,
    /// Picker compression quality (0.0-1.0)
    pub picker_quality: f32,
    /// Whether the picker offers basic crop/edit
    pub allow_editing: bool,
    /// Camera facing on entry ("front" or "back")
    pub default_facing: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            tick_ms: 1000,
            gallery_reprompt_ms: 500,
            picker_quality: 0.9,
            allow_editing: true,
            default_facing: "front".to_string(),
        }
    }
}

/// Speech synthesis voice settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "tr-TR".to_string(),
            rate: 0.9,
            pitch: 1.0,
        }
    }
}

/// Event bus sizing
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast channel capacity
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl IntakeConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: IntakeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::NotFound(format!("config file {}", path.display()))
            }
            _ => Error::Config(format!("Cannot read config file {}: {}", path.display(), e)),
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.survey.min_age > self.survey.max_age {
            return Err(Error::Config(format!(
                "survey.min_age ({}) exceeds survey.max_age ({})",
                self.survey.min_age, self.survey.max_age
            )));
        }
        if !(0.0..=1.0).contains(&self.capture.picker_quality) {
            return Err(Error::Config(format!(
                "capture.picker_quality must be within 0.0-1.0, got {}",
                self.capture.picker_quality
            )));
        }
        if !matches!(self.capture.default_facing.as_str(), "front" | "back") {
            return Err(Error::Config(format!(
                "capture.default_facing must be \"front\" or \"back\", got \"{}\"",
                self.capture.default_facing
            )));
        }
        if self.events.capacity == 0 {
            return Err(Error::Config("events.capacity must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Where a resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    Defaults,
}

/// Resolves the configuration file following the priority order above
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    app_name: String,
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            cli_path: None,
        }
    }

    /// Set the path given on the command line (highest priority)
    pub fn with_cli_path(mut self, path: Option<PathBuf>) -> Self {
        self.cli_path = path;
        self
    }

    /// Determine which source applies, without reading it
    pub fn source(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        if let Some(path) = self.user_config_path() {
            if path.exists() {
                return ConfigSource::UserFile(path);
            }
        }

        ConfigSource::Defaults
    }

    /// Resolve and load the configuration
    pub fn resolve(&self) -> Result<(IntakeConfig, ConfigSource)> {
        let source = self.source();
        let config = match &source {
            ConfigSource::CommandLine(path) | ConfigSource::Environment(path) => {
                IntakeConfig::load(path)?
            }
            ConfigSource::UserFile(path) => match IntakeConfig::load(path) {
                Ok(config) => config,
                Err(e) => {
                    // Optional file: degrade to defaults rather than refuse to start
                    warn!("Ignoring unusable config file {}: {}", path.display(), e);
                    IntakeConfig::default()
                }
            },
            ConfigSource::Defaults => {
                info!("No config file found, using compiled defaults");
                IntakeConfig::default()
            }
        };
        Ok((config, source))
    }

    /// `<config dir>/<app>/config.toml`, if the platform has a config dir
    pub fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(&self.app_name).join("config.toml"))
    }
}
