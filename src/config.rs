//! Configuration system for scg.
//!
//! Layers, highest priority first:
//! 1. Environment variables
//! 2. Project config (.scg.toml in the working directory)
//! 3. User config (~/.config/scg/config.toml)
//! 4. Compiled defaults (lowest priority)
//!
//! Loading is fail-soft: unreadable or malformed files are skipped so a bad
//! config can never wedge the hook.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogFormat;

/// Per-project config file, looked up in the working directory.
const PROJECT_CONFIG_NAME: &str = ".scg.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display and verbosity settings.
    pub general: GeneralConfig,

    /// Decision logging settings.
    pub logging: LoggingConfig,
}

/// Display and verbosity options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// When to colorize CLI output: "auto", "always", or "never".
    pub color: String,

    /// Whether to show verbose output in CLI mode.
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            color: "auto".to_string(),
            verbose: false,
        }
    }
}

/// Decision logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Path to log file. Supports ~ expansion. Logging is off when unset.
    pub file: Option<String>,

    /// Output format: "text" or "json".
    pub format: LogFormat,
}

/// One config file's contents. Every field is optional so that a layer only
/// overrides what it actually writes down, even when the written value
/// happens to equal a default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigOverlay {
    general: GeneralOverlay,
    logging: LoggingOverlay,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GeneralOverlay {
    color: Option<String>,
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingOverlay {
    file: Option<String>,
    format: Option<LogFormat>,
}

impl ConfigOverlay {
    fn load(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;
        toml::from_str(&contents).ok()
    }
}

impl Config {
    /// Load configuration from all layers.
    #[must_use]
    pub fn load() -> Self {
        let mut config = Self::default();
        if let Some(path) = user_config_path() {
            if let Some(user) = ConfigOverlay::load(&path) {
                config.apply(user);
            }
        }
        if let Some(project) = ConfigOverlay::load(Path::new(PROJECT_CONFIG_NAME)) {
            config.apply(project);
        }
        config.apply_env();
        config
    }

    /// Load a single config file over the defaults, returning None when it
    /// is missing or malformed.
    #[must_use]
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let overlay = ConfigOverlay::load(path)?;
        let mut config = Self::default();
        config.apply(overlay);
        Some(config)
    }

    fn apply(&mut self, overlay: ConfigOverlay) {
        if let Some(color) = overlay.general.color {
            self.general.color = color;
        }
        if let Some(verbose) = overlay.general.verbose {
            self.general.verbose = verbose;
        }
        if let Some(file) = overlay.logging.file {
            self.logging.file = Some(file);
        }
        if let Some(format) = overlay.logging.format {
            self.logging.format = format;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(file) = env::var("SCG_LOG_FILE") {
            if !file.is_empty() {
                self.logging.file = Some(file);
            }
        }
        if let Ok(format) = env::var("SCG_LOG_FORMAT") {
            match format.as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "text" => self.logging.format = LogFormat::Text,
                _ => {}
            }
        }
        if let Ok(color) = env::var("SCG_COLOR") {
            if matches!(color.as_str(), "auto" | "always" | "never") {
                self.general.color = color;
            }
        }
    }
}

/// Path to the user config file, if a config directory exists.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scg").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.general.color, "auto");
        assert!(!config.general.verbose);
        assert!(config.logging.file.is_none());
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn load_from_file_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[general]\ncolor = \"never\"\n[logging]\nfile = \"~/.scg/decisions.log\"\nformat = \"json\"\n",
        )
        .unwrap();
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.general.color, "never");
        assert_eq!(config.logging.file.as_deref(), Some("~/.scg/decisions.log"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn load_from_file_malformed_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(Config::load_from_file(&path).is_none());
        assert!(Config::load_from_file(&dir.path().join("missing.toml")).is_none());
    }

    #[test]
    fn overlay_touches_only_written_fields() {
        let mut base = Config::default();
        base.logging.file = Some("user.log".to_string());
        let overlay: ConfigOverlay = toml::from_str("[general]\ncolor = \"never\"\n").unwrap();
        base.apply(overlay);
        assert_eq!(base.general.color, "never");
        assert_eq!(base.logging.file.as_deref(), Some("user.log"));
    }

    #[test]
    fn explicit_default_value_still_overrides() {
        // A project file writing `format = "text"` must win over a user-level
        // `format = "json"` even though "text" is the compiled default.
        let mut base = Config::default();
        base.logging.format = LogFormat::Json;
        let overlay: ConfigOverlay = toml::from_str("[logging]\nformat = \"text\"\n").unwrap();
        base.apply(overlay);
        assert_eq!(base.logging.format, LogFormat::Text);

        let untouched: ConfigOverlay = toml::from_str("[general]\nverbose = true\n").unwrap();
        let mut base = Config::default();
        base.logging.format = LogFormat::Json;
        base.apply(untouched);
        assert_eq!(base.logging.format, LogFormat::Json);
    }
}
