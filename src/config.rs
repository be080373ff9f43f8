//! Configuration loading for the dojo.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.dojo/config.toml`)
//! 3. User config (`~/.dojo/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::MAX_SCORE;
use crate::error::{DojoError, FailOpen, Result};
use crate::grading::DEFAULT_PASS_THRESHOLD;
use crate::tracker::DEFAULT_XP_PER_LEVEL;
use crate::util::{read_to_string_limited, write_atomic, MAX_FILE_SIZE};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Submission grading.
    pub grading: GradingConfig,
    /// Experience and levels.
    pub xp: XpConfig,
    /// Record store location.
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GradingConfig {
    /// Minimum score that counts as a pass (0-100).
    pub pass_threshold: u8,
}

impl GradingConfig {
    pub fn is_valid_pass_threshold(value: u8) -> bool {
        value <= MAX_SCORE
    }
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct XpConfig {
    /// XP needed to gain one level.
    pub per_level: u32,
}

/// Minimum allowed XP per level.
pub const MIN_XP_PER_LEVEL: u32 = 1;

impl XpConfig {
    pub fn is_valid_per_level(value: u32) -> bool {
        value >= MIN_XP_PER_LEVEL
    }
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            per_level: DEFAULT_XP_PER_LEVEL,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides `<dojo_home>/dojo.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

/// One config file as written. Only the keys present in the file are
/// `Some`, so a layer can set a value equal to the default and still
/// override a lower layer.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigLayer {
    pub grading: GradingLayer,
    pub xp: XpLayer,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GradingLayer {
    pub pass_threshold: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct XpLayer {
    pub per_level: Option<u32>,
}

impl ConfigLayer {
    /// Parse a single config file without applying defaults.
    pub fn load_from_file(path: &Path) -> Result<ConfigLayer> {
        let content = read_to_string_limited(path, MAX_FILE_SIZE)?;
        toml::from_str(&content).map_err(|e| DojoError::config(e.to_string()))
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `<dojo_home>/config.toml`.
    fn load_user_config() -> Option<ConfigLayer> {
        let path = dojo_home()?.join("config.toml");
        Self::load_optional(&path)
    }

    /// Load project config from `.dojo/config.toml` in the given directory.
    fn load_project_config(cwd: &Path) -> Option<ConfigLayer> {
        let path = project_dojo_dir(cwd).join("config.toml");
        Self::load_optional(&path)
    }

    /// A missing file is silently skipped. An unreadable or invalid one is
    /// skipped with a warning.
    fn load_optional(path: &Path) -> Option<ConfigLayer> {
        if !path.exists() {
            return None;
        }
        ConfigLayer::load_from_file(path)
            .map(Some)
            .fail_open_default(&format!("loading {}", path.display()))
    }

    /// Load config from a specific file path, filling unset keys with
    /// defaults.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        Ok(Config::default().merge(ConfigLayer::load_from_file(path)?))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // DOJO_PASS_THRESHOLD
        if let Ok(val) = env::var("DOJO_PASS_THRESHOLD") {
            match val.parse::<u8>() {
                Ok(n) if GradingConfig::is_valid_pass_threshold(n) => {
                    self.grading.pass_threshold = n;
                }
                _ => eprintln!(
                    "Warning: Invalid DOJO_PASS_THRESHOLD value '{}'. \
                    Expected 0-{}. Using '{}'.",
                    val, MAX_SCORE, self.grading.pass_threshold
                ),
            }
        }

        // DOJO_XP_PER_LEVEL
        if let Ok(val) = env::var("DOJO_XP_PER_LEVEL") {
            match val.parse::<u32>() {
                Ok(n) if XpConfig::is_valid_per_level(n) => self.xp.per_level = n,
                _ => eprintln!(
                    "Warning: Invalid DOJO_XP_PER_LEVEL value '{}'. \
                    Must be >= {}. Using '{}'.",
                    val, MIN_XP_PER_LEVEL, self.xp.per_level
                ),
            }
        }

        // DOJO_DATA_FILE
        if let Ok(val) = env::var("DOJO_DATA_FILE") {
            if val.trim().is_empty() {
                eprintln!("Warning: DOJO_DATA_FILE is empty. Ignoring.");
            } else {
                self.storage.data_file = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge a config layer into this one.
    ///
    /// Every key the layer sets wins, including values equal to the
    /// default. Out of range values are skipped with a warning.
    fn merge(mut self, other: ConfigLayer) -> Self {
        if let Some(threshold) = other.grading.pass_threshold {
            if GradingConfig::is_valid_pass_threshold(threshold) {
                self.grading.pass_threshold = threshold;
            } else {
                tracing::warn!(
                    value = threshold,
                    "ignoring out of range grading.pass_threshold"
                );
            }
        }

        if let Some(per_level) = other.xp.per_level {
            if XpConfig::is_valid_per_level(per_level) {
                self.xp.per_level = per_level;
            } else {
                tracing::warn!(value = per_level, "ignoring invalid xp.per_level");
            }
        }

        if other.storage.data_file.is_some() {
            self.storage.data_file = other.storage.data_file;
        }

        self
    }

    /// Resolved record store path: the configured override or
    /// `<dojo_home>/dojo.json`.
    pub fn data_file(&self) -> Option<PathBuf> {
        self.storage.data_file.clone().or_else(default_data_file)
    }

    /// Save configuration to `.dojo/config.toml` in the given directory.
    pub fn save_project(&self, cwd: &Path) -> Result<()> {
        let path = project_dojo_dir(cwd).join("config.toml");
        let content =
            toml::to_string_pretty(self).map_err(|e| DojoError::config(e.to_string()))?;
        write_atomic(&path, content.as_bytes())
    }
}

/// Get the dojo home directory.
///
/// Returns `$DOJO_HOME` if set, otherwise `~/.dojo`. Without a home
/// directory a per-user temp location is used.
pub fn dojo_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("DOJO_HOME") {
        if home.is_empty() {
            tracing::warn!("DOJO_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("DOJO_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".dojo"));
    }

    let fallback_path = fallback_dojo_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

#[cfg(unix)]
fn fallback_dojo_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/dojo-{}", uid))
}

#[cfg(not(unix))]
fn fallback_dojo_home() -> PathBuf {
    std::env::temp_dir().join("dojo")
}

/// `<dojo_home>/dojo.json`.
pub fn default_data_file() -> Option<PathBuf> {
    dojo_home().map(|h| h.join("dojo.json"))
}

/// `<dojo_home>/progress.log`.
pub fn progress_log_path() -> Option<PathBuf> {
    dojo_home().map(|h| h.join("progress.log"))
}

/// `<dojo_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    dojo_home().map(|h| h.join("crash.log"))
}

/// `<cwd>/.dojo`.
pub fn project_dojo_dir(cwd: &Path) -> PathBuf {
    cwd.join(".dojo")
}
