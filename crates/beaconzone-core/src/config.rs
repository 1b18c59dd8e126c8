//! Application configuration management.
//!
//! Handles loading, saving, and validating beaconzone configuration including:
//! - Presence threshold and Leave behaviour of the region detector
//! - Scanning regions
//! - Zone names and notification messages
//! - Advisory scan cadence for the external scanner
//! - HTTP server settings

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::region::Region;
use crate::zones::{default_zones, Zone};

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_ENV: &str = "BEACONZONE_CONFIG";

/// Default presence threshold in meters.
pub const DEFAULT_PRESENCE_THRESHOLD: f64 = 4.0;

static PROXIMITY_UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("proximity UUID pattern is valid")
});

/// Returns `true` if the string is a hyphenated proximity UUID.
#[must_use]
pub fn is_valid_proximity_uuid(value: &str) -> bool {
    PROXIMITY_UUID_RE.is_match(value)
}

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    WriteError {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("Invalid configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single field failed validation.
    #[error("{field}: {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Several fields failed validation.
    #[error("{} validation errors", .0.len())]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Region detector settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Distance in meters at or under which a beacon counts as present.
    pub presence_threshold: f64,

    /// Return to the absent state after a same-zone Leave.
    pub reset_on_leave: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
            reset_on_leave: false,
        }
    }
}

/// Scan cadence suggested to the external scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Foreground scan window in milliseconds.
    pub foreground_period_ms: u64,
    /// Foreground wait between scans in milliseconds.
    pub foreground_wait_ms: u64,
    /// Background scan window in milliseconds.
    pub background_period_ms: u64,
    /// Background wait between scans in milliseconds.
    pub background_wait_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            foreground_period_ms: 1000,
            foreground_wait_ms: 0,
            background_period_ms: 1000,
            background_wait_ms: 0,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// How many notifications the recent-events log keeps.
    pub recent_event_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            recent_event_capacity: 100,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Region detector settings.
    pub detector: DetectorConfig,

    /// Scanning regions, one ranging session each.
    pub regions: Vec<Region>,

    /// Zone names and messages.
    pub zones: Vec<Zone>,

    /// Advisory scan cadence.
    pub scan: ScanConfig,

    /// HTTP server settings.
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detector: DetectorConfig::default(),
            regions: vec![Region::default()],
            zones: default_zones(),
            scan: ScanConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, malformed or invalid.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), regions = config.regions.len(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, parsed or validated.
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        match Self::load(path.as_ref()) {
            Err(ConfigError::NotFound(missing)) => {
                debug!(path = %missing.display(), "No configuration file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Write configuration to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every field, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns a single `ValidationError` or `MultipleValidationErrors`.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();
        let mut invalid = |field: String, message: &str| {
            errors.push(ConfigError::ValidationError {
                field,
                message: message.to_string(),
            });
        };

        let threshold = self.detector.presence_threshold;
        if !threshold.is_finite() || threshold <= 0.0 {
            invalid(
                "detector.presence_threshold".into(),
                "must be a positive number of meters",
            );
        }

        if self.regions.is_empty() {
            invalid("regions".into(), "at least one region is required");
        }
        for (i, region) in self.regions.iter().enumerate() {
            if region.id.trim().is_empty() {
                invalid(format!("regions[{i}].id"), "must not be empty");
            }
            if self.regions[..i].iter().any(|r| r.id == region.id) {
                invalid(format!("regions[{i}].id"), "duplicate region id");
            }
            if !is_valid_proximity_uuid(&region.proximity_uuid) {
                invalid(
                    format!("regions[{i}].proximity_uuid"),
                    "must be a hyphenated UUID",
                );
            }
        }

        for (i, zone) in self.zones.iter().enumerate() {
            if zone.name.trim().is_empty() {
                invalid(format!("zones[{i}].name"), "must not be empty");
            }
        }

        if self.server.recent_event_capacity == 0 {
            invalid(
                "server.recent_event_capacity".into(),
                "must keep at least one event",
            );
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::MultipleValidationErrors(errors)),
        }
    }

    /// Configuration path: `BEACONZONE_CONFIG` if set, else the platform default.
    #[must_use]
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV).map_or_else(Self::default_path, PathBuf::from)
    }

    /// Platform default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        // On Linux hosts: /etc/beaconzone/config.toml
        // Elsewhere: the per-user config directory
        #[cfg(target_os = "linux")]
        {
            PathBuf::from("/etc/beaconzone/config.toml")
        }
        #[cfg(not(target_os = "linux"))]
        {
            directories::ProjectDirs::from("", "", "beaconzone").map_or_else(
                || PathBuf::from("beaconzone.toml"),
                |dirs| dirs.config_dir().join("config.toml"),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::DEFAULT_PROXIMITY_UUID;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!((config.detector.presence_threshold - 4.0).abs() < f64::EPSILON);
        assert!(!config.detector.reset_on_leave);
        assert_eq!(config.regions[0].proximity_uuid, DEFAULT_PROXIMITY_UUID);
        assert_eq!(config.zones.len(), 3);
        assert_eq!(config.scan.foreground_period_ms, 1000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [detector]
            presence_threshold = 2.5
            "#,
        )
        .unwrap();
        assert!((config.detector.presence_threshold - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.regions, vec![Region::default()]);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_regions_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [[regions]]
            id = "office"
            proximity_uuid = "B9407F30-F5F8-466E-AFF9-25556B57FE6D"
            major = 7171
            "#,
        )
        .unwrap();
        assert_eq!(config.regions.len(), 1);
        assert_eq!(config.regions[0].major, Some(7171));
        assert_eq!(config.regions[0].minor, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.detector.presence_threshold = -1.0;
        config.regions[0].proximity_uuid = "not-a-uuid".into();
        config.server.recent_event_capacity = 0;

        match config.validate() {
            Err(ConfigError::MultipleValidationErrors(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_duplicate_and_missing_regions() {
        let mut config = Config::default();
        config.regions.push(Region::default());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { ref field, .. }) if field == "regions[1].id"
        ));

        config.regions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_threshold_is_rejected() {
        let mut config = Config::default();
        config.detector.presence_threshold = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.detector.reset_on_leave = true;
        config.server.port = 8081;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(_))));
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "detector = [").unwrap();

        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_uuid_validation() {
        assert!(is_valid_proximity_uuid(DEFAULT_PROXIMITY_UUID));
        assert!(is_valid_proximity_uuid("B9407F30-F5F8-466E-AFF9-25556B57FE6D"));
        assert!(!is_valid_proximity_uuid("b9407f30f5f8466eaff925556b57fe6d"));
        assert!(!is_valid_proximity_uuid(""));
    }
}
