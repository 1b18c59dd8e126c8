//! Unified error types for the beaconzone core library.
//!
//! The batch path (merge + region detection) never fails: malformed
//! observations are absorbed as undefined distances instead of raised.
//! Errors only come from configuration handling and from callers asking
//! for a region that is not configured.
//!
//! # Example
//!
//! ```rust
//! use beaconzone_core::error::{BeaconzoneError, Result};
//! use std::path::PathBuf;
//!
//! fn load_config(path: &PathBuf) -> Result<()> {
//!     if !path.exists() {
//!         return Err(BeaconzoneError::ConfigNotFound(path.clone()));
//!     }
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The unified error type for all beaconzone operations.
#[derive(Debug, Error)]
pub enum BeaconzoneError {
    // =========================================================================
    // REGION ERRORS
    // =========================================================================
    /// A batch or query referenced a region id that is not configured.
    #[error("Unknown region: '{0}'. Check the [[regions]] entries in the configuration.")]
    UnknownRegion(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// The configuration file was not found at the expected path.
    #[error("Configuration file not found at: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration file exists but could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// The configuration was parsed but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // =========================================================================
    // PERSISTENCE & I/O ERRORS
    // =========================================================================
    /// An error occurred while persisting or reading data.
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A specialized [`Result`] type for beaconzone operations.
pub type Result<T> = std::result::Result<T, BeaconzoneError>;

impl BeaconzoneError {
    /// Returns `true` if this error is related to configuration.
    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound(_) | Self::ConfigParseError(_) | Self::ConfigValidationError(_)
        )
    }

    /// Returns `true` if this error is related to I/O or persistence.
    #[inline]
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::PersistenceError(_) | Self::IoError(_))
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 404 Not Found
            Self::UnknownRegion(_) | Self::ConfigNotFound(_) => 404,

            // 422 Unprocessable Entity - semantic errors
            Self::ConfigParseError(_) | Self::ConfigValidationError(_) => 422,

            // 500 Internal Server Error - server-side issues
            Self::PersistenceError(_) | Self::IoError(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownRegion(_) => "UNKNOWN_REGION",
            Self::ConfigNotFound(_) => "CONFIG_NOT_FOUND",
            Self::ConfigParseError(_) => "CONFIG_PARSE_ERROR",
            Self::ConfigValidationError(_) => "CONFIG_VALIDATION_ERROR",
            Self::PersistenceError(_) => "PERSISTENCE_ERROR",
            Self::IoError(_) => "IO_ERROR",
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<crate::config::ConfigError> for BeaconzoneError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::NotFound(path) => Self::ConfigNotFound(path),
            ConfigError::ReadError { path, source } => {
                Self::PersistenceError(format!("Failed to read {}: {}", path.display(), source))
            }
            ConfigError::WriteError { path, source } => {
                Self::PersistenceError(format!("Failed to write {}: {}", path.display(), source))
            }
            ConfigError::ParseError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::SerializeError(e) => Self::ConfigParseError(e.to_string()),
            ConfigError::ValidationError { field, message } => {
                Self::ConfigValidationError(format!("{field}: {message}"))
            }
            ConfigError::MultipleValidationErrors(errors) => {
                let messages: Vec<String> = errors.into_iter().map(|e| e.to_string()).collect();
                Self::ConfigValidationError(messages.join("; "))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::io::{Error as IoErr, ErrorKind};

    #[test]
    fn test_config_error_classification() {
        assert!(BeaconzoneError::ConfigNotFound(PathBuf::from("/test")).is_config_error());
        assert!(BeaconzoneError::ConfigParseError("syntax error".into()).is_config_error());
        assert!(BeaconzoneError::ConfigValidationError("bad".into()).is_config_error());

        assert!(!BeaconzoneError::UnknownRegion("rid".into()).is_config_error());
    }

    #[test]
    fn test_io_error_classification() {
        assert!(BeaconzoneError::PersistenceError("disk full".into()).is_io_error());
        assert!(BeaconzoneError::IoError(IoErr::new(ErrorKind::NotFound, "test")).is_io_error());

        assert!(!BeaconzoneError::UnknownRegion("rid".into()).is_io_error());
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            BeaconzoneError::UnknownRegion("lobby".into()).http_status_code(),
            404
        );
        assert_eq!(
            BeaconzoneError::ConfigValidationError("error".into()).http_status_code(),
            422
        );
        assert_eq!(
            BeaconzoneError::PersistenceError("error".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BeaconzoneError::UnknownRegion("lobby".into()).error_code(),
            "UNKNOWN_REGION"
        );
        assert_eq!(
            BeaconzoneError::ConfigNotFound(PathBuf::new()).error_code(),
            "CONFIG_NOT_FOUND"
        );
    }

    #[test]
    fn test_from_config_validation_errors() {
        let err: BeaconzoneError = ConfigError::MultipleValidationErrors(vec![
            ConfigError::ValidationError {
                field: "detector.presence_threshold".into(),
                message: "must be positive".into(),
            },
            ConfigError::ValidationError {
                field: "regions".into(),
                message: "at least one region is required".into(),
            },
        ])
        .into();

        let message = err.to_string();
        assert!(message.contains("detector.presence_threshold: must be positive"));
        assert!(message.contains("; regions: at least one region is required"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoErr::new(ErrorKind::NotFound, "file not found");
        let err: BeaconzoneError = io_err.into();
        assert!(matches!(err, BeaconzoneError::IoError(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<BeaconzoneError>();
        assert_sync::<BeaconzoneError>();
    }
}
