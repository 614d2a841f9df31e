//! Error types for `Lander`
//!
//! A small hierarchy: phase errors raised by the registry and phase
//! actions, configuration errors raised by the loader, and a top-level
//! error that maps onto process exit codes.

use std::path::PathBuf;
use thiserror::Error;

use crate::phase::Phase;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `lander` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Phase engine error (unknown phase, aborted phase action)
    pub const PHASE_ERROR: i32 = 5;

    /// Usage error (invalid arguments, missing required options). Replaces
    /// clap's default status of 2, which is `CONFIG_ERROR` here.
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `Lander` operations.
///
/// Aggregates the domain errors and provides exit code mapping for the CLI.
#[derive(Debug, Error)]
pub enum LanderError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Phase engine error
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LanderError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Phase(_) => ExitCode::PHASE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Phase Engine Errors
// ============================================================================

/// Phase engine errors.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// The registry was asked for an identifier it does not know.
    ///
    /// Recoverable: the caller decides what to do with the miss, the
    /// controller is never touched.
    #[error("unknown phase '{name}'{}", suggestion.as_ref().map_or_else(String::new, |s| format!(" (did you mean '{s}'?)")))]
    UnknownPhase {
        /// The identifier that was requested
        name: String,
        /// Closest known identifier, if one is near enough
        suggestion: Option<String>,
    },

    /// A phase action failed while running.
    #[error("phase '{phase}' action failed: {detail}")]
    ActionFailed {
        /// Phase whose action failed
        phase: Phase,
        /// Description of the failure
        detail: String,
    },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Reading the configuration file failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `Lander` operations.
pub type Result<T> = std::result::Result<T, LanderError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::PHASE_ERROR, 5);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
    }

    #[test]
    fn test_phase_error_exit_code() {
        let err: LanderError = PhaseError::ActionFailed {
            phase: Phase::Descending,
            detail: "broken pipe".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::PHASE_ERROR);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: LanderError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: LanderError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_unknown_phase_display_with_suggestion() {
        let err = PhaseError::UnknownPhase {
            name: "orbt".to_string(),
            suggestion: Some("orbit".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "unknown phase 'orbt' (did you mean 'orbit'?)"
        );
    }

    #[test]
    fn test_unknown_phase_display_without_suggestion() {
        let err = PhaseError::UnknownPhase {
            name: "bogus-phase-name".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "unknown phase 'bogus-phase-name'");
    }

    #[test]
    fn test_action_failed_display() {
        let err = PhaseError::ActionFailed {
            phase: Phase::EngineCutoff,
            detail: "console closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "phase 'engine-cutoff' action failed: console closed"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "steps".to_string(),
            value: "0".to_string(),
            expected: "a value between 1 and 1000".to_string(),
        };
        assert!(err.to_string().contains("steps"));
        assert!(err.to_string().contains("between 1 and 1000"));
    }
}
