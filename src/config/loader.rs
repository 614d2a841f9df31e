//! Configuration loader
//!
//! Reads a YAML file, enforces a size limit, deserializes it into
//! [`LanderConfig`] and validates the result.

use std::path::Path;

use tracing::debug;

use crate::config::schema::{LanderConfig, MAX_STEPS};
use crate::error::ConfigError;

/// Default maximum configuration file size in bytes.
const DEFAULT_MAX_CONFIG_SIZE: usize = 1024 * 1024;

/// Loads and validates the configuration file at `path`.
///
/// # Errors
///
/// Returns `ConfigError::MissingFile` if the file does not exist,
/// `ConfigError::Io` if it cannot be read, `ConfigError::ParseError` for
/// malformed YAML, and `ConfigError::InvalidValue` for out-of-range values
/// or an oversized file.
pub fn load_config(path: &Path) -> Result<LanderConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let max_size = env_or("LANDER_MAX_CONFIG_SIZE", DEFAULT_MAX_CONFIG_SIZE);
    if raw.len() > max_size {
        return Err(ConfigError::InvalidValue {
            field: "<file>".to_string(),
            value: format!("{} bytes", raw.len()),
            expected: format!("at most {max_size} bytes"),
        });
    }

    let config = parse_config(&raw, path)?;
    validate(&config)?;

    debug!(path = %path.display(), mission = %config.mission.name, "configuration loaded");
    Ok(config)
}

/// Parses YAML text into a configuration without validating it.
///
/// Blank input yields the default configuration.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` if the YAML is malformed or contains
/// unknown fields.
pub fn parse_config(raw: &str, path: &Path) -> Result<LanderConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(LanderConfig::default());
    }

    serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Validates value ranges of a parsed configuration.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for the first invalid field.
pub fn validate(config: &LanderConfig) -> Result<(), ConfigError> {
    if config.steps == 0 || config.steps > MAX_STEPS {
        return Err(ConfigError::InvalidValue {
            field: "steps".to_string(),
            value: config.steps.to_string(),
            expected: format!("a value between 1 and {MAX_STEPS}"),
        });
    }

    if config.mission.name.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "mission.name".to_string(),
            value: config.mission.name.clone(),
            expected: "a non-empty name".to_string(),
        });
    }

    Ok(())
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FailurePolicy;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config("mission:\n  name: test-mission\nfailure_policy: abort\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mission.name, "test-mission");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_load_empty_file_is_default() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config, LanderConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/lander.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn test_load_malformed_yaml() {
        let file = write_config("steps: [unclosed\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "{err:?}");
    }

    #[test]
    fn test_zero_steps_rejected() {
        let file = write_config("steps: 0\n");
        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "steps"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_too_many_steps_rejected() {
        let config = LanderConfig {
            steps: MAX_STEPS + 1,
            ..LanderConfig::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_blank_mission_name_rejected() {
        let file = write_config("mission:\n  name: \"  \"\n");
        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "mission.name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_mentions_path() {
        let err = parse_config("nonsense_key: 1\n", Path::new("mission.yaml")).unwrap_err();
        assert!(err.to_string().contains("mission.yaml"));
    }
}
