//! Configuration module
//!
//! Loading and validation of `lander` YAML configuration files.

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config, validate};
pub use schema::{DEFAULT_STEPS, FailurePolicy, LanderConfig, MAX_STEPS, MissionConfig};
