//! Configuration schema types
//!
//! Deserialized from YAML. Every field has a default, so an empty file is
//! a valid configuration.

use serde::{Deserialize, Serialize};

/// Default number of advances performed by `lander run`.
pub const DEFAULT_STEPS: u32 = 3;

/// Upper bound for `steps`.
pub const MAX_STEPS: u32 = 1000;

/// Root configuration for a mission run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct LanderConfig {
    /// Mission metadata
    pub mission: MissionConfig,

    /// Number of times the driver advances the controller
    pub steps: u32,

    /// What to do when a phase action fails
    pub failure_policy: FailurePolicy,

    /// Whether `lander run` attaches the console diagnostic listener
    pub diagnostics: bool,
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self {
            mission: MissionConfig::default(),
            steps: DEFAULT_STEPS,
            failure_policy: FailurePolicy::default(),
            diagnostics: true,
        }
    }
}

/// Mission metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionConfig {
    /// Human-readable mission name, used in logs and events
    pub name: String,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            name: "lunar-lander".to_string(),
        }
    }
}

/// Policy applied after a phase action fails.
///
/// Listeners are notified of the failure and the phase is left in place
/// under both policies. The policy only decides whether `advance` reports
/// the failure as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Absorb the failure; `advance` returns `AdvanceOutcome::Recovered`.
    #[default]
    Continue,
    /// Surface the failure; `advance` returns an error.
    Abort,
}
