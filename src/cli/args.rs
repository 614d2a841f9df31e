//! CLI argument definitions
//!
//! All Clap derive structs for `lander` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::FailurePolicy;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Sequential mission-phase controller for a lunar lander.
#[derive(Parser, Debug)]
#[command(name = "lander", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "LANDER_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the mission, advancing the controller a number of times.
    Run(RunArgs),

    /// List the mission phases in order.
    Phases(PhasesArgs),

    /// Validate configuration files without running a mission.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "LANDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of advances (overrides the config file).
    #[arg(short, long, env = "LANDER_STEPS")]
    pub steps: Option<u32>,

    /// Failure policy for phase actions (overrides the config file).
    #[arg(long)]
    pub failure_policy: Option<FailurePolicy>,

    /// Write structured JSONL events to this file (`-` for stderr).
    #[arg(long)]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on `127.0.0.1:<port>`.
    #[arg(long, env = "LANDER_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Do not attach the console diagnostic listener.
    #[arg(long)]
    pub no_diagnostics: bool,
}

/// Arguments for `phases`.
#[derive(Args, Debug)]
pub struct PhasesArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
