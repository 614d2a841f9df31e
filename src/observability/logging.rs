//! Log setup for the `lander` binary.
//!
//! Logs go to stderr; stdout is the mission console. When both streams
//! are terminals they interleave on one screen, so automatic coloring is
//! turned off there and console lines stay free of escape codes.

use std::io::IsTerminal;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive. Takes precedence
/// over `-v` flags.
pub const LOG_LEVEL_ENV: &str = "LANDER_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Builds the default filter directive for a `-v` count.
///
/// Dependencies always log at `warn`; only `lander` targets get louder.
#[must_use]
pub fn filter_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_owned(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,lander={level}")
}

/// Which standard streams are attached to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminals {
    /// stderr is a terminal
    pub stderr: bool,
    /// stdout is a terminal
    pub stdout: bool,
    /// `NO_COLOR` is set
    pub no_color: bool,
}

impl Terminals {
    /// Inspects the current process.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            stderr: std::io::stderr().is_terminal(),
            stdout: std::io::stdout().is_terminal(),
            no_color: std::env::var_os("NO_COLOR").is_some(),
        }
    }

    /// Decides whether log lines carry ANSI styling.
    #[must_use]
    pub const fn ansi(self, color: ColorChoice) -> bool {
        match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.stderr && !self.stdout && !self.no_color,
        }
    }
}

/// Installs the global subscriber writing to stderr.
///
/// A second call leaves the first subscriber in place.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let filter = EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match format {
        LogFormat::Human => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(Terminals::detect().ansi(color))
            .with_target(verbosity >= 2)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .boxed(),
    };

    if tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("log subscriber already installed");
    }
}
