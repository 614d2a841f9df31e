//! Configuration validation command
//!
//! Loads each file through the normal loader and reports the result per
//! file. Fails if any file is invalid.

use std::path::PathBuf;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config;
use crate::error::{ConfigError, LanderError};

/// Validate configuration files.
///
/// # Errors
///
/// Returns the first configuration error encountered, after every file
/// has been reported.
pub fn run(args: &ValidateArgs) -> Result<(), LanderError> {
    let mut reports = Vec::with_capacity(args.files.len());
    let mut first_error: Option<ConfigError> = None;

    for path in &args.files {
        tracing::info!(file = %path.display(), "validating configuration");
        match config::load_config(path) {
            Ok(_) => reports.push((path.clone(), None)),
            Err(e) => {
                reports.push((path.clone(), Some(e.to_string())));
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match args.format {
        OutputFormat::Human => print!("{}", render_human(&reports)),
        OutputFormat::Json => println!("{}", render_json(&reports)?),
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}

type Report = (PathBuf, Option<String>);

fn render_human(reports: &[Report]) -> String {
    let mut out = String::new();
    for (path, error) in reports {
        match error {
            None => out.push_str(&format!("ok      {}\n", path.display())),
            Some(e) => out.push_str(&format!("invalid {}: {e}\n", path.display())),
        }
    }
    out
}

fn render_json(reports: &[Report]) -> Result<String, LanderError> {
    let files: Vec<serde_json::Value> = reports
        .iter()
        .map(|(path, error)| {
            serde_json::json!({
                "path": path.display().to_string(),
                "valid": error.is_none(),
                "error": error,
            })
        })
        .collect();
    let invalid = reports.iter().filter(|(_, e)| e.is_some()).count();
    let summary = serde_json::json!({
        "files": files,
        "summary": {
            "valid": reports.len() - invalid,
            "invalid": invalid,
        },
    });
    Ok(serde_json::to_string_pretty(&summary)?)
}
