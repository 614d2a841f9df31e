//! Phase listing
//!
//! Prints the mission phases in order, in human or JSON format.

use crate::cli::args::{OutputFormat, PhasesArgs};
use crate::error::LanderError;
use crate::phase::{Phase, PhaseRegistry};

/// Print the phase table.
///
/// # Errors
///
/// Returns `LanderError::Json` if JSON serialization fails.
pub fn run(args: &PhasesArgs) -> Result<(), LanderError> {
    match args.format {
        OutputFormat::Human => print!("{}", render_human()),
        OutputFormat::Json => println!("{}", render_json()?),
    }
    Ok(())
}

fn render_human() -> String {
    let mut out = String::new();
    for (i, phase) in PhaseRegistry::all().iter().enumerate() {
        let next = phase.successor().map_or("(terminal)", Phase::id);
        out.push_str(&format!(
            "{}. {:<14} -> {:<14} {}\n",
            i + 1,
            phase.id(),
            next,
            phase.notification()
        ));
    }
    out
}

fn render_json() -> Result<String, LanderError> {
    let phases: Vec<serde_json::Value> = PhaseRegistry::all()
        .iter()
        .map(|phase| {
            serde_json::json!({
                "id": phase.id(),
                "notification": phase.notification(),
                "next": phase.successor().map(Phase::id),
                "terminal": phase.is_terminal(),
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&phases)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_lists_every_phase_in_order() {
        let out = render_human();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("1. orbit"));
        assert!(lines[2].contains("engine-cutoff"));
        assert!(lines[3].contains("(terminal)"));
    }

    #[test]
    fn json_has_null_successor_for_landed() {
        let parsed: serde_json::Value = serde_json::from_str(&render_json().unwrap()).unwrap();
        let phases = parsed.as_array().unwrap();
        assert_eq!(phases.len(), 4);
        assert_eq!(phases[0]["next"], "descending");
        assert_eq!(phases[3]["id"], "landed");
        assert!(phases[3]["next"].is_null());
        assert_eq!(phases[3]["terminal"], true);
    }
}
