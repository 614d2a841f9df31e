//! Mission run command
//!
//! Builds a controller with stdout as its console, attaches the console
//! diagnostic listener, and advances the configured number of times.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::cli::args::RunArgs;
use crate::config::{self, LanderConfig};
use crate::error::LanderError;
use crate::observability::{EventEmitter, init_metrics, metrics};
use crate::phase::{Controller, DiagnosticTool};

/// Notification sent when an error escapes the driving loop.
pub const UNHANDLED_FAILURE_NOTIFICATION: &str = "An exception occurred in the state machine.";

/// Run the mission.
///
/// # Errors
///
/// Returns configuration errors and I/O errors opening the event stream or
/// metrics listener. A failure escaping `advance` under the abort policy is
/// reported to listeners and stderr and does not fail the command.
pub fn run(args: &RunArgs) -> Result<(), LanderError> {
    let config = resolve_config(args)?;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
    }

    let mut controller = Controller::new(&config, Box::new(std::io::stdout()));
    if let Some(path) = &args.events_file {
        controller = controller.with_events(open_events(path)?);
    }
    if config.diagnostics && !args.no_diagnostics {
        controller.attach(Arc::new(DiagnosticTool::stdout()));
    }

    info!(
        mission = %config.mission.name,
        steps = config.steps,
        run_id = %controller.run_id(),
        "mission started"
    );

    if let Err(err) = drive(&mut controller, config.steps) {
        report_driver_failure(&controller, &err);
    }

    info!(
        phase = %controller.current_phase(),
        advances = controller.advances(),
        "mission finished"
    );
    controller.shutdown();
    Ok(())
}

/// Advances the controller `steps` times, stopping at the first error.
///
/// # Errors
///
/// Returns the first error produced by `advance`.
pub fn drive(controller: &mut Controller, steps: u32) -> Result<(), LanderError> {
    for _ in 0..steps {
        controller.advance()?;
    }
    Ok(())
}

/// Reports a failure that escaped the driving loop and tells listeners.
///
/// The controller stays in the phase it failed in.
pub fn report_driver_failure(controller: &Controller, err: &LanderError) {
    eprintln!("An exception occurred: {err}");
    warn!(error = %err, phase = %controller.current_phase(), "mission driver stopped");
    metrics::record_error("driver");
    controller.notify(UNHANDLED_FAILURE_NOTIFICATION);
}

/// Loads the config file (if any) and applies CLI overrides.
fn resolve_config(args: &RunArgs) -> Result<LanderConfig, LanderError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => LanderConfig::default(),
    };

    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(policy) = args.failure_policy {
        config.failure_policy = policy;
    }

    config::validate(&config)?;
    Ok(config)
}

fn open_events(path: &Path) -> Result<EventEmitter, LanderError> {
    if path == Path::new("-") {
        return Ok(EventEmitter::stderr());
    }
    Ok(EventEmitter::from_file(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use crate::phase::{MessageLog, Phase};

    fn args() -> RunArgs {
        RunArgs {
            config: None,
            steps: None,
            failure_policy: None,
            events_file: None,
            metrics_port: None,
            no_diagnostics: false,
        }
    }

    #[test]
    fn test_drive_three_steps() {
        let log = Arc::new(MessageLog::new());
        let mut controller = Controller::with_console(Box::new(std::io::sink()));
        controller.attach(log.clone());

        drive(&mut controller, 3).unwrap();

        assert_eq!(controller.current_phase(), Phase::Landed);
        assert_eq!(
            log.messages(),
            vec![
                "Deployed in Orbit: Preparing for descent",
                "Descending: Engines are operational",
                "Engine Cut Off: At 30 meters",
            ]
        );
    }

    /// Console that rejects every write.
    struct DeadConsole;

    impl std::io::Write for DeadConsole {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_driver_failure_is_reported_to_listeners() {
        let log = Arc::new(MessageLog::new());
        let config = LanderConfig {
            failure_policy: FailurePolicy::Abort,
            ..LanderConfig::default()
        };
        let mut controller = Controller::new(&config, Box::new(DeadConsole));
        controller.attach(log.clone());

        let err = drive(&mut controller, 3).unwrap_err();
        report_driver_failure(&controller, &err);

        assert_eq!(
            log.messages(),
            vec![
                "Error while deploying in orbit.",
                UNHANDLED_FAILURE_NOTIFICATION,
            ]
        );
        assert_eq!(controller.current_phase(), Phase::Orbit);
        assert_eq!(controller.advances(), 1);
    }

    #[test]
    fn test_resolve_config_overrides() {
        let a = RunArgs {
            steps: Some(7),
            failure_policy: Some(FailurePolicy::Abort),
            ..args()
        };
        let config = resolve_config(&a).unwrap();
        assert_eq!(config.steps, 7);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_resolve_config_rejects_zero_steps() {
        let a = RunArgs {
            steps: Some(0),
            ..args()
        };
        assert!(matches!(
            resolve_config(&a),
            Err(LanderError::Config(_))
        ));
    }
}
