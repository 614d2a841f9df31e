//! Metrics collection for `Lander`.
//!
//! Prometheus-compatible metrics for phase activity. The recording
//! functions are no-ops until [`init_metrics`] installs a recorder.

use std::sync::atomic::{AtomicBool, Ordering};

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::LanderError;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without
/// an HTTP endpoint.
///
/// # Errors
///
/// Returns `LanderError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), LanderError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| LanderError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

/// Registers metric descriptions with the global recorder.
fn describe_metrics() {
    describe_counter!(
        "lander_advances_total",
        "Total number of advance calls by phase run"
    );
    describe_counter!(
        "lander_phase_transitions_total",
        "Total number of phase transitions"
    );
    describe_gauge!(
        "lander_current_phase",
        "Currently active phase (1 = active)"
    );
    describe_counter!(
        "lander_notifications_total",
        "Total number of notification deliveries"
    );
    describe_counter!(
        "lander_errors_total",
        "Total number of errors by category"
    );
}

/// Records one `advance` call on the given phase.
pub fn record_advance(phase: &'static str) {
    counter!("lander_advances_total", "phase" => phase).increment(1);
}

/// Records a phase transition.
pub fn record_phase_transition(from: &'static str, to: &'static str) {
    counter!("lander_phase_transitions_total", "from" => from, "to" => to).increment(1);
}

/// Sets the currently active phase gauge.
///
/// Zeros out the previous phase label (if any) before setting the new one,
/// so stale labels do not keep reporting `1.0`.
pub fn set_current_phase(phase: &'static str, previous: Option<&'static str>) {
    if let Some(prev) = previous {
        gauge!("lander_current_phase", "phase" => prev).set(0.0);
    }
    gauge!("lander_current_phase", "phase" => phase).set(1.0);
}

/// Records notification deliveries.
pub fn record_notifications(deliveries: usize) {
    counter!("lander_notifications_total").increment(deliveries as u64);
}

/// Records an error by category.
pub fn record_error(category: &'static str) {
    counter!("lander_errors_total", "category" => category).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // metrics macros silently no-op when no global recorder is installed
        record_advance("orbit");
        record_phase_transition("orbit", "descending");
        set_current_phase("descending", Some("orbit"));
        set_current_phase("orbit", None);
        record_notifications(3);
        record_error("phase_action");
    }

    #[test]
    fn init_metrics_is_idempotent() {
        init_metrics(None).unwrap();
        init_metrics(None).unwrap();
    }
}
