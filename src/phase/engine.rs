//! Mission controller
//!
//! The `Controller` owns the current phase, the console the phase actions
//! write to, and the attached listeners. It is constructed explicitly and
//! passed by reference; there is no process-wide instance. Its starting
//! phase comes from [`PhaseRegistry::initial`], like every later phase.

use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{FailurePolicy, LanderConfig};
use crate::error::{LanderError, PhaseError};
use crate::observability::metrics;
use crate::observability::{Event, EventEmitter};

use super::listener::{Listener, ListenerId, ListenerSet};
use super::registry::PhaseRegistry;
use super::state::{AdvanceOutcome, Phase};

/// Line written to the console after every phase swap.
pub const TRANSITION_MARKER: &str = "State transitioned.";

/// Owner of the mission state machine.
///
/// Coordinates:
/// - Ownership and replacement of the current phase
/// - Notification fan-out to listeners, in attachment order
/// - The failure policy applied when a phase action fails
/// - Optional structured events and metrics
///
/// `advance` takes `&mut self`, so concurrent advances are ruled out at
/// compile time; share a controller across threads behind a mutex.
pub struct Controller {
    /// Phase currently in effect
    current: Phase,
    /// Attached listeners
    listeners: ListenerSet,
    /// Sink for phase action output and transition markers
    console: Box<dyn Write + Send>,
    /// Decides whether failed actions surface as errors
    failure_policy: FailurePolicy,
    /// Mission name for logs and events
    mission: String,
    /// Identifier of this controller's run
    run_id: Uuid,
    /// Number of `advance` calls so far
    advances: u64,
    /// Structured event stream, when enabled
    events: Option<EventEmitter>,
}

impl Controller {
    /// Creates a controller in the initial phase.
    #[must_use]
    pub fn new(config: &LanderConfig, console: Box<dyn Write + Send>) -> Self {
        let run_id = Uuid::new_v4();
        let initial = PhaseRegistry::initial();
        debug!(
            %run_id,
            mission = %config.mission.name,
            phase = %initial,
            policy = ?config.failure_policy,
            "controller created"
        );
        metrics::set_current_phase(initial.id(), None);

        Self {
            current: initial,
            listeners: ListenerSet::new(),
            console,
            failure_policy: config.failure_policy,
            mission: config.mission.name.clone(),
            run_id,
            advances: 0,
            events: None,
        }
    }

    /// Creates a controller with the default configuration.
    #[must_use]
    pub fn with_console(console: Box<dyn Write + Send>) -> Self {
        Self::new(&LanderConfig::default(), console)
    }

    /// Enables the structured event stream and emits `MissionStarted`.
    #[must_use]
    pub fn with_events(mut self, emitter: EventEmitter) -> Self {
        emitter.emit(Event::MissionStarted {
            timestamp: Utc::now(),
            run_id: self.run_id,
            mission: self.mission.clone(),
            phase: self.current,
        });
        self.events = Some(emitter);
        self
    }

    /// Runs the current phase.
    ///
    /// The phase performs its action, listeners are notified, and the phase
    /// is replaced by its successor if it has one. The terminal phase
    /// re-runs without changing state.
    ///
    /// # Errors
    ///
    /// Returns `LanderError::Phase` when a phase action fails under
    /// [`FailurePolicy::Abort`]. The current phase is unchanged in that case.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, LanderError> {
        self.advances += 1;
        let phase = self.current;
        debug!(%phase, advance = self.advances, "advancing");
        metrics::record_advance(phase.id());
        phase.run(self)
    }

    /// Replaces the current phase and writes the transition marker.
    ///
    /// A console failure while writing the marker is logged; the swap has
    /// already happened and is not undone.
    pub fn set_phase(&mut self, phase: Phase) {
        let previous = std::mem::replace(&mut self.current, phase);

        if let Err(e) = writeln!(self.console, "{TRANSITION_MARKER}").and_then(|()| self.console.flush())
        {
            warn!(error = %e, "failed to write transition marker");
            metrics::record_error("console");
        }

        info!(from = %previous, to = %phase, "phase transition");
        metrics::record_phase_transition(previous.id(), phase.id());
        metrics::set_current_phase(phase.id(), Some(previous.id()));
        self.emit(Event::PhaseEntered {
            timestamp: Utc::now(),
            from: previous,
            to: phase,
        });
    }

    /// Delivers `message` to every attached listener, in attachment order.
    pub fn notify(&self, message: &str) {
        let deliveries = self.listeners.notify(message);
        debug!(message, deliveries, "notification sent");
        metrics::record_notifications(deliveries);
        self.emit(Event::NotificationSent {
            timestamp: Utc::now(),
            message: message.to_owned(),
            listeners: deliveries,
        });
    }

    /// Attaches a listener. Returns the handle for this attachment.
    pub fn attach(&mut self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = self.listeners.attach(listener);
        debug!(%id, total = self.listeners.len(), "listener attached");
        id
    }

    /// Detaches a listener attachment. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let removed = self.listeners.detach(id);
        debug!(%id, removed, "listener detach");
        removed
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn current_phase(&self) -> Phase {
        self.current
    }

    /// Returns whether the current phase is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.current.is_terminal()
    }

    /// Returns the number of listener attachments.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Returns the number of `advance` calls so far.
    #[must_use]
    pub const fn advances(&self) -> u64 {
        self.advances
    }

    /// Returns the identifier of this run.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns the configured failure policy.
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Tears the controller down, releasing the current phase.
    ///
    /// A console that cannot be flushed is logged; teardown still completes.
    pub fn shutdown(mut self) {
        if let Err(e) = self.console.flush() {
            warn!(error = %e, "failed to flush console at shutdown");
            metrics::record_error("console");
        }
        info!(
            run_id = %self.run_id,
            phase = %self.current,
            advances = self.advances,
            "controller shut down"
        );
        self.emit(Event::MissionStopped {
            timestamp: Utc::now(),
            run_id: self.run_id,
            phase: self.current,
            advances: self.advances,
        });
    }

    pub(crate) fn console_mut(&mut self) -> &mut (dyn Write + Send) {
        self.console.as_mut()
    }

    /// Handles a failed phase action.
    ///
    /// Listeners always hear about the failure and the phase stays put;
    /// the failure policy decides whether the caller sees an error.
    pub(crate) fn recover(&mut self, err: PhaseError) -> Result<AdvanceOutcome, LanderError> {
        let PhaseError::ActionFailed { phase, detail } = err else {
            return Err(err.into());
        };

        warn!(%phase, %detail, policy = ?self.failure_policy, "phase action failed");
        metrics::record_error("phase_action");
        self.emit(Event::PhaseActionFailed {
            timestamp: Utc::now(),
            phase,
            detail: detail.clone(),
        });
        self.notify(phase.failure_notification());

        match self.failure_policy {
            FailurePolicy::Continue => Ok(AdvanceOutcome::Recovered { phase, detail }),
            FailurePolicy::Abort => Err(PhaseError::ActionFailed { phase, detail }.into()),
        }
    }

    fn emit(&self, event: Event) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .field("failure_policy", &self.failure_policy)
            .field("advances", &self.advances)
            .field("run_id", &self.run_id)
            .finish_non_exhaustive()
    }
}
