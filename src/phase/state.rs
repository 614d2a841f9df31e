//! Phase state representation
//!
//! The mission phases form a closed set, so a phase is a plain `Copy`
//! enum. Each variant carries its hard-coded behavior: the console line
//! written by its action, the notification fanned out to listeners, the
//! notification used when the action fails, and its successor.

use std::io::Write;

use serde::Serialize;
use tracing::debug;

use crate::error::{LanderError, PhaseError};

use super::engine::Controller;
use super::registry::PhaseRegistry;

/// One stage of the mission.
///
/// Serializes as its stable identifier (`"engine-cutoff"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Deployed in orbit, preparing for descent. Initial phase.
    Orbit,
    /// Powered descent with engines running.
    Descending,
    /// Engines cut off 30 meters above the surface.
    EngineCutoff,
    /// On the surface. Terminal phase.
    Landed,
}

impl Phase {
    /// All phases in mission order.
    pub const ALL: [Self; 4] = [
        Self::Orbit,
        Self::Descending,
        Self::EngineCutoff,
        Self::Landed,
    ];

    /// The phase every controller starts in.
    pub const INITIAL: Self = Self::Orbit;

    /// Returns the stable identifier of this phase.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Orbit => "orbit",
            Self::Descending => "descending",
            Self::EngineCutoff => "engine-cutoff",
            Self::Landed => "landed",
        }
    }

    /// Returns the line the phase action writes to the console.
    #[must_use]
    pub const fn console_line(self) -> &'static str {
        match self {
            Self::Orbit => "Lunar Lander is deployed in orbit. Preparing for descent.",
            Self::Descending => "Lunar Lander is descending. Engines are operational.",
            Self::EngineCutoff => {
                "Engines cut off at 30 meters above the surface. Final descent phase."
            }
            Self::Landed => "Lunar Lander has landed on the surface. Mission successful.",
        }
    }

    /// Returns the notification sent to listeners when the phase runs.
    #[must_use]
    pub const fn notification(self) -> &'static str {
        match self {
            Self::Orbit => "Deployed in Orbit: Preparing for descent",
            Self::Descending => "Descending: Engines are operational",
            Self::EngineCutoff => "Engine Cut Off: At 30 meters",
            Self::Landed => "Landed: Mission successful",
        }
    }

    /// Returns the notification sent to listeners when the action fails.
    #[must_use]
    pub const fn failure_notification(self) -> &'static str {
        match self {
            Self::Orbit => "Error while deploying in orbit.",
            Self::Descending => "Error during descent.",
            Self::EngineCutoff => "Error during engine cut-off.",
            Self::Landed => "Error during landing phase.",
        }
    }

    /// Returns the phase that follows this one, or `None` for the terminal
    /// phase.
    ///
    /// This is the transition table. [`Phase::run`] builds the successor
    /// it actually enters through the registry.
    #[must_use]
    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Orbit => Some(Self::Descending),
            Self::Descending => Some(Self::EngineCutoff),
            Self::EngineCutoff => Some(Self::Landed),
            Self::Landed => None,
        }
    }

    /// Returns whether this phase has no successor.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    /// Performs the phase action: writes the console line.
    ///
    /// # Errors
    ///
    /// Returns `PhaseError::ActionFailed` if the console cannot be written.
    pub fn perform<W: Write + ?Sized>(self, console: &mut W) -> Result<(), PhaseError> {
        writeln!(console, "{}", self.console_line())
            .and_then(|()| console.flush())
            .map_err(|e| PhaseError::ActionFailed {
                phase: self,
                detail: e.to_string(),
            })
    }

    /// Runs this phase against the controller.
    ///
    /// Performs the action, notifies listeners, then asks the controller to
    /// swap in a freshly created successor. Notification always precedes the
    /// swap. A failed action is handed to the controller, which notifies and
    /// applies its failure policy; no transition happens in that case.
    ///
    /// # Errors
    ///
    /// Returns an error when the controller's failure policy is
    /// [`FailurePolicy::Abort`](crate::config::FailurePolicy::Abort) and the
    /// action failed.
    pub fn run(self, controller: &mut Controller) -> Result<AdvanceOutcome, LanderError> {
        if let Err(err) = self.perform(controller.console_mut()) {
            return controller.recover(err);
        }

        controller.notify(self.notification());

        let Some(next) = self.successor() else {
            debug!(phase = %self, "terminal phase; remaining");
            return Ok(AdvanceOutcome::Remained(self));
        };

        let next = PhaseRegistry::create(next.id())?;
        controller.set_phase(next);

        Ok(AdvanceOutcome::Transitioned(PhaseTransition {
            from: self,
            to: next,
        }))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Phase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseRegistry::create(s)
    }
}

/// Record of a phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Phase we transitioned from
    pub from: Phase,
    /// Phase we transitioned to
    pub to: Phase,
}

/// What a single `advance` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The phase ran and the controller moved to its successor.
    Transitioned(PhaseTransition),
    /// The terminal phase ran again; the current phase is unchanged.
    Remained(Phase),
    /// The phase action failed, listeners were told, and the failure was
    /// absorbed. The current phase is unchanged.
    Recovered {
        /// Phase whose action failed
        phase: Phase,
        /// Description of the failure
        detail: String,
    },
}

impl AdvanceOutcome {
    /// Returns the phase that is current after this advance.
    #[must_use]
    pub const fn phase_after(&self) -> Phase {
        match self {
            Self::Transitioned(t) => t.to,
            Self::Remained(phase) | Self::Recovered { phase, .. } => *phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that rejects every write.
    struct BrokenConsole;

    impl Write for BrokenConsole {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "console closed",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_successor_chain_is_linear() {
        let mut phase = Phase::INITIAL;
        let mut visited = vec![phase];
        while let Some(next) = phase.successor() {
            phase = next;
            visited.push(phase);
        }
        assert_eq!(visited, Phase::ALL);
    }

    #[test]
    fn test_every_successor_is_registered() {
        for phase in Phase::ALL {
            if let Some(next) = phase.successor() {
                assert_eq!(PhaseRegistry::create(next.id()).unwrap(), next);
            }
        }
    }

    #[test]
    fn test_only_landed_is_terminal() {
        for phase in Phase::ALL {
            assert_eq!(phase.is_terminal(), phase == Phase::Landed, "{phase}");
        }
    }

    #[test]
    fn test_display_matches_id() {
        assert_eq!(Phase::EngineCutoff.to_string(), "engine-cutoff");
        assert_eq!(Phase::Orbit.to_string(), "orbit");
    }

    #[test]
    fn test_serializes_as_identifier() {
        for phase in Phase::ALL {
            let json = serde_json::to_value(phase).unwrap();
            assert_eq!(json, serde_json::json!(phase.id()));
        }
    }

    #[test]
    fn test_perform_writes_console_line() {
        let mut buf = Vec::new();
        Phase::Descending.perform(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Lunar Lander is descending. Engines are operational.\n"
        );
    }

    #[test]
    fn test_perform_reports_console_failure() {
        let err = Phase::Landed.perform(&mut BrokenConsole).unwrap_err();
        match err {
            PhaseError::ActionFailed { phase, detail } => {
                assert_eq!(phase, Phase::Landed);
                assert!(detail.contains("console closed"));
            }
            other @ PhaseError::UnknownPhase { .. } => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_outcome_phase_after() {
        let t = AdvanceOutcome::Transitioned(PhaseTransition {
            from: Phase::Orbit,
            to: Phase::Descending,
        });
        assert_eq!(t.phase_after(), Phase::Descending);
        assert_eq!(
            AdvanceOutcome::Remained(Phase::Landed).phase_after(),
            Phase::Landed
        );
        let r = AdvanceOutcome::Recovered {
            phase: Phase::Orbit,
            detail: "x".to_string(),
        };
        assert_eq!(r.phase_after(), Phase::Orbit);
    }
}
