//! Phase engine
//!
//! The mission state machine: orbit → descending → engine-cutoff → landed.
//!
//! # Architecture
//!
//! - [`Phase`] - Closed set of mission phases and their hard-coded behavior
//! - [`PhaseRegistry`] - The only place phases are constructed
//! - [`Listener`] - Notification sinks, shared with the controller via `Arc`
//! - [`Controller`] - Owns the current phase, advances it, fans out notifications

pub mod engine;
pub mod listener;
pub mod registry;
pub mod state;

pub use engine::{Controller, TRANSITION_MARKER};
pub use listener::{DiagnosticTool, Listener, ListenerId, ListenerSet, MessageLog};
pub use registry::{PhaseRegistry, suggest_phase};
pub use state::{AdvanceOutcome, Phase, PhaseTransition};
