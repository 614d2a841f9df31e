//! Structured event stream for `Lander`.
//!
//! Discrete, typed events emitted by the controller. Events are serialized
//! as newline-delimited JSON (JSONL) and carry a monotonically increasing
//! sequence number, so the order of notifications and transitions within a
//! run can be reconstructed from the stream.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::phase::Phase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a mission run.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A controller started emitting events.
    MissionStarted {
        /// When the event stream was attached.
        timestamp: DateTime<Utc>,
        /// Identifier of this controller's run.
        run_id: Uuid,
        /// Configured mission name.
        mission: String,
        /// Phase current at start.
        phase: Phase,
    },

    /// The controller replaced its current phase.
    PhaseEntered {
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
        /// Outgoing phase.
        from: Phase,
        /// Incoming phase.
        to: Phase,
    },

    /// A notification was fanned out to listeners.
    NotificationSent {
        /// When the notification was delivered.
        timestamp: DateTime<Utc>,
        /// Notification text.
        message: String,
        /// Number of deliveries made.
        listeners: usize,
    },

    /// A phase action failed.
    PhaseActionFailed {
        /// When the failure was observed.
        timestamp: DateTime<Utc>,
        /// Phase whose action failed.
        phase: Phase,
        /// Failure description.
        detail: String,
    },

    /// The controller was shut down.
    MissionStopped {
        /// When the controller shut down.
        timestamp: DateTime<Utc>,
        /// Identifier of this controller's run.
        run_id: Uuid,
        /// Phase current at shutdown.
        phase: Phase,
        /// Number of advances performed.
        advances: u64,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as a single JSON line, and flushes the underlying
/// writer. Serialization or I/O failures are silently dropped: the event
/// stream is an observer and must never change mission behavior.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

// Box<dyn Write> is not Debug
impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or opened.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
