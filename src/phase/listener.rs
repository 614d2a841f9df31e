//! Notification listeners
//!
//! Listeners are shared with the controller through `Arc`, so a listener
//! stays alive for as long as its longest holder. Each attachment gets its
//! own [`ListenerId`], which is the handle used to detach it again.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// Sink for textual status notifications.
pub trait Listener: Send + Sync {
    /// Called synchronously for every notification, in attachment order.
    fn on_notify(&self, message: &str);
}

/// Handle identifying one attachment of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Ordered collection of attached listeners.
///
/// No deduplication: attaching the same listener twice delivers every
/// message to it twice.
#[derive(Default)]
pub struct ListenerSet {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn Listener>)>,
}

impl ListenerSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a listener and returns the handle for this attachment.
    pub fn attach(&mut self, listener: Arc<dyn Listener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Removes the attachment with the given handle.
    ///
    /// Returns `false` if no such attachment exists.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Delivers `message` to every listener in attachment order.
    ///
    /// Returns the number of deliveries made.
    pub fn notify(&self, message: &str) -> usize {
        for (_, listener) in &self.entries {
            listener.on_notify(message);
        }
        self.entries.len()
    }

    /// Returns the number of attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in listeners
// ---------------------------------------------------------------------------

/// Console diagnostic listener.
///
/// Prints `Diagnostic Tool: <message>` per notification. Write failures
/// are dropped; a broken diagnostic sink must not disturb the mission.
pub struct DiagnosticTool {
    out: Mutex<Box<dyn Write + Send>>,
}

impl DiagnosticTool {
    /// Creates a diagnostic tool writing to the given writer.
    #[must_use]
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Creates a diagnostic tool writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl Listener for DiagnosticTool {
    fn on_notify(&self, message: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "Diagnostic Tool: {message}").and_then(|()| out.flush()) {
            debug!(error = %e, "diagnostic output dropped");
        }
    }
}

impl std::fmt::Debug for DiagnosticTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticTool").finish_non_exhaustive()
    }
}

/// In-memory listener that records every message it receives.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<String>>,
}

impl MessageLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of recorded messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns whether no message has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Listener for MessageLog {
    fn on_notify(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}
