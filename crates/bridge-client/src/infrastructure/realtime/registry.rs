//! Per-kind handler lists for realtime events.

use std::collections::HashMap;

use bridge_core::{EventKind, RealtimeEvent};
use parking_lot::RwLock;
use tracing::trace;

use crate::application::ports::{EventHandler, HandlerId};

/// Thread-safe registry mapping each [`EventKind`] to its handlers.
///
/// Handlers are called in registration order.  Dispatch copies the handler
/// list before calling anything, so a handler may register or remove handlers
/// (including itself) without deadlocking.  A handler added during dispatch
/// first sees the next event; a handler removed during dispatch is not called
/// again, not even for the event being dispatched.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<EventKind, Vec<(HandlerId, EventHandler)>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, kind: EventKind, handler: EventHandler) -> HandlerId {
        let id = HandlerId::new();
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push((id, handler));
        trace!(%kind, %id, "handler registered");
        id
    }

    /// Removes one handler.  Other handlers for the same kind are untouched.
    pub fn remove(&self, kind: EventKind, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(hid, _)| *hid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(&kind);
        }
        removed
    }

    /// Calls every handler registered for the event's kind.  Returns how many
    /// were called.
    pub fn dispatch(&self, event: &RealtimeEvent) -> usize {
        let kind = event.kind();
        let targets: Vec<(HandlerId, EventHandler)> = self
            .handlers
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut called = 0;
        for (id, handler) in &targets {
            if !self.contains(kind, *id) {
                continue;
            }
            handler(event);
            called += 1;
        }
        called
    }

    fn contains(&self, kind: EventKind, id: HandlerId) -> bool {
        self.handlers
            .read()
            .get(&kind)
            .is_some_and(|list| list.iter().any(|(hid, _)| *hid == id))
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.read().get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .handlers
            .read()
            .iter()
            .map(|(k, v)| (*k, v.len()))
            .collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &counts)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
