//! Per-document coalescing of raw watcher events.
//!
//! Editors often emit several filesystem events for one save (truncate,
//! write, rename). [`EventDebouncer`] folds them into a single
//! [`StorageEvent`] per document once the document has been quiet for the
//! debounce window.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::event::{StorageEvent, StorageEventKind};
use crate::identifier::DocumentId;

struct PendingEvent {
    kind: StorageEventKind,
    deadline: Instant,
}

/// Thread-safe event debouncer.
///
/// `record` is called from the watcher callback, `drain_ready` from the
/// thread that forwards events to the receiver.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<DocumentId, PendingEvent>>,
    window: Duration,
}

impl EventDebouncer {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            window,
        }
    }

    /// Record an event, restarting the document's quiet period.
    pub(crate) fn record(&self, id: DocumentId, kind: StorageEventKind) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.window;

        match pending.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(PendingEvent { kind, deadline });
            }
            Entry::Occupied(mut entry) => match coalesce(entry.get().kind, kind) {
                Some(kind) => {
                    *entry.get_mut() = PendingEvent { kind, deadline };
                }
                // Created then removed inside one window: nothing happened.
                None => {
                    entry.remove();
                }
            },
        }
    }

    /// Remove and return every event whose quiet period has ended.
    pub(crate) fn drain_ready(&self) -> Vec<StorageEvent> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let ready: Vec<DocumentId> = pending
            .iter()
            .filter(|(_, event)| event.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        ready
            .into_iter()
            .filter_map(|id| {
                let event = pending.remove(&id)?;
                Some(StorageEvent {
                    id,
                    kind: event.kind,
                })
            })
            .collect()
    }
}

/// Fold a new event into the pending one. `None` drops both.
#[allow(clippy::match_same_arms)]
fn coalesce(existing: StorageEventKind, new: StorageEventKind) -> Option<StorageEventKind> {
    use StorageEventKind::{Created, Modified, Removed};

    match (existing, new) {
        (Created, Created | Modified) => Some(Created),
        (Created, Removed) => None,
        (Modified, Created) => Some(Created),
        (Modified, Modified) => Some(Modified),
        (Modified, Removed) => Some(Removed),
        // Replaced on disk
        (Removed, Created) => Some(Modified),
        (Removed, Modified | Removed) => Some(Removed),
    }
}
