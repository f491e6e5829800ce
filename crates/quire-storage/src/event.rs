//! Storage event types for change notification.
//!
//! Provides types for subscribing to document changes through the
//! [`Storage::watch`](crate::Storage::watch) method.

use std::sync::mpsc;
use std::time::Duration;

pub use std::sync::mpsc::RecvTimeoutError;

use crate::identifier::DocumentId;

/// Kind of storage event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageEventKind {
    /// Document was created.
    Created,
    /// Document was modified.
    Modified,
    /// Document was removed.
    Removed,
}

/// A storage change event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    /// Identifier of the affected document.
    pub id: DocumentId,
    /// Kind of change.
    pub kind: StorageEventKind,
}

/// Receiver for storage events.
///
/// Wraps a [`std::sync::mpsc::Receiver`] for synchronous event delivery.
pub struct StorageEventReceiver {
    rx: mpsc::Receiver<StorageEvent>,
    // Held by no-op receivers so waiting blocks instead of reporting a disconnect.
    _keepalive: Option<mpsc::Sender<StorageEvent>>,
}

impl StorageEventReceiver {
    /// Create a new receiver from a channel receiver.
    pub(crate) fn new(rx: mpsc::Receiver<StorageEvent>) -> Self {
        Self {
            rx,
            _keepalive: None,
        }
    }

    /// Try to receive an event without blocking.
    ///
    /// Returns `None` if no event is available or the sender is dropped.
    #[must_use]
    pub fn try_recv(&self) -> Option<StorageEvent> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next event for at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RecvTimeoutError::Timeout`] if nothing arrived in time, or
    /// [`RecvTimeoutError::Disconnected`] once the watcher is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<StorageEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Create a receiver that never yields events.
    ///
    /// Used by the default `Storage::watch()` implementation for backends
    /// that don't support change notification.
    pub(crate) fn no_op() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            rx,
            _keepalive: Some(tx),
        }
    }
}

/// Handle to stop watching for changes.
///
/// Dropping the handle disconnects the shutdown channel, which stops the
/// thread that owns the filesystem watcher.
pub struct WatchHandle {
    _shutdown: Option<mpsc::Sender<()>>,
}

impl WatchHandle {
    pub(crate) fn new(shutdown: mpsc::Sender<()>) -> Self {
        Self {
            _shutdown: Some(shutdown),
        }
    }

    /// Create a no-op handle that does nothing on drop.
    pub(crate) fn no_op() -> Self {
        Self { _shutdown: None }
    }
}
