//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.
//! Counts `list()` and `read()` calls so callers can assert on caching.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, mpsc};

use crate::event::{StorageEvent, StorageEventKind, StorageEventReceiver, WatchHandle};
use crate::identifier::DocumentId;
use crate::storage::{DocumentEntry, Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores documents in memory, in insertion order. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use quire_storage::{DocumentId, MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_document("intro", "---\ntitle: Introduction\n---\n# Hello");
///
/// let entries = storage.list().unwrap();
/// let text = storage.read(&DocumentId::new("intro")).unwrap();
/// assert_eq!(storage.read_calls(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    entries: RwLock<Vec<DocumentEntry>>,
    contents: RwLock<HashMap<DocumentId, String>>,
    unreadable: RwLock<HashSet<DocumentId>>,
    unavailable: AtomicBool,
    list_calls: AtomicUsize,
    read_calls: AtomicUsize,
    event_sender: RwLock<Option<mpsc::Sender<StorageEvent>>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listed document with content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, stem: &str, content: impl Into<String>) -> Self {
        self.add_document(stem, content);
        self
    }

    /// Add a document that is listed but whose content can't be read.
    ///
    /// Simulates a file removed between enumeration and read.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_listed_only(self, stem: &str) -> Self {
        self.entries.write().unwrap().push(Self::entry(stem));
        self
    }

    /// Add a listed document whose reads fail with
    /// [`StorageErrorKind::Unavailable`], as for a file with bad permissions.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_unreadable(self, stem: &str, content: impl Into<String>) -> Self {
        self.add_document(stem, content);
        self.unreadable
            .write()
            .unwrap()
            .insert(DocumentId::from_file_stem(stem));
        self
    }

    /// Let reads of a document added with [`with_unreadable`](Self::with_unreadable)
    /// succeed again.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_readable(&self, stem: &str) {
        self.unreadable
            .write()
            .unwrap()
            .remove(&DocumentId::from_file_stem(stem));
    }

    /// Make every call fail with [`StorageErrorKind::Unavailable`].
    #[must_use]
    pub fn unavailable(self) -> Self {
        self.set_unavailable(true);
        self
    }

    /// Toggle the unavailable state after construction.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Add or replace a document after construction.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_document(&self, stem: &str, content: impl Into<String>) {
        let id = DocumentId::from_file_stem(stem);
        {
            let mut entries = self.entries.write().unwrap();
            if !entries.iter().any(|e| e.id == id) {
                entries.push(Self::entry(stem));
            }
        }
        self.contents.write().unwrap().insert(id, content.into());
    }

    /// Number of `list()` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Number of `read()` calls so far.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Emit a storage event.
    ///
    /// Only works if `watch()` has been called first.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn emit(&self, stem: &str, kind: StorageEventKind) {
        if let Some(sender) = self.event_sender.read().unwrap().as_ref() {
            let _ = sender.send(StorageEvent {
                id: DocumentId::from_file_stem(stem),
                kind,
            });
        }
    }

    fn entry(stem: &str) -> DocumentEntry {
        DocumentEntry {
            id: DocumentId::from_file_stem(stem),
            file_name: format!("{stem}.md"),
        }
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::new(StorageErrorKind::Unavailable).with_backend(BACKEND));
        }
        Ok(())
    }
}

impl Storage for MockStorage {
    fn list(&self) -> Result<Vec<DocumentEntry>, StorageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.entries.read().unwrap().clone())
    }

    fn read(&self, id: &DocumentId) -> Result<String, StorageError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        if self.unreadable.read().unwrap().contains(id) {
            return Err(StorageError::new(StorageErrorKind::Unavailable)
                .with_path(id.as_str())
                .with_backend(BACKEND));
        }
        self.contents
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id.as_str()).with_backend(BACKEND))
    }

    fn watch(&self) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (tx, rx) = mpsc::channel();
        *self.event_sender.write().unwrap() = Some(tx);
        Ok((StorageEventReceiver::new(rx), WatchHandle::no_op()))
    }
}
