//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading documents from a single flat directory
//! of `<name>.<ext>` files.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};

use crate::debouncer::EventDebouncer;
use crate::event::{StorageEventKind, StorageEventReceiver, WatchHandle};
use crate::identifier::DocumentId;
use crate::storage::{DocumentEntry, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Quiet period before a burst of changes to one document is reported.
const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);

/// How often the drain thread checks for ready events.
const DRAIN_INTERVAL: Duration = Duration::from_millis(25);

/// Default document file extension.
pub const DEFAULT_EXTENSION: &str = "md";

/// Filesystem storage implementation.
///
/// Lists regular files with the configured extension in `source_dir`
/// (non-recursive). Hidden files are skipped. The document identifier is the
/// encoded file stem.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use quire_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("mdchapters"));
/// let entries = storage.list()?;
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Directory holding the document files.
    source_dir: PathBuf,
    /// Extension without the leading dot.
    extension: String,
}

impl FsStorage {
    /// Create a new filesystem storage for `.md` documents.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self::with_extension(source_dir, DEFAULT_EXTENSION)
    }

    /// Create a new filesystem storage with a custom document extension.
    ///
    /// A leading dot in `extension` is ignored.
    #[must_use]
    pub fn with_extension(source_dir: PathBuf, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            source_dir,
            extension: extension.trim_start_matches('.').to_owned(),
        }
    }

    /// File stem of `path` if it names a visible document file.
    fn document_stem<'a>(&self, path: &'a Path) -> Option<&'a str> {
        if path.extension() != Some(OsStr::new(&self.extension)) {
            return None;
        }
        let name = path.file_name()?.to_str()?;
        if name.starts_with('.') {
            return None;
        }
        path.file_stem()?.to_str()
    }

    /// Resolve an identifier to the document's full path.
    ///
    /// Rejects identifiers that don't decode or that would name something
    /// other than a plain file inside `source_dir` (e.g. `..%2Fsecret`).
    fn resolve(&self, id: &DocumentId) -> Result<PathBuf, StorageError> {
        let invalid = || {
            StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(id.as_str())
                .with_backend(BACKEND)
        };

        let name = id.decode().map_err(|e| invalid().with_source(e))?;
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
            return Err(invalid());
        }

        Ok(self.source_dir.join(format!("{name}.{}", self.extension)))
    }
}

impl Storage for FsStorage {
    fn list(&self) -> Result<Vec<DocumentEntry>, StorageError> {
        let entries = fs::read_dir(&self.source_dir).map_err(|e| {
            StorageError::io(e, Some(self.source_dir.clone())).with_backend(BACKEND)
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                StorageError::io(e, Some(self.source_dir.clone())).with_backend(BACKEND)
            })?;
            let path = entry.path();

            // Follows symlinks, so linked documents are listed too.
            if !path.is_file() {
                continue;
            }

            let Some(stem) = self.document_stem(&path) else {
                tracing::trace!(path = %path.display(), "Skipping non-document entry");
                continue;
            };

            documents.push(DocumentEntry {
                id: DocumentId::from_file_stem(stem),
                file_name: entry.file_name().to_string_lossy().into_owned(),
            });
        }

        tracing::debug!(
            dir = %self.source_dir.display(),
            count = documents.len(),
            "Listed documents"
        );
        Ok(documents)
    }

    fn read(&self, id: &DocumentId) -> Result<String, StorageError> {
        let full_path = self.resolve(id)?;
        tracing::debug!(id = %id, path = %full_path.display(), "Reading document");
        fs::read_to_string(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn watch(&self) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (event_tx, event_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let debouncer = Arc::new(EventDebouncer::new(DEBOUNCE_WINDOW));

        let filter = Self::with_extension(self.source_dir.clone(), self.extension.clone());
        let watcher_debouncer = Arc::clone(&debouncer);

        let mut watcher =
            notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "File watcher error");
                        return;
                    }
                };
                let Some(kind) = storage_event_kind(event.kind) else {
                    return;
                };

                // Non-recursive watch: every path is the directory or a direct child.
                for path in event.paths {
                    if let Some(stem) = filter.document_stem(&path) {
                        watcher_debouncer.record(DocumentId::from_file_stem(stem), kind);
                    }
                }
            })
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Other)
                    .with_backend(BACKEND)
                    .with_source(e)
            })?;

        watcher
            .watch(&self.source_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                StorageError::new(StorageErrorKind::Unavailable)
                    .with_path(self.source_dir.clone())
                    .with_backend(BACKEND)
                    .with_source(e)
            })?;

        tracing::info!(dir = %self.source_dir.display(), "Watching document directory");

        // The drain thread owns the watcher; dropping the handle stops both.
        std::thread::spawn(move || {
            let _watcher = watcher;

            loop {
                match shutdown_rx.recv_timeout(DRAIN_INTERVAL) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                for event in debouncer.drain_ready() {
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((
            StorageEventReceiver::new(event_rx),
            WatchHandle::new(shutdown_tx),
        ))
    }
}

/// Map a `notify` event kind to a document change, ignoring access events.
fn storage_event_kind(kind: notify::EventKind) -> Option<StorageEventKind> {
    match kind {
        notify::EventKind::Create(_) => Some(StorageEventKind::Created),
        notify::EventKind::Modify(_) => Some(StorageEventKind::Modified),
        notify::EventKind::Remove(_) => Some(StorageEventKind::Removed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::event::RecvTimeoutError;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    fn create_test_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }

    fn sorted_ids(entries: &[DocumentEntry]) -> Vec<&str> {
        let mut ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn test_list_empty_dir() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();

        assert!(entries.is_empty());
    }

    #[test]
    fn test_list_missing_dir_fails() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().join("nonexistent"));

        let err = storage.list().unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_list_flat_directory() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("intro.md"), "# Intro").unwrap();
        fs::write(temp_dir.path().join("parsing.md"), "# Parsing").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();

        assert_eq!(sorted_ids(&entries), vec!["intro", "parsing"]);
    }

    #[test]
    fn test_list_encodes_file_stems() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("Part 1.md"), "text").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id.as_str(), "Part%201");
        assert_eq!(entries[0].file_name, "Part 1.md");
    }

    #[test]
    fn test_list_strips_only_last_extension() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("v1.2.md"), "text").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();

        assert_eq!(entries[0].id.as_str(), "v1.2");
    }

    #[test]
    fn test_list_skips_other_extensions_dirs_and_hidden() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("intro.md"), "# Intro").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "notes").unwrap();
        fs::write(temp_dir.path().join(".draft.md"), "# Draft").unwrap();
        fs::create_dir(temp_dir.path().join("images.md")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();

        assert_eq!(sorted_ids(&entries), vec!["intro"]);
    }

    #[test]
    fn test_list_is_not_recursive() {
        let temp_dir = create_test_dir();
        let nested = temp_dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("inner.md"), "# Inner").unwrap();
        fs::write(temp_dir.path().join("outer.md"), "# Outer").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();

        assert_eq!(sorted_ids(&entries), vec!["outer"]);
    }

    #[test]
    fn test_custom_extension() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("intro.markdown"), "# Intro").unwrap();
        fs::write(temp_dir.path().join("other.md"), "# Other").unwrap();

        let storage = FsStorage::with_extension(temp_dir.path().to_path_buf(), ".markdown");
        let entries = storage.list().unwrap();

        assert_eq!(sorted_ids(&entries), vec!["intro"]);
        let text = storage.read(&DocumentId::new("intro")).unwrap();
        assert_eq!(text, "# Intro");
    }

    #[test]
    fn test_read_by_encoded_id() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("Part 1.md"), "# Part One").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let text = storage.read(&DocumentId::new("Part%201")).unwrap();

        assert_eq!(text, "# Part One");
    }

    #[test]
    fn test_read_listed_entries() {
        let temp_dir = create_test_dir();
        fs::write(temp_dir.path().join("введение.md"), "Привет").unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let entries = storage.list().unwrap();
        let text = storage.read(&entries[0].id).unwrap();

        assert_eq!(text, "Привет");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read(&DocumentId::new("missing-id")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(
            err.path.as_deref(),
            Some(temp_dir.path().join("missing-id.md").as_path())
        );
    }

    #[test]
    fn test_read_rejects_path_traversal() {
        let temp_dir = create_test_dir();
        let docs = temp_dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(temp_dir.path().join("secret.md"), "secret").unwrap();

        let storage = FsStorage::new(docs);
        let err = storage.read(&DocumentId::new("..%2Fsecret")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_read_rejects_undecodable_id() {
        let temp_dir = create_test_dir();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read(&DocumentId::new("%FF")).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidPath);
    }

    #[test]
    fn test_read_directory_is_not_not_found() {
        let temp_dir = create_test_dir();
        fs::create_dir(temp_dir.path().join("folder.md")).unwrap();

        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let err = storage.read(&DocumentId::new("folder")).unwrap_err();

        assert!(!err.is_not_found());
    }

    #[test]
    fn test_watch_missing_dir_fails() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().join("nonexistent"));

        assert!(storage.watch().is_err());
    }

    #[test]
    fn test_watch_reports_new_document() {
        let temp_dir = create_test_dir();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let (rx, _handle) = storage.watch().unwrap();

        fs::write(temp_dir.path().join("fresh.md"), "# Fresh").unwrap();

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.id.as_str(), "fresh");
    }

    #[test]
    fn test_watch_coalesces_rapid_writes() {
        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("a.md");
        fs::write(&path, "# A").unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let (rx, _handle) = storage.watch().unwrap();

        fs::write(&path, "# A\n\nFirst edit").unwrap();
        std::thread::sleep(Duration::from_millis(30));
        fs::write(&path, "# A\n\nSecond edit").unwrap();

        let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(event.id.as_str(), "a");
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(400)),
            Err(RecvTimeoutError::Timeout)
        );
    }
}
