//! Cached document loading and rendering.
//!
//! [`Library`] turns raw documents from a [`Storage`] backend into
//! [`DocumentSummary`] lists and rendered [`DocumentContent`], keeping both
//! in memory until [`Library::invalidate`] is called.
//!
//! # Thread Safety
//!
//! `Library` is `Send + Sync` and meant to be shared behind an `Arc`:
//! - cached values are `Arc`s, so hits only clone a pointer under a read lock
//! - misses parse and convert without holding any lock, then insert under a
//!   short write lock (concurrent misses for one document may both do the
//!   work; the last insert wins)
//! - `invalidate()` takes each write lock once and never fails
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use quire_site::Library;
//! use quire_storage::{DocumentId, FsStorage};
//!
//! let library = Library::new(Arc::new(FsStorage::new(PathBuf::from("mdchapters"))));
//!
//! for summary in library.summaries()?.iter() {
//!     println!("{}: {}", summary.id, summary.title);
//! }
//! let intro = library.content(&DocumentId::from_file_stem("intro"))?;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use quire_renderer::{HtmlConverter, MarkupConverter};
use quire_storage::{
    DocumentId, Storage, StorageError, StorageEventReceiver, WatchHandle,
};

use crate::document::{DocumentContent, DocumentSummary};
use crate::front_matter;
use crate::metadata::DocumentMetadata;

/// Error returned by [`Library`] operations.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// The document store could not be enumerated or read.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),
    /// No document exists for the identifier.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),
}

/// Document pipeline with a list cache and a per-document content cache.
pub struct Library {
    storage: Arc<dyn Storage>,
    converter: Arc<dyn MarkupConverter>,
    /// All summaries in enumeration order; `None` until first listed.
    list_cache: RwLock<Option<Arc<[DocumentSummary]>>>,
    content_cache: RwLock<HashMap<DocumentId, Arc<DocumentContent>>>,
}

impl Library {
    /// Create a library over `storage` using the default HTML converter.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::builder(storage).build()
    }

    /// Start building a library over `storage`.
    #[must_use]
    pub fn builder(storage: Arc<dyn Storage>) -> LibraryBuilder {
        LibraryBuilder {
            storage,
            converter: None,
        }
    }

    /// Summaries of all documents, in enumeration order.
    ///
    /// The first call reads every document; later calls return the cached
    /// list without touching the store until [`invalidate`](Self::invalidate).
    /// Documents with a malformed header are listed with default metadata.
    /// Documents that vanish between enumeration and read are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::StoreUnavailable`] if the store can't be
    /// enumerated or a listed document fails to read for any reason other
    /// than being gone. Nothing is cached in that case.
    pub fn summaries(&self) -> Result<Arc<[DocumentSummary]>, LibraryError> {
        if let Some(cached) = self
            .list_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            tracing::debug!(count = cached.len(), "Summary list cache hit");
            return Ok(Arc::clone(cached));
        }

        tracing::debug!("Summary list cache miss");
        let entries = self.storage.list().map_err(LibraryError::StoreUnavailable)?;

        let mut summaries = Vec::with_capacity(entries.len());
        for entry in entries {
            let raw = match self.storage.read(&entry.id) {
                Ok(raw) => raw,
                Err(e) if e.is_not_found() => {
                    tracing::warn!(id = %entry.id, file = %entry.file_name, error = %e, "Skipping vanished document");
                    continue;
                }
                Err(e) => return Err(LibraryError::StoreUnavailable(e)),
            };
            let (metadata, _) = parse_document(&entry.id, &raw);
            summaries.push(DocumentSummary::new(entry.id, metadata));
        }

        let summaries: Arc<[DocumentSummary]> = summaries.into();
        tracing::debug!(count = summaries.len(), "Loaded document summaries");
        *self
            .list_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&summaries));
        Ok(summaries)
    }

    /// Rendered content of one document.
    ///
    /// Cached per identifier until [`invalidate`](Self::invalidate).
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::DocumentNotFound`] if no document exists for
    /// `id` (including identifiers that can't name a file), or
    /// [`LibraryError::StoreUnavailable`] for any other read failure.
    pub fn content(&self, id: &DocumentId) -> Result<Arc<DocumentContent>, LibraryError> {
        if let Some(cached) = self
            .content_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            tracing::debug!(%id, "Content cache hit");
            return Ok(Arc::clone(cached));
        }

        tracing::debug!(%id, "Content cache miss");
        let raw = self.storage.read(id).map_err(|e| {
            if e.is_not_found() {
                LibraryError::DocumentNotFound(id.clone())
            } else {
                LibraryError::StoreUnavailable(e)
            }
        })?;

        let (metadata, body) = parse_document(id, &raw);
        let rendered_body = self.converter.convert(body);
        let content = Arc::new(DocumentContent::new(id.clone(), metadata, rendered_body));

        self.content_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::clone(&content));
        Ok(content)
    }

    /// Drop both caches.
    ///
    /// The next [`summaries`](Self::summaries) call re-enumerates the store
    /// and the next [`content`](Self::content) call for any document reads it
    /// again.
    pub fn invalidate(&self) {
        *self
            .list_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        let evicted = {
            let mut cache = self
                .content_cache
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let evicted = cache.len();
            cache.clear();
            evicted
        };
        tracing::info!(evicted, "Invalidated document caches");
    }

    /// Watch the underlying store for document changes.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::StoreUnavailable`] if the store can't be watched.
    pub fn watch(&self) -> Result<(StorageEventReceiver, WatchHandle), LibraryError> {
        self.storage.watch().map_err(LibraryError::StoreUnavailable)
    }
}

/// Builder for [`Library`].
pub struct LibraryBuilder {
    storage: Arc<dyn Storage>,
    converter: Option<Arc<dyn MarkupConverter>>,
}

impl LibraryBuilder {
    /// Use a custom markup converter instead of [`HtmlConverter`].
    #[must_use]
    pub fn converter(mut self, converter: Arc<dyn MarkupConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    #[must_use]
    pub fn build(self) -> Library {
        Library {
            storage: self.storage,
            converter: self
                .converter
                .unwrap_or_else(|| Arc::new(HtmlConverter::new())),
            list_cache: RwLock::new(None),
            content_cache: RwLock::new(HashMap::new()),
        }
    }
}

/// Split a document and parse its header.
///
/// A malformed header is logged and replaced by empty metadata.
fn parse_document<'a>(id: &DocumentId, raw: &'a str) -> (DocumentMetadata, &'a str) {
    let doc = front_matter::split(raw);
    let metadata = match doc.header.map(DocumentMetadata::parse) {
        None => DocumentMetadata::default(),
        Some(Ok(metadata)) => metadata,
        Some(Err(e)) => {
            tracing::warn!(%id, error = %e, "Ignoring malformed document header");
            DocumentMetadata::default()
        }
    };
    (metadata, doc.body)
}

#[cfg(test)]
mod tests {
    static_assertions::assert_impl_all!(super::Library: Send, Sync);

    use pretty_assertions::assert_eq;
    use quire_storage::MockStorage;

    use super::*;

    fn library(storage: &Arc<MockStorage>) -> Library {
        Library::new(Arc::clone(storage) as Arc<dyn Storage>)
    }

    fn id(stem: &str) -> DocumentId {
        DocumentId::from_file_stem(stem)
    }

    struct UpperConverter;

    impl MarkupConverter for UpperConverter {
        fn convert(&self, markdown: &str) -> String {
            markdown.to_uppercase()
        }
    }

    #[test]
    fn test_intro_end_to_end() {
        let storage = Arc::new(
            MockStorage::new().with_document("intro", "---\ntitle: Introduction\norder: 1\n---\n# Hello\nWorld"),
        );
        let library = library(&storage);

        let summaries = library.summaries().unwrap();
        assert_eq!(
            summaries.to_vec(),
            vec![DocumentSummary {
                id: id("intro"),
                title: "Introduction".to_owned(),
                description: None,
                order: Some(1.0),
            }]
        );

        let content = library.content(&id("intro")).unwrap();
        assert_eq!(content.title, "Introduction");
        assert_eq!(content.order, Some(1.0));
        assert_eq!(content.rendered_body, "<h1>Hello</h1>\n<p>World</p>\n");
    }

    #[test]
    fn test_summaries_preserve_enumeration_order() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("zeta", "---\norder: 1\n---\n")
                .with_document("alpha", "---\norder: 2\n---\n"),
        );

        let summaries = library(&storage).summaries().unwrap();

        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_summaries_cached_without_store_calls() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("a", "# A")
                .with_document("b", "# B"),
        );
        let library = library(&storage);

        let first = library.summaries().unwrap();
        let (lists, reads) = (storage.list_calls(), storage.read_calls());
        let second = library.summaries().unwrap();

        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(storage.list_calls(), lists);
        assert_eq!(storage.read_calls(), reads);
    }

    #[test]
    fn test_content_cached_without_reads() {
        let storage = Arc::new(MockStorage::new().with_document("intro", "# Hello"));
        let library = library(&storage);

        let first = library.content(&id("intro")).unwrap();
        let second = library.content(&id("intro")).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(storage.read_calls(), 1);
    }

    #[test]
    fn test_cached_content_survives_store_changes() {
        let storage = Arc::new(MockStorage::new().with_document("intro", "# Old"));
        let library = library(&storage);
        library.content(&id("intro")).unwrap();

        storage.add_document("intro", "# New");

        let content = library.content(&id("intro")).unwrap();
        assert_eq!(content.rendered_body, "<h1>Old</h1>\n");
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let storage = Arc::new(MockStorage::new().with_document("intro", "# Old"));
        let library = library(&storage);
        library.summaries().unwrap();
        library.content(&id("intro")).unwrap();

        storage.add_document("intro", "---\ntitle: Fresh\n---\n# New");
        storage.add_document("extra", "# Extra");
        library.invalidate();

        let summaries = library.summaries().unwrap();
        let content = library.content(&id("intro")).unwrap();

        assert_eq!(storage.list_calls(), 2);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].title, "Fresh");
        assert_eq!(content.rendered_body, "<h1>New</h1>\n");
    }

    #[test]
    fn test_invalidate_on_empty_caches() {
        let storage = Arc::new(MockStorage::new());
        let library = library(&storage);

        library.invalidate();
        library.invalidate();

        assert_eq!(storage.list_calls(), 0);
        assert!(library.summaries().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_header_uses_defaults() {
        let storage = Arc::new(
            MockStorage::new().with_document("broken doc", "---\ntitle: [unclosed\n---\nBody text"),
        );
        let library = library(&storage);

        let summaries = library.summaries().unwrap();
        assert_eq!(summaries[0].title, "broken doc");
        assert_eq!(summaries[0].order, None);

        let content = library.content(&id("broken doc")).unwrap();
        assert_eq!(content.title, "broken doc");
        assert_eq!(content.rendered_body, "<p>Body text</p>\n");
    }

    #[test]
    fn test_no_header_title_from_identifier() {
        let storage = Arc::new(MockStorage::new().with_document("Глава 1", "text"));

        let summaries = library(&storage).summaries().unwrap();

        assert_eq!(summaries[0].title, "Глава 1");
        assert_eq!(summaries[0].id, id("Глава 1"));
    }

    #[test]
    fn test_unclosed_header_consumes_document() {
        let storage = Arc::new(MockStorage::new().with_document("draft", "---\ntitle: Draft\n"));
        let library = library(&storage);

        let content = library.content(&id("draft")).unwrap();

        assert_eq!(content.title, "Draft");
        assert_eq!(content.rendered_body, "");
    }

    #[test]
    fn test_content_not_found() {
        let storage = Arc::new(MockStorage::new());
        let library = library(&storage);

        let err = library.content(&id("missing")).unwrap_err();

        assert!(matches!(err, LibraryError::DocumentNotFound(ref missing) if missing.as_str() == "missing"));
        assert_eq!(err.to_string(), "document not found: missing");
    }

    #[test]
    fn test_not_found_is_not_cached() {
        let storage = Arc::new(MockStorage::new());
        let library = library(&storage);
        assert!(library.content(&id("late")).is_err());

        storage.add_document("late", "# Late");

        assert_eq!(
            library.content(&id("late")).unwrap().rendered_body,
            "<h1>Late</h1>\n"
        );
    }

    #[test]
    fn test_store_unavailable_on_list() {
        let storage = Arc::new(MockStorage::new().with_document("a", "x").unavailable());
        let library = library(&storage);

        let err = library.summaries().unwrap_err();
        assert!(matches!(err, LibraryError::StoreUnavailable(_)));

        storage.set_unavailable(false);
        assert_eq!(library.summaries().unwrap().len(), 1);
        assert_eq!(storage.list_calls(), 2);
    }

    #[test]
    fn test_store_unavailable_on_read() {
        let storage = Arc::new(MockStorage::new().with_document("a", "x").unavailable());

        let err = library(&storage).content(&id("a")).unwrap_err();

        assert!(matches!(err, LibraryError::StoreUnavailable(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_vanished_document_skipped_in_listing() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("a", "# A")
                .with_listed_only("ghost")
                .with_document("b", "# B"),
        );

        let summaries = library(&storage).summaries().unwrap();

        let ids: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_unreadable_document_fails_listing() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("a", "# A")
                .with_unreadable("locked", "# Locked"),
        );
        let library = library(&storage);

        let err = library.summaries().unwrap_err();
        assert!(matches!(err, LibraryError::StoreUnavailable(_)));

        storage.set_readable("locked");
        assert_eq!(library.summaries().unwrap().len(), 2);
        assert_eq!(storage.list_calls(), 2);
    }

    #[test]
    fn test_custom_converter() {
        let storage = Arc::new(MockStorage::new().with_document("a", "---\ntitle: T\n---\nbody"));
        let library = Library::builder(Arc::clone(&storage) as Arc<dyn Storage>)
            .converter(Arc::new(UpperConverter))
            .build();

        assert_eq!(library.content(&id("a")).unwrap().rendered_body, "BODY");
    }

    #[test]
    fn test_watch_forwards_store_events() {
        let storage = Arc::new(MockStorage::new());
        let library = library(&storage);
        let (rx, _handle) = library.watch().unwrap();

        storage.emit("intro", quire_storage::StorageEventKind::Modified);

        assert_eq!(rx.try_recv().unwrap().id, id("intro"));
    }

    #[test]
    fn test_concurrent_access() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("a", "# A")
                .with_document("b", "# B"),
        );
        let library = Arc::new(library(&storage));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let library = Arc::clone(&library);
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        assert_eq!(library.summaries().unwrap().len(), 2);
                        let stem = if i % 2 == 0 { "a" } else { "b" };
                        let content = library.content(&id(stem)).unwrap();
                        assert_eq!(content.title, stem);
                        if i == 0 {
                            library.invalidate();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
