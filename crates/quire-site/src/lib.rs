//! Document content pipeline for Quire.
//!
//! Loads documents from a [`quire_storage::Storage`] backend, splits off the
//! YAML header, converts the body to HTML and caches the results:
//!
//! - [`Library::summaries`] lists every document with its metadata
//! - [`Library::content`] renders one document
//! - [`Library::invalidate`] drops both caches
//!
//! [`sorted_for_index`] orders summaries for display.

mod document;
pub mod front_matter;
mod index;
mod library;
mod metadata;

pub use document::{DocumentContent, DocumentSummary};
pub use index::sorted_for_index;
pub use library::{Library, LibraryBuilder, LibraryError};
pub use metadata::{DocumentMetadata, MetadataError};
