//! Document store for the Quire document library.
//!
//! This crate provides a [`Storage`] trait that maps a flat document directory
//! to a set of [`DocumentId`]s and their raw text. This enables:
//!
//! - **Unit testing** of the content pipeline without touching the real filesystem
//! - **Clean separation** between parsing/caching logic and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `list()`, `read()`, and `watch()` methods
//! - [`FsStorage`] implementation reading `<name>.<ext>` files from one directory
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//! - [`DocumentId`], the URL-safe identifier derived from a file's base name
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use quire_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("mdchapters"));
//! for entry in storage.list()? {
//!     let text = storage.read(&entry.id)?;
//!     println!("{}: {} bytes", entry.file_name, text.len());
//! }
//! ```

mod debouncer;
mod event;
mod fs;
mod identifier;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use event::{RecvTimeoutError, StorageEvent, StorageEventKind, StorageEventReceiver, WatchHandle};
pub use fs::{DEFAULT_EXTENSION, FsStorage};
pub use identifier::{DocumentId, IdentifierError};
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{DocumentEntry, Storage, StorageError, StorageErrorKind};
