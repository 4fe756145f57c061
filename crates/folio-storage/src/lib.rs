//! Storage abstraction for the Folio documentation corpus.
//!
//! This crate provides a [`Storage`] trait that hides where versioned content
//! comes from. A backend walks one version at a time and hands back a
//! [`ScanResult`]: raw documents in walk order, per-directory
//! [`CategoryDescriptor`]s and the non-fatal warnings produced on the way.
//!
//! - **Unit testing** without touching the real filesystem ([`MockStorage`], `mock` feature)
//! - **Backend flexibility**: the filesystem backend lives in `folio-storage-fs`
//! - **Change signals** through [`Storage::watch`]
//!
//! # Example
//!
//! ```ignore
//! use folio_storage::Storage;
//! use folio_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new("docs".into());
//! for version in storage.versions()? {
//!     let scan = storage.scan(&version)?;
//!     println!("{version}: {} documents", scan.documents.len());
//! }
//! ```

mod event;
mod metadata;
#[cfg(feature = "mock")]
mod mock;
mod scan;
mod storage;

pub use event::{StorageEvent, StorageEventReceiver, WatchHandle};
pub use metadata::{CategoryDescriptor, Frontmatter};
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use scan::{RawDocument, ScanResult, ScanWarning};
pub use storage::{Storage, StorageError, StorageErrorKind};
