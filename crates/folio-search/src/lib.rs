//! Search projection and index synchronization.
//!
//! Turns resolved [`folio_site::Document`]s into flat [`SearchRecord`]s and
//! replaces the contents of an external full-text index with them.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use folio_search::{CancelHandle, Indexer, MeilisearchClient, MeilisearchConfig};
//!
//! let client = MeilisearchClient::new(MeilisearchConfig::new("http://127.0.0.1:7700", "docs"));
//! let indexer = Indexer::new(Arc::new(client));
//! let report = indexer.sync(&corpora, &CancelHandle::new())?;
//! println!("indexed {} records", report.total());
//! ```

mod client;
mod error;
mod record;
mod sanitize;
mod sync;

pub use client::{IndexSettings, MeilisearchClient, MeilisearchConfig, SearchIndex};
pub use error::{IndexError, SyncError, SyncStage};
pub use record::{PRIMARY_KEY, SearchRecord, record_id};
pub use sanitize::sanitize;
pub use sync::{CancelHandle, Indexer, SyncReport, SyncScope, VersionBatch};
