//! Versioned documentation corpus for Folio.
//!
//! This crate provides:
//! - [`Site`]: per-version corpus cache with atomic snapshot replacement
//! - [`Corpus`]: resolved documents of one version with slug resolution and adjacency
//! - [`Toc`]: heading-based table of contents
//! - [`CorpusWatcher`]: invalidates cached versions on storage change signals
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use folio_site::{Resolution, Site};
//! use folio_storage_fs::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("docs")));
//! let site = Site::new(storage);
//!
//! match site.resolve("v1", "guide/intro")? {
//!     Resolution::Document(doc) => println!("{}", doc.title),
//!     Resolution::Category(listing) => println!("{} pages", listing.documents.len()),
//!     Resolution::NotFound => println!("not found"),
//! }
//! # Ok(())
//! # }
//! ```

mod corpus;
mod document;
mod inheritance;
mod navigation;
mod resolve;
mod site;
mod toc;
mod watcher;

pub use corpus::Corpus;
pub use document::Document;
pub use inheritance::{category_tab_group, resolve_tab_group};
pub use navigation::{Adjacent, DocPage, NavLink};
pub use resolve::{CategoryListing, Resolution, normalize_slug};
pub use site::{Site, StaticParam};
pub use toc::{Toc, TocEntries, TocEntry, TocNode};
pub use watcher::CorpusWatcher;
