//! Per-version corpus cache.
//!
//! [`Site`] walks a version the first time it is requested and keeps the
//! resulting [`Corpus`] until the version is invalidated. Reloads build the
//! new snapshot off to the side and publish it with a single map insert, so
//! concurrent readers see either the old `Arc<Corpus>` or the new one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde::Serialize;

use folio_storage::{Storage, StorageError};

use crate::corpus::Corpus;
use crate::document::Document;
use crate::navigation::DocPage;
use crate::resolve::{Resolution, normalize_slug};

/// One pre-generatable page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StaticParam {
    pub version: String,
    pub slug: String,
}

/// Versioned documentation corpus with lazy, per-version caching.
///
/// # Thread Safety
///
/// Designed for concurrent access without external locking:
/// - `RwLock<HashMap<_, Arc<Corpus>>>` holds the published snapshots
/// - `Mutex<()>` serializes reloads so a version is walked once per invalidation
/// - `AtomicU64` generation discards loads that raced with an invalidation
pub struct Site {
    storage: Arc<dyn Storage>,
    /// Mutex for serializing reload operations.
    reload_lock: Mutex<()>,
    /// Published snapshots by version.
    corpora: RwLock<HashMap<String, Arc<Corpus>>>,
    /// Cached version listing.
    versions: RwLock<Option<Arc<[String]>>>,
    /// Bumped by every invalidation.
    generation: AtomicU64,
}

impl Site {
    /// Create a site over a storage backend. Nothing is walked until first use.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            reload_lock: Mutex::new(()),
            corpora: RwLock::new(HashMap::new()),
            versions: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Available versions, sorted ascending.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn list_versions(&self) -> Result<Vec<String>, StorageError> {
        if let Some(versions) = self.versions.read().unwrap().as_ref() {
            return Ok(versions.to_vec());
        }
        let generation = self.generation.load(Ordering::Acquire);
        let versions: Arc<[String]> = self.storage.versions()?.into();
        if self.generation.load(Ordering::Acquire) == generation {
            *self.versions.write().unwrap() = Some(Arc::clone(&versions));
        }
        Ok(versions.to_vec())
    }

    fn cached(&self, version: &str) -> Option<Arc<Corpus>> {
        self.corpora.read().unwrap().get(version).cloned()
    }

    /// Current snapshot for a version, walking it if needed.
    ///
    /// Uses double-checked locking:
    /// 1. Fast path: return the published snapshot
    /// 2. Slow path: acquire `reload_lock`, recheck, then walk
    ///
    /// Returns `Ok(None)` for a version the storage does not have. Unknown
    /// versions are never cached.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn corpus(&self, version: &str) -> Result<Option<Arc<Corpus>>, StorageError> {
        if let Some(corpus) = self.cached(version) {
            return Ok(Some(corpus));
        }

        let _guard = self.reload_lock.lock().unwrap();

        if let Some(corpus) = self.cached(version) {
            return Ok(Some(corpus));
        }

        self.load(version)
    }

    /// Walk a version now and publish the result, replacing any cached snapshot.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn refresh(&self, version: &str) -> Result<Option<Arc<Corpus>>, StorageError> {
        let _guard = self.reload_lock.lock().unwrap();
        self.load(version)
    }

    /// Walk and publish. Caller must hold `reload_lock`.
    fn load(&self, version: &str) -> Result<Option<Arc<Corpus>>, StorageError> {
        let generation = self.generation.load(Ordering::Acquire);

        let scan = match self.storage.scan(version) {
            Ok(scan) => scan,
            Err(e) if e.is_not_found() => {
                tracing::debug!(version, "Unknown version");
                self.corpora.write().unwrap().remove(version);
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(version, error = %e, "Failed to scan version");
                return Err(e);
            }
        };

        let corpus = Arc::new(Corpus::build(version, scan));
        tracing::debug!(
            version,
            documents = corpus.documents().len(),
            warnings = corpus.warnings().len(),
            "Loaded corpus"
        );

        // An invalidation during the walk may have missed what we just read.
        // Serve this snapshot once but let the next caller walk again.
        if self.generation.load(Ordering::Acquire) == generation {
            self.corpora
                .write()
                .unwrap()
                .insert(version.to_owned(), Arc::clone(&corpus));
        }
        Ok(Some(corpus))
    }

    /// Drop the cached snapshot for a version.
    ///
    /// Readers holding the old `Arc<Corpus>` keep using it. The next request
    /// walks the version again. The version listing is also dropped since the
    /// signal may come from a newly created version.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn invalidate(&self, version: &str) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.corpora.write().unwrap().remove(version);
        *self.versions.write().unwrap() = None;
        tracing::debug!(version, "Invalidated corpus");
    }

    /// Drop every cached snapshot.
    ///
    /// # Panics
    ///
    /// Panics if internal locks are poisoned.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.corpora.write().unwrap().clear();
        *self.versions.write().unwrap() = None;
    }

    /// Classify a slug within a version.
    ///
    /// An unknown version resolves to [`Resolution::NotFound`].
    pub fn resolve(&self, version: &str, slug: &str) -> Result<Resolution, StorageError> {
        Ok(self
            .corpus(version)?
            .map_or(Resolution::NotFound, |corpus| corpus.resolve(slug)))
    }

    /// Document with previous/next links and table of contents.
    ///
    /// Returns `None` unless the slug names a document.
    pub fn page(&self, version: &str, slug: &str) -> Result<Option<DocPage>, StorageError> {
        let Some(corpus) = self.corpus(version)? else {
            return Ok(None);
        };
        let slug = normalize_slug(slug);
        let (Some(document), Some(adjacent)) = (corpus.get(&slug), corpus.adjacent(&slug)) else {
            return Ok(None);
        };
        Ok(Some(DocPage::new(Arc::clone(document), &adjacent)))
    }

    /// Documents of a version in corpus order. Empty for an unknown version.
    pub fn list_documents(&self, version: &str) -> Result<Vec<Arc<Document>>, StorageError> {
        Ok(self
            .corpus(version)?
            .map(|corpus| corpus.documents().to_vec())
            .unwrap_or_default())
    }

    /// Every `(version, slug)` pair, versions ascending, documents in corpus order.
    pub fn static_params(&self) -> Result<Vec<StaticParam>, StorageError> {
        let mut params = Vec::new();
        for version in self.list_versions()? {
            for doc in self.list_documents(&version)? {
                params.push(StaticParam {
                    version: version.clone(),
                    slug: doc.slug.clone(),
                });
            }
        }
        Ok(params)
    }
}
