//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, mpsc};

use crate::event::{StorageEvent, StorageEventReceiver, WatchHandle};
use crate::metadata::{CategoryDescriptor, Frontmatter};
use crate::scan::{RawDocument, ScanResult, ScanWarning};
use crate::storage::{Storage, StorageError};

#[derive(Clone, Debug, Default)]
struct VersionContent {
    documents: Vec<RawDocument>,
    descriptors: Vec<CategoryDescriptor>,
    warnings: Vec<ScanWarning>,
}

/// Mock storage for testing.
///
/// Holds versions in memory. Documents are returned in insertion order, which
/// stands in for walk order. Use the builder methods to configure the mock
/// with test data.
///
/// # Example
///
/// ```ignore
/// use folio_storage::{Frontmatter, MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_document("v1", "intro.md", Frontmatter::default(), "# Intro")
///     .with_descriptor("v1", "guide", Some("guides"));
///
/// let scan = storage.scan("v1").unwrap();
/// assert_eq!(scan.documents[0].slug, "intro");
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    versions: RwLock<BTreeMap<String, VersionContent>>,
    scans: AtomicUsize,
    event_sender: RwLock<Option<mpsc::Sender<StorageEvent>>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a version with no content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_version(self, version: impl Into<String>) -> Self {
        self.versions
            .write()
            .unwrap()
            .entry(version.into())
            .or_default();
        self
    }

    /// Add a content file to a version.
    ///
    /// The slug is the path with its extension stripped.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(
        self,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
        frontmatter: Frontmatter,
        body: impl Into<String>,
    ) -> Self {
        let source_path: PathBuf = path.into();
        let slug = slug_for(&source_path);
        self.versions
            .write()
            .unwrap()
            .entry(version.into())
            .or_default()
            .documents
            .push(RawDocument {
                slug,
                source_path,
                frontmatter,
                body: body.into(),
            });
        self
    }

    /// Add a category descriptor for a directory.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_descriptor(
        self,
        version: impl Into<String>,
        dir: impl Into<String>,
        tab_group: Option<&str>,
    ) -> Self {
        self.with_category(
            version,
            CategoryDescriptor {
                path: dir.into(),
                tab_group: tab_group.map(str::to_owned),
                ..Default::default()
            },
        )
    }

    /// Add a fully specified category descriptor.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_category(self, version: impl Into<String>, descriptor: CategoryDescriptor) -> Self {
        self.versions
            .write()
            .unwrap()
            .entry(version.into())
            .or_default()
            .descriptors
            .push(descriptor);
        self
    }

    /// Add a warning that every scan of the version reports.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_warning(self, version: impl Into<String>, warning: ScanWarning) -> Self {
        self.versions
            .write()
            .unwrap()
            .entry(version.into())
            .or_default()
            .warnings
            .push(warning);
        self
    }

    /// Replace the body of an existing document, as an edit on disk would.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_body(&self, version: &str, slug: &str, body: impl Into<String>) {
        let mut versions = self.versions.write().unwrap();
        if let Some(doc) = versions
            .get_mut(version)
            .and_then(|content| content.documents.iter_mut().find(|d| d.slug == slug))
        {
            doc.body = body.into();
        }
    }

    /// Number of [`Storage::scan`] calls served so far.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Send a change event for a version to the active watcher, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn emit(&self, version: &str) {
        if let Some(tx) = self.event_sender.read().unwrap().as_ref() {
            let _ = tx.send(StorageEvent {
                version: version.to_owned(),
                paths: Vec::new(),
            });
        }
    }
}

fn slug_for(path: &Path) -> String {
    path.with_extension("")
        .to_string_lossy()
        .replace('\\', "/")
}

impl Storage for MockStorage {
    fn versions(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.versions.read().unwrap().keys().cloned().collect())
    }

    fn scan(&self, version: &str) -> Result<ScanResult, StorageError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        let content = self
            .versions
            .read()
            .unwrap()
            .get(version)
            .cloned()
            .ok_or_else(|| StorageError::not_found(version).with_backend("Mock"))?;

        let mut result = ScanResult {
            documents: content.documents,
            descriptors: content.descriptors,
            warnings: content.warnings,
        };
        result.resolve_collisions();
        Ok(result)
    }

    fn watch(&self) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (event_tx, event_rx) = mpsc::channel();
        let (stop_tx, _stop_rx) = mpsc::channel();
        *self.event_sender.write().unwrap() = Some(event_tx);
        Ok((StorageEventReceiver::new(event_rx), WatchHandle::new(stop_tx)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_versions_sorted() {
        let storage = MockStorage::new().with_version("v2").with_version("v1");

        assert_eq!(storage.versions().unwrap(), vec!["v1", "v2"]);
    }

    #[test]
    fn test_scan_unknown_version_not_found() {
        let storage = MockStorage::new();

        let err = storage.scan("v9").unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Mock"));
    }

    #[test]
    fn test_scan_derives_slugs_and_counts_calls() {
        let storage = MockStorage::new()
            .with_document("v1", "guide/setup.mdx", Frontmatter::default(), "Setup")
            .with_descriptor("v1", "guide", Some("guides"));

        let scan = storage.scan("v1").unwrap();

        assert_eq!(scan.documents[0].slug, "guide/setup");
        assert_eq!(scan.descriptors[0].tab_group.as_deref(), Some("guides"));
        assert_eq!(storage.scan_count(), 1);
    }

    #[test]
    fn test_scan_resolves_collisions() {
        let storage = MockStorage::new()
            .with_document("v1", "a.md", Frontmatter::default(), "first")
            .with_document("v1", "a.mdx", Frontmatter::default(), "second");

        let scan = storage.scan("v1").unwrap();

        assert_eq!(scan.documents.len(), 1);
        assert_eq!(scan.documents[0].body, "second");
        assert_eq!(scan.warnings.len(), 1);
    }

    #[test]
    fn test_set_body() {
        let storage =
            MockStorage::new().with_document("v1", "a.md", Frontmatter::default(), "old");

        storage.set_body("v1", "a", "new");

        assert_eq!(storage.scan("v1").unwrap().documents[0].body, "new");
    }

    #[test]
    fn test_emit_reaches_watcher() {
        let storage = MockStorage::new();
        let (rx, _handle) = storage.watch().unwrap();

        storage.emit("v1");

        assert_eq!(rx.try_recv().map(|e| e.version), Some("v1".to_owned()));
    }
}
