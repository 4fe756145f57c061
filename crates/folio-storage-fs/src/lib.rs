//! Filesystem storage backend for the Folio documentation corpus.
//!
//! This crate provides [`FsStorage`], a filesystem implementation of the
//! [`Storage`](folio_storage::Storage) trait. Each non-hidden directory under
//! the docs root is a version:
//!
//! ```text
//! docs/
//! ├── v1/
//! │   ├── intro.mdx
//! │   └── guide/
//! │       ├── _category_.json
//! │       └── setup.md
//! └── v2/
//!     └── ...
//! ```
//!
//! It handles:
//!
//! - Depth-first, lexically ordered walking of a version
//! - Leading YAML metadata blocks and JSON category descriptors
//! - File watching with per-version event debouncing
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use folio_storage::Storage;
//! use folio_storage_fs::FsStorage;
//!
//! let storage = FsStorage::new(PathBuf::from("docs"));
//! for version in storage.versions()? {
//!     let scan = storage.scan(&version)?;
//!     println!("{version}: {} documents", scan.documents.len());
//! }
//! ```

mod debouncer;
mod descriptor;
mod frontmatter;
mod scanner;
mod source;

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use notify::{RecursiveMode, Watcher};

use debouncer::EventDebouncer;
use folio_storage::{
    ScanResult, Storage, StorageError, StorageErrorKind, StorageEventReceiver, WatchHandle,
};
use scanner::Scanner;
use source::SourceKind;

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Default content extensions.
const DEFAULT_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Default category descriptor file name.
pub const DEFAULT_DESCRIPTOR_FILE: &str = "_category_.json";

/// Create a storage error from a notify error.
fn notify_error(e: notify::Error) -> StorageError {
    StorageError::new(StorageErrorKind::Other)
        .with_backend(BACKEND)
        .with_source(e)
}

/// Filesystem storage rooted at a docs directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    extensions: Vec<String>,
    descriptor_file: String,
    debounce: Duration,
}

impl FsStorage {
    /// Create storage with default extensions (`md`, `mdx`) and descriptor
    /// file name (`_category_.json`).
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_owned(),
            debounce: Duration::from_millis(100),
        }
    }

    /// Override recognized content extensions (without the leading dot).
    #[must_use]
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_owned())
            .collect();
        self
    }

    /// Override the category descriptor file name.
    #[must_use]
    pub fn with_descriptor_file(mut self, name: impl Into<String>) -> Self {
        self.descriptor_file = name.into();
        self
    }

    /// Override how long change events are held back for coalescing.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Docs root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject version names that could escape the docs root.
    fn validate_version(version: &str) -> Result<(), StorageError> {
        let invalid = version.is_empty()
            || version.starts_with('.')
            || version.contains(['/', '\\'])
            || Path::new(version)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if invalid {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_backend(BACKEND)
                .with_path(version));
        }
        Ok(())
    }

    /// Map an absolute event path to `(version, path relative to version root)`.
    fn split_event_path(
        root: &Path,
        path: &Path,
        extensions: &[String],
        descriptor_file: &str,
    ) -> Option<(String, PathBuf)> {
        let rel = path.strip_prefix(root).ok()?;
        let mut components = rel.components();
        let Some(Component::Normal(version)) = components.next() else {
            return None;
        };
        let version = version.to_string_lossy();
        if version.starts_with('.') {
            return None;
        }
        let inner = components.as_path().to_path_buf();
        if inner
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
        {
            return None;
        }
        // Directory renames and removals carry no extension but still change the tree.
        let relevant = inner.as_os_str().is_empty()
            || inner.extension().is_none()
            || SourceKind::classify(&inner, extensions, descriptor_file).is_some();
        relevant.then(|| (version.into_owned(), inner))
    }
}

impl Storage for FsStorage {
    fn versions(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| StorageError::io(e, Some(self.root.clone())).with_backend(BACKEND))?;

        let mut versions: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.'))
            .collect();
        versions.sort();
        Ok(versions)
    }

    fn scan(&self, version: &str) -> Result<ScanResult, StorageError> {
        Self::validate_version(version)?;
        let version_root = self.root.join(version);
        let is_dir = fs::metadata(&version_root)
            .map_err(|e| StorageError::io(e, Some(version_root.clone())).with_backend(BACKEND))?
            .is_dir();
        if !is_dir {
            return Err(StorageError::not_found(version_root).with_backend(BACKEND));
        }

        let result = Scanner::new(&version_root, &self.extensions, &self.descriptor_file).scan();
        tracing::debug!(
            version,
            documents = result.documents.len(),
            descriptors = result.descriptors.len(),
            warnings = result.warnings.len(),
            "Scanned version"
        );
        Ok(result)
    }

    fn watch(&self) -> Result<(StorageEventReceiver, WatchHandle), StorageError> {
        let (event_tx, event_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let debouncer = Arc::new(EventDebouncer::new(self.debounce));

        let root = self.root.clone();
        let extensions = self.extensions.clone();
        let descriptor_file = self.descriptor_file.clone();
        let watcher_debouncer = Arc::clone(&debouncer);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            if !matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            ) {
                return;
            }
            for path in event.paths {
                if let Some((version, rel)) =
                    Self::split_event_path(&root, &path, &extensions, &descriptor_file)
                {
                    watcher_debouncer.record(version, rel);
                }
            }
        })
        .map_err(notify_error)?;

        watcher
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(notify_error)?;

        // Spawn drain thread. The watcher is moved in to keep it alive.
        std::thread::spawn(move || {
            let _watcher = watcher;

            loop {
                match shutdown_rx.recv_timeout(Duration::from_millis(50)) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }

                for event in debouncer.drain_ready() {
                    tracing::debug!(version = %event.version, paths = event.paths.len(), "Content changed");
                    if event_tx.send(event).is_err() {
                        return;
                    }
                }
            }
        });

        // When dropped, shutdown_tx disconnects, causing the drain thread to exit
        Ok((
            StorageEventReceiver::new(event_rx),
            WatchHandle::new(shutdown_tx),
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn exts() -> Vec<String> {
        vec!["md".to_owned(), "mdx".to_owned()]
    }

    #[test]
    fn test_versions_sorted_and_filtered() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("v2")).unwrap();
        fs::create_dir(temp.path().join("v1")).unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();
        write(temp.path(), "README.md", "");

        let storage = FsStorage::new(temp.path().to_path_buf());

        assert_eq!(storage.versions().unwrap(), vec!["v1", "v2"]);
    }

    #[test]
    fn test_versions_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp.path().join("nope"));

        let err = storage.versions().unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_scan_version() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "v1/guide/_category_.json", r#"{"tab_group": "guides"}"#);
        write(temp.path(), "v1/guide/intro.mdx", "---\ntitle: Intro\n---\nHello");
        write(temp.path(), "v2/other.md", "");

        let storage = FsStorage::new(temp.path().to_path_buf());
        let result = storage.scan("v1").unwrap();

        assert_eq!(result.documents.len(), 1);
        assert_eq!(result.documents[0].slug, "guide/intro");
        assert_eq!(result.descriptors[0].path, "guide");
    }

    #[test]
    fn test_scan_unknown_version_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp.path().to_path_buf());

        let err = storage.scan("v9").unwrap_err();

        assert!(err.is_not_found());
    }

    #[test]
    fn test_scan_rejects_traversal() {
        let temp = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp.path().to_path_buf());

        for version in ["..", "../etc", ".git", "a/b", ""] {
            let err = storage.scan(version).unwrap_err();
            assert_eq!(err.kind, StorageErrorKind::InvalidPath, "{version}");
        }
    }

    #[test]
    fn test_custom_extensions() {
        let temp = tempfile::tempdir().unwrap();
        write(temp.path(), "v1/a.md", "");
        write(temp.path(), "v1/b.txt", "");

        let storage =
            FsStorage::new(temp.path().to_path_buf()).with_extensions(vec![".txt".to_owned()]);
        let result = storage.scan("v1").unwrap();

        let slugs: Vec<_> = result.documents.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b"]);
    }

    #[test]
    fn test_split_event_path() {
        let root = Path::new("/docs");
        let split =
            |p: &str| FsStorage::split_event_path(root, Path::new(p), &exts(), "_category_.json");

        assert_eq!(
            split("/docs/v1/guide/intro.mdx"),
            Some(("v1".to_owned(), PathBuf::from("guide/intro.mdx")))
        );
        assert_eq!(
            split("/docs/v1/guide/_category_.json"),
            Some(("v1".to_owned(), PathBuf::from("guide/_category_.json")))
        );
        assert_eq!(
            split("/docs/v1/guide"),
            Some(("v1".to_owned(), PathBuf::from("guide")))
        );
        assert_eq!(split("/docs/v1/logo.png"), None);
        assert_eq!(split("/docs/.git/index"), None);
        assert_eq!(split("/docs/v1/.intro.md.swp"), None);
        assert_eq!(split("/elsewhere/v1/a.md"), None);
    }

    #[test]
    fn test_watch_emits_version_event() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("v1")).unwrap();
        let root = temp.path().canonicalize().unwrap();

        let storage = FsStorage::new(root.clone()).with_debounce(Duration::from_millis(20));
        let (rx, handle) = storage.watch().unwrap();

        std::thread::sleep(Duration::from_millis(100));
        write(&root, "v1/intro.md", "# Intro");

        let mut received = None;
        for _ in 0..100 {
            if let Some(event) = rx.try_recv() {
                received = Some(event);
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        let event = received.expect("no change event within 2s");
        assert_eq!(event.version, "v1");
        assert!(event.paths.contains(&PathBuf::from("intro.md")));

        handle.stop();
    }
}
