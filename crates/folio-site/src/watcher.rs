//! Change-signal consumer.

use std::sync::Arc;
use std::thread;

use folio_storage::{StorageError, StorageEvent, WatchHandle};

use crate::site::Site;

/// Invalidates cached versions of a [`Site`] as its storage reports changes.
///
/// Runs on a background thread. Dropping the watcher (or calling
/// [`stop`](Self::stop)) stops the storage watch, which ends the thread once
/// the event channel closes.
pub struct CorpusWatcher {
    _handle: WatchHandle,
}

impl CorpusWatcher {
    /// Start watching the site's storage.
    pub fn start(site: Arc<Site>) -> Result<Self, StorageError> {
        Self::start_with(site, |_| {})
    }

    /// Start watching and call `listener` after each invalidation.
    pub fn start_with<F>(site: Arc<Site>, listener: F) -> Result<Self, StorageError>
    where
        F: Fn(&StorageEvent) + Send + 'static,
    {
        let (events, handle) = site.storage().watch()?;

        thread::spawn(move || {
            for event in events.iter() {
                tracing::info!(version = %event.version, paths = event.paths.len(), "Corpus changed");
                site.invalidate(&event.version);
                listener(&event);
            }
            tracing::debug!("Corpus watcher stopped");
        });

        Ok(Self { _handle: handle })
    }

    /// Stop watching.
    pub fn stop(self) {
        drop(self);
    }
}
