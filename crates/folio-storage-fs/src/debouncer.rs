//! Event debouncing for change notification.
//!
//! Coalesces bursts of filesystem events into a single event per version,
//! since editors emit several events per save and a single refresh covers
//! every file in a version.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use folio_storage::StorageEvent;

/// Pending changes for one version.
struct PendingVersion {
    paths: BTreeSet<PathBuf>,
    deadline: Instant,
}

/// Thread-safe event debouncer keyed by version.
///
/// Every new path for a version pushes that version's deadline out by the
/// debounce duration.
pub(crate) struct EventDebouncer {
    pending: Mutex<HashMap<String, PendingVersion>>,
    debounce_duration: Duration,
}

impl EventDebouncer {
    /// Create a new debouncer with the specified debounce duration.
    pub fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            debounce_duration,
        }
    }

    /// Record a change to `path` (relative to the version root) in `version`.
    ///
    /// Thread-safe, called from watcher callbacks.
    pub fn record(&self, version: String, path: PathBuf) {
        let mut pending = self.pending.lock().unwrap();
        let deadline = Instant::now() + self.debounce_duration;
        let entry = pending.entry(version).or_insert_with(|| PendingVersion {
            paths: BTreeSet::new(),
            deadline,
        });
        entry.paths.insert(path);
        entry.deadline = deadline;
    }

    /// Drain versions whose debounce deadline has passed.
    ///
    /// Events come back sorted by version.
    pub fn drain_ready(&self) -> Vec<StorageEvent> {
        let mut pending = self.pending.lock().unwrap();
        let now = Instant::now();

        let mut ready: Vec<String> = pending
            .iter()
            .filter(|(_, entry)| entry.deadline <= now)
            .map(|(version, _)| version.clone())
            .collect();
        ready.sort();

        ready
            .into_iter()
            .filter_map(|version| {
                let entry = pending.remove(&version)?;
                Some(StorageEvent {
                    version,
                    paths: entry.paths.into_iter().collect(),
                })
            })
            .collect()
    }
}
