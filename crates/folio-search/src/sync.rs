//! Clear-then-add index synchronization.
//!
//! A full run configures the index, deletes every record, then inserts the
//! projection one version at a time. A version-scoped run replaces only the
//! versions it is given. Projection is CPU work and runs across versions in
//! parallel. Writes hold the index's own write lock, so two runs against the
//! same index never interleave their clear/insert cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;

use folio_site::Corpus;

use crate::client::{IndexSettings, SearchIndex};
use crate::error::{SyncError, SyncStage};
use crate::record::{PRIMARY_KEY, SearchRecord};

/// Records of one version, ready for insertion.
#[derive(Clone, Debug)]
pub struct VersionBatch {
    pub version: String,
    pub records: Vec<SearchRecord>,
}

/// Outcome of a successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// `(version, records inserted)` in insertion order.
    pub versions: Vec<(String, usize)>,
}

impl SyncReport {
    /// Records inserted across all versions.
    #[must_use]
    pub fn total(&self) -> usize {
        self.versions.iter().map(|(_, count)| count).sum()
    }
}

/// What a write replaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncScope {
    /// Every record in the index.
    All,
    /// Only the records of the versions being written.
    Versions,
}

/// Cancellation token for one run.
///
/// Create one per run. Once cancelled it stays cancelled, so a request made
/// at any point before a write step is honored. A version already being
/// written finishes.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn check(&self, stage: impl FnOnce() -> SyncStage) -> Result<(), SyncError> {
        if self.is_cancelled() {
            let stage = stage();
            tracing::warn!(%stage, "Index sync cancelled");
            return Err(SyncError::Cancelled { stage });
        }
        Ok(())
    }
}

/// Projects corpora into search records and pushes them to an index.
pub struct Indexer {
    index: Arc<dyn SearchIndex>,
    settings: IndexSettings,
    max_content_chars: usize,
}

impl Indexer {
    #[must_use]
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self {
            index,
            settings: IndexSettings::default(),
            max_content_chars: 0,
        }
    }

    /// Truncate record content to this many characters. `0` keeps everything.
    #[must_use]
    pub fn with_max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.max_content_chars = max_content_chars;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: IndexSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Project every document of every corpus, preserving corpus order.
    #[must_use]
    pub fn project(&self, corpora: &[Arc<Corpus>]) -> Vec<VersionBatch> {
        corpora
            .par_iter()
            .map(|corpus| VersionBatch {
                version: corpus.version().to_owned(),
                records: corpus
                    .documents()
                    .iter()
                    .map(|doc| SearchRecord::from_document(doc, self.max_content_chars))
                    .collect(),
            })
            .collect()
    }

    /// Replace the index contents with the projection of `corpora`.
    ///
    /// Any failure aborts the run. Writes already made are not undone, so a
    /// failed run leaves the index partially populated until the next run.
    ///
    /// # Panics
    ///
    /// Panics if the index write lock is poisoned.
    pub fn sync(
        &self,
        corpora: &[Arc<Corpus>],
        cancel: &CancelHandle,
    ) -> Result<SyncReport, SyncError> {
        self.write(self.project(corpora), SyncScope::All, cancel)
    }

    /// Replace only the records of the versions in `corpora`.
    ///
    /// Records of every other version are left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the index write lock is poisoned.
    pub fn sync_versions(
        &self,
        corpora: &[Arc<Corpus>],
        cancel: &CancelHandle,
    ) -> Result<SyncReport, SyncError> {
        self.write(self.project(corpora), SyncScope::Versions, cancel)
    }

    /// Write projected batches under the index write lock.
    ///
    /// Cancellation is checked before configuring, before clearing, and
    /// before each version.
    ///
    /// # Panics
    ///
    /// Panics if the index write lock is poisoned.
    pub fn write(
        &self,
        batches: Vec<VersionBatch>,
        scope: SyncScope,
        cancel: &CancelHandle,
    ) -> Result<SyncReport, SyncError> {
        let lock = self.index.write_lock();
        let _guard = lock.lock().unwrap();

        cancel.check(|| SyncStage::Configure)?;
        tracing::info!("Configuring index attributes");
        self.index
            .configure_attributes(&self.settings)
            .map_err(|source| SyncError::Index {
                stage: SyncStage::Configure,
                source,
            })?;

        if scope == SyncScope::All {
            cancel.check(|| SyncStage::Clear)?;
            tracing::info!("Clearing index");
            self.index.delete_all().map_err(|source| SyncError::Index {
                stage: SyncStage::Clear,
                source,
            })?;
        }

        let mut report = SyncReport::default();
        for batch in batches {
            if scope == SyncScope::Versions {
                let stage = SyncStage::ClearVersion {
                    version: batch.version.clone(),
                };
                cancel.check(|| stage.clone())?;
                self.index
                    .delete_version(&batch.version)
                    .map_err(|source| SyncError::Index { stage, source })?;
            } else {
                cancel.check(|| SyncStage::Insert {
                    version: batch.version.clone(),
                })?;
            }

            if !batch.records.is_empty() {
                self.index
                    .bulk_insert(&batch.records, PRIMARY_KEY)
                    .map_err(|source| SyncError::Index {
                        stage: SyncStage::Insert {
                            version: batch.version.clone(),
                        },
                        source,
                    })?;
            }
            tracing::info!(version = %batch.version, records = batch.records.len(), "Indexed version");
            report.versions.push((batch.version, batch.records.len()));
        }

        tracing::info!(records = report.total(), "Index sync complete");
        Ok(report)
    }
}
