//! Error types for search indexing.

use std::fmt;

/// Error from a single call against the search index.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// The index accepted the request but the task failed.
    #[error("task {uid} failed: {message}")]
    TaskFailed {
        /// Task identifier.
        uid: u64,
        /// Error reported by the index.
        message: String,
    },

    /// The task did not finish within the configured wait.
    #[error("task {uid} did not finish in time")]
    TaskTimeout {
        /// Task identifier.
        uid: u64,
    },
}

impl IndexError {
    /// Check if this error is a timeout, either on the wire or while waiting for a task.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::HttpRequest(ureq::Error::Timeout(_)) | Self::TaskTimeout { .. }
        )
    }
}

/// Step of a synchronization run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncStage {
    /// Applying searchable/filterable/sortable attribute settings.
    Configure,
    /// Deleting every existing record.
    Clear,
    /// Deleting the records of one version.
    ClearVersion {
        /// Version being cleared.
        version: String,
    },
    /// Inserting the records of one version.
    Insert {
        /// Version being inserted.
        version: String,
    },
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => write!(f, "configuring index"),
            Self::Clear => write!(f, "clearing index"),
            Self::ClearVersion { version } => write!(f, "clearing version {version}"),
            Self::Insert { version } => write!(f, "inserting version {version}"),
        }
    }
}

/// Synchronization aborted.
///
/// Writes made before the failure are not rolled back: the index may be left
/// cleared but only partly repopulated. The whole run is idempotent, so the
/// remedy is to run it again from the start.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// A call against the index failed.
    #[error("index sync failed while {stage}")]
    Index {
        /// Step that failed.
        stage: SyncStage,
        /// Underlying failure.
        #[source]
        source: IndexError,
    },

    /// Cancellation was observed before this stage started.
    #[error("index sync cancelled before {stage}")]
    Cancelled {
        /// First stage that did not run.
        stage: SyncStage,
    },
}

impl SyncError {
    /// Stage that failed, or the first one skipped by cancellation.
    #[must_use]
    pub fn stage(&self) -> &SyncStage {
        match self {
            Self::Index { stage, .. } | Self::Cancelled { stage } => stage,
        }
    }
}
