//! CLI error types.

use std::error::Error;

use folio_config::ConfigError;
use folio_search::SyncError;
use folio_storage::StorageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{}", with_causes(.0))]
    Sync(#[from] SyncError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),
}

/// Render an error followed by its source chain.
fn with_causes(err: &(dyn Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use folio_search::{IndexError, SyncStage};

    use super::*;

    #[test]
    fn test_sync_error_shows_cause() {
        let err = CliError::from(SyncError::Index {
            stage: SyncStage::Clear,
            source: IndexError::HttpResponse {
                status: 401,
                body: "invalid api key".to_owned(),
            },
        });

        assert_eq!(
            err.to_string(),
            "index sync failed while clearing index: HTTP error: 401 - invalid api key"
        );
    }
}
