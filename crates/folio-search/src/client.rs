//! Search index client.
//!
//! [`SearchIndex`] is the surface the synchronizer needs. [`MeilisearchClient`]
//! implements it over the Meilisearch REST API with a blocking `ureq` agent.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::IndexError;
use crate::record::SearchRecord;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Write locks by index URL, shared by every client in the process.
static WRITE_LOCKS: LazyLock<Mutex<HashMap<String, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn shared_write_lock(index_url: &str) -> Arc<Mutex<()>> {
    let mut locks = WRITE_LOCKS.lock().unwrap();
    Arc::clone(locks.entry(index_url.to_owned()).or_default())
}

/// Filter expression matching every record of `version`.
fn version_filter(version: &str) -> String {
    let escaped = version.replace('\\', "\\\\").replace('"', "\\\"");
    format!("version = \"{escaped}\"")
}

/// Attribute configuration applied before every sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    pub searchable_attributes: Vec<String>,
    pub filterable_attributes: Vec<String>,
    pub sortable_attributes: Vec<String>,
    pub distinct_attribute: String,
    pub ranking_rules: Vec<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        fn owned(items: &[&str]) -> Vec<String> {
            items.iter().map(|&s| s.to_owned()).collect()
        }

        Self {
            searchable_attributes: owned(&["title", "content", "tags"]),
            filterable_attributes: owned(&["version", "category", "tags"]),
            sortable_attributes: owned(&["title"]),
            distinct_attribute: "id".to_owned(),
            ranking_rules: owned(&["words", "typo", "proximity", "attribute", "sort", "exactness"]),
        }
    }
}

/// Write surface of an external full-text index.
///
/// Every call may fail with a distinguishable [`IndexError`].
pub trait SearchIndex: Send + Sync {
    /// Declare attribute configuration. Idempotent.
    fn configure_attributes(&self, settings: &IndexSettings) -> Result<(), IndexError>;

    /// Delete every record in the index.
    fn delete_all(&self) -> Result<(), IndexError>;

    /// Delete the records of one version. Needs `version` to be filterable.
    fn delete_version(&self, version: &str) -> Result<(), IndexError>;

    /// Insert records keyed by `primary_key`.
    fn bulk_insert(&self, records: &[SearchRecord], primary_key: &str) -> Result<(), IndexError>;

    /// Lock held for a whole write cycle.
    ///
    /// Every handle to the same external index must return the same lock,
    /// so that two cycles never interleave.
    fn write_lock(&self) -> Arc<Mutex<()>>;
}

/// Connection settings for [`MeilisearchClient`].
#[derive(Clone, Debug)]
pub struct MeilisearchConfig {
    /// Server URL, e.g. `http://127.0.0.1:7700`.
    pub host: String,
    /// Sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Index uid.
    pub index_name: String,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Wait for each enqueued task to finish before returning.
    pub wait_for_tasks: bool,
    /// Upper bound on waiting for one task.
    pub task_timeout: Duration,
}

impl MeilisearchConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: None,
            index_name: index_name.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            wait_for_tasks: true,
            task_timeout: Duration::from_secs(60),
        }
    }
}

/// Response body of every write endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnqueuedTask {
    task_uid: u64,
}

#[derive(Deserialize)]
struct Task {
    status: TaskStatus,
    #[serde(default)]
    error: Option<TaskErrorBody>,
}

#[derive(Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Deserialize)]
struct TaskErrorBody {
    message: String,
}

/// Meilisearch REST API client.
pub struct MeilisearchClient {
    agent: Agent,
    base_url: String,
    index_uid: String,
    auth_header: Option<String>,
    wait_for_tasks: bool,
    task_timeout: Duration,
    poll_interval: Duration,
    write_lock: Arc<Mutex<()>>,
}

impl MeilisearchClient {
    /// Create a client. No request is made until the first call.
    ///
    /// Clients for the same host and index share one write lock. Writers in
    /// other processes are not coordinated.
    ///
    /// # Panics
    ///
    /// Panics if the lock registry is poisoned.
    #[must_use]
    pub fn new(config: MeilisearchConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();

        let base_url = config.host.trim_end_matches('/').to_owned();
        let write_lock = shared_write_lock(&format!("{base_url}/indexes/{}", config.index_name));

        Self {
            agent,
            base_url,
            index_uid: config.index_name,
            auth_header: config
                .api_key
                .filter(|key| !key.is_empty())
                .map(|key| format!("Bearer {key}")),
            wait_for_tasks: config.wait_for_tasks,
            task_timeout: config.task_timeout,
            poll_interval: Duration::from_millis(100),
            write_lock,
        }
    }

    fn index_url(&self) -> String {
        format!("{}/indexes/{}", self.base_url, self.index_uid)
    }

    /// Read the body of a finished response, mapping error statuses.
    fn read_response<T: for<'de> Deserialize<'de>>(
        response: ureq::http::Response<ureq::Body>,
    ) -> Result<T, IndexError> {
        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(IndexError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(body_reader.read_json()?)
    }

    fn send_json(&self, method: &str, url: &str, body: Vec<u8>) -> Result<u64, IndexError> {
        let request = match method {
            "PATCH" => self.agent.patch(url),
            "PUT" => self.agent.put(url),
            _ => self.agent.post(url),
        };
        let request = match &self.auth_header {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        };
        let response = request
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&body[..])?;
        let task: EnqueuedTask = Self::read_response(response)?;
        self.finish(task.task_uid)?;
        Ok(task.task_uid)
    }

    fn delete(&self, url: &str) -> Result<u64, IndexError> {
        let request = self.agent.delete(url);
        let request = match &self.auth_header {
            Some(auth) => request.header("Authorization", auth),
            None => request,
        };
        let response = request.header("Accept", "application/json").call()?;
        let task: EnqueuedTask = Self::read_response(response)?;
        self.finish(task.task_uid)?;
        Ok(task.task_uid)
    }

    /// Poll a task until it settles, when waiting is enabled.
    fn finish(&self, uid: u64) -> Result<(), IndexError> {
        if !self.wait_for_tasks {
            tracing::debug!(task = uid, "Task enqueued");
            return Ok(());
        }

        let url = format!("{}/tasks/{uid}", self.base_url);
        let deadline = Instant::now() + self.task_timeout;
        loop {
            let request = self.agent.get(&url);
            let request = match &self.auth_header {
                Some(auth) => request.header("Authorization", auth),
                None => request,
            };
            let task: Task = Self::read_response(request.header("Accept", "application/json").call()?)?;

            match task.status {
                TaskStatus::Succeeded => {
                    tracing::debug!(task = uid, "Task succeeded");
                    return Ok(());
                }
                TaskStatus::Failed | TaskStatus::Canceled => {
                    let message = task.error.map_or_else(
                        || "task was canceled".to_owned(),
                        |e| e.message,
                    );
                    return Err(IndexError::TaskFailed { uid, message });
                }
                TaskStatus::Enqueued | TaskStatus::Processing => {}
            }

            if Instant::now() >= deadline {
                return Err(IndexError::TaskTimeout { uid });
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl SearchIndex for MeilisearchClient {
    fn configure_attributes(&self, settings: &IndexSettings) -> Result<(), IndexError> {
        let url = format!("{}/settings", self.index_url());
        let body = serde_json::to_vec(settings)?;
        let uid = self.send_json("PATCH", &url, body)?;
        tracing::info!(index = %self.index_uid, task = uid, "Updated index settings");
        Ok(())
    }

    fn delete_all(&self) -> Result<(), IndexError> {
        let url = format!("{}/documents", self.index_url());
        let uid = self.delete(&url)?;
        tracing::info!(index = %self.index_uid, task = uid, "Cleared index");
        Ok(())
    }

    fn delete_version(&self, version: &str) -> Result<(), IndexError> {
        let url = format!("{}/documents/delete", self.index_url());
        let body = serde_json::to_vec(&serde_json::json!({ "filter": version_filter(version) }))?;
        let uid = self.send_json("POST", &url, body)?;
        tracing::info!(index = %self.index_uid, version, task = uid, "Cleared version");
        Ok(())
    }

    fn bulk_insert(&self, records: &[SearchRecord], primary_key: &str) -> Result<(), IndexError> {
        let url = format!("{}/documents?primaryKey={primary_key}", self.index_url());
        let body = serde_json::to_vec(records)?;
        let uid = self.send_json("POST", &url, body)?;
        tracing::info!(index = %self.index_uid, task = uid, records = records.len(), "Added documents");
        Ok(())
    }

    fn write_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.write_lock)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_settings_wire_format() {
        let json = serde_json::to_value(IndexSettings::default()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "searchableAttributes": ["title", "content", "tags"],
                "filterableAttributes": ["version", "category", "tags"],
                "sortableAttributes": ["title"],
                "distinctAttribute": "id",
                "rankingRules": ["words", "typo", "proximity", "attribute", "sort", "exactness"],
            })
        );
    }

    #[test]
    fn test_task_parsing() {
        let task: Task = serde_json::from_str(
            r#"{"uid": 4, "status": "failed", "error": {"message": "bad key", "code": "x"}}"#,
        )
        .unwrap();
        assert!(task.status == TaskStatus::Failed);
        assert_eq!(task.error.unwrap().message, "bad key");

        let enqueued: EnqueuedTask =
            serde_json::from_str(r#"{"taskUid": 9, "indexUid": "docs", "status": "enqueued"}"#)
                .unwrap();
        assert_eq!(enqueued.task_uid, 9);
    }

    #[test]
    fn test_client_urls_and_auth() {
        let mut config = MeilisearchConfig::new("http://localhost:7700/", "docs");
        config.api_key = Some("secret".to_owned());
        let client = MeilisearchClient::new(config);

        assert_eq!(client.index_url(), "http://localhost:7700/indexes/docs");
        assert_eq!(client.auth_header.as_deref(), Some("Bearer secret"));
    }

    #[test]
    fn test_empty_api_key_sends_no_auth() {
        let mut config = MeilisearchConfig::new("http://localhost:7700", "docs");
        config.api_key = Some(String::new());

        assert!(MeilisearchClient::new(config).auth_header.is_none());
    }

    #[test]
    fn test_version_filter_quotes_value() {
        assert_eq!(version_filter("v1"), r#"version = "v1""#);
        assert_eq!(version_filter(r#"a"b\c"#), r#"version = "a\"b\\c""#);
    }

    #[test]
    fn test_clients_for_same_index_share_write_lock() {
        let a = MeilisearchClient::new(MeilisearchConfig::new("http://localhost:7700", "shared"));
        let b = MeilisearchClient::new(MeilisearchConfig::new("http://localhost:7700/", "shared"));
        let other = MeilisearchClient::new(MeilisearchConfig::new("http://localhost:7700", "other"));

        assert!(Arc::ptr_eq(&a.write_lock(), &b.write_lock()));
        assert!(!Arc::ptr_eq(&a.write_lock(), &other.write_lock()));
    }

    #[test]
    fn test_unreachable_host_is_request_error() {
        let mut config = MeilisearchConfig::new("http://127.0.0.1:1", "docs");
        config.timeout = Duration::from_secs(2);
        let client = MeilisearchClient::new(config);

        let err = client.delete_all().unwrap_err();

        assert!(matches!(err, IndexError::HttpRequest(_)));
    }
}
