//! Configuration management for Folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `search.meilisearch.host`
//! - `search.meilisearch.api_key`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override search host.
    pub search_host: Option<String>,
    /// Override index name.
    pub index_name: Option<String>,
    /// Override search record content limit.
    pub max_content_chars: Option<usize>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Search provider supported by the indexer.
pub const MEILISEARCH_PROVIDER: &str = "meilisearch";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Search indexing configuration.
    pub search: SearchConfig,
    /// Change watching configuration.
    pub watch: WatchConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    extensions: Option<Vec<String>>,
    descriptor_file: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Docs root; each subdirectory is a version.
    pub source_dir: PathBuf,
    /// Content file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Category descriptor filename.
    pub descriptor_file: String,
}

/// Search indexing configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// Whether indexing is enabled.
    pub enabled: bool,
    /// Search provider name.
    pub provider: Option<String>,
    /// Truncate record content to this many characters (0 = unlimited).
    pub max_content_chars: usize,
    /// Meilisearch connection settings.
    pub meilisearch: MeilisearchSettings,
}

/// Meilisearch connection settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MeilisearchSettings {
    /// Server URL.
    pub host: String,
    /// API key. Empty means no authentication.
    pub api_key: Option<String>,
    /// Index uid.
    pub index_name: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
    /// Wait for each enqueued task to finish.
    pub wait_for_tasks: bool,
    /// Upper bound on waiting for one task, in seconds.
    pub task_timeout_secs: u64,
}

impl Default for MeilisearchSettings {
    fn default() -> Self {
        Self {
            host: "http://127.0.0.1:7700".to_owned(),
            api_key: None,
            index_name: "docs".to_owned(),
            timeout_secs: 30,
            wait_for_tasks: true,
            task_timeout_secs: 60,
        }
    }
}

impl MeilisearchSettings {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.host, "search.meilisearch.host")?;
        require_http_url(&self.host, "search.meilisearch.host")?;
        require_non_empty(&self.index_name, "search.meilisearch.index_name")?;
        if !self
            .index_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ConfigError::Validation(
                "search.meilisearch.index_name may only contain [A-Za-z0-9_-]".to_owned(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "search.meilisearch.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Change watching configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Quiet period before a burst of changes is reported.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

impl WatchConfig {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`search.meilisearch.api_key`").
        field: String,
        /// Error message (e.g., "${`MEILI_API_KEY`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(host) = &settings.search_host {
            self.search.meilisearch.host.clone_from(host);
        }
        if let Some(index_name) = &settings.index_name {
            self.search.meilisearch.index_name.clone_from(index_name);
        }
        if let Some(max_content_chars) = settings.max_content_chars {
            self.search.max_content_chars = max_content_chars;
        }
    }

    /// Get validated Meilisearch settings.
    ///
    /// Use this instead of reading the `search` field directly when the
    /// command needs an index: it requires search to be enabled with the
    /// `meilisearch` provider.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if search is disabled, the provider is
    /// not `meilisearch`, or the connection settings are invalid.
    pub fn require_search(&self) -> Result<&MeilisearchSettings, ConfigError> {
        if !self.search.enabled {
            return Err(ConfigError::Validation(
                "search indexing is disabled (set search.enabled = true)".to_owned(),
            ));
        }
        match self.search.provider.as_deref() {
            Some(MEILISEARCH_PROVIDER) => {}
            Some(other) => {
                return Err(ConfigError::Validation(format!(
                    "unsupported search.provider \"{other}\" (expected \"{MEILISEARCH_PROVIDER}\")"
                )));
            }
            None => {
                return Err(ConfigError::Validation(
                    "search.provider must be set to \"meilisearch\"".to_owned(),
                ));
            }
        }
        self.search.meilisearch.validate()?;
        Ok(&self.search.meilisearch)
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            search: SearchConfig::default(),
            watch: WatchConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                extensions: default_extensions(),
                descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Search connection settings are only checked when search is enabled.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_docs()?;
        if self.search.enabled {
            self.search.meilisearch.validate()?;
        }
        Ok(())
    }

    fn validate_docs(&self) -> Result<(), ConfigError> {
        let docs = &self.docs_resolved;
        if docs.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "docs.extensions cannot be empty".to_owned(),
            ));
        }
        if docs.extensions.iter().any(String::is_empty) {
            return Err(ConfigError::Validation(
                "docs.extensions cannot contain empty entries".to_owned(),
            ));
        }
        require_non_empty(&docs.descriptor_file, "docs.descriptor_file")?;
        if docs.descriptor_file.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "docs.descriptor_file must be a file name, not a path".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let meili = &mut self.search.meilisearch;
        meili.host = expand::expand_env(&meili.host, "search.meilisearch.host")?;
        if let Some(ref key) = meili.api_key {
            meili.api_key = Some(expand::expand_env(key, "search.meilisearch.api_key")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory and fill defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let extensions = self.docs.extensions.clone().map_or_else(default_extensions, |exts| {
            exts.into_iter()
                .map(|ext| ext.trim_start_matches('.').to_owned())
                .collect()
        });

        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
            extensions,
            descriptor_file: self
                .docs
                .descriptor_file
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTOR_FILE.to_owned()),
        };
    }
}

/// Default category descriptor filename.
const DEFAULT_DESCRIPTOR_FILE: &str = "_category_.json";

fn default_extensions() -> Vec<String> {
    vec!["md".to_owned(), "mdx".to_owned()]
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/project"));

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/project/docs"));
        assert_eq!(config.docs_resolved.extensions, vec!["md", "mdx"]);
        assert_eq!(config.docs_resolved.descriptor_file, "_category_.json");
        assert!(!config.search.enabled);
        assert_eq!(config.search.max_content_chars, 0);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.search.meilisearch.host, "http://127.0.0.1:7700");
        assert_eq!(config.search.meilisearch.index_name, "docs");
        assert!(config.search.meilisearch.wait_for_tasks);
    }

    #[test]
    fn test_parse_search_config() {
        let toml = r#"
[search]
enabled = true
provider = "meilisearch"
max_content_chars = 5000

[search.meilisearch]
host = "https://search.example.com"
api_key = "master"
index_name = "handbook"
timeout_secs = 5
wait_for_tasks = false
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.search.enabled);
        assert_eq!(config.search.max_content_chars, 5000);
        let meili = config.require_search().unwrap();
        assert_eq!(meili.host, "https://search.example.com");
        assert_eq!(meili.api_key.as_deref(), Some("master"));
        assert_eq!(meili.index_name, "handbook");
        assert_eq!(meili.timeout(), Duration::from_secs(5));
        assert!(!meili.wait_for_tasks);
        assert_eq!(meili.task_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[docs]
source_dir = "content/docs"
extensions = [".md", "markdown"]
descriptor_file = "_dir.json"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.docs_resolved.source_dir,
            PathBuf::from("/project/content/docs")
        );
        assert_eq!(config.docs_resolved.extensions, vec!["md", "markdown"]);
        assert_eq!(config.docs_resolved.descriptor_file, "_dir.json");
    }

    #[test]
    fn test_require_search_disabled() {
        let config = Config::default_with_base(Path::new("/project"));

        let err = config.require_search().unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_require_search_wrong_provider() {
        let toml = r#"
[search]
enabled = true
provider = "algolia"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        let err = config.require_search().unwrap_err();

        assert!(err.to_string().contains("algolia"));
    }

    #[test]
    fn test_require_search_missing_provider() {
        let toml = "[search]\nenabled = true\n";
        let config: Config = toml::from_str(toml).unwrap();

        assert!(config.require_search().is_err());
    }

    #[test]
    fn test_validate_meilisearch_host() {
        let settings = MeilisearchSettings {
            host: "localhost:7700".to_owned(),
            ..Default::default()
        };

        let err = settings.validate().unwrap_err();

        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_validate_index_name() {
        let settings = MeilisearchSettings {
            index_name: "my docs".to_owned(),
            ..Default::default()
        };

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_docs() {
        let mut config = Config::default_with_base(Path::new("/project"));
        assert!(config.validate().is_ok());

        config.docs_resolved.extensions.clear();
        assert!(config.validate().is_err());

        config.docs_resolved.extensions = vec!["md".to_owned()];
        config.docs_resolved.descriptor_file = "meta/_category_.json".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/project"));
        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/other/docs")),
            search_host: Some("http://meili:7700".to_owned()),
            index_name: None,
            max_content_chars: Some(100),
        });

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/other/docs"));
        assert_eq!(config.search.meilisearch.host, "http://meili:7700");
        assert_eq!(config.search.meilisearch.index_name, "docs");
        assert_eq!(config.search.max_content_chars, 100);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/project"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.docs_resolved.source_dir, PathBuf::from("/project/docs"));
        assert_eq!(config.search.meilisearch.host, "http://127.0.0.1:7700");
    }

    #[test]
    fn test_expand_env_vars_search() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("FOLIO_TEST_CONFIG_HOST", "http://meili.internal:7700");
            std::env::remove_var("FOLIO_TEST_CONFIG_KEY");
        }

        let toml = r#"
[search.meilisearch]
host = "${FOLIO_TEST_CONFIG_HOST}"
api_key = "${FOLIO_TEST_CONFIG_KEY:-}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.search.meilisearch.host, "http://meili.internal:7700");
        assert_eq!(config.search.meilisearch.api_key.as_deref(), Some(""));

        unsafe {
            std::env::remove_var("FOLIO_TEST_CONFIG_HOST");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("FOLIO_TEST_CONFIG_MISSING");
        }

        let toml = r#"
[search.meilisearch]
api_key = "${FOLIO_TEST_CONFIG_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { ref field, .. } if field == "search.meilisearch.api_key"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/folio.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("folio.toml");
        fs::write(&path, "[docs]\nsource_dir = \"site/docs\"\n\n[watch]\ndebounce_ms = 250\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(
            config.docs_resolved.source_dir,
            temp_dir.path().join("site/docs")
        );
        assert_eq!(config.watch.debounce(), Duration::from_millis(250));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_rejects_invalid_search_when_enabled() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("folio.toml");
        fs::write(
            &path,
            "[search]\nenabled = true\nprovider = \"meilisearch\"\n\n[search.meilisearch]\nhost = \"\"\n",
        )
        .unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_discover_from_parent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp_dir.path().join("folio.toml"), "").unwrap();

        assert_eq!(
            Config::discover_from(&nested),
            Some(temp_dir.path().join("folio.toml"))
        );
    }
}
