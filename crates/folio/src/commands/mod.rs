//! CLI command implementations.

pub(crate) mod docs;
pub(crate) mod index;
pub(crate) mod resolve;
pub(crate) mod versions;
pub(crate) mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_config::{CliSettings, Config};
use folio_site::Site;
use folio_storage::Storage;
use folio_storage_fs::FsStorage;

use crate::error::CliError;

pub(crate) use docs::DocsArgs;
pub(crate) use index::IndexArgs;
pub(crate) use resolve::ResolveArgs;
pub(crate) use versions::VersionsArgs;
pub(crate) use watch::WatchArgs;

/// Options shared by every command that reads the docs tree.
#[derive(Args)]
pub(crate) struct SourceArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation root directory (overrides config).
    #[arg(short, long, env = "FOLIO_SOURCE_DIR")]
    source_dir: Option<PathBuf>,
}

impl SourceArgs {
    /// Load config, applying `overrides` on top of the source directory flag.
    pub(crate) fn load_config(&self, overrides: CliSettings) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            ..overrides
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Filesystem storage configured from `config`.
pub(crate) fn storage_from_config(config: &Config) -> FsStorage {
    FsStorage::new(config.docs_resolved.source_dir.clone())
        .with_extensions(config.docs_resolved.extensions.clone())
        .with_descriptor_file(config.docs_resolved.descriptor_file.clone())
        .with_debounce(config.watch.debounce())
}

/// Site over the configured docs root.
pub(crate) fn open_site(config: &Config) -> Site {
    let storage: Arc<dyn Storage> = Arc::new(storage_from_config(config));
    Site::new(storage)
}

/// Fail with a readable message when `version` does not exist.
pub(crate) fn require_version(site: &Site, version: &str) -> Result<(), CliError> {
    let versions = site.list_versions()?;
    if versions.iter().any(|v| v == version) {
        return Ok(());
    }
    let available = if versions.is_empty() {
        "none".to_owned()
    } else {
        versions.join(", ")
    };
    Err(CliError::Validation(format!(
        "unknown version \"{version}\" (available: {available})"
    )))
}
