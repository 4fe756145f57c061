//! `folio index` command implementation.

use std::sync::Arc;

use clap::Args;
use folio_config::CliSettings;
use folio_search::{CancelHandle, Indexer, MeilisearchClient, MeilisearchConfig};

use super::{SourceArgs, open_site, require_version};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Only replace these versions, keeping the others (repeatable; default: all).
    #[arg(long = "version", value_name = "VERSION")]
    versions: Vec<String>,

    /// Search server URL (overrides config).
    #[arg(long, env = "MEILI_HOST")]
    host: Option<String>,

    /// Index name (overrides config).
    #[arg(long)]
    index_name: Option<String>,

    /// Truncate indexed content to this many characters (overrides config).
    #[arg(long)]
    max_content_chars: Option<usize>,
}

impl IndexArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(CliSettings {
            search_host: self.host.clone(),
            index_name: self.index_name.clone(),
            max_content_chars: self.max_content_chars,
            ..CliSettings::default()
        })?;
        let settings = config.require_search()?;
        let site = open_site(&config);

        let versions = if self.versions.is_empty() {
            site.list_versions()?
        } else {
            let versions = dedup_versions(&self.versions);
            for version in &versions {
                require_version(&site, version)?;
            }
            versions
        };

        output.info(&format!(
            "Source directory: {}",
            config.docs_resolved.source_dir.display()
        ));
        let mut corpora = Vec::with_capacity(versions.len());
        for version in &versions {
            let Some(corpus) = site.corpus(version)? else {
                continue;
            };
            for warning in corpus.warnings() {
                output.warning(&format!("{version}: {warning}"));
            }
            output.info(&format!(
                "Found {} documents in {version}",
                corpus.documents().len()
            ));
            corpora.push(corpus);
        }

        output.info(&format!(
            "Indexing into {} at {}",
            settings.index_name, settings.host
        ));
        let client = MeilisearchClient::new(MeilisearchConfig {
            host: settings.host.clone(),
            api_key: settings.api_key.clone(),
            index_name: settings.index_name.clone(),
            timeout: settings.timeout(),
            wait_for_tasks: settings.wait_for_tasks,
            task_timeout: settings.task_timeout(),
        });
        let indexer = Indexer::new(Arc::new(client))
            .with_max_content_chars(config.search.max_content_chars);

        let cancel = CancelHandle::new();
        let report = if self.versions.is_empty() {
            indexer.sync(&corpora, &cancel)?
        } else {
            indexer.sync_versions(&corpora, &cancel)?
        };

        output.success(&format!(
            "Indexed {} documents across {} versions",
            report.total(),
            report.versions.len()
        ));
        Ok(())
    }
}

/// Drop repeated `--version` values, keeping first occurrence order.
fn dedup_versions(requested: &[String]) -> Vec<String> {
    let mut versions: Vec<String> = Vec::with_capacity(requested.len());
    for version in requested {
        if !versions.contains(version) {
            versions.push(version.clone());
        }
    }
    versions
}
