//! `folio watch` command implementation.

use std::sync::{Arc, mpsc};
use std::time::Instant;

use clap::Args;
use folio_config::CliSettings;
use folio_site::{CorpusWatcher, Site};

use super::{SourceArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the watch command.
#[derive(Args)]
pub(crate) struct WatchArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl WatchArgs {
    /// Watch until the process is interrupted.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(CliSettings::default())?;
        let site = Arc::new(open_site(&config));

        for version in site.list_versions()? {
            warm(&output, &site, &version);
        }

        let (tx, rx) = mpsc::channel();
        let _watcher = CorpusWatcher::start_with(Arc::clone(&site), move |event| {
            let _ = tx.send(event.clone());
        })?;
        output.info(&format!(
            "Watching {} (Ctrl+C to stop)",
            config.docs_resolved.source_dir.display()
        ));

        for event in rx {
            output.info(&format!(
                "{} changed ({} paths)",
                event.version,
                event.paths.len()
            ));
            warm(&output, &site, &event.version);
        }
        Ok(())
    }
}

/// Reload one version and report how it went.
fn warm(output: &Output, site: &Site, version: &str) {
    let started = Instant::now();
    match site.corpus(version) {
        Ok(Some(corpus)) => {
            for warning in corpus.warnings() {
                output.warning(&format!("{version}: {warning}"));
            }
            output.success(&format!(
                "Loaded {version}: {} documents in {:.1?}",
                corpus.documents().len(),
                started.elapsed()
            ));
        }
        Ok(None) => output.warning(&format!("{version} was removed")),
        Err(e) => output.error(&format!("Failed to load {version}: {e}")),
    }
}
