//! `folio docs` command implementation.

use clap::Args;
use folio_config::CliSettings;

use super::{SourceArgs, open_site, require_version};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the docs command.
#[derive(Args)]
pub(crate) struct DocsArgs {
    /// Version to list.
    version: String,

    #[command(flatten)]
    source: SourceArgs,
}

impl DocsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(CliSettings::default())?;
        let site = open_site(&config);
        require_version(&site, &self.version)?;

        let Some(corpus) = site.corpus(&self.version)? else {
            return Err(CliError::Validation(format!(
                "version \"{}\" disappeared while loading",
                self.version
            )));
        };

        for warning in corpus.warnings() {
            output.warning(&format!("warning: {warning}"));
        }
        for doc in corpus.documents() {
            let tab_group = doc.tab_group.as_deref().unwrap_or("-");
            output.line(&format!("{}\t{}\t{tab_group}", doc.slug, doc.title));
        }
        output.info(&format!(
            "{} documents in {}",
            corpus.documents().len(),
            self.version
        ));
        Ok(())
    }
}
