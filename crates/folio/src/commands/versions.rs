//! `folio versions` command implementation.

use clap::Args;
use folio_config::CliSettings;

use super::{SourceArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the versions command.
#[derive(Args)]
pub(crate) struct VersionsArgs {
    #[command(flatten)]
    source: SourceArgs,
}

impl VersionsArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(CliSettings::default())?;
        let site = open_site(&config);

        let versions = site.list_versions()?;
        if versions.is_empty() {
            output.warning(&format!(
                "No versions found in {}",
                config.docs_resolved.source_dir.display()
            ));
        }
        for version in versions {
            output.line(&version);
        }
        Ok(())
    }
}
