//! `folio resolve` command implementation.

use clap::Args;
use folio_config::CliSettings;
use folio_site::{CategoryListing, DocPage, Resolution, TocNode};
use serde::Serialize;

use super::{SourceArgs, open_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Version to resolve in.
    version: String,

    /// Slash-separated path (e.g. `guide/intro`).
    slug: String,

    /// Print the result as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    source: SourceArgs,
}

/// What `resolve --json` prints.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ResolveOutput {
    Document(DocPage),
    Category(CategoryListing),
    NotFound,
}

impl ResolveArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.source.load_config(CliSettings::default())?;
        let site = open_site(&config);

        let result = match site.resolve(&self.version, &self.slug)? {
            Resolution::Document(_) => match site.page(&self.version, &self.slug)? {
                Some(page) => ResolveOutput::Document(page),
                // Invalidated between the two lookups.
                None => ResolveOutput::NotFound,
            },
            Resolution::Category(listing) => ResolveOutput::Category(listing),
            Resolution::NotFound => ResolveOutput::NotFound,
        };

        if self.json {
            output.line(&serde_json::to_string_pretty(&result)?);
            return Ok(());
        }

        match result {
            ResolveOutput::Document(page) => print_page(&output, &page),
            ResolveOutput::Category(listing) => print_category(&output, &listing),
            ResolveOutput::NotFound => {
                output.warning(&format!(
                    "Not found: {}/{}",
                    self.version,
                    self.slug.trim_matches('/')
                ));
            }
        }
        Ok(())
    }
}

fn print_page(output: &Output, page: &DocPage) {
    let doc = &page.document;
    output.heading(&doc.title);
    output.detail(&doc.description);
    output.line(&format!("slug:      {}", doc.slug));
    output.line(&format!("version:   {}", doc.version));
    if let Some(tab_group) = &doc.tab_group {
        output.line(&format!("tab group: {tab_group}"));
    }
    if !doc.tags.is_empty() {
        output.line(&format!("tags:      {}", doc.tags.join(", ")));
    }
    if let Some(previous) = &page.previous {
        output.line(&format!("previous:  {} ({})", previous.title, previous.slug));
    }
    if let Some(next) = &page.next {
        output.line(&format!("next:      {} ({})", next.title, next.slug));
    }
    if !page.toc.is_empty() {
        output.line("contents:");
        print_toc(output, &page.toc, 1);
    }
}

fn print_toc(output: &Output, nodes: &[TocNode], depth: usize) {
    for node in nodes {
        output.line(&format!(
            "{}{} #{}",
            "  ".repeat(depth),
            node.text,
            node.anchor_id
        ));
        print_toc(output, &node.children, depth + 1);
    }
}

fn print_category(output: &Output, listing: &CategoryListing) {
    output.heading(&listing.title);
    output.line(&format!("category:  {}", listing.path));
    if let Some(tab_group) = &listing.tab_group {
        output.line(&format!("tab group: {tab_group}"));
    }
    for doc in &listing.documents {
        output.line(&format!("  {}\t{}", doc.slug, doc.title));
    }
}
