//! Table of contents extraction.
//!
//! Headings are read with `pulldown-cmark`, so fenced code and indented
//! blocks never produce entries. Extraction is a pure function of the body:
//! [`Toc::entries`] can be called any number of times and always yields the
//! same sequence.

use std::collections::HashSet;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

/// One heading in document order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    /// Plain heading text.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
    /// Anchor id, unique within the document.
    pub anchor_id: String,
}

/// Heading with nested subheadings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub text: String,
    pub level: u8,
    pub anchor_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocNode>,
}

/// Restartable view over the headings of a body.
#[derive(Clone, Copy, Debug)]
pub struct Toc<'a> {
    body: &'a str,
}

impl<'a> Toc<'a> {
    #[must_use]
    pub fn new(body: &'a str) -> Self {
        Self { body }
    }

    /// Fresh lazy pass over the headings.
    #[must_use]
    pub fn entries(&self) -> TocEntries<'a> {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        TocEntries {
            parser: Parser::new_ext(self.body, options),
            used_ids: HashSet::new(),
        }
    }

    /// Nest headings under the closest preceding heading of a lower level.
    #[must_use]
    pub fn tree(&self) -> Vec<TocNode> {
        let mut roots: Vec<TocNode> = Vec::new();
        // Path of open nodes from a root down to the last inserted node.
        let mut open: Vec<usize> = Vec::new();
        let mut open_levels: Vec<u8> = Vec::new();

        for entry in self.entries() {
            while open_levels.last().is_some_and(|&l| l >= entry.level) {
                open.pop();
                open_levels.pop();
            }

            let node = TocNode {
                text: entry.text,
                level: entry.level,
                anchor_id: entry.anchor_id,
                children: Vec::new(),
            };

            let siblings = open
                .iter()
                .fold(&mut roots, |nodes, &i| &mut nodes[i].children);
            siblings.push(node);
            open.push(siblings.len() - 1);
            open_levels.push(entry.level);
        }

        roots
    }
}

impl<'a> IntoIterator for &Toc<'a> {
    type Item = TocEntry;
    type IntoIter = TocEntries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

/// Lazy iterator over the headings of one body.
pub struct TocEntries<'a> {
    parser: Parser<'a>,
    used_ids: HashSet<String>,
}

impl TocEntries<'_> {
    /// Derive a unique anchor id, appending `-1`, `-2`, ... on collision.
    fn unique_id(&mut self, text: &str) -> String {
        let base = anchor_base(text);
        let mut id = base.clone();
        let mut n = 0;
        while self.used_ids.contains(&id) {
            n += 1;
            id = format!("{base}-{n}");
        }
        self.used_ids.insert(id.clone());
        id
    }
}

impl Iterator for TocEntries<'_> {
    type Item = TocEntry;

    fn next(&mut self) -> Option<TocEntry> {
        let level = loop {
            if let Event::Start(Tag::Heading { level, .. }) = self.parser.next()? {
                break level as u8;
            }
        };

        let mut text = String::new();
        for event in self.parser.by_ref() {
            match event {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) | Event::InlineMath(t) => text.push_str(&t),
                Event::SoftBreak | Event::HardBreak => text.push(' '),
                _ => {}
            }
        }
        let text = text.trim().to_owned();
        let anchor_id = self.unique_id(&text);

        Some(TocEntry {
            text,
            level,
            anchor_id,
        })
    }
}

/// Lowercase, collapse every run of non-alphanumeric characters into `-`.
///
/// Text without any alphanumeric character becomes `"section"`.
fn anchor_base(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if id.is_empty() {
        id.push_str("section");
    }
    id
}
