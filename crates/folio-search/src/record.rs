//! Flat search records.

use serde::Serialize;
use sha2::{Digest, Sha256};

use folio_site::Document;

use crate::sanitize::sanitize;

/// Primary key field of every record.
pub const PRIMARY_KEY: &str = "id";

/// One document as the search engine sees it.
///
/// Never stored locally. Fully reconstructible from the corpus, which makes
/// indexing safe to re-run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_group: Option<String>,
}

impl SearchRecord {
    /// Project a document. `max_content_chars` of `0` keeps all content.
    #[must_use]
    pub fn from_document(doc: &Document, max_content_chars: usize) -> Self {
        Self {
            id: record_id(&doc.version, &doc.slug),
            title: doc.title.clone(),
            content: sanitize(&doc.body, max_content_chars),
            slug: doc.slug.clone(),
            version: doc.version.clone(),
            category: doc.category().map(str::to_owned),
            tags: doc.tags.clone(),
            tab_group: doc.tab_group.clone(),
        }
    }
}

/// Longest id the index accepts, in bytes.
const MAX_ID_LEN: usize = 511;

/// Deterministic, collision-free record id: `{version}__{slug}`.
///
/// ASCII letters and digits are kept and `/` becomes `-`. Every other byte,
/// including `-`, `_` and `.`, is written as `_XX` (uppercase hex), so the
/// mapping can be reversed and `__` only ever appears as the separator.
/// Ids over the index limit keep a readable prefix followed by `_h` and the
/// SHA-256 of `{version}/{slug}`.
#[must_use]
pub fn record_id(version: &str, slug: &str) -> String {
    let mut id = String::with_capacity(version.len() + slug.len() + 2);
    push_encoded(&mut id, version);
    id.push_str("__");
    push_encoded(&mut id, slug);

    if id.len() <= MAX_ID_LEN {
        return id;
    }

    let mut hasher = Sha256::new();
    hasher.update(format!("{version}/{slug}").as_bytes());
    let hash = hex::encode(hasher.finalize());
    // `id` is pure ASCII, so any byte offset is a char boundary.
    id.truncate(MAX_ID_LEN - 2 - hash.len());
    id.push_str("_h");
    id.push_str(&hash);
    id
}

fn push_encoded(id: &mut String, part: &str) {
    for byte in part.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => id.push(char::from(byte)),
            b'/' => id.push('-'),
            _ => id.push_str(&format!("_{byte:02X}")),
        }
    }
}
