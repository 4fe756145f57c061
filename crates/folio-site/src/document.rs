//! Resolved document type.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use folio_storage::RawDocument;

/// A content unit with defaults and inheritance applied.
///
/// Immutable once built. A refresh replaces the whole per-version
/// collection instead of touching individual documents.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Document {
    /// Unique within its version.
    pub slug: String,
    /// Version this document belongs to.
    pub version: String,
    /// Frontmatter title, or the slug.
    pub title: String,
    /// Frontmatter description, or `"Documentation for {title}"`.
    pub description: String,
    /// Raw, unrendered content.
    pub body: String,
    /// Tags without duplicates, first occurrence kept.
    pub tags: Vec<String>,
    /// Effective tab group after inheritance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_group: Option<String>,
    /// Unrecognized frontmatter keys.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
    /// Source file relative to the version root.
    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Document {
    /// Build a document from a raw scan entry and its resolved tab group.
    #[must_use]
    pub fn from_raw(version: &str, raw: RawDocument, tab_group: Option<String>) -> Self {
        let RawDocument {
            slug,
            source_path,
            frontmatter,
            body,
        } = raw;

        let title = frontmatter
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| slug.clone());
        let description = frontmatter
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Documentation for {title}"));

        let mut tags: Vec<String> = Vec::with_capacity(frontmatter.tags.len());
        for tag in frontmatter.tags {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        Self {
            slug,
            version: version.to_owned(),
            title,
            description,
            body,
            tags,
            tab_group,
            metadata: frontmatter.extra,
            source_path,
        }
    }

    /// First path segment when the slug is nested, e.g. `"guide"` for `"guide/intro"`.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.slug.split_once('/').map(|(first, _)| first)
    }
}

#[cfg(test)]
mod tests {
    use folio_storage::Frontmatter;
    use pretty_assertions::assert_eq;

    use super::*;

    fn raw(slug: &str, frontmatter: Frontmatter) -> RawDocument {
        RawDocument {
            slug: slug.to_owned(),
            source_path: PathBuf::from(format!("{slug}.md")),
            frontmatter,
            body: "Body".to_owned(),
        }
    }

    #[test]
    fn test_defaults_from_slug() {
        let doc = Document::from_raw("v1", raw("guide/intro", Frontmatter::default()), None);

        assert_eq!(doc.title, "guide/intro");
        assert_eq!(doc.description, "Documentation for guide/intro");
        assert_eq!(doc.version, "v1");
        assert!(doc.tags.is_empty());
    }

    #[test]
    fn test_frontmatter_fields_used() {
        let meta = Frontmatter {
            title: Some("Intro".to_owned()),
            description: Some("Start here".to_owned()),
            tags: vec!["a".to_owned(), "b".to_owned(), "a".to_owned()],
            extra: BTreeMap::from([("draft".to_owned(), serde_json::json!(true))]),
            ..Default::default()
        };
        let doc = Document::from_raw("v1", raw("intro", meta), Some("guides".to_owned()));

        assert_eq!(doc.title, "Intro");
        assert_eq!(doc.description, "Start here");
        assert_eq!(doc.tags, vec!["a", "b"]);
        assert_eq!(doc.tab_group.as_deref(), Some("guides"));
        assert_eq!(doc.metadata.get("draft"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn test_description_default_uses_title() {
        let meta = Frontmatter {
            title: Some("Setup".to_owned()),
            ..Default::default()
        };
        let doc = Document::from_raw("v1", raw("setup", meta), None);

        assert_eq!(doc.description, "Documentation for Setup");
    }

    #[test]
    fn test_category() {
        let nested = Document::from_raw("v1", raw("guide/a/b", Frontmatter::default()), None);
        let top = Document::from_raw("v1", raw("intro", Frontmatter::default()), None);

        assert_eq!(nested.category(), Some("guide"));
        assert_eq!(top.category(), None);
    }

    #[test]
    fn test_serialize_skips_source_path() {
        let doc = Document::from_raw("v1", raw("intro", Frontmatter::default()), None);
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json.get("source_path").is_none());
        assert!(json.get("tab_group").is_none());
        assert_eq!(json["slug"], "intro");
    }
}
