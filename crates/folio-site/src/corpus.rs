//! Immutable per-version snapshot.
//!
//! A [`Corpus`] is built completely from one [`ScanResult`] before anyone can
//! see it, then shared behind an `Arc`. Readers never observe a partially
//! built collection.

use std::collections::HashMap;
use std::sync::Arc;

use folio_storage::{CategoryDescriptor, ScanResult, ScanWarning};

use crate::document::Document;
use crate::inheritance::{category_tab_group, resolve_tab_group};
use crate::navigation::Adjacent;
use crate::resolve::{CategoryListing, Resolution, category_title, normalize_slug};

/// Resolved documents of one version in walk order.
#[derive(Debug)]
pub struct Corpus {
    version: String,
    documents: Vec<Arc<Document>>,
    slug_index: HashMap<String, usize>,
    descriptors: HashMap<String, CategoryDescriptor>,
    warnings: Vec<ScanWarning>,
}

impl Corpus {
    /// Apply defaults and tab group inheritance to a scan.
    #[must_use]
    pub fn build(version: &str, scan: ScanResult) -> Self {
        let descriptors: HashMap<String, CategoryDescriptor> = scan
            .descriptors
            .into_iter()
            .map(|d| (d.path.clone(), d))
            .collect();

        let mut documents = Vec::with_capacity(scan.documents.len());
        let mut slug_index = HashMap::with_capacity(scan.documents.len());
        for raw in scan.documents {
            let tab_group =
                resolve_tab_group(raw.frontmatter.tab_group.as_deref(), &raw.slug, &descriptors);
            let document = Document::from_raw(version, raw, tab_group);
            // Backends resolve collisions already; keep the last one if a custom one didn't.
            if let Some(&existing) = slug_index.get(&document.slug) {
                documents.remove(existing);
                slug_index.retain(|_, i| *i != existing);
                for i in slug_index.values_mut() {
                    if *i > existing {
                        *i -= 1;
                    }
                }
            }
            slug_index.insert(document.slug.clone(), documents.len());
            documents.push(Arc::new(document));
        }

        Self {
            version: version.to_owned(),
            documents,
            slug_index,
            descriptors,
            warnings: scan.warnings,
        }
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Documents in corpus order.
    #[must_use]
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    /// Warnings produced while walking this version.
    #[must_use]
    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Descriptor for a directory, if one was found.
    #[must_use]
    pub fn descriptor(&self, path: &str) -> Option<&CategoryDescriptor> {
        self.descriptors.get(path)
    }

    /// Exact lookup by normalized slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Arc<Document>> {
        self.slug_index.get(slug).map(|&i| &self.documents[i])
    }

    /// Previous and next documents in corpus order.
    ///
    /// Returns `None` if the slug is not a document.
    #[must_use]
    pub fn adjacent(&self, slug: &str) -> Option<Adjacent> {
        let i = *self.slug_index.get(slug)?;
        Some(Adjacent {
            previous: i
                .checked_sub(1)
                .map(|p| Arc::clone(&self.documents[p])),
            next: self.documents.get(i + 1).map(Arc::clone),
        })
    }

    /// Classify a requested slug.
    ///
    /// An exact document match always wins over a category with the same path.
    #[must_use]
    pub fn resolve(&self, slug: &str) -> Resolution {
        let slug = normalize_slug(slug);
        if slug.is_empty() {
            return Resolution::NotFound;
        }

        if let Some(doc) = self.get(&slug) {
            return Resolution::Document(Arc::clone(doc));
        }

        let prefix = format!("{slug}/");
        let documents: Vec<Arc<Document>> = self
            .documents
            .iter()
            .filter(|d| d.slug.starts_with(&prefix))
            .cloned()
            .collect();
        if documents.is_empty() {
            return Resolution::NotFound;
        }

        let title = self
            .descriptors
            .get(&slug)
            .and_then(|d| d.label.clone())
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| category_title(&slug));
        let tab_group = category_tab_group(&slug, &self.descriptors);

        Resolution::Category(CategoryListing {
            path: slug,
            title,
            tab_group,
            documents,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use folio_storage::{Frontmatter, RawDocument};
    use pretty_assertions::assert_eq;

    use super::*;

    fn raw(slug: &str) -> RawDocument {
        RawDocument {
            slug: slug.to_owned(),
            source_path: PathBuf::from(format!("{slug}.mdx")),
            frontmatter: Frontmatter::default(),
            body: String::new(),
        }
    }

    fn descriptor(path: &str, tab_group: &str) -> CategoryDescriptor {
        CategoryDescriptor {
            path: path.to_owned(),
            tab_group: Some(tab_group.to_owned()),
            ..Default::default()
        }
    }

    fn corpus(slugs: &[&str], descriptors: Vec<CategoryDescriptor>) -> Corpus {
        Corpus::build(
            "v1",
            ScanResult {
                documents: slugs.iter().map(|s| raw(s)).collect(),
                descriptors,
                warnings: Vec::new(),
            },
        )
    }

    fn slugs(docs: &[Arc<Document>]) -> Vec<&str> {
        docs.iter().map(|d| d.slug.as_str()).collect()
    }

    #[test]
    fn test_build_applies_inheritance() {
        let corpus = corpus(&["guide/intro"], vec![descriptor("guide", "guides")]);

        let doc = corpus.get("guide/intro").unwrap();
        assert_eq!(doc.tab_group.as_deref(), Some("guides"));
        assert_eq!(doc.version, "v1");
    }

    #[test]
    fn test_build_keeps_last_duplicate() {
        let mut scan = ScanResult {
            documents: vec![raw("a"), raw("b"), raw("a")],
            ..Default::default()
        };
        scan.documents[2].body = "second".to_owned();

        let corpus = Corpus::build("v1", scan);

        assert_eq!(slugs(corpus.documents()), vec!["b", "a"]);
        assert_eq!(corpus.get("a").unwrap().body, "second");
        assert_eq!(corpus.get("b").unwrap().slug, "b");
    }

    #[test]
    fn test_resolve_document() {
        let corpus = corpus(&["guide/intro"], vec![descriptor("guide", "guides")]);

        let Resolution::Document(doc) = corpus.resolve("guide/intro") else {
            panic!("expected document");
        };
        assert_eq!(doc.tab_group.as_deref(), Some("guides"));
    }

    #[test]
    fn test_resolve_category() {
        let corpus = corpus(
            &["intro", "guide/intro", "guide/setup", "guidelines"],
            vec![descriptor("guide", "guides")],
        );

        let Resolution::Category(listing) = corpus.resolve("guide") else {
            panic!("expected category");
        };
        assert_eq!(listing.path, "guide");
        assert_eq!(listing.title, "Guide");
        assert_eq!(listing.tab_group.as_deref(), Some("guides"));
        assert_eq!(slugs(&listing.documents), vec!["guide/intro", "guide/setup"]);
    }

    #[test]
    fn test_resolve_document_wins_over_category() {
        let corpus = corpus(&["guide", "guide/intro"], Vec::new());

        assert!(matches!(corpus.resolve("guide"), Resolution::Document(_)));
    }

    #[test]
    fn test_resolve_nested_category_uses_label() {
        let corpus = corpus(
            &["guide/advanced/tuning"],
            vec![CategoryDescriptor {
                path: "guide/advanced".to_owned(),
                label: Some("Advanced Topics".to_owned()),
                ..Default::default()
            }],
        );

        let Resolution::Category(listing) = corpus.resolve("/guide/advanced/") else {
            panic!("expected category");
        };
        assert_eq!(listing.title, "Advanced Topics");
        assert_eq!(listing.tab_group, None);
    }

    #[test]
    fn test_resolve_not_found() {
        let corpus = corpus(&["guide/intro"], Vec::new());

        assert!(corpus.resolve("nope").is_not_found());
        assert!(corpus.resolve("gui").is_not_found());
        assert!(corpus.resolve("guide/intro/more").is_not_found());
        assert!(corpus.resolve("").is_not_found());
        assert!(corpus.resolve("/").is_not_found());
    }

    #[test]
    fn test_adjacent_symmetry() {
        let corpus = corpus(&["a", "b/x", "c"], Vec::new());
        let docs = corpus.documents();

        for pair in docs.windows(2) {
            let first = corpus.adjacent(&pair[0].slug).unwrap();
            let second = corpus.adjacent(&pair[1].slug).unwrap();
            assert_eq!(first.next.as_ref(), Some(&pair[1]));
            assert_eq!(second.previous.as_ref(), Some(&pair[0]));
        }
    }

    #[test]
    fn test_adjacent_boundaries() {
        let corpus = corpus(&["a", "b"], Vec::new());

        let first = corpus.adjacent("a").unwrap();
        let last = corpus.adjacent("b").unwrap();

        assert!(first.previous.is_none());
        assert!(last.next.is_none());
        assert!(corpus.adjacent("missing").is_none());
    }

    #[test]
    fn test_adjacent_single_document() {
        let corpus = corpus(&["only"], Vec::new());

        assert_eq!(corpus.adjacent("only"), Some(Adjacent::default()));
    }
}
