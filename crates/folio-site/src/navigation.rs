//! Previous/next links and page assembly.

use std::sync::Arc;

use serde::Serialize;

use crate::document::Document;
use crate::toc::{Toc, TocNode};

/// Neighbours of a document in corpus order.
///
/// Order spans the whole version, not just one category, so the next
/// document may belong to an unrelated section.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Adjacent {
    pub previous: Option<Arc<Document>>,
    pub next: Option<Arc<Document>>,
}

/// Link to another document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub slug: String,
    pub title: String,
}

impl From<&Document> for NavLink {
    fn from(doc: &Document) -> Self {
        Self {
            slug: doc.slug.clone(),
            title: doc.title.clone(),
        }
    }
}

/// A resolved document with everything needed to display it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DocPage {
    pub document: Arc<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<NavLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NavLink>,
    pub toc: Vec<TocNode>,
}

impl DocPage {
    pub(crate) fn new(document: Arc<Document>, adjacent: &Adjacent) -> Self {
        let toc = Toc::new(&document.body).tree();
        Self {
            previous: adjacent.previous.as_deref().map(NavLink::from),
            next: adjacent.next.as_deref().map(NavLink::from),
            toc,
            document,
        }
    }
}
