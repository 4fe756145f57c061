//! Slug classification results.

use std::sync::Arc;

use serde::Serialize;

use crate::document::Document;

/// What a requested slug names within a version.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Exact slug match.
    Document(Arc<Document>),
    /// No exact match, but documents live below the slug.
    Category(CategoryListing),
    /// Neither. An expected outcome, not a failure.
    NotFound,
}

impl Resolution {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Documents below a category path, in corpus order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryListing {
    /// Normalized category path (e.g. `"guide/advanced"`).
    pub path: String,
    /// Descriptor label, or the last path segment in title case.
    pub title: String,
    /// Nearest tab group at or above the category directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_group: Option<String>,
    pub documents: Vec<Arc<Document>>,
}

/// Strip leading/trailing slashes and empty segments.
///
/// `"/guide//intro/"` → `"guide/intro"`.
#[must_use]
pub fn normalize_slug(slug: &str) -> String {
    let mut normalized = String::with_capacity(slug.len());
    for part in slug.split('/').filter(|p| !p.is_empty()) {
        if !normalized.is_empty() {
            normalized.push('/');
        }
        normalized.push_str(part);
    }
    normalized
}

/// Title for a category without a descriptor label.
///
/// Uses the last path segment, `-`/`_` become spaces, each word capitalized.
pub(crate) fn category_title(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    titlecase_from_slug(last)
}

/// Convert a slug (kebab-case or `snake_case`) to title case.
///
/// ```ignore
/// assert_eq!(titlecase_from_slug("setup-guide"), "Setup Guide");
/// ```
fn titlecase_from_slug(slug: &str) -> String {
    let mut result = String::with_capacity(slug.len());
    for word in slug.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        capitalize_first_into(word, &mut result);
    }
    result
}

fn capitalize_first_into(word: &str, out: &mut String) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("guide/intro"), "guide/intro");
        assert_eq!(normalize_slug("/guide/intro/"), "guide/intro");
        assert_eq!(normalize_slug("guide//intro"), "guide/intro");
        assert_eq!(normalize_slug("///"), "");
        assert_eq!(normalize_slug(""), "");
    }

    #[test]
    fn test_category_title() {
        assert_eq!(category_title("guide"), "Guide");
        assert_eq!(category_title("guide/getting-started"), "Getting Started");
        assert_eq!(category_title("api_reference"), "Api Reference");
    }

    #[test]
    fn test_resolution_serializes_with_kind_tag() {
        let json = serde_json::to_value(Resolution::NotFound).unwrap();

        assert_eq!(json, serde_json::json!({"kind": "not_found"}));
    }
}
