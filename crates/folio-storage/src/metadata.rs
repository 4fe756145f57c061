//! Document and directory metadata types.
//!
//! Only data types live here. Parsing is format-specific and implemented by
//! each storage backend.
//!
//! # Recognized frontmatter keys
//!
//! - `title`: page title
//! - `description`: page description
//! - `tags`: sequence of strings
//! - `tab_group`: grouping label, overrides anything inherited from directories
//!
//! Every other key is kept in [`Frontmatter::extra`] untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata block at the top of a content file.
///
/// All recognized fields are optional. Unknown keys are collected into
/// `extra` so nothing the author wrote is lost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Page description for listings and search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Free-form tags.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,

    /// Tab group set on the document itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_group: Option<String>,

    /// Passthrough keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Frontmatter {
    /// Check if no key was set at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_empty()
            && self.tab_group.is_none()
            && self.extra.is_empty()
    }
}

/// `tags: ~` is treated the same as a missing key.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Per-directory category settings.
///
/// Applies to every document below `path` unless a deeper descriptor or the
/// document's own frontmatter says otherwise.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategoryDescriptor {
    /// Directory path relative to the version root (`""` for the root itself).
    pub path: String,
    /// Tab group inherited by everything below this directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_group: Option<String>,
    /// Display label for the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordering hint among sibling categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
}
