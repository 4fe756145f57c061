//! Tab group inheritance.
//!
//! A document's own `tab_group` always wins. Otherwise the directories above
//! it are checked from the nearest to the root, and the first descriptor that
//! sets a tab group provides it. Pure functions over already-loaded data.

use std::collections::HashMap;

use folio_storage::CategoryDescriptor;

/// Directory chain above a slug, nearest first.
///
/// `"a/b/c"` → `["a/b", "a", ""]`. The root (`""`) is always last.
#[must_use]
pub(crate) fn build_ancestor_chain(slug: &str) -> Vec<&str> {
    let mut ancestors: Vec<&str> = slug.rmatch_indices('/').map(|(i, _)| &slug[..i]).collect();
    ancestors.push("");
    ancestors
}

/// Effective tab group for a document.
///
/// Empty strings count as unset.
#[must_use]
pub fn resolve_tab_group(
    own: Option<&str>,
    slug: &str,
    descriptors: &HashMap<String, CategoryDescriptor>,
) -> Option<String> {
    if let Some(own) = own.filter(|g| !g.is_empty()) {
        return Some(own.to_owned());
    }
    nearest_tab_group(build_ancestor_chain(slug), descriptors)
}

/// Tab group for a category directory: its own descriptor, then its ancestors.
#[must_use]
pub fn category_tab_group(
    path: &str,
    descriptors: &HashMap<String, CategoryDescriptor>,
) -> Option<String> {
    let mut chain = vec![path];
    if !path.is_empty() {
        chain.extend(build_ancestor_chain(path));
    }
    nearest_tab_group(chain, descriptors)
}

fn nearest_tab_group(
    chain: Vec<&str>,
    descriptors: &HashMap<String, CategoryDescriptor>,
) -> Option<String> {
    chain.into_iter().find_map(|dir| {
        descriptors
            .get(dir)?
            .tab_group
            .as_deref()
            .filter(|g| !g.is_empty())
            .map(str::to_owned)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn descriptors(entries: &[(&str, Option<&str>)]) -> HashMap<String, CategoryDescriptor> {
        entries
            .iter()
            .map(|(path, group)| {
                (
                    (*path).to_owned(),
                    CategoryDescriptor {
                        path: (*path).to_owned(),
                        tab_group: group.map(str::to_owned),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_build_ancestor_chain() {
        assert_eq!(build_ancestor_chain("intro"), vec![""]);
        assert_eq!(build_ancestor_chain("a/b/c"), vec!["a/b", "a", ""]);
    }

    #[test]
    fn test_own_tab_group_wins() {
        let map = descriptors(&[("guide", Some("guides"))]);

        assert_eq!(
            resolve_tab_group(Some("api"), "guide/intro", &map),
            Some("api".to_owned())
        );
    }

    #[test]
    fn test_nearest_ancestor_wins() {
        let map = descriptors(&[("a", Some("X")), ("a/b", Some("Y"))]);

        assert_eq!(resolve_tab_group(None, "a/b/c", &map), Some("Y".to_owned()));
        assert_eq!(resolve_tab_group(None, "a/d", &map), Some("X".to_owned()));
    }

    #[test]
    fn test_descriptor_without_group_is_skipped() {
        let map = descriptors(&[("a", Some("X")), ("a/b", None)]);

        assert_eq!(resolve_tab_group(None, "a/b/c", &map), Some("X".to_owned()));
    }

    #[test]
    fn test_root_descriptor_applies_everywhere() {
        let map = descriptors(&[("", Some("root"))]);

        assert_eq!(resolve_tab_group(None, "intro", &map), Some("root".to_owned()));
        assert_eq!(resolve_tab_group(None, "x/y/z", &map), Some("root".to_owned()));
    }

    #[test]
    fn test_no_group_anywhere() {
        let map = descriptors(&[("other", Some("O"))]);

        assert_eq!(resolve_tab_group(None, "guide/intro", &map), None);
    }

    #[test]
    fn test_empty_own_group_falls_through() {
        let map = descriptors(&[("guide", Some("guides"))]);

        assert_eq!(
            resolve_tab_group(Some(""), "guide/intro", &map),
            Some("guides".to_owned())
        );
    }

    #[test]
    fn test_sibling_prefix_does_not_match() {
        let map = descriptors(&[("guide", Some("guides"))]);

        assert_eq!(resolve_tab_group(None, "guidelines/intro", &map), None);
    }

    #[test]
    fn test_category_tab_group_includes_self() {
        let map = descriptors(&[("a", Some("X")), ("a/b", Some("Y"))]);

        assert_eq!(category_tab_group("a/b", &map), Some("Y".to_owned()));
        assert_eq!(category_tab_group("a/c", &map), Some("X".to_owned()));
        assert_eq!(category_tab_group("z", &map), None);
    }
}
