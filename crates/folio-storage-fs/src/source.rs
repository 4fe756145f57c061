//! Source file classification for corpus walking.

use std::path::{Component, Path};

/// The role a source file plays in building a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceKind {
    /// Content file (`.md`, `.mdx`, ...), becomes a document.
    Content,
    /// Per-directory category descriptor (e.g. `_category_.json`).
    Descriptor,
}

impl SourceKind {
    /// Classify a file by name.
    ///
    /// Extensions are compared case-insensitively. Returns `None` for
    /// anything that is neither content nor a descriptor.
    pub fn classify(path: &Path, extensions: &[String], descriptor_file: &str) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy();
        if file_name == descriptor_file {
            return Some(Self::Descriptor);
        }
        let ext = path.extension()?.to_string_lossy();
        extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&ext))
            .then_some(Self::Content)
    }
}

/// Convert a path relative to the version root into a slug.
///
/// Strips the extension and joins components with `/` regardless of the
/// platform separator.
///
/// - `intro.mdx` -> `"intro"`
/// - `guide/setup.md` -> `"guide/setup"`
/// - `guide\setup.md` -> `"guide/setup"`
pub(crate) fn file_path_to_slug(rel_path: &Path) -> String {
    dir_path_to_slug(&rel_path.with_extension(""))
}

/// Convert a directory path relative to the version root into a `/`-joined path.
///
/// The version root itself maps to `""`.
pub(crate) fn dir_path_to_slug(rel_path: &Path) -> String {
    let mut slug = String::new();
    for component in rel_path.components() {
        if let Component::Normal(part) = component {
            if !slug.is_empty() {
                slug.push('/');
            }
            slug.push_str(&part.to_string_lossy());
        }
    }
    // Separators inside a single component only happen with foreign paths.
    if slug.contains('\\') {
        slug = slug.replace('\\', "/");
    }
    slug
}
