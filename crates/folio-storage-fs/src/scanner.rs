//! Depth-first walk of one version directory.
//!
//! Entries in each directory are visited in lexical order of their names,
//! files and subdirectories interleaved, so a re-walk of unchanged content
//! always yields the same sequence. Hidden entries (leading `.`) are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use folio_storage::{RawDocument, ScanResult, ScanWarning};

use crate::descriptor::parse_descriptor;
use crate::frontmatter::parse_document;
use crate::source::{SourceKind, dir_path_to_slug, file_path_to_slug};

/// Walks a version root and collects raw documents and descriptors.
pub(crate) struct Scanner<'a> {
    root: &'a Path,
    extensions: &'a [String],
    descriptor_file: &'a str,
}

impl<'a> Scanner<'a> {
    pub fn new(root: &'a Path, extensions: &'a [String], descriptor_file: &'a str) -> Self {
        Self {
            root,
            extensions,
            descriptor_file,
        }
    }

    /// Walk the whole tree.
    ///
    /// Never fails: unreadable files and directories become warnings or log
    /// entries. Slug collisions are resolved before returning.
    pub fn scan(&self) -> ScanResult {
        let mut result = ScanResult::default();
        self.scan_directory(self.root, Path::new(""), &mut result);
        result.resolve_collisions();
        result
    }

    fn scan_directory(&self, dir_path: &Path, rel_dir: &Path, result: &mut ScanResult) {
        let entries = match fs::read_dir(dir_path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %dir_path.display(), error = %e, "Skipping unreadable directory");
                return;
            }
        };

        // Cache file_type to avoid repeated stat calls
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e.file_name(), e.path(), is_dir)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (name, path, is_dir) in entries {
            let rel_path = rel_dir.join(&name);
            if is_dir {
                self.scan_directory(&path, &rel_path, result);
                continue;
            }
            match SourceKind::classify(&rel_path, self.extensions, self.descriptor_file) {
                Some(SourceKind::Content) => self.load_content(&path, rel_path, result),
                Some(SourceKind::Descriptor) => {
                    Self::load_descriptor(&path, rel_dir, rel_path, result);
                }
                None => {}
            }
        }
    }

    fn load_content(&self, path: &Path, rel_path: PathBuf, result: &mut ScanResult) {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                result.warn(ScanWarning::Parse {
                    path: rel_path,
                    message: e.to_string(),
                });
                return;
            }
        };

        match parse_document(&content) {
            Ok((frontmatter, body)) => {
                let slug = file_path_to_slug(&rel_path);
                tracing::trace!(%slug, root = %self.root.display(), "Found document");
                result.documents.push(RawDocument {
                    slug,
                    source_path: rel_path,
                    frontmatter,
                    body,
                });
            }
            Err(e) => result.warn(ScanWarning::Parse {
                path: rel_path,
                message: e.to_string(),
            }),
        }
    }

    fn load_descriptor(path: &Path, rel_dir: &Path, rel_path: PathBuf, result: &mut ScanResult) {
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                parse_descriptor(dir_path_to_slug(rel_dir), &content).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(descriptor) => result.descriptors.push(descriptor),
            Err(message) => result.warn(ScanWarning::DescriptorParse {
                path: rel_path,
                message,
            }),
        }
    }
}
