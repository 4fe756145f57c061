//! Results of walking one version of the corpus.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::metadata::{CategoryDescriptor, Frontmatter};

/// A content file as found by a backend, before any inheritance is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct RawDocument {
    /// Path relative to the version root, `/`-separated, extension stripped.
    pub slug: String,
    /// Source file relative to the version root.
    pub source_path: PathBuf,
    /// Parsed metadata block (default when the file has none).
    pub frontmatter: Frontmatter,
    /// Content after the metadata block.
    pub body: String,
}

/// Non-fatal problem found while walking a version.
///
/// None of these stop a walk. The affected file is skipped (or, for
/// collisions, replaced) and the walk continues.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScanWarning {
    /// A content file's metadata block could not be parsed or the file could not be read.
    #[error("Skipping {}: {message}", .path.display())]
    Parse {
        /// Source file relative to the version root.
        path: PathBuf,
        /// Parser or I/O message.
        message: String,
    },
    /// Two files produced the same slug; the later one in walk order won.
    #[error("Slug `{slug}` from {} replaces {}", .kept.display(), .replaced.display())]
    SlugCollision {
        /// The contested slug.
        slug: String,
        /// File that now provides the slug.
        kept: PathBuf,
        /// File that was dropped.
        replaced: PathBuf,
    },
    /// A category descriptor was malformed and is treated as absent.
    #[error("Ignoring category descriptor {}: {message}", .path.display())]
    DescriptorParse {
        /// Descriptor file relative to the version root.
        path: PathBuf,
        /// Parser or I/O message.
        message: String,
    },
}

/// Everything a backend found in one version.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Raw documents in walk order.
    pub documents: Vec<RawDocument>,
    /// One entry per directory that has a valid descriptor.
    pub descriptors: Vec<CategoryDescriptor>,
    /// Skipped files and collisions, in the order they were found.
    pub warnings: Vec<ScanWarning>,
}

impl ScanResult {
    /// Record a warning and log it.
    pub fn warn(&mut self, warning: ScanWarning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Drop documents whose slug is claimed again later in walk order.
    ///
    /// The surviving document keeps the position of the file that won, so the
    /// sequence stays in walk order. Each dropped file produces a
    /// [`ScanWarning::SlugCollision`].
    pub fn resolve_collisions(&mut self) {
        let last_index: HashMap<&str, usize> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (doc.slug.as_str(), i))
            .collect();

        if last_index.len() == self.documents.len() {
            return;
        }

        let mut collisions = Vec::new();
        let mut winners = Vec::with_capacity(self.documents.len());
        for (i, doc) in self.documents.iter().enumerate() {
            let winner = last_index[doc.slug.as_str()];
            winners.push(winner == i);
            if winner != i {
                collisions.push(ScanWarning::SlugCollision {
                    slug: doc.slug.clone(),
                    kept: self.documents[winner].source_path.clone(),
                    replaced: doc.source_path.clone(),
                });
            }
        }

        let mut keep = winners.into_iter();
        self.documents.retain(|_| keep.next().unwrap_or(true));

        for warning in collisions {
            self.warn(warning);
        }
    }
}
