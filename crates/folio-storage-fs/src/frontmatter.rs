//! Leading metadata block parsing.
//!
//! A content file may start with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Getting Started
//! tab_group: guides
//! ---
//! # Getting Started
//! ```
//!
//! A file without an opening fence has empty metadata and its whole content
//! is the body.

use folio_storage::Frontmatter;

/// Why a metadata block was rejected.
#[derive(Debug, thiserror::Error)]
pub(crate) enum FrontmatterError {
    /// Opening fence without a closing one.
    #[error("metadata block is not closed")]
    Unterminated,
    /// The block is YAML but not a key/value mapping.
    #[error("metadata block must be a mapping")]
    NotMapping,
    /// YAML syntax or field type error.
    #[error("invalid metadata: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Split a file into its metadata and body and parse the metadata.
pub(crate) fn parse_document(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let Some((yaml, body)) = split(content)? else {
        let body = content.strip_prefix('\u{feff}').unwrap_or(content);
        return Ok((Frontmatter::default(), body.to_owned()));
    };
    Ok((parse_block(yaml)?, body.to_owned()))
}

/// Locate the fenced block.
///
/// Returns `Ok(None)` when the file has no opening fence.
fn split(content: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let (first, block) = next_line(content);
    if first.trim_end() != "---" {
        return Ok(None);
    }

    let mut rest = block;
    while !rest.is_empty() {
        let (line, after) = next_line(rest);
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &block[..block.len() - rest.len()];
            return Ok(Some((yaml, after)));
        }
        rest = after;
    }
    Err(FrontmatterError::Unterminated)
}

fn next_line(s: &str) -> (&str, &str) {
    match s.find('\n') {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => (s, ""),
    }
}

fn parse_block(yaml: &str) -> Result<Frontmatter, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }
    match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
        serde_yaml::Value::Null => Ok(Frontmatter::default()),
        value @ serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        _ => Err(FrontmatterError::NotMapping),
    }
}
