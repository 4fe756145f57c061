//! Plain-text extraction for indexing.
//!
//! Strips everything a reader would not search for: code, MDX module lines,
//! HTML/JSX tags and markdown symbols. Link and image syntax keeps its text.

use std::sync::LazyLock;

use regex::Regex;

static BACKTICK_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^[ \t]*```.*?^[ \t]*```[^\n]*$").unwrap());

static TILDE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^[ \t]*~~~.*?^[ \t]*~~~[^\n]*$").unwrap());

static MDX_MODULE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:import|export)\s[^\n]*$").unwrap());

static HTML_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`[^`\n]*`").unwrap());

// Images and links share one pattern; the optional `!` is dropped with the URL.
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]\n]*)\]\([^)\n]*\)").unwrap());

// Capitalized JSX components take any props. Lowercase names must be known
// HTML elements whose attributes all carry values, so `x<y and z>w` is prose.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"</?[A-Z][A-Za-z0-9.]*(?:\s[^<>]*)?/?>",
        r"|</?(?:a|abbr|article|aside|b|blockquote|br|button|caption|code|dd|del|details|div|dl|dt",
        r"|em|figcaption|figure|footer|h[1-6]|header|hr|i|iframe|img|input|ins|kbd|label|li",
        r"|main|mark|nav|ol|p|picture|pre|section|small|source|span|strong|sub|summary|sup",
        r"|svg|table|tbody|td|tfoot|th|thead|tr|u|ul|video)",
        r#"(?:\s+[A-Za-z_:][-\w.:]*=(?:"[^"]*"|'[^']*'|\{[^{}]*\}|[^\s"'<>=]+))*\s*/?>"#,
    ))
    .unwrap()
});

// Table separator rows, thematic breaks and setext underlines.
static RULE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t|:=-]{3,}$").unwrap());

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]*>+").unwrap());

static SYMBOLS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[#*_~|]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Reduce a document body to searchable text.
///
/// `max_chars` of `0` means unlimited; otherwise the result is cut to that
/// many characters.
#[must_use]
pub fn sanitize(body: &str, max_chars: usize) -> String {
    let text = BACKTICK_FENCE.replace_all(body, " ");
    let text = TILDE_FENCE.replace_all(&text, " ");
    let text = MDX_MODULE_LINE.replace_all(&text, " ");
    let text = HTML_COMMENT.replace_all(&text, " ");
    let text = INLINE_CODE.replace_all(&text, " ");
    let text = LINK.replace_all(&text, "$1");
    let text = TAG.replace_all(&text, " ");
    let text = RULE_LINE.replace_all(&text, " ");
    let text = BLOCKQUOTE.replace_all(&text, " ");
    let text = SYMBOLS.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    if max_chars == 0 {
        return text.to_owned();
    }
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].trim_end().to_owned(),
        None => text.to_owned(),
    }
}
