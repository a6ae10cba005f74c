//! Content rendering and pagination.
//!
//! Turns a section's markup body into plain text and cuts it into
//! Telegram-sized chunks.
//!
//! Regexes are declared with `lazy_regex!`, so patterns are validated at
//! compile time and built on first use.

// lazy_regex! relies on once_cell statics
#![allow(clippy::non_std_lazy_statics)]

use crate::utils::char_prefix;
use lazy_regex::lazy_regex;
use std::iter::FusedIterator;
use unicode_segmentation::UnicodeSegmentation;

/// Text sent in place of a section that has no content yet.
pub const CONTENT_PLACEHOLDER: &str = "📝 Content coming soon.";

/// Default chunk length, kept below Telegram's 4096 limit.
pub const DEFAULT_MAX_LEN: usize = 3500;

static RE_COMMENT: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?s)<!--.*?-->");

static RE_SCRIPT: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"(?is)<script\b[^>]*>.*?</script\s*>");

static RE_STYLE: lazy_regex::Lazy<regex::Regex> =
    lazy_regex!(r"(?is)<style\b[^>]*>.*?</style\s*>");

/// `<br>`, `<br/>`, `<br />`
static RE_LINE_BREAK: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)<br\s*/?>");

/// Opening or closing block-level tags
static RE_BLOCK: lazy_regex::Lazy<regex::Regex> = lazy_regex!(
    r"(?i)</?(?:p|div|h[1-6]|ul|ol|blockquote|pre|section|article|header|footer|table|tr|hr)\b[^<>]*>"
);

static RE_LIST_ITEM_OPEN: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)<li\b[^<>]*>");

static RE_LIST_ITEM_CLOSE: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?i)</li\s*>");

/// Any remaining tag-like token: `<tag ...>` or `</tag>`
static RE_TAG: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"</?[A-Za-z][^<>]*>");

static RE_LEADING_BLANKS: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?m)^[ \t]+");

static RE_TRAILING_BLANKS: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"(?m)[ \t]+$");

static RE_BLANK_RUN: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"[ \t]{2,}");

/// Match 3+ consecutive newlines
static RE_MULTI_NEWLINE: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"\n{3,}");

/// One rewriting pass over the markup.
///
/// Every rewrite either shortens the text or replaces a carriage return, and
/// nothing reintroduces a carriage return except entity decoding, which
/// shortens. Repeating the pass therefore reaches a fixed point.
fn strip_pass(text: &str) -> String {
    let mut out = text.replace("\r\n", "\n").replace('\r', "\n");

    out = RE_COMMENT.replace_all(&out, "").into_owned();
    out = RE_SCRIPT.replace_all(&out, "").into_owned();
    out = RE_STYLE.replace_all(&out, "").into_owned();
    out = RE_LINE_BREAK.replace_all(&out, "\n").into_owned();
    out = RE_BLOCK.replace_all(&out, "\n\n").into_owned();
    out = RE_LIST_ITEM_OPEN.replace_all(&out, "\n• ").into_owned();
    out = RE_LIST_ITEM_CLOSE.replace_all(&out, "\n").into_owned();
    out = RE_TAG.replace_all(&out, "").into_owned();

    out = html_escape::decode_html_entities(&out).into_owned();

    out = RE_LEADING_BLANKS.replace_all(&out, "").into_owned();
    out = RE_TRAILING_BLANKS.replace_all(&out, "").into_owned();
    out = RE_BLANK_RUN.replace_all(&out, " ").into_owned();
    out = RE_MULTI_NEWLINE.replace_all(&out, "\n\n").into_owned();

    out.trim().to_string()
}

/// Strips structural markup to plain text.
///
/// Paragraph boundaries become blank lines, `<br>` becomes a newline, list
/// items become `• ` bullets and HTML entities are decoded. The result is a
/// fixed point of the transformation, so applying it again changes nothing.
///
/// # Examples
///
/// ```
/// use guide_bot::render::to_plain_text;
/// assert_eq!(to_plain_text("<h2>Atlas</h2><p>Guide</p>"), "Atlas\n\nGuide");
/// assert_eq!(to_plain_text("Fish &amp; chips"), "Fish & chips");
/// ```
#[must_use]
pub fn to_plain_text(markup: &str) -> String {
    let mut current = strip_pass(markup);
    loop {
        let next = strip_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Iterator over bounded-length chunks of a text. See [`chunk`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a str,
    max_len: usize,
    placeholder_pending: bool,
}

/// Cuts `text` into chunks of at most `max_len` characters.
///
/// Each cut prefers the last newline strictly before `max_len`; without one
/// it falls back to a hard split at `max_len`, moved back to the previous
/// grapheme boundary when possible. Whitespace around a cut (the newline,
/// blank lines before it, leading whitespace of the remainder) is dropped.
/// Empty input yields a single placeholder chunk. A `max_len` of zero is
/// treated as one.
///
/// # Examples
///
/// ```
/// use guide_bot::render::chunk;
/// let parts: Vec<&str> = chunk("Line 1\nLine 2\nLine 3", 14).collect();
/// assert_eq!(parts, vec!["Line 1\nLine 2", "Line 3"]);
/// ```
#[must_use]
pub fn chunk(text: &str, max_len: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        max_len: max_len.max(1),
        placeholder_pending: text.is_empty(),
    }
}

impl<'a> Chunks<'a> {
    /// Byte offset of the cut for `rest`, which is longer than the window.
    fn cut_offset(&self, window_end: usize) -> usize {
        let window = &self.rest[..window_end];
        if let Some(newline) = window.rfind('\n').filter(|&idx| idx > 0) {
            // Blank lines before the cut belong to the trimmed gap.
            let kept = window[..newline].trim_end().len();
            return if kept > 0 { kept } else { newline };
        }

        // Start of the grapheme that begins at or straddles the window edge.
        let boundary = self
            .rest
            .grapheme_indices(true)
            .map(|(idx, _)| idx)
            .take_while(|&idx| idx <= window_end)
            .last()
            .unwrap_or(0);

        // A single cluster wider than the window is split on a char boundary.
        if boundary == 0 {
            window_end
        } else {
            boundary
        }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.placeholder_pending {
            self.placeholder_pending = false;
            return Some(char_prefix(CONTENT_PLACEHOLDER, self.max_len));
        }
        if self.rest.is_empty() {
            return None;
        }

        let window = char_prefix(self.rest, self.max_len);
        if window.len() == self.rest.len() {
            let last = self.rest;
            self.rest = "";
            return Some(last);
        }

        let cut = self.cut_offset(window.len());
        let (head, tail) = self.rest.split_at(cut);
        self.rest = tail.trim_start();
        Some(head)
    }
}

impl FusedIterator for Chunks<'_> {}

/// Renders section bodies into message-sized plain-text chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRenderer {
    max_len: usize,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

impl ContentRenderer {
    /// Create a renderer producing chunks of at most `max_len` characters.
    #[must_use]
    pub const fn new(max_len: usize) -> Self {
        Self {
            max_len: if max_len == 0 { 1 } else { max_len },
        }
    }

    /// Configured chunk length limit.
    #[must_use]
    pub const fn max_len(&self) -> usize {
        self.max_len
    }

    /// Markup to an ordered, never-empty list of chunks.
    #[must_use]
    pub fn render(&self, markup: &str) -> Vec<String> {
        let plain = to_plain_text(markup);
        chunk(&plain, self.max_len).map(str::to_owned).collect()
    }
}
