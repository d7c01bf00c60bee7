//! Text cleanup for model-written outline lines.
//!
//! Handles bullet-marker removal, balanced emphasis stripping, whitespace
//! collapsing and indentation measurement. Asterisks that are not part of a
//! balanced span wrapping the whole text or its leading words are kept, so
//! `2 * 3` survives untouched.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse runs of whitespace into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Leading list markers: `-`, `*`, `+` and `•`-style glyphs, or `1.` / `1)`.
static BULLET_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[-*+](?:\s+|$)|[•▪◦‣●]\s*|\d{1,3}[.)]\s+)").unwrap()
});

/// `**text**` covering the whole line.
static WHOLE_BOLD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+)\*\*$").unwrap());

/// `**text**` at the start of the line, followed by more text.
static LEADING_BOLD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+)\*\*").unwrap());

/// `*text*` covering the whole line.
static WHOLE_ITALIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*\s](?:[^*]*[^*\s])?)\*$").unwrap());

/// `*text*` at the start of the line, closed before a space or colon.
static LEADING_ITALIC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*\s](?:[^*]*[^*\s])?)\*([\s:])").unwrap());

/// Characters not allowed in file names on common platforms.
static FILENAME_UNSAFE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\s]+"#).unwrap());

/// Cleaner for outline lines.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    /// Spaces that make up one indent level. A tab counts as one level.
    spaces_per_level: usize,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self { spaces_per_level: 2 }
    }
}

impl TextCleaner {
    /// Create a cleaner with two spaces per indent level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many leading spaces make up one indent level.
    pub fn with_spaces_per_level(mut self, spaces: usize) -> Self {
        self.spaces_per_level = spaces.max(1); // At least 1 space per level
        self
    }

    /// Indent level of a raw line, from its leading whitespace.
    pub fn indent_level(&self, line: &str) -> usize {
        let mut columns = 0;
        for c in line.chars() {
            match c {
                ' ' | '\u{a0}' => columns += 1,
                '\t' => columns += self.spaces_per_level,
                _ => break,
            }
        }
        columns / self.spaces_per_level
    }

    /// Clean a content line into bullet text.
    ///
    /// - Removes the leading list marker
    /// - Strips balanced emphasis around the whole text or its leading span
    /// - Applies Unicode NFC normalization
    /// - Collapses whitespace runs and trims
    pub fn clean_bullet(&self, line: &str) -> String {
        let without_marker = strip_bullet_marker(line.trim_start());
        let stripped = strip_emphasis(without_marker.trim());
        self.collapse(&stripped)
    }

    /// Clean header text: emphasis and trailing colon.
    pub fn clean_header(&self, text: &str) -> String {
        let stripped = strip_emphasis(text.trim());
        let collapsed = self.collapse(&stripped);
        collapsed.trim_end_matches(':').trim().to_string()
    }

    /// Normalize, drop characters XML cannot carry and collapse whitespace.
    pub fn collapse(&self, text: &str) -> String {
        let normalized: String = text.nfc().collect();
        let normalized = strip_xml_invalid(&normalized);
        WHITESPACE_COLLAPSE_REGEX
            .replace_all(&normalized, " ")
            .trim()
            .to_string()
    }
}

/// Remove a leading list marker, if any.
pub fn strip_bullet_marker(text: &str) -> &str {
    match BULLET_MARKER_REGEX.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Strip balanced emphasis markers that wrap the whole text or its leading span.
pub fn strip_emphasis(text: &str) -> String {
    if let Some(caps) = WHOLE_BOLD_REGEX.captures(text) {
        return caps[1].trim().to_string();
    }
    if LEADING_BOLD_REGEX.is_match(text) {
        return LEADING_BOLD_REGEX.replace(text, "$1").into_owned();
    }
    if let Some(caps) = WHOLE_ITALIC_REGEX.captures(text) {
        return caps[1].to_string();
    }
    if LEADING_ITALIC_REGEX.is_match(text) {
        return LEADING_ITALIC_REGEX.replace(text, "$1$2").into_owned();
    }
    text.to_string()
}

/// Turn arbitrary text into a file-name-safe stem.
pub fn sanitize_file_stem(text: &str) -> String {
    let cleaned = FILENAME_UNSAFE_REGEX.replace_all(text.trim(), "_");
    let stem: String = cleaned.chars().take(48).collect();
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem
    }
}

/// Whether XML 1.0 allows `c` in character data.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// `text` without the control characters XML 1.0 forbids.
pub fn strip_xml_invalid(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}
