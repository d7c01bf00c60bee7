//! Outline parsing for model-written presentation text.
//!
//! The model is asked to answer with a `*Title*` first line, `**Section**`
//! headers and `•`/`-` bullets indented two spaces per level, but nothing
//! guarantees it does. The parser never fails: lines it cannot place are
//! dropped and a missing title falls back to the first section or
//! `"Presentation"`.

use crate::normalize::TextCleaner;
use crate::types::{Bullet, DetailLevel, Outline, MAX_BULLET_LEVEL};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Title used when neither a `*Title*` line nor any section was found.
pub const DEFAULT_TITLE: &str = "Presentation";

/// Canonical name of the opening section.
pub const INTRODUCTION: &str = "Introduction";

/// Canonical name of the closing section.
pub const CONCLUSION: &str = "Conclusion";

/// Words that mark a section as a closing section.
const CLOSING_KEYWORDS: &[&str] = &["conclusion", "summary", "wrap-up", "final"];

/// `**Section**` with an optional trailing colon.
static BOLD_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*([^*]+?)\*\*:?$").unwrap());

/// `# Section` through `###### Section`.
static HASH_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").unwrap());

/// `Slide 3: Section`, also used to strip the prefix inside other headers.
static SLIDE_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^slide\s+\d+\s*[:.\-–]\s*(.+)$").unwrap());

/// `*Title*` on a line of its own.
static TITLE_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*([^*\s](?:[^*]*[^*\s])?)\*$").unwrap());

/// Loose match for introduction-like section names.
static INTRODUCTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)introduction").unwrap());

/// A parsed presentation: title plus ordered sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedOutline {
    /// Presentation title, never empty.
    pub title: String,

    /// Sections in rendering order.
    pub outline: Outline,
}

/// Line-oriented parser for outline text.
#[derive(Debug, Clone)]
pub struct OutlineParser {
    /// Deepest bullet level emitted.
    max_level: u8,

    cleaner: TextCleaner,
}

impl Default for OutlineParser {
    fn default() -> Self {
        Self {
            max_level: MAX_BULLET_LEVEL,
            cleaner: TextCleaner::new(),
        }
    }
}

impl OutlineParser {
    /// Create a parser with the default level range and indentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower the deepest bullet level emitted.
    pub fn with_max_level(mut self, max_level: u8) -> Self {
        self.max_level = max_level.min(MAX_BULLET_LEVEL);
        self
    }

    /// Set how many leading spaces make up one indent level.
    pub fn with_spaces_per_level(mut self, spaces: usize) -> Self {
        self.cleaner = self.cleaner.with_spaces_per_level(spaces);
        self
    }

    /// Parse raw model output into a title and outline.
    pub fn parse(&self, raw: &str) -> ParsedOutline {
        let mut title: Option<String> = None;
        let mut outline = Outline::new();
        let mut current: Option<String> = None;
        let mut buffered: Vec<&str> = Vec::new();

        for line in raw.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(header) = self.match_header(line.trim()) {
                if let Some(section) = current.take() {
                    self.flush(&mut outline, &section, &buffered);
                }
                buffered.clear();
                log::debug!("Section header: {}", header);
                outline.open(&header);
                current = Some(header);
                continue;
            }

            if current.is_some() {
                buffered.push(line);
            } else if title.is_none() {
                title = self.match_title(line.trim());
                if title.is_none() {
                    log::debug!("Dropping line before first section: {}", line.trim());
                }
            } else {
                log::debug!("Dropping line before first section: {}", line.trim());
            }
        }

        if let Some(section) = current.take() {
            self.flush(&mut outline, &section, &buffered);
        }

        let title = title
            .or_else(|| outline.first_key().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        normalize_introduction(&mut outline);

        ParsedOutline { title, outline }
    }

    /// Recognize a section header and return its cleaned text.
    fn match_header(&self, line: &str) -> Option<String> {
        let inner = BOLD_HEADER_REGEX
            .captures(line)
            .or_else(|| HASH_HEADER_REGEX.captures(line))
            .or_else(|| SLIDE_HEADER_REGEX.captures(line))
            .map(|caps| caps[1].to_string())?;

        let mut text = self.cleaner.clean_header(&inner);
        if let Some(caps) = SLIDE_HEADER_REGEX.captures(&text) {
            text = self.cleaner.clean_header(&caps[1]);
        }

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Recognize the `*Title*` line.
    fn match_title(&self, line: &str) -> Option<String> {
        let caps = TITLE_LINE_REGEX.captures(line)?;
        let text = self.cleaner.collapse(&caps[1]);
        if text.is_empty() || is_generic_introduction(&text) {
            None
        } else {
            Some(text)
        }
    }

    /// Turn a section's buffered content lines into bullets.
    fn flush(&self, outline: &mut Outline, section: &str, lines: &[&str]) {
        for line in lines {
            let text = self.cleaner.clean_bullet(line);
            if text.is_empty() {
                continue;
            }
            let level = self.cleaner.indent_level(line).min(self.max_level as usize);
            outline.push_bullet(section, Bullet::new(text, level));
        }
    }
}

/// Whether a would-be title is just the model announcing its answer.
fn is_generic_introduction(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower == "introduction"
        || lower.starts_with("here is")
        || lower.starts_with("here's")
        || lower.starts_with("sure")
}

/// Rename a loosely matching introduction section to `Introduction` and move
/// it to the front.
fn normalize_introduction(outline: &mut Outline) {
    if !outline.contains(INTRODUCTION) {
        let candidate = outline
            .keys()
            .find(|key| INTRODUCTION_REGEX.is_match(key))
            .map(str::to_string);
        if let Some(key) = candidate {
            log::debug!("Renaming section '{}' to '{}'", key, INTRODUCTION);
            outline.rename(&key, INTRODUCTION);
        }
    }
    outline.move_to_front(INTRODUCTION);
}

/// Whether a section title reads as a closing section.
pub fn is_closing_section(title: &str) -> bool {
    let lower = title.to_lowercase();
    CLOSING_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Make sure the outline ends with a closing section.
///
/// If the last section already reads as a closing section nothing changes.
/// Otherwise an existing `Conclusion` section is moved last, or a new one with
/// three standard bullets is appended.
pub fn ensure_conclusion(outline: &mut Outline) {
    if outline.last_key().is_some_and(is_closing_section) {
        return;
    }
    if outline.move_to_back(CONCLUSION) {
        return;
    }
    outline.insert(
        CONCLUSION,
        vec![
            Bullet::top("Summary of key points and takeaways"),
            Bullet::top("Future outlook and recommendations"),
            Bullet::top("Q&A and discussion"),
        ],
    );
}

/// A canned outline for when text generation is unavailable.
///
/// Deterministic for a given topic and detail level.
pub fn mock_outline(topic: &str, detail: DetailLevel) -> ParsedOutline {
    let topic = topic.trim();
    let title = if topic.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        topic.to_string()
    };
    let subject = title.as_str();
    let detailed = detail == DetailLevel::Detailed;

    let mut outline = Outline::new();
    let mut section = |name: String, points: Vec<(String, Vec<String>)>| {
        let mut bullets = Vec::new();
        for (point, subpoints) in points {
            bullets.push(Bullet::top(point));
            if detailed {
                bullets.extend(subpoints.into_iter().map(|s| Bullet::new(s, 1)));
            }
        }
        outline.insert(name, bullets);
    };

    section(
        INTRODUCTION.to_string(),
        vec![
            (
                format!("What {} is and why it matters", subject),
                vec![format!("A short definition of {}", subject)],
            ),
            (
                "Goals of this presentation".to_string(),
                vec!["What you will be able to explain afterwards".to_string()],
            ),
            ("Roadmap of the topics ahead".to_string(), vec![]),
        ],
    );
    section(
        "Key Concepts".to_string(),
        vec![
            (
                "Core principles".to_string(),
                vec!["The ideas everything else builds on".to_string()],
            ),
            (
                "Essential terminology".to_string(),
                vec!["Terms used throughout the field".to_string()],
            ),
            ("How the parts fit together".to_string(), vec![]),
        ],
    );
    section(
        "Applications".to_string(),
        vec![
            (
                format!("Where {} is used today", subject),
                vec!["Examples from industry and research".to_string()],
            ),
            ("Everyday examples".to_string(), vec![]),
            ("Benefits in practice".to_string(), vec![]),
        ],
    );
    section(
        "Challenges".to_string(),
        vec![
            (
                "Common limitations".to_string(),
                vec!["Where current approaches fall short".to_string()],
            ),
            ("Open questions".to_string(), vec![]),
            ("Risks to keep in mind".to_string(), vec![]),
        ],
    );
    if detailed {
        section(
            "Case Studies".to_string(),
            vec![
                (
                    format!("A successful {} project", subject),
                    vec!["What made it work".to_string()],
                ),
                (
                    "A cautionary example".to_string(),
                    vec!["What went wrong and why".to_string()],
                ),
                ("Lessons learned".to_string(), vec![]),
            ],
        );
        section(
            "Future Trends".to_string(),
            vec![
                ("Emerging research directions".to_string(), vec![]),
                (
                    format!("How {} may evolve", subject),
                    vec!["Developments to watch over the next years".to_string()],
                ),
                ("Skills that will matter".to_string(), vec![]),
            ],
        );
    }
    section(
        CONCLUSION.to_string(),
        vec![
            ("Summary of key points and takeaways".to_string(), vec![]),
            ("Future outlook and recommendations".to_string(), vec![]),
            ("Q&A and discussion".to_string(), vec![]),
        ],
    );

    ParsedOutline { title, outline }
}
