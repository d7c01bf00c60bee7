//! Domain types for representing a generated outline and its slides.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Deepest indent level a bullet may carry.
pub const MAX_BULLET_LEVEL: u8 = 4;

/// One line of slide content with its rendering indent depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    /// The cleaned text.
    pub text: String,

    /// Indent depth, `0..=MAX_BULLET_LEVEL`.
    pub level: u8,
}

impl Bullet {
    /// Create a bullet, clamping the level into the legal range.
    pub fn new(text: impl Into<String>, level: usize) -> Self {
        Self {
            text: text.into(),
            level: level.min(MAX_BULLET_LEVEL as usize) as u8,
        }
    }

    /// Create a top-level bullet.
    pub fn top(text: impl Into<String>) -> Self {
        Self::new(text, 0)
    }
}

/// Ordered mapping from section title to its bullets.
///
/// Keys are unique and keep their insertion order; order is rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outline {
    sections: Vec<(String, Vec<Bullet>)>,
}

impl Outline {
    /// Create an empty outline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the outline has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Insert a section. An existing key keeps its position and has its
    /// bullets replaced.
    pub fn insert(&mut self, title: impl Into<String>, bullets: Vec<Bullet>) {
        let title = title.into();
        match self.position(&title) {
            Some(idx) => self.sections[idx].1 = bullets,
            None => self.sections.push((title, bullets)),
        }
    }

    /// Open a section, creating it empty if it does not exist yet.
    pub fn open(&mut self, title: &str) {
        if !self.contains(title) {
            self.sections.push((title.to_string(), Vec::new()));
        }
    }

    /// Append a bullet to an existing section. Returns false if the section
    /// does not exist.
    pub fn push_bullet(&mut self, title: &str, bullet: Bullet) -> bool {
        match self.position(title) {
            Some(idx) => {
                self.sections[idx].1.push(bullet);
                true
            }
            None => false,
        }
    }

    /// Bullets of a section.
    pub fn get(&self, title: &str) -> Option<&[Bullet]> {
        self.position(title).map(|idx| self.sections[idx].1.as_slice())
    }

    /// Whether a section with this exact title exists.
    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    /// Section titles in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(k, _)| k.as_str())
    }

    /// Sections in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Bullet])> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// First section title.
    pub fn first_key(&self) -> Option<&str> {
        self.sections.first().map(|(k, _)| k.as_str())
    }

    /// Last section title.
    pub fn last_key(&self) -> Option<&str> {
        self.sections.last().map(|(k, _)| k.as_str())
    }

    /// Rename a section in place. Fails (returns false) if `from` is missing
    /// or `to` is already taken by another section.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.contains(from);
        }
        if self.contains(to) {
            return false;
        }
        match self.position(from) {
            Some(idx) => {
                self.sections[idx].0 = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Move a section to the front, preserving the relative order of the rest.
    pub fn move_to_front(&mut self, title: &str) -> bool {
        match self.position(title) {
            Some(idx) => {
                let section = self.sections.remove(idx);
                self.sections.insert(0, section);
                true
            }
            None => false,
        }
    }

    /// Move a section to the back, preserving the relative order of the rest.
    pub fn move_to_back(&mut self, title: &str) -> bool {
        match self.position(title) {
            Some(idx) => {
                let section = self.sections.remove(idx);
                self.sections.push(section);
                true
            }
            None => false,
        }
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.sections.iter().position(|(k, _)| k == title)
    }
}

impl Serialize for Outline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (title, bullets) in &self.sections {
            map.serialize_entry(title, bullets)?;
        }
        map.end()
    }
}

/// How much content the generated deck should carry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Fewer sections, short bullet lists.
    #[default]
    Simple,
    /// More sections, longer bullet lists with sub-points.
    Detailed,
}

impl DetailLevel {
    /// Lowercase name as used on the command line and in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "detailed" => Ok(Self::Detailed),
            other => Err(format!(
                "unknown detail level '{}' (expected 'simple' or 'detailed')",
                other
            )),
        }
    }
}

/// The closed set of slide visual templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideLayout {
    Title,
    TitleContent,
    TwoColumn,
    ImageLeftTextRight,
    ImageRightTextLeft,
    Conclusion,
}

impl SlideLayout {
    /// Every layout variant.
    pub const ALL: [SlideLayout; 6] = [
        Self::Title,
        Self::TitleContent,
        Self::TwoColumn,
        Self::ImageLeftTextRight,
        Self::ImageRightTextLeft,
        Self::Conclusion,
    ];

    /// Whether this layout needs a downloaded picture.
    pub fn needs_image(&self) -> bool {
        matches!(self, Self::ImageLeftTextRight | Self::ImageRightTextLeft)
    }

    /// Whether this layout is one of the text-heavy variants.
    pub fn is_text_heavy(&self) -> bool {
        matches!(self, Self::TitleContent | Self::TwoColumn)
    }

    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::TitleContent => "title_content",
            Self::TwoColumn => "two_column",
            Self::ImageLeftTextRight => "image_left_text_right",
            Self::ImageRightTextLeft => "image_right_text_left",
            Self::Conclusion => "conclusion",
        }
    }
}

impl fmt::Display for SlideLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Outline {
        let mut outline = Outline::new();
        outline.insert("Alpha", vec![Bullet::top("a")]);
        outline.insert("Beta", vec![]);
        outline.insert("Gamma", vec![Bullet::new("g", 1)]);
        outline
    }

    #[test]
    fn test_bullet_level_clamped() {
        assert_eq!(Bullet::new("deep", 42).level, MAX_BULLET_LEVEL);
        assert_eq!(Bullet::new("flat", 0).level, 0);
    }

    #[test]
    fn test_insert_keeps_order_and_position() {
        let mut outline = sample();
        outline.insert("Alpha", vec![Bullet::top("replaced")]);
        let keys: Vec<_> = outline.keys().collect();
        assert_eq!(keys, vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(outline.get("Alpha").unwrap()[0].text, "replaced");
    }

    #[test]
    fn test_push_bullet_requires_section() {
        let mut outline = sample();
        assert!(outline.push_bullet("Beta", Bullet::top("b")));
        assert!(!outline.push_bullet("Delta", Bullet::top("d")));
        assert_eq!(outline.get("Beta").unwrap().len(), 1);
    }

    #[test]
    fn test_rename_refuses_collision() {
        let mut outline = sample();
        assert!(!outline.rename("Alpha", "Beta"));
        assert!(outline.rename("Alpha", "First"));
        assert_eq!(outline.first_key(), Some("First"));
        assert!(!outline.rename("Missing", "Other"));
    }

    #[test]
    fn test_move_to_front_and_back() {
        let mut outline = sample();
        assert!(outline.move_to_front("Gamma"));
        let keys: Vec<_> = outline.keys().collect();
        assert_eq!(keys, vec!["Gamma", "Alpha", "Beta"]);

        assert!(outline.move_to_back("Gamma"));
        assert_eq!(outline.last_key(), Some("Gamma"));
        assert!(!outline.move_to_back("Missing"));
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"Alpha":[{"text":"a","level":0}],"Beta":[],"Gamma":[{"text":"g","level":1}]}"#
        );
    }

    #[test]
    fn test_detail_level_from_str() {
        assert_eq!("Simple".parse::<DetailLevel>(), Ok(DetailLevel::Simple));
        assert_eq!(" detailed ".parse::<DetailLevel>(), Ok(DetailLevel::Detailed));
        assert!("verbose".parse::<DetailLevel>().is_err());
        assert_eq!(DetailLevel::Detailed.to_string(), "detailed");
    }

    #[test]
    fn test_layout_classification() {
        let image_layouts: Vec<_> = SlideLayout::ALL.iter().filter(|l| l.needs_image()).collect();
        assert_eq!(image_layouts.len(), 2);
        assert!(SlideLayout::TwoColumn.is_text_heavy());
        assert!(!SlideLayout::Conclusion.is_text_heavy());
        assert_eq!(SlideLayout::ImageRightTextLeft.to_string(), "image_right_text_left");
    }
}
