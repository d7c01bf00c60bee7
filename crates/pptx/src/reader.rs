//! PPTX reader used to inspect generated decks.

use deckgen_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::template::{PRESENTATION_PART, PRESENTATION_RELS_PART, REL_SLIDE};

/// Text and pictures found on one slide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlideSummary {
    /// 1-based position in the deck.
    pub number: usize,
    /// Non-empty paragraphs, in shape order.
    pub paragraphs: Vec<String>,
    /// Number of `p:pic` elements.
    pub pictures: usize,
}

impl SlideSummary {
    /// Whether any paragraph equals `text`.
    pub fn has_text(&self, text: &str) -> bool {
        self.paragraphs.iter().any(|p| p == text)
    }
}

/// Slides of a presentation package, in presentation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub slides: Vec<SlideSummary>,
}

impl DeckSummary {
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Reader for PPTX (Office Open XML) packages.
pub struct DeckReader;

impl DeckReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a `.pptx` file.
    pub fn open(&self, path: &Path) -> Result<DeckSummary> {
        let file = File::open(path)?;
        self.read(BufReader::new(file))
    }

    /// Read a package from any seekable reader.
    pub fn read<R: Read + Seek>(&self, reader: R) -> Result<DeckSummary> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let slide_order = self.get_slide_order(&mut archive)?;
        let mut summary = DeckSummary::default();
        for (idx, slide_path) in slide_order.iter().enumerate() {
            summary
                .slides
                .push(self.parse_slide(&mut archive, slide_path, idx + 1)?);
        }
        Ok(summary)
    }

    /// Slide part names in presentation order: `p:sldIdLst` resolved through
    /// the presentation relationships, else the relationships sorted by
    /// number.
    fn get_slide_order<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let rels_content = self.read_file_from_archive(archive, PRESENTATION_RELS_PART)?;
        let mut targets: HashMap<String, String> = HashMap::new();
        let mut slides: Vec<(String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let rel_type = attr_value(e, b"Type").unwrap_or_default();
                    let target = attr_value(e, b"Target").unwrap_or_default();
                    let id = attr_value(e, b"Id").unwrap_or_default();

                    if rel_type == REL_SLIDE {
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        let order_num = extract_slide_number(&target).or_else(|| extract_slide_number(&id));
                        slides.push((full_path.clone(), order_num));
                        targets.insert(id, full_path);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        let listed = self.listed_slide_ids(archive)?;
        if !listed.is_empty() {
            return listed
                .iter()
                .map(|rel_id| {
                    targets.get(rel_id).cloned().ok_or_else(|| {
                        Error::XmlError(format!("slide relationship {} not found", rel_id))
                    })
                })
                .collect();
        }

        slides.sort_by(|a, b| match (a.1, b.1) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.0.cmp(&b.0),
        });

        Ok(slides.into_iter().map(|(path, _)| path).collect())
    }

    /// Relationship ids of `p:sldId` entries, in order.
    fn listed_slide_ids<R: Read + Seek>(&self, archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let content = self.read_file_from_archive(archive, PRESENTATION_PART)?;
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);

        let mut ids = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    // r:id is namespaced; match on the local part
                    let rel_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| local_name(attr.key.as_ref()) == b"id" && attr.key.as_ref() != b"id")
                        .map(|attr| String::from_utf8_lossy(&attr.value).to_string());
                    if let Some(rel_id) = rel_id {
                        ids.push(rel_id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing presentation: {}", e)));
                }
                _ => {}
            }
        }
        Ok(ids)
    }

    /// Parse a single slide from the archive.
    fn parse_slide<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        slide_path: &str,
        slide_number: usize,
    ) -> Result<SlideSummary> {
        let content = self.read_file_from_archive(archive, slide_path)?;
        let mut slide = SlideSummary {
            number: slide_number,
            ..Default::default()
        };

        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);

        let mut in_text_body = false;
        let mut in_paragraph = false;
        let mut current_text = String::new();

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => match local_name(e.name().as_ref()) {
                    b"pic" => slide.pictures += 1,
                    b"txBody" => in_text_body = true,
                    b"p" if in_text_body => {
                        in_paragraph = true;
                        current_text.clear();
                    }
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if in_paragraph {
                        let text = e.unescape().unwrap_or_default();
                        current_text.push_str(&text);
                    }
                }
                Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                    b"txBody" => in_text_body = false,
                    b"p" if in_paragraph => {
                        in_paragraph = false;
                        let text = current_text.trim();
                        if !text.is_empty() {
                            slide.paragraphs.push(text.to_string());
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::warn!("XML parsing error in {} (continuing): {}", slide_path, e);
                }
                _ => {}
            }
        }

        Ok(slide)
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DeckReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Unescaped value of attribute `key` (matched on the full qualified name).
pub(crate) fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_slide_number() {
        assert_eq!(extract_slide_number("rId1"), Some(1));
        assert_eq!(extract_slide_number("rId12"), Some(12));
        assert_eq!(extract_slide_number("slides/slide1.xml"), Some(1));
        assert_eq!(extract_slide_number("slide123.xml"), Some(123));
        assert_eq!(extract_slide_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_attr_value_unescapes() {
        let xml = r#"<Relationship Id="rId1" Target="a&amp;b.xml"/>"#;
        let mut reader = Reader::from_str(xml);
        match reader.read_event().unwrap() {
            Event::Empty(e) => {
                assert_eq!(attr_value(&e, b"Target").as_deref(), Some("a&b.xml"));
                assert_eq!(attr_value(&e, b"Id").as_deref(), Some("rId1"));
                assert_eq!(attr_value(&e, b"Type"), None);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_not_a_package() {
        let err = DeckReader::new()
            .read(std::io::Cursor::new(b"plain text".to_vec()))
            .unwrap_err();
        assert!(matches!(err, Error::ZipError(_)));
    }
}
