//! Presentation templates: the built-in blank package or a theme `.pptx`
//! whose slides are discarded and whose masters, layouts and theme are
//! reused.

use crate::blank;
use crate::reader::{attr_value, local_name};
use deckgen_core::{Canvas, Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

pub(crate) const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub(crate) const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub(crate) const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";
const APP_PROPS_PART: &str = "docProps/app.xml";
const MEDIA_PREFIX: &str = "ppt/media/";

pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const TYPES_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Extension list entry holding PowerPoint 2010 sections, which reference
/// slide ids of the discarded slides.
const SECTION_EXT_URI: &str = "{521415D9-36F7-43E2-AB2F-B90AF26B5E84}";

const LAYOUT_PREFIX: &str = "ppt/slideLayouts/slideLayout";

/// Content type for a media file extension.
pub(crate) fn media_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpeg" | "jpg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// A package to build a deck on.
#[derive(Debug, Clone)]
pub struct Template {
    /// Parts copied into the output unchanged.
    parts: BTreeMap<String, Vec<u8>>,
    presentation: String,
    presentation_rels: String,
    content_types: String,
    layout_part: String,
    canvas: Canvas,
    source: Option<PathBuf>,
}

impl Template {
    /// The built-in blank 10"×7.5" template.
    pub fn blank() -> Self {
        let parts = blank::STATIC_PARTS
            .iter()
            .map(|(name, xml)| (name.to_string(), xml.as_bytes().to_vec()))
            .collect();
        Self {
            parts,
            presentation: blank::PRESENTATION.to_string(),
            presentation_rels: blank::PRESENTATION_RELS.to_string(),
            content_types: blank::CONTENT_TYPES.to_string(),
            layout_part: format!("{}1.xml", LAYOUT_PREFIX),
            canvas: Canvas::default(),
            source: None,
        }
    }

    /// Load a theme file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ThemeNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        let mut template = Self::from_reader(BufReader::new(file))?;
        template.source = Some(path.to_path_buf());
        Ok(template)
    }

    /// Load a theme package from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::InvalidTemplate(format!("not a ZIP package: {}", e)))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::InvalidTemplate(format!("unreadable entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            if is_discarded_part(&name) {
                log::debug!("Discarding template part {}", name);
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.insert(name, data);
        }

        let mut take_text = |name: &str| -> Result<String> {
            let data = parts
                .remove(name)
                .ok_or_else(|| Error::InvalidTemplate(format!("missing part {}", name)))?;
            String::from_utf8(data)
                .map_err(|e| Error::InvalidTemplate(format!("{} is not UTF-8: {}", name, e)))
        };
        let presentation = take_text(PRESENTATION_PART)?;
        let presentation_rels = take_text(PRESENTATION_RELS_PART)?;
        let content_types = take_text(CONTENT_TYPES_PART)?;

        drop_unreferenced_media(&mut parts, &presentation_rels);
        // slide counts and titles in the theme's app.xml describe its old slides
        if parts.contains_key(APP_PROPS_PART) {
            parts.insert(APP_PROPS_PART.to_string(), blank::APP_PROPS.as_bytes().to_vec());
        }

        let layout_part = choose_layout(&parts)?;
        let canvas = read_slide_size(&presentation)?.unwrap_or_default();
        log::debug!(
            "Template layout {} on a {}x{} EMU canvas",
            layout_part,
            canvas.width,
            canvas.height
        );

        Ok(Self {
            parts,
            presentation,
            presentation_rels,
            content_types,
            layout_part,
            canvas,
            source: None,
        })
    }

    /// Open `theme` if given, falling back to the blank template when it is
    /// missing or unusable.
    pub fn resolve(theme: Option<&Path>) -> Self {
        match theme {
            None => Self::blank(),
            Some(path) => match Self::open(path) {
                Ok(template) => {
                    log::info!("Using theme {}", path.display());
                    template
                }
                Err(e) => {
                    log::warn!("{}; using the blank template", e);
                    Self::blank()
                }
            },
        }
    }

    /// Whether this is the built-in blank template.
    pub fn is_blank(&self) -> bool {
        self.source.is_none()
    }

    /// The theme file this template was loaded from.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Slide size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Part name of the layout new slides are based on.
    pub fn layout_part(&self) -> &str {
        &self.layout_part
    }

    pub(crate) fn parts(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.parts.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub(crate) fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// `presentation.xml` with its slide list replaced by `slide_rel_ids`, in
    /// order. Custom shows and sections referring to the old slides are
    /// dropped.
    pub(crate) fn presentation_xml(&self, slide_rel_ids: &[String]) -> Result<String> {
        enum Action {
            Keep,
            Skip,
            SkipSubtree,
            InsertBefore,
        }

        let mut reader = Reader::from_str(&self.presentation);
        let mut writer = Writer::new(Vec::with_capacity(self.presentation.len() + 64 * slide_rel_ids.len()));
        let mut skip_depth = 0usize;
        let mut inserted = false;
        let mut prefix = String::from("p");

        loop {
            let event = reader
                .read_event()
                .map_err(|e| Error::XmlError(format!("presentation.xml: {}", e)))?;
            if let Event::Eof = event {
                break;
            }

            if skip_depth > 0 {
                match event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    _ => {}
                }
                continue;
            }

            let action = match &event {
                Event::Start(e) if is_slide_reference(e) => Action::SkipSubtree,
                Event::Empty(e) if is_slide_reference(e) => Action::Skip,
                Event::Start(e) | Event::Empty(e)
                    if !inserted && matches!(local_name(e.name().as_ref()), b"sldSz" | b"notesSz") =>
                {
                    prefix = element_prefix(e.name().as_ref()).unwrap_or("p").to_string();
                    Action::InsertBefore
                }
                Event::End(e) if !inserted && local_name(e.name().as_ref()) == b"presentation" => {
                    prefix = element_prefix(e.name().as_ref()).unwrap_or("p").to_string();
                    Action::InsertBefore
                }
                _ => Action::Keep,
            };

            match action {
                Action::Skip => continue,
                Action::SkipSubtree => {
                    skip_depth = 1;
                    continue;
                }
                Action::InsertBefore => {
                    let list = slide_id_list(&prefix, slide_rel_ids)?;
                    writer
                        .get_mut()
                        .extend_from_slice(list.as_bytes());
                    inserted = true;
                }
                Action::Keep => {}
            }
            writer
                .write_event(event)
                .map_err(|e| Error::XmlError(format!("presentation.xml: {}", e)))?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| Error::XmlError(format!("presentation.xml: {}", e)))
    }

    /// Presentation relationships with the old slide relationships removed
    /// and `slide_count` new ones appended. Returns the XML and the new
    /// relationship ids in slide order.
    pub(crate) fn presentation_rels_xml(&self, slide_count: usize) -> Result<(String, Vec<String>)> {
        let mut relationships = Vec::new();
        let mut reader = Reader::from_str(&self.presentation_rels);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let rel = Relationship {
                        id: attr_value(e, b"Id").unwrap_or_default(),
                        rel_type: attr_value(e, b"Type").unwrap_or_default(),
                        target: attr_value(e, b"Target").unwrap_or_default(),
                        target_mode: attr_value(e, b"TargetMode"),
                    };
                    if rel.rel_type == REL_SLIDE {
                        continue;
                    }
                    relationships.push(rel);
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!(
                        "Error parsing presentation relationships: {}",
                        e
                    )));
                }
                _ => {}
            }
        }

        let next = relationships
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let mut ids = Vec::with_capacity(slide_count);
        for i in 0..slide_count {
            let id = format!("rId{}", next + i);
            relationships.push(Relationship {
                id: id.clone(),
                rel_type: REL_SLIDE.to_string(),
                target: format!("slides/slide{}.xml", i + 1),
                target_mode: None,
            });
            ids.push(id);
        }

        Ok((relationships_xml(&relationships)?, ids))
    }

    /// Content types with slide overrides replaced and defaults added for
    /// every media extension in use.
    pub(crate) fn content_types_xml(&self, slide_count: usize, media_exts: &[&str]) -> Result<String> {
        let mut defaults: Vec<(String, String)> = Vec::new();
        let mut overrides: Vec<(String, String)> = Vec::new();

        let mut reader = Reader::from_str(&self.content_types);
        reader.trim_text(true);
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    match local_name(e.name().as_ref()) {
                        b"Default" => {
                            if let (Some(ext), Some(ct)) =
                                (attr_value(e, b"Extension"), attr_value(e, b"ContentType"))
                            {
                                defaults.push((ext, ct));
                            }
                        }
                        b"Override" => {
                            if let (Some(part), Some(ct)) =
                                (attr_value(e, b"PartName"), attr_value(e, b"ContentType"))
                            {
                                let name = part.trim_start_matches('/');
                                let dropped_media =
                                    name.starts_with(MEDIA_PREFIX) && !self.parts.contains_key(name);
                                if !is_discarded_part(name) && !dropped_media {
                                    overrides.push((part, ct));
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlError(format!("Error parsing content types: {}", e)));
                }
                _ => {}
            }
        }

        for ext in media_exts {
            if !defaults.iter().any(|(e, _)| e.eq_ignore_ascii_case(ext)) {
                defaults.push((ext.to_string(), media_content_type(ext).to_string()));
            }
        }
        for i in 0..slide_count {
            overrides.push((format!("/ppt/slides/slide{}.xml", i + 1), CT_SLIDE.to_string()));
        }

        let mut xml = String::with_capacity(self.content_types.len() + 128 * slide_count);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
        write!(xml, r#"<Types xmlns="{}">"#, TYPES_NAMESPACE).map_err(fmt_err)?;
        for (ext, ct) in &defaults {
            write!(
                xml,
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape(ext.as_str()),
                escape(ct.as_str())
            )
            .map_err(fmt_err)?;
        }
        for (part, ct) in &overrides {
            write!(
                xml,
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape(part.as_str()),
                escape(ct.as_str())
            )
            .map_err(fmt_err)?;
        }
        xml.push_str("</Types>");
        Ok(xml)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self::blank()
    }
}

/// One package relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub target_mode: Option<String>,
}

fn fmt_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// Serialize a relationships part.
pub(crate) fn relationships_xml(relationships: &[Relationship]) -> Result<String> {
    let mut xml = String::with_capacity(128 + 160 * relationships.len());
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    write!(xml, r#"<Relationships xmlns="{}">"#, RELS_NAMESPACE).map_err(fmt_err)?;
    for rel in relationships {
        write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}""#,
            escape(rel.id.as_str()),
            escape(rel.rel_type.as_str()),
            escape(rel.target.as_str())
        )
        .map_err(fmt_err)?;
        if let Some(mode) = &rel.target_mode {
            write!(xml, r#" TargetMode="{}""#, escape(mode.as_str())).map_err(fmt_err)?;
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    Ok(xml)
}

fn slide_id_list(prefix: &str, slide_rel_ids: &[String]) -> Result<String> {
    let mut xml = String::with_capacity(32 + 48 * slide_rel_ids.len());
    write!(xml, "<{}:sldIdLst>", prefix).map_err(fmt_err)?;
    for (i, rel_id) in slide_rel_ids.iter().enumerate() {
        write!(xml, r#"<{}:sldId id="{}" r:id="{}"/>"#, prefix, 256 + i, rel_id).map_err(fmt_err)?;
    }
    write!(xml, "</{}:sldIdLst>", prefix).map_err(fmt_err)?;
    Ok(xml)
}

/// Elements of `presentation.xml` that point at the old slides.
fn is_slide_reference(e: &BytesStart) -> bool {
    match local_name(e.name().as_ref()) {
        b"sldIdLst" | b"custShowLst" => true,
        b"ext" => attr_value(e, b"uri").as_deref() == Some(SECTION_EXT_URI),
        _ => false,
    }
}

fn element_prefix(name: &[u8]) -> Option<&str> {
    let pos = name.iter().position(|&b| b == b':')?;
    std::str::from_utf8(&name[..pos]).ok()
}

/// Slides and notes slides are not carried over from a theme.
fn is_discarded_part(name: &str) -> bool {
    name.starts_with("ppt/slides/") || name.starts_with("ppt/notesSlides/")
}

/// Remove media parts that no kept relationship points at, such as pictures
/// used only by the discarded slides.
fn drop_unreferenced_media(parts: &mut BTreeMap<String, Vec<u8>>, presentation_rels: &str) {
    let mut used: BTreeSet<String> = parts
        .iter()
        .filter(|(name, _)| name.ends_with(".rels"))
        .filter_map(|(name, data)| Some(relationship_targets(name, std::str::from_utf8(data).ok()?)))
        .flatten()
        .collect();
    used.extend(relationship_targets(PRESENTATION_RELS_PART, presentation_rels));

    parts.retain(|name, _| {
        let keep = !name.starts_with(MEDIA_PREFIX) || used.contains(name);
        if !keep {
            log::debug!("Discarding unreferenced template media {}", name);
        }
        keep
    });
}

/// Part names targeted by the internal relationships in `rels_part`.
fn relationship_targets(rels_part: &str, xml: &str) -> Vec<String> {
    let mut targets = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                if attr_value(e, b"TargetMode").as_deref() == Some("External") {
                    continue;
                }
                if let Some(target) = attr_value(e, b"Target") {
                    targets.push(resolve_target(rels_part, &target));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Unreadable relationships in {}: {}", rels_part, e);
                break;
            }
            _ => {}
        }
    }
    targets
}

/// Resolve a relationship target against the part owning `rels_part`.
fn resolve_target(rels_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let rels_dir = rels_part.rsplit_once('/').map_or("", |(dir, _)| dir);
    let base = rels_dir.strip_suffix("_rels").unwrap_or(rels_dir);

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// The layout named "Blank" if there is one, else the lowest-numbered.
fn choose_layout(parts: &BTreeMap<String, Vec<u8>>) -> Result<String> {
    let mut layouts: Vec<(usize, &str, Option<String>)> = parts
        .iter()
        .filter_map(|(name, data)| {
            let number = name
                .strip_prefix(LAYOUT_PREFIX)?
                .strip_suffix(".xml")?
                .parse::<usize>()
                .ok()?;
            Some((number, name.as_str(), layout_name(data)))
        })
        .collect();
    layouts.sort_by_key(|(number, _, _)| *number);

    let chosen = layouts
        .iter()
        .find(|(_, _, name)| {
            name.as_deref()
                .is_some_and(|n| n.trim().eq_ignore_ascii_case("blank"))
        })
        .or_else(|| layouts.first())
        .ok_or_else(|| Error::InvalidTemplate("no slide layouts".into()))?;

    Ok(chosen.1.to_string())
}

/// The `name` of a layout's `p:cSld`.
fn layout_name(data: &[u8]) -> Option<String> {
    let xml = std::str::from_utf8(data).ok()?;
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"cSld" =>
            {
                return attr_value(e, b"name");
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// `p:sldSz` of a presentation part.
fn read_slide_size(presentation: &str) -> Result<Option<Canvas>> {
    let mut reader = Reader::from_str(presentation);
    reader.trim_text(true);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if local_name(e.name().as_ref()) == b"sldSz" =>
            {
                let cx = attr_value(e, b"cx").and_then(|v| v.parse::<i64>().ok());
                let cy = attr_value(e, b"cy").and_then(|v| v.parse::<i64>().ok());
                return Ok(match (cx, cy) {
                    (Some(w), Some(h)) if w > 0 && h > 0 => Some(Canvas::new(w, h)),
                    _ => None,
                });
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => {
                return Err(Error::InvalidTemplate(format!("presentation.xml: {}", e)));
            }
            _ => {}
        }
    }
}

/// Names of the `.pptx` themes in `dir`, sorted. A missing folder has no
/// themes.
pub fn list_themes(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut themes = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pptx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pptx"));
        if !is_pptx {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            themes.push(stem.to_string());
        }
    }
    themes.sort();
    Ok(themes)
}

/// Path of theme `name` in `dir`.
pub fn theme_path(dir: &Path, name: &str) -> PathBuf {
    if name.to_ascii_lowercase().ends_with(".pptx") {
        dir.join(name)
    } else {
        dir.join(format!("{}.pptx", name))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// A theme built from the blank parts, with `extra` added or replacing
    /// parts of the same name.
    pub(crate) fn theme_package(extra: &[(&str, &str)], presentation: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        let blank = Template::blank();
        for (name, data) in blank.parts() {
            if extra.iter().any(|(n, _)| *n == name) {
                continue;
            }
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.start_file(CONTENT_TYPES_PART, options).unwrap();
        zip.write_all(blank::CONTENT_TYPES.as_bytes()).unwrap();
        zip.start_file(PRESENTATION_RELS_PART, options).unwrap();
        zip.write_all(blank::PRESENTATION_RELS.as_bytes()).unwrap();
        zip.start_file(PRESENTATION_PART, options).unwrap();
        zip.write_all(presentation.as_bytes()).unwrap();
        for (name, data) in extra {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_blank_template() {
        let template = Template::blank();
        assert!(template.is_blank());
        assert_eq!(template.canvas(), Canvas::default());
        assert_eq!(template.layout_part(), "ppt/slideLayouts/slideLayout1.xml");
        assert!(template.has_part("ppt/theme/theme1.xml"));
    }

    #[test]
    fn test_presentation_slide_list_rewritten() {
        let template = Template::blank();
        let xml = template
            .presentation_xml(&["rId6".to_string(), "rId7".to_string()])
            .unwrap();

        assert!(xml.contains(r#"<p:sldIdLst><p:sldId id="256" r:id="rId6"/><p:sldId id="257" r:id="rId7"/></p:sldIdLst><p:sldSz"#));
        assert_eq!(xml.matches("sldIdLst>").count(), 2);
        assert!(!xml.contains("<p:sldIdLst/>"));
    }

    #[test]
    fn test_old_slides_and_sections_dropped() {
        let presentation = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId9"/></p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/><p:custShowLst><p:custShow name="x" id="0"><p:sldLst><p:sld r:id="rId9"/></p:sldLst></p:custShow></p:custShowLst><p:extLst><p:ext uri="{521415D9-36F7-43E2-AB2F-B90AF26B5E84}"><p14:sectionLst xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main"><p14:section name="A" id="{1}"><p14:sldIdLst><p14:sldId id="256"/></p14:sldIdLst></p14:section></p14:sectionLst></p:ext></p:extLst></p:presentation>"#;
        let bytes = theme_package(
            &[
                ("ppt/slides/slide1.xml", "<p:sld/>"),
                ("ppt/slides/_rels/slide1.xml.rels", "<Relationships/>"),
                ("ppt/notesSlides/notesSlide1.xml", "<p:notes/>"),
            ],
            presentation,
        );
        let template = Template::from_reader(Cursor::new(bytes)).unwrap();

        assert!(!template.has_part("ppt/slides/slide1.xml"));
        assert!(!template.has_part("ppt/notesSlides/notesSlide1.xml"));
        assert_eq!(template.canvas(), Canvas::new(12_192_000, 6_858_000));

        let xml = template.presentation_xml(&["rId6".to_string()]).unwrap();
        assert!(!xml.contains("rId9"));
        assert!(!xml.contains("custShowLst"));
        assert!(!xml.contains("sectionLst"));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId6"/>"#));
        assert!(xml.contains("<p:extLst></p:extLst>"));
    }

    #[test]
    fn test_media_of_discarded_slides_dropped() {
        let layout_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/logo.png"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a.png" TargetMode="External"/></Relationships>"#;
        let slide_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image9.png"/></Relationships>"#;
        let bytes = theme_package(
            &[
                ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", layout_rels),
                ("ppt/slides/slide1.xml", "<p:sld/>"),
                ("ppt/slides/_rels/slide1.xml.rels", slide_rels),
                ("ppt/media/logo.png", "logo"),
                ("ppt/media/image9.png", "photo"),
            ],
            blank::PRESENTATION,
        );
        let template = Template::from_reader(Cursor::new(bytes)).unwrap();

        assert!(template.has_part("ppt/media/logo.png"));
        assert!(!template.has_part("ppt/media/image9.png"));
        assert!(template.has_part("ppt/slideLayouts/_rels/slideLayout1.xml.rels"));
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/slideLayouts/_rels/slideLayout1.xml.rels", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(resolve_target(PRESENTATION_RELS_PART, "media/a.gif"), "ppt/media/a.gif");
        assert_eq!(resolve_target("_rels/.rels", "docProps/app.xml"), "docProps/app.xml");
        assert_eq!(
            resolve_target("ppt/slides/_rels/slide1.xml.rels", "/ppt/media/b.png"),
            "ppt/media/b.png"
        );
    }

    #[test]
    fn test_theme_app_properties_replaced() {
        let app = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Slides>12</Slides><TitlesOfParts>Quarterly Results</TitlesOfParts></Properties>"#;
        let bytes = theme_package(&[("docProps/app.xml", app)], blank::PRESENTATION);
        let template = Template::from_reader(Cursor::new(bytes)).unwrap();

        let (_, data) = template
            .parts()
            .find(|(name, _)| *name == "docProps/app.xml")
            .unwrap();
        let xml = std::str::from_utf8(data).unwrap();
        assert_eq!(xml, blank::APP_PROPS);
        assert!(!xml.contains("Quarterly Results"));
    }

    #[test]
    fn test_presentation_rels_renumbered() {
        let template = Template::blank();
        let (xml, ids) = template.presentation_rels_xml(3).unwrap();
        assert_eq!(ids, vec!["rId6", "rId7", "rId8"]);
        assert!(xml.contains(r#"Target="slides/slide3.xml""#));
        assert!(xml.contains(r#"Target="slideMasters/slideMaster1.xml""#));
    }

    #[test]
    fn test_content_types() {
        let template = Template::blank();
        let xml = template.content_types_xml(2, &["png", "jpeg"]).unwrap();
        assert!(xml.contains(r#"<Default Extension="png" ContentType="image/png"/>"#));
        assert!(xml.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
        assert!(xml.contains(r#"PartName="/ppt/slides/slide2.xml""#));
        assert!(!xml.contains("slide3.xml"));
    }

    #[test]
    fn test_blank_layout_preferred() {
        let title_layout = r#"<p:sldLayout xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld name="Title Slide"/></p:sldLayout>"#;
        let blank_layout = r#"<p:sldLayout xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld name="Blank"/></p:sldLayout>"#;

        let mut parts = BTreeMap::new();
        parts.insert(format!("{}2.xml", LAYOUT_PREFIX), title_layout.as_bytes().to_vec());
        parts.insert(format!("{}11.xml", LAYOUT_PREFIX), title_layout.as_bytes().to_vec());
        assert_eq!(choose_layout(&parts).unwrap(), "ppt/slideLayouts/slideLayout2.xml");

        parts.insert(format!("{}7.xml", LAYOUT_PREFIX), blank_layout.as_bytes().to_vec());
        assert_eq!(choose_layout(&parts).unwrap(), "ppt/slideLayouts/slideLayout7.xml");

        assert!(choose_layout(&BTreeMap::new()).is_err());
    }

    #[test]
    fn test_missing_theme_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.pptx");
        assert!(matches!(Template::open(&missing), Err(Error::ThemeNotFound(_))));
        assert!(Template::resolve(Some(&missing)).is_blank());

        let junk = dir.path().join("junk.pptx");
        std::fs::write(&junk, b"not a zip").unwrap();
        assert!(matches!(Template::open(&junk), Err(Error::InvalidTemplate(_))));
        assert!(Template::resolve(Some(&junk)).is_blank());
    }

    #[test]
    fn test_list_themes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Ocean.pptx"), b"").unwrap();
        std::fs::write(dir.path().join("Aurora.PPTX"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        assert_eq!(list_themes(dir.path()).unwrap(), vec!["Aurora", "Ocean"]);
        assert!(list_themes(&dir.path().join("absent")).unwrap().is_empty());
        assert_eq!(theme_path(dir.path(), "Ocean"), dir.path().join("Ocean.pptx"));
        assert_eq!(theme_path(dir.path(), "Ocean.pptx"), dir.path().join("Ocean.pptx"));
    }
}
