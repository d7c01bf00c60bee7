//! Deck assembly and package writing.

use crate::shapes::{AutoShape, MediaId, Picture, Shape, TextBox};
use crate::template::{
    media_content_type, relationships_xml, Relationship, Template, CONTENT_TYPES_PART,
    PRESENTATION_PART, PRESENTATION_RELS_PART, REL_IMAGE, REL_SLIDE_LAYOUT,
};
use deckgen_core::{Canvas, Error, Result, Rgb};
use image::{ImageFormat, ImageReader};
use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One slide under construction. Shapes are drawn in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slide {
    background: Option<Rgb>,
    shapes: Vec<Shape>,
}

impl Slide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the slide background with a solid colour instead of inheriting
    /// the master background.
    pub fn set_background(&mut self, color: Rgb) -> &mut Self {
        self.background = Some(color);
        self
    }

    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    pub fn add_text_box(&mut self, text_box: TextBox) -> &mut Self {
        self.shapes.push(Shape::Text(text_box));
        self
    }

    pub fn add_shape(&mut self, shape: AutoShape) -> &mut Self {
        self.shapes.push(Shape::Auto(shape));
        self
    }

    pub fn add_picture(&mut self, picture: Picture) -> &mut Self {
        self.shapes.push(Shape::Picture(picture));
        self
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Number of pictures on the slide.
    pub fn picture_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| matches!(s, Shape::Picture(_)))
            .count()
    }

    /// Generate the slide part, resolving pictures through `media_rel`.
    fn to_xml(&self, media_rel: &dyn Fn(MediaId) -> Option<String>) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
        xml.push_str("<p:cSld>");

        if let Some(color) = self.background {
            write!(
                xml,
                r#"<p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg>"#,
                color.to_hex()
            )
            .map_err(|e| Error::XmlError(e.to_string()))?;
        }

        xml.push_str("<p:spTree>");
        xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
        xml.push_str(r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#);

        for (i, shape) in self.shapes.iter().enumerate() {
            let rel_id = match shape {
                Shape::Picture(picture) => media_rel(picture.media),
                _ => None,
            };
            shape.to_xml(i as u32 + 2, &mut xml, rel_id.as_deref())?;
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");
        Ok(xml)
    }
}

/// An image stored in the deck, with its pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub media: MediaId,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
struct Media {
    part: String,
    ext: &'static str,
    data: Vec<u8>,
}

/// A presentation being generated on top of a template.
#[derive(Debug)]
pub struct Deck {
    template: Template,
    slides: Vec<Slide>,
    media: Vec<Media>,
    /// Last number used for a generated media part name. Only grows.
    media_seq: usize,
}

impl Deck {
    pub fn new(template: Template) -> Self {
        Self {
            template,
            slides: Vec::new(),
            media: Vec::new(),
            media_seq: 0,
        }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn canvas(&self) -> Canvas {
        self.template.canvas()
    }

    /// Append a slide; slides are saved in the order they were added.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Store image bytes as a media part.
    ///
    /// PNG, JPEG and GIF are stored as they are; any other decodable format
    /// is converted to PNG.
    pub fn embed_image(&mut self, data: Vec<u8>) -> Result<EmbeddedImage> {
        let format = image::guess_format(&data)
            .map_err(|e| Error::ImageError(format!("unrecognised image data: {}", e)))?;
        let (width, height) = ImageReader::with_format(Cursor::new(&data), format)
            .into_dimensions()
            .map_err(|e| Error::ImageError(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(Error::ImageError("image has no pixels".into()));
        }

        let (ext, data) = match format {
            ImageFormat::Png => ("png", data),
            ImageFormat::Jpeg => ("jpeg", data),
            ImageFormat::Gif => ("gif", data),
            other => {
                log::debug!("Converting {:?} image to PNG", other);
                let decoded = image::load_from_memory_with_format(&data, other)
                    .map_err(|e| Error::ImageError(e.to_string()))?;
                let mut png = Cursor::new(Vec::new());
                decoded
                    .write_to(&mut png, ImageFormat::Png)
                    .map_err(|e| Error::ImageError(e.to_string()))?;
                ("png", png.into_inner())
            }
        };

        let part = self.next_media_part(ext);
        let media = MediaId(self.media.len());
        self.media.push(Media { part, ext, data });
        Ok(EmbeddedImage {
            media,
            width,
            height,
        })
    }

    /// A media part name used neither by the template nor by this deck.
    fn next_media_part(&mut self, ext: &str) -> String {
        loop {
            self.media_seq += 1;
            let part = format!("ppt/media/generated{}.{}", self.media_seq, ext);
            let taken = self.template.has_part(&part) || self.media.iter().any(|m| m.part == part);
            if !taken {
                return part;
            }
        }
    }

    /// Store an image file as a media part.
    pub fn embed_image_file(&mut self, path: &Path) -> Result<EmbeddedImage> {
        let data = std::fs::read(path)?;
        self.embed_image(data)
    }

    /// Write the package to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::info!("Saved {} slides to {}", self.slides.len(), path.display());
        Ok(())
    }

    /// Write the package to any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let (presentation_rels, slide_rel_ids) =
            self.template.presentation_rels_xml(self.slides.len())?;
        let exts: BTreeSet<&str> = self.media.iter().map(|m| m.ext).collect();
        let exts: Vec<&str> = exts.into_iter().collect();

        let content_types = self.template.content_types_xml(self.slides.len(), &exts)?;
        let presentation = self.template.presentation_xml(&slide_rel_ids)?;

        write_part(&mut zip, options, CONTENT_TYPES_PART, content_types.as_bytes())?;
        write_part(&mut zip, options, PRESENTATION_PART, presentation.as_bytes())?;
        write_part(&mut zip, options, PRESENTATION_RELS_PART, presentation_rels.as_bytes())?;

        for (name, data) in self.template.parts() {
            write_part(&mut zip, options, name, data)?;
        }

        let layout_target = format!(
            "../{}",
            self.template
                .layout_part()
                .strip_prefix("ppt/")
                .unwrap_or(self.template.layout_part())
        );

        for (i, slide) in self.slides.iter().enumerate() {
            let number = i + 1;
            let mut relationships = vec![Relationship {
                id: "rId1".to_string(),
                rel_type: REL_SLIDE_LAYOUT.to_string(),
                target: layout_target.clone(),
                target_mode: None,
            }];

            let mut media_rels: Vec<(MediaId, String)> = Vec::new();
            for shape in slide.shapes() {
                if let Shape::Picture(picture) = shape {
                    if media_rels.iter().any(|(id, _)| *id == picture.media) {
                        continue;
                    }
                    let media = self.media.get(picture.media.0).ok_or_else(|| {
                        Error::Render(format!("slide {} refers to unknown media", number))
                    })?;
                    let rel_id = format!("rId{}", relationships.len() + 1);
                    relationships.push(Relationship {
                        id: rel_id.clone(),
                        rel_type: REL_IMAGE.to_string(),
                        target: format!("../{}", media.part.trim_start_matches("ppt/")),
                        target_mode: None,
                    });
                    media_rels.push((picture.media, rel_id));
                }
            }

            let lookup = |id: MediaId| {
                media_rels
                    .iter()
                    .find(|(media, _)| *media == id)
                    .map(|(_, rel)| rel.clone())
            };
            let slide_xml = slide.to_xml(&lookup)?;

            write_part(
                &mut zip,
                options,
                &format!("ppt/slides/slide{}.xml", number),
                slide_xml.as_bytes(),
            )?;
            write_part(
                &mut zip,
                options,
                &format!("ppt/slides/_rels/slide{}.xml.rels", number),
                relationships_xml(&relationships)?.as_bytes(),
            )?;
        }

        for media in &self.media {
            log::debug!(
                "Writing {} ({}, {} bytes)",
                media.part,
                media_content_type(media.ext),
                media.data.len()
            );
            write_part(&mut zip, options, &media.part, &media.data)?;
        }

        zip.finish()
            .map_err(|e| Error::ZipError(format!("Failed to finish package: {}", e)))?;
        Ok(())
    }
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: FileOptions,
    name: &str,
    data: &[u8],
) -> Result<()> {
    zip.start_file(name, options)
        .map_err(|e| Error::ZipError(format!("Failed to add '{}': {}", name, e)))?;
    zip.write_all(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blank;
    use crate::reader::DeckReader;
    use crate::shapes::Paragraph;
    use crate::template::tests::theme_package;
    use deckgen_core::Rect;
    use image::{DynamicImage, RgbImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_embed_png_keeps_bytes() {
        let mut deck = Deck::new(Template::blank());
        let png = encoded(40, 20, ImageFormat::Png);
        let embedded = deck.embed_image(png.clone()).unwrap();

        assert_eq!((embedded.width, embedded.height), (40, 20));
        assert_eq!(deck.media[0].ext, "png");
        assert_eq!(deck.media[0].data, png);
        assert_eq!(deck.media[0].part, "ppt/media/generated1.png");
    }

    #[test]
    fn test_embed_rejects_garbage() {
        let mut deck = Deck::new(Template::blank());
        let err = deck.embed_image(b"<html>not found</html>".to_vec()).unwrap_err();
        assert!(matches!(err, Error::ImageError(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_save_and_read_back() {
        let mut deck = Deck::new(Template::blank());
        let image = deck.embed_image(encoded(8, 8, ImageFormat::Png)).unwrap();

        let mut first = Slide::new();
        first
            .set_background(Rgb(0x2c, 0x3e, 0x50))
            .add_text_box(TextBox::new(Rect::new(0, 0, 100, 100)).with_paragraph(Paragraph::new("First")));
        deck.add_slide(first);

        let mut second = Slide::new();
        second
            .add_picture(Picture::new(image.media, Rect::new(0, 0, 50, 50)))
            .add_text_box(TextBox::new(Rect::new(0, 0, 100, 100)).with_paragraph(Paragraph::new("Second")));
        deck.add_slide(second);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pptx");
        deck.save(&path).unwrap();

        let summary = DeckReader::new().open(&path).unwrap();
        assert_eq!(summary.slide_count(), 2);
        assert!(summary.slides[0].has_text("First"));
        assert_eq!(summary.slides[0].pictures, 0);
        assert!(summary.slides[1].has_text("Second"));
        assert_eq!(summary.slides[1].pictures, 1);
    }

    #[test]
    fn test_saved_package_reopens_as_template() {
        let mut deck = Deck::new(Template::blank());
        deck.add_slide(Slide::new());
        let mut buffer = Cursor::new(Vec::new());
        deck.write_to(&mut buffer).unwrap();

        buffer.set_position(0);
        let template = Template::from_reader(buffer).unwrap();
        assert!(!template.has_part("ppt/slides/slide1.xml"));
        assert_eq!(template.layout_part(), "ppt/slideLayouts/slideLayout1.xml");
        assert_eq!(template.canvas(), Canvas::default());
    }

    fn media_parts(package: Vec<u8>) -> Vec<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(package)).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .filter(|name| name.starts_with("ppt/media/"))
            .collect()
    }

    #[test]
    fn test_media_names_skip_template_parts() {
        let layout_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/generated1.png"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/generated3.png"/></Relationships>"#;
        let theme = theme_package(
            &[
                ("ppt/slideLayouts/_rels/slideLayout1.xml.rels", layout_rels),
                ("ppt/media/generated1.png", "logo"),
                ("ppt/media/generated3.png", "badge"),
            ],
            blank::PRESENTATION,
        );
        let mut deck = Deck::new(Template::from_reader(Cursor::new(theme)).unwrap());

        let mut slide = Slide::new();
        for _ in 0..3 {
            let image = deck.embed_image(encoded(4, 4, ImageFormat::Png)).unwrap();
            slide.add_picture(Picture::new(image.media, Rect::new(0, 0, 10, 10)));
        }
        deck.add_slide(slide);

        let names: Vec<&str> = deck.media.iter().map(|m| m.part.as_str()).collect();
        assert_eq!(
            names,
            vec!["ppt/media/generated2.png", "ppt/media/generated4.png", "ppt/media/generated5.png"]
        );

        let mut buffer = Cursor::new(Vec::new());
        deck.write_to(&mut buffer).unwrap();
        let package = buffer.into_inner();
        let parts = media_parts(package.clone());
        assert_eq!(parts.len(), 5);
        assert_eq!(parts.iter().collect::<BTreeSet<_>>().len(), 5);

        let summary = DeckReader::new().read(Cursor::new(package)).unwrap();
        assert_eq!(summary.slides[0].pictures, 3);
    }

    #[test]
    fn test_saved_deck_reused_as_theme() {
        let mut first = Deck::new(Template::blank());
        let mut slide = Slide::new();
        for _ in 0..3 {
            let image = first.embed_image(encoded(4, 4, ImageFormat::Png)).unwrap();
            slide.add_picture(Picture::new(image.media, Rect::new(0, 0, 10, 10)));
        }
        first.add_slide(slide);
        let mut buffer = Cursor::new(Vec::new());
        first.write_to(&mut buffer).unwrap();

        buffer.set_position(0);
        let template = Template::from_reader(buffer).unwrap();
        assert!(!template.has_part("ppt/media/generated1.png"));

        let mut second = Deck::new(template);
        let a = second.embed_image(encoded(4, 4, ImageFormat::Png)).unwrap();
        let b = second.embed_image(encoded(6, 6, ImageFormat::Png)).unwrap();
        assert_ne!(second.media[0].part, second.media[1].part);

        let mut slide = Slide::new();
        slide
            .add_picture(Picture::new(a.media, Rect::new(0, 0, 10, 10)))
            .add_picture(Picture::new(b.media, Rect::new(0, 0, 10, 10)));
        second.add_slide(slide);

        let mut output = Cursor::new(Vec::new());
        second.write_to(&mut output).unwrap();
        let package = output.into_inner();
        assert_eq!(
            media_parts(package.clone()),
            vec!["ppt/media/generated1.png", "ppt/media/generated2.png"]
        );
        let summary = DeckReader::new().read(Cursor::new(package)).unwrap();
        assert_eq!(summary.slide_count(), 1);
        assert_eq!(summary.slides[0].pictures, 2);
    }

    #[test]
    fn test_unsaved_path_is_fatal() {
        let deck = Deck::new(Template::blank());
        let dir = tempfile::tempdir().unwrap();
        let err = deck.save(&dir.path().join("missing").join("out.pptx")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
        assert!(!err.is_recoverable());
    }
}
