//! Shape model and DrawingML emission for generated slides.

use deckgen_core::geometry::points;
use deckgen_core::normalize::strip_xml_invalid;
use deckgen_core::{Error, Rect, Result, Rgb};
use quick_xml::escape::escape;
use std::fmt::Write as FmtWrite;

/// Bullet glyph used for content paragraphs.
pub const BULLET: char = '•';

fn xml_err(e: std::fmt::Error) -> Error {
    Error::XmlError(e.to_string())
}

/// Horizontal paragraph alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn as_attr(&self) -> &'static str {
        match self {
            Align::Left => "l",
            Align::Center => "ctr",
            Align::Right => "r",
        }
    }
}

/// Vertical anchoring of text inside its box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Anchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    fn as_attr(&self) -> &'static str {
        match self {
            Anchor::Top => "t",
            Anchor::Middle => "ctr",
            Anchor::Bottom => "b",
        }
    }
}

/// One paragraph of a text box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub text: String,
    /// Indent depth, rendered through `lvl` and a left margin.
    pub level: u8,
    /// Font size in points; inherited when `None`.
    pub size: Option<f64>,
    pub bold: bool,
    /// Text colour; inherited when `None`.
    pub color: Option<Rgb>,
    pub align: Align,
    /// Bullet glyph, or no bullet.
    pub bullet: Option<char>,
    /// Space after the paragraph in points.
    pub space_after: Option<f64>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn color(mut self, color: Option<Rgb>) -> Self {
        self.color = color;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = level;
        self
    }

    pub fn bullet(mut self, glyph: char) -> Self {
        self.bullet = Some(glyph);
        self
    }

    pub fn space_after(mut self, pts: f64) -> Self {
        self.space_after = Some(pts);
        self
    }
}

/// A free-floating text box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub rect: Rect,
    pub paragraphs: Vec<Paragraph>,
    pub anchor: Anchor,
    /// Shrink text on overflow instead of spilling out of the box.
    pub shrink_to_fit: bool,
}

impl TextBox {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            paragraphs: Vec::new(),
            anchor: Anchor::Top,
            shrink_to_fit: false,
        }
    }

    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn shrink_to_fit(mut self) -> Self {
        self.shrink_to_fit = true;
        self
    }
}

/// Preset geometry for auto-shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Rect,
    RoundRect,
    Ellipse,
}

impl Preset {
    fn as_attr(&self) -> &'static str {
        match self {
            Preset::Rect => "rect",
            Preset::RoundRect => "roundRect",
            Preset::Ellipse => "ellipse",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Preset::Rect => "Rectangle",
            Preset::RoundRect => "Rounded Rectangle",
            Preset::Ellipse => "Ellipse",
        }
    }
}

/// Shape outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    /// Line width in points.
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: Rgb, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }
}

/// A preset shape with optional fill and outline; `None` means no fill / no
/// line rather than inheriting the theme style.
#[derive(Debug, Clone, PartialEq)]
pub struct AutoShape {
    pub preset: Preset,
    pub rect: Rect,
    pub fill: Option<Rgb>,
    pub stroke: Option<Stroke>,
}

impl AutoShape {
    pub fn new(preset: Preset, rect: Rect) -> Self {
        Self {
            preset,
            rect,
            fill: None,
            stroke: None,
        }
    }

    pub fn fill(mut self, color: Rgb) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }
}

/// Handle to an image stored in the deck's media parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(pub(crate) usize);

/// Crop insets in thousandths of a percent, as in `a:srcRect`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crop {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Crop {
    /// Crop that trims `placed` back to `frame`, for a picture scaled to
    /// cover its frame.
    pub fn to_frame(frame: Rect, placed: Rect) -> Self {
        let pct = |overflow: i64, total: i64| {
            if total <= 0 {
                0
            } else {
                (overflow.max(0) as f64 * 100_000.0 / total as f64).round() as i64
            }
        };
        Self {
            left: pct(frame.x - placed.x, placed.width),
            top: pct(frame.y - placed.y, placed.height),
            right: pct(
                placed.x + placed.width - (frame.x + frame.width),
                placed.width,
            ),
            bottom: pct(
                placed.y + placed.height - (frame.y + frame.height),
                placed.height,
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Crop::default()
    }
}

/// An embedded picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    pub media: MediaId,
    pub rect: Rect,
    pub crop: Crop,
    pub description: String,
}

impl Picture {
    pub fn new(media: MediaId, rect: Rect) -> Self {
        Self {
            media,
            rect,
            crop: Crop::default(),
            description: String::new(),
        }
    }

    pub fn crop(mut self, crop: Crop) -> Self {
        self.crop = crop;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Anything drawn on a slide, in z-order.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text(TextBox),
    Auto(AutoShape),
    Picture(Picture),
}

impl Shape {
    /// Emit `p:sp` / `p:pic` XML for this shape. Pictures need the
    /// relationship id of their media part.
    pub(crate) fn to_xml(&self, shape_id: u32, xml: &mut String, rel_id: Option<&str>) -> Result<()> {
        match self {
            Shape::Text(text_box) => write_text_box(text_box, shape_id, xml),
            Shape::Auto(shape) => write_auto_shape(shape, shape_id, xml),
            Shape::Picture(picture) => {
                let rel_id = rel_id.ok_or_else(|| {
                    Error::Render(format!("picture {} has no media relationship", shape_id))
                })?;
                write_picture(picture, shape_id, rel_id, xml)
            }
        }
    }
}

fn write_xfrm(rect: &Rect, xml: &mut String) -> Result<()> {
    xml.push_str("<a:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, rect.x, rect.y).map_err(xml_err)?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, rect.width, rect.height).map_err(xml_err)?;
    xml.push_str("</a:xfrm>");
    Ok(())
}

fn write_solid_fill(color: Rgb, xml: &mut String) -> Result<()> {
    write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color.to_hex())
        .map_err(xml_err)
}

fn write_text_box(text_box: &TextBox, shape_id: u32, xml: &mut String) -> Result<()> {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="TextBox {}"/>"#,
        shape_id,
        shape_id - 1
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cNvSpPr txBox="1"/>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr>");
    write_xfrm(&text_box.rect, xml)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("<a:noFill/>");
    xml.push_str("</p:spPr>");

    xml.push_str("<p:txBody>");
    write!(
        xml,
        r#"<a:bodyPr wrap="square" rtlCol="0" anchor="{}">"#,
        text_box.anchor.as_attr()
    )
    .map_err(xml_err)?;
    if text_box.shrink_to_fit {
        xml.push_str("<a:normAutofit/>");
    } else {
        xml.push_str("<a:noAutofit/>");
    }
    xml.push_str("</a:bodyPr>");
    xml.push_str("<a:lstStyle/>");

    if text_box.paragraphs.is_empty() {
        xml.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    for paragraph in &text_box.paragraphs {
        write_paragraph(paragraph, xml)?;
    }

    xml.push_str("</p:txBody>");
    xml.push_str("</p:sp>");
    Ok(())
}

/// Left margin per indent level, in EMUs.
const LEVEL_INDENT: i64 = 342_900;

/// Hanging indent for the bullet glyph, in EMUs.
const BULLET_HANG: i64 = 228_600;

fn write_paragraph(paragraph: &Paragraph, xml: &mut String) -> Result<()> {
    xml.push_str("<a:p>");

    write!(xml, r#"<a:pPr algn="{}""#, paragraph.align.as_attr()).map_err(xml_err)?;
    if paragraph.level > 0 {
        write!(xml, r#" lvl="{}""#, paragraph.level).map_err(xml_err)?;
    }
    let indent = LEVEL_INDENT * paragraph.level as i64;
    if paragraph.bullet.is_some() {
        write!(xml, r#" marL="{}" indent="-{}""#, indent + BULLET_HANG, BULLET_HANG)
            .map_err(xml_err)?;
    } else {
        write!(xml, r#" marL="{}" indent="0""#, indent).map_err(xml_err)?;
    }
    xml.push('>');
    if let Some(pts) = paragraph.space_after {
        write!(
            xml,
            r#"<a:spcAft><a:spcPts val="{}"/></a:spcAft>"#,
            (pts * 100.0).round() as i64
        )
        .map_err(xml_err)?;
    }
    match paragraph.bullet {
        Some(glyph) => {
            write!(xml, r#"<a:buFont typeface="Arial"/><a:buChar char="{}"/>"#, glyph)
                .map_err(xml_err)?;
        }
        None => xml.push_str("<a:buNone/>"),
    }
    xml.push_str("</a:pPr>");

    let mut run_props = String::from(r#"lang="en-US" dirty="0""#);
    if let Some(size) = paragraph.size {
        write!(run_props, r#" sz="{}""#, (size * 100.0).round() as u32).map_err(xml_err)?;
    }
    if paragraph.bold {
        run_props.push_str(r#" b="1""#);
    }

    if paragraph.text.is_empty() {
        write!(xml, "<a:endParaRPr {}/>", run_props).map_err(xml_err)?;
    } else {
        xml.push_str("<a:r>");
        match paragraph.color {
            Some(color) => {
                write!(xml, "<a:rPr {}>", run_props).map_err(xml_err)?;
                write_solid_fill(color, xml)?;
                xml.push_str("</a:rPr>");
            }
            None => write!(xml, "<a:rPr {}/>", run_props).map_err(xml_err)?,
        }
        write!(xml, "<a:t>{}</a:t>", escape_text(&paragraph.text)).map_err(xml_err)?;
        xml.push_str("</a:r>");
    }

    xml.push_str("</a:p>");
    Ok(())
}

fn write_auto_shape(shape: &AutoShape, shape_id: u32, xml: &mut String) -> Result<()> {
    xml.push_str("<p:sp>");
    xml.push_str("<p:nvSpPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{} {}"/>"#,
        shape_id,
        shape.preset.display_name(),
        shape_id - 1
    )
    .map_err(xml_err)?;
    xml.push_str("<p:cNvSpPr/>");
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvSpPr>");

    xml.push_str("<p:spPr>");
    write_xfrm(&shape.rect, xml)?;
    write!(
        xml,
        r#"<a:prstGeom prst="{}"><a:avLst/></a:prstGeom>"#,
        shape.preset.as_attr()
    )
    .map_err(xml_err)?;

    match shape.fill {
        Some(color) => write_solid_fill(color, xml)?,
        None => xml.push_str("<a:noFill/>"),
    }

    match shape.stroke {
        Some(stroke) => {
            write!(xml, r#"<a:ln w="{}">"#, points(stroke.width)).map_err(xml_err)?;
            write_solid_fill(stroke.color, xml)?;
            if stroke.dashed {
                xml.push_str(r#"<a:prstDash val="dash"/>"#);
            }
            xml.push_str("</a:ln>");
        }
        None => xml.push_str("<a:ln><a:noFill/></a:ln>"),
    }
    xml.push_str("</p:spPr>");

    // Empty body keeps the shape editable as text in PowerPoint
    xml.push_str(r#"<p:txBody><a:bodyPr rtlCol="0" anchor="ctr"/><a:lstStyle/><a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p></p:txBody>"#);
    xml.push_str("</p:sp>");
    Ok(())
}

/// Escaped character data with XML-forbidden characters removed.
fn escape_text(text: &str) -> String {
    let cleaned = strip_xml_invalid(text);
    escape(&cleaned).into_owned()
}

fn write_picture(picture: &Picture, shape_id: u32, rel_id: &str, xml: &mut String) -> Result<()> {
    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
        shape_id,
        shape_id - 1,
        escape_text(&picture.description)
    )
    .map_err(xml_err)?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, rel_id).map_err(xml_err)?;
    if !picture.crop.is_empty() {
        let crop = &picture.crop;
        write!(
            xml,
            r#"<a:srcRect l="{}" t="{}" r="{}" b="{}"/>"#,
            crop.left, crop.top, crop.right, crop.bottom
        )
        .map_err(xml_err)?;
    }
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    write_xfrm(&picture.rect, xml)?;
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");
    xml.push_str("</p:pic>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_box_xml() {
        let text_box = TextBox::new(Rect::new(10, 20, 300, 400))
            .anchor(Anchor::Middle)
            .with_paragraph(
                Paragraph::new("Light & dark <phases>")
                    .size(20.0)
                    .bold()
                    .color(Some(Rgb::WHITE))
                    .align(Align::Center),
            )
            .with_paragraph(Paragraph::new("Detail").level(1).bullet(BULLET));

        let mut xml = String::new();
        Shape::Text(text_box).to_xml(2, &mut xml, None).unwrap();

        assert!(xml.contains(r#"<a:off x="10" y="20"/>"#));
        assert!(xml.contains(r#"<a:ext cx="300" cy="400"/>"#));
        assert!(xml.contains(r#"anchor="ctr""#));
        assert!(xml.contains("Light &amp; dark &lt;phases&gt;"));
        assert!(xml.contains(r#"sz="2000""#));
        assert!(xml.contains(r#"b="1""#));
        assert!(xml.contains(r#"<a:srgbClr val="FFFFFF"/>"#));
        assert!(xml.contains(r#"algn="ctr""#));
        assert!(xml.contains(r#"lvl="1""#));
        assert!(xml.contains(r#"<a:buChar char="•"/>"#));
    }

    #[test]
    fn test_auto_shape_dashed_outline() {
        let shape = AutoShape::new(Preset::RoundRect, Rect::new(0, 0, 10, 10))
            .stroke(Stroke::dashed(Rgb::BLACK, 1.0));
        let mut xml = String::new();
        Shape::Auto(shape).to_xml(3, &mut xml, None).unwrap();

        assert!(xml.contains(r#"prst="roundRect""#));
        assert!(xml.contains("<a:noFill/>"));
        assert!(xml.contains(r#"<a:ln w="12700">"#));
        assert!(xml.contains(r#"<a:prstDash val="dash"/>"#));
    }

    #[test]
    fn test_control_characters_not_written() {
        let text_box = TextBox::new(Rect::new(0, 0, 10, 10))
            .with_paragraph(Paragraph::new("Water\u{1}vapour & ice\u{B}"));
        let mut xml = String::new();
        Shape::Text(text_box).to_xml(2, &mut xml, None).unwrap();
        assert!(xml.contains("<a:t>Watervapour &amp; ice</a:t>"));

        let picture = Picture::new(MediaId(0), Rect::new(0, 0, 10, 10)).description("Bell\u{7} tower");
        let mut xml = String::new();
        Shape::Picture(picture).to_xml(3, &mut xml, Some("rId2")).unwrap();
        assert!(xml.contains(r#"descr="Bell tower""#));
        assert!(!xml.chars().any(|c| c.is_control() && c != '\n'));
    }

    #[test]
    fn test_picture_requires_relationship() {
        let picture = Picture::new(MediaId(0), Rect::new(0, 0, 10, 10));
        let mut xml = String::new();
        assert!(Shape::Picture(picture.clone()).to_xml(4, &mut xml, None).is_err());

        let mut xml = String::new();
        Shape::Picture(picture).to_xml(4, &mut xml, Some("rId2")).unwrap();
        assert!(xml.contains(r#"r:embed="rId2""#));
        assert!(!xml.contains("srcRect"));
    }

    #[test]
    fn test_crop_to_frame() {
        let frame = Rect::new(0, 0, 100, 100);
        let placed = Rect::new(0, -50, 100, 200);
        let crop = Crop::to_frame(frame, placed);
        assert_eq!(crop.left, 0);
        assert_eq!(crop.right, 0);
        assert_eq!(crop.top, 25_000);
        assert_eq!(crop.bottom, 25_000);

        assert!(Crop::to_frame(frame, frame).is_empty());
    }
}
