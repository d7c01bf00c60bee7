//! Per-layout slide drawing.
//!
//! Coordinates are given in inches on the 10"×7.5" reference canvas and
//! scaled to the template's slide size.

use crate::deck::{EmbeddedImage, Slide};
use crate::shapes::{Align, Anchor, AutoShape, Crop, Paragraph, Picture, Preset, Stroke, TextBox, BULLET};
use deckgen_core::geometry::{fit_contain, fit_cover, inches};
use deckgen_core::{Bullet, Canvas, Palette, Rect, Rgb, SlideLayout};

/// Subtitle under the presentation title.
pub const TITLE_SUBTITLE: &str = "Created with AI Presentation Generator";

/// Heading of the closing slide.
pub const THANK_YOU: &str = "Thank You!";

/// Subtitle of the closing slide.
pub const THANK_YOU_SUBTITLE: &str = "Questions & Discussion";

/// Bullets kept on a conclusion slide.
pub const CONCLUSION_BULLETS: usize = 3;

const PANEL_FILL: Rgb = Rgb::WHITE;
const PANEL_TEXT: Rgb = Rgb::BLACK;

/// Draws slides for one deck.
#[derive(Debug, Clone)]
pub struct SlideRenderer {
    canvas: Canvas,
    palette: Palette,
    /// Slides sit on a theme master: keep its background and text colours.
    themed: bool,
}

impl SlideRenderer {
    pub fn new(canvas: Canvas, palette: Palette, themed: bool) -> Self {
        Self {
            canvas,
            palette,
            themed,
        }
    }

    /// Explicit text colour, or `None` to inherit from the theme.
    fn text_color(&self) -> Option<Rgb> {
        if self.themed {
            None
        } else {
            Some(self.palette.text())
        }
    }

    /// Colour for lines and secondary decoration that must show on the
    /// slide background.
    fn line_color(&self) -> Rgb {
        if self.themed {
            self.palette.primary
        } else {
            self.palette.text()
        }
    }

    fn base_slide(&self) -> Slide {
        let mut slide = Slide::new();
        if !self.themed {
            slide.set_background(self.palette.primary);
        }
        slide
    }

    fn place(&self, x: f64, y: f64, width: f64, height: f64) -> Rect {
        self.canvas.place(x, y, width, height)
    }

    /// Opening slide: full-bleed cover image with a caption card, or a
    /// centred title when there is no image.
    pub fn title_slide(&self, title: &str, cover: Option<&EmbeddedImage>) -> Slide {
        match cover {
            Some(image) => self.cover_title_slide(title, image),
            None => self.plain_title_slide(title),
        }
    }

    fn plain_title_slide(&self, title: &str) -> Slide {
        let mut slide = self.base_slide();
        slide.add_text_box(
            TextBox::new(self.place(0.5, 2.2, 9.0, 1.6))
                .anchor(Anchor::Bottom)
                .shrink_to_fit()
                .with_paragraph(
                    Paragraph::new(title)
                        .size(44.0)
                        .bold()
                        .color(self.text_color())
                        .align(Align::Center),
                ),
        );
        slide.add_shape(
            AutoShape::new(Preset::Rect, self.place(3.0, 3.95, 4.0, 0.03)).fill(self.palette.accent),
        );
        slide.add_text_box(
            TextBox::new(self.place(0.5, 4.1, 9.0, 0.8)).with_paragraph(
                Paragraph::new(TITLE_SUBTITLE)
                    .size(18.0)
                    .color(self.text_color())
                    .align(Align::Center),
            ),
        );
        slide
    }

    fn cover_title_slide(&self, title: &str, image: &EmbeddedImage) -> Slide {
        let mut slide = self.base_slide();
        let frame = self.canvas.full();
        if let Some(placed) = fit_cover(frame, image.width, image.height) {
            slide.add_picture(
                Picture::new(image.media, frame)
                    .crop(Crop::to_frame(frame, placed))
                    .description(title),
            );
        }

        let card = self.place(5.7, 5.5, 4.0, 1.8);
        slide.add_shape(
            AutoShape::new(Preset::RoundRect, card)
                .fill(PANEL_FILL)
                .stroke(Stroke::solid(self.palette.accent, 1.0)),
        );
        slide.add_text_box(
            TextBox::new(inset(card, 0.2))
                .anchor(Anchor::Middle)
                .shrink_to_fit()
                .with_paragraph(Paragraph::new(title).size(28.0).bold().color(Some(PANEL_TEXT)))
                .with_paragraph(
                    Paragraph::new(TITLE_SUBTITLE)
                        .size(14.0)
                        .color(Some(PANEL_TEXT)),
                ),
        );
        slide
    }

    /// Draw one section. Image layouts without an image are drawn as
    /// `title_content`; the layout actually drawn is returned.
    pub fn section_slide(
        &self,
        layout: SlideLayout,
        title: &str,
        bullets: &[Bullet],
        image: Option<&EmbeddedImage>,
    ) -> (Slide, SlideLayout) {
        match (layout, image) {
            (SlideLayout::Title, image) => (self.title_slide(title, image), SlideLayout::Title),
            (SlideLayout::TitleContent, _) => (self.title_content(title, bullets), layout),
            (SlideLayout::TwoColumn, _) => (self.two_column(title, bullets), layout),
            (SlideLayout::Conclusion, _) => (self.conclusion(title, bullets), layout),
            (SlideLayout::ImageLeftTextRight, Some(image)) => (
                self.image_and_text(title, bullets, image, Side::Left),
                layout,
            ),
            (SlideLayout::ImageRightTextLeft, Some(image)) => (
                self.image_and_text(title, bullets, image, Side::Right),
                layout,
            ),
            (SlideLayout::ImageLeftTextRight | SlideLayout::ImageRightTextLeft, None) => {
                log::debug!("No image for '{}'; drawing {} instead", title, SlideLayout::TitleContent);
                (self.title_content(title, bullets), SlideLayout::TitleContent)
            }
        }
    }

    fn header(&self, slide: &mut Slide, title: &str) {
        slide.add_text_box(
            TextBox::new(self.place(0.5, 0.3, 9.0, 0.8))
                .anchor(Anchor::Middle)
                .shrink_to_fit()
                .with_paragraph(
                    Paragraph::new(title)
                        .size(36.0)
                        .bold()
                        .color(self.text_color())
                        .align(Align::Center),
                ),
        );
        slide.add_shape(
            AutoShape::new(Preset::Rect, self.place(1.0, 1.1, 8.0, 0.02)).fill(self.palette.accent),
        );
    }

    fn decorations(&self, slide: &mut Slide) {
        slide.add_shape(
            AutoShape::new(Preset::Ellipse, self.place(9.0, 0.1, 0.4, 0.4)).fill(self.palette.accent),
        );
        slide.add_shape(
            AutoShape::new(Preset::Ellipse, self.place(0.1, 6.5, 0.3, 0.3)).fill(self.line_color()),
        );
    }

    fn title_content(&self, title: &str, bullets: &[Bullet]) -> Slide {
        let mut slide = self.base_slide();
        self.header(&mut slide, title);
        slide.add_text_box(bullet_box(
            self.place(0.8, 1.5, 8.4, 5.3),
            bullets,
            20.0,
            self.text_color(),
        ));
        self.decorations(&mut slide);
        slide
    }

    fn two_column(&self, title: &str, bullets: &[Bullet]) -> Slide {
        let mut slide = self.base_slide();
        self.header(&mut slide, title);

        let (left, right) = split_columns(bullets);
        let columns = [
            (self.place(0.5, 1.5, 4.5, 5.5), left),
            (self.place(5.2, 1.5, 4.3, 5.5), right),
        ];
        for (frame, column) in columns {
            slide.add_shape(
                AutoShape::new(Preset::RoundRect, frame).stroke(Stroke::dashed(self.line_color(), 1.0)),
            );
            slide.add_text_box(bullet_box(inset(frame, 0.2), column, 20.0, self.text_color()));
        }

        self.decorations(&mut slide);
        slide
    }

    fn image_and_text(&self, title: &str, bullets: &[Bullet], image: &EmbeddedImage, side: Side) -> Slide {
        let mut slide = self.base_slide();
        self.header(&mut slide, title);

        let (image_frame, text_frame) = match side {
            Side::Left => (self.place(0.8, 1.5, 4.0, 4.5), self.place(5.2, 1.5, 4.3, 4.5)),
            Side::Right => (self.place(5.2, 1.5, 4.3, 4.5), self.place(0.5, 1.5, 4.5, 4.5)),
        };

        slide.add_shape(
            AutoShape::new(Preset::RoundRect, text_frame)
                .fill(PANEL_FILL)
                .stroke(Stroke::solid(self.palette.accent, 1.0)),
        );
        slide.add_text_box(bullet_box(inset(text_frame, 0.2), bullets, 16.0, Some(PANEL_TEXT)));

        slide.add_shape(
            AutoShape::new(Preset::RoundRect, image_frame)
                .fill(PANEL_FILL)
                .stroke(Stroke::solid(self.palette.accent, 2.0)),
        );
        if let Some(placed) = fit_contain(inset(image_frame, 0.1), image.width, image.height) {
            slide.add_picture(Picture::new(image.media, placed).description(title));
        }

        self.decorations(&mut slide);
        slide
    }

    fn conclusion(&self, title: &str, bullets: &[Bullet]) -> Slide {
        let mut slide = self.base_slide();
        slide.add_text_box(
            TextBox::new(self.place(0.5, 0.5, 9.0, 1.0))
                .anchor(Anchor::Middle)
                .with_paragraph(
                    Paragraph::new(title)
                        .size(32.0)
                        .bold()
                        .color(self.text_color())
                        .align(Align::Center),
                ),
        );

        let mut content = TextBox::new(self.place(1.0, 2.0, 8.0, 4.0))
            .anchor(Anchor::Middle)
            .shrink_to_fit();
        for bullet in bullets.iter().take(CONCLUSION_BULLETS) {
            content = content.with_paragraph(
                Paragraph::new(bullet.text.as_str())
                    .size(20.0)
                    .color(self.text_color())
                    .align(Align::Center)
                    .space_after(12.0),
            );
        }
        slide.add_text_box(content);
        slide
    }

    /// Closing slide appended after every section.
    pub fn thank_you_slide(&self) -> Slide {
        let mut slide = self.base_slide();
        slide.add_shape(AutoShape::new(Preset::Rect, self.canvas.full()).fill(self.palette.primary));
        slide.add_text_box(
            TextBox::new(self.place(1.0, 2.5, 8.0, 2.0))
                .anchor(Anchor::Middle)
                .with_paragraph(
                    Paragraph::new(THANK_YOU)
                        .size(48.0)
                        .bold()
                        .color(Some(self.palette.text()))
                        .align(Align::Center),
                ),
        );
        slide.add_text_box(
            TextBox::new(self.place(1.0, 5.0, 8.0, 1.0)).with_paragraph(
                Paragraph::new(THANK_YOU_SUBTITLE)
                    .size(24.0)
                    .color(Some(self.palette.accent))
                    .align(Align::Center),
            ),
        );
        slide
    }
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Shrink `rect` by `margin` inches on every side.
fn inset(rect: Rect, margin: f64) -> Rect {
    rect.inset(inches(margin))
}

/// Split bullets at the midpoint; the right column gets the extra one.
pub fn split_columns(bullets: &[Bullet]) -> (&[Bullet], &[Bullet]) {
    bullets.split_at(bullets.len() / 2)
}

fn bullet_box(rect: Rect, bullets: &[Bullet], size: f64, color: Option<Rgb>) -> TextBox {
    let mut text_box = TextBox::new(rect).shrink_to_fit();
    for bullet in bullets {
        let size = if bullet.level == 0 { size } else { size - 2.0 };
        text_box = text_box.with_paragraph(
            Paragraph::new(bullet.text.as_str())
                .level(bullet.level)
                .size(size)
                .color(color)
                .bullet(BULLET)
                .space_after(6.0),
        );
    }
    text_box
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{MediaId, Shape};

    fn renderer(themed: bool) -> SlideRenderer {
        SlideRenderer::new(Canvas::default(), Palette::default(), themed)
    }

    fn bullets(n: usize) -> Vec<Bullet> {
        (0..n).map(|i| Bullet::top(format!("Point {}", i + 1))).collect()
    }

    fn texts(slide: &Slide) -> Vec<String> {
        slide
            .shapes()
            .iter()
            .filter_map(|s| match s {
                Shape::Text(t) => Some(t),
                _ => None,
            })
            .flat_map(|t| t.paragraphs.iter().map(|p| p.text.clone()))
            .collect()
    }

    fn pictures(slide: &Slide) -> Vec<&Picture> {
        slide
            .shapes()
            .iter()
            .filter_map(|s| match s {
                Shape::Picture(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn image(width: u32, height: u32) -> EmbeddedImage {
        EmbeddedImage {
            media: MediaId(0),
            width,
            height,
        }
    }

    #[test]
    fn test_title_content_lists_every_bullet() {
        let mut points = bullets(4);
        points.push(Bullet::new("Nested", 2));
        let (slide, layout) = renderer(false).section_slide(SlideLayout::TitleContent, "Causes", &points, None);

        assert_eq!(layout, SlideLayout::TitleContent);
        let texts = texts(&slide);
        assert_eq!(texts[0], "Causes");
        assert_eq!(&texts[1..], &["Point 1", "Point 2", "Point 3", "Point 4", "Nested"]);

        let nested = slide
            .shapes()
            .iter()
            .find_map(|s| match s {
                Shape::Text(t) => t.paragraphs.iter().find(|p| p.text == "Nested"),
                _ => None,
            })
            .unwrap();
        assert_eq!(nested.level, 2);
    }

    #[test]
    fn test_two_column_split() {
        let five = bullets(5);
        let (left, right) = split_columns(&five);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 3);
        assert_eq!(right[0].text, "Point 3");

        let (left, right) = split_columns(&[]);
        assert!(left.is_empty() && right.is_empty());

        let (slide, _) = renderer(false).section_slide(SlideLayout::TwoColumn, "Both", &five, None);
        assert_eq!(texts(&slide).len(), 6);
    }

    #[test]
    fn test_conclusion_keeps_three_bullets() {
        let (slide, layout) =
            renderer(false).section_slide(SlideLayout::Conclusion, "Conclusion", &bullets(6), None);
        assert_eq!(layout, SlideLayout::Conclusion);
        assert_eq!(texts(&slide), vec!["Conclusion", "Point 1", "Point 2", "Point 3"]);
    }

    #[test]
    fn test_image_layout_without_image_falls_back() {
        for layout in [SlideLayout::ImageLeftTextRight, SlideLayout::ImageRightTextLeft] {
            let (slide, drawn) = renderer(false).section_slide(layout, "Uses", &bullets(2), None);
            assert_eq!(drawn, SlideLayout::TitleContent);
            assert!(pictures(&slide).is_empty());
        }
    }

    #[test]
    fn test_image_fits_inside_its_panel() {
        let r = renderer(false);
        let (slide, drawn) =
            r.section_slide(SlideLayout::ImageLeftTextRight, "Uses", &bullets(2), Some(&image(1600, 900)));
        assert_eq!(drawn, SlideLayout::ImageLeftTextRight);

        let pics = pictures(&slide);
        assert_eq!(pics.len(), 1);
        let panel = inset(Canvas::default().place(0.8, 1.5, 4.0, 4.5), 0.1);
        assert!(panel.contains(&pics[0].rect));
        assert_eq!(pics[0].rect.width, panel.width);

        let (slide, _) =
            r.section_slide(SlideLayout::ImageRightTextLeft, "Uses", &bullets(2), Some(&image(300, 900)));
        let pic = pictures(&slide)[0].rect;
        assert!(pic.x > inches(5.0));
    }

    #[test]
    fn test_title_slide_variants() {
        let r = renderer(false);
        let plain = r.title_slide("Photosynthesis", None);
        assert!(pictures(&plain).is_empty());
        assert_eq!(texts(&plain), vec!["Photosynthesis", TITLE_SUBTITLE]);

        let cover = r.title_slide("Photosynthesis", Some(&image(1000, 1000)));
        let pics = pictures(&cover);
        assert_eq!(pics.len(), 1);
        assert_eq!(pics[0].rect, Canvas::default().full());
        assert!(pics[0].crop.top > 0);
        assert_eq!(pics[0].crop.left, 0);
    }

    #[test]
    fn test_thank_you_slide() {
        let slide = renderer(true).thank_you_slide();
        assert_eq!(texts(&slide), vec![THANK_YOU, THANK_YOU_SUBTITLE]);
    }

    #[test]
    fn test_background_only_without_theme() {
        let palette = Palette::default();
        let (blank, _) = renderer(false).section_slide(SlideLayout::TitleContent, "A", &bullets(1), None);
        assert_eq!(blank.background(), Some(palette.primary));

        let (themed, _) = renderer(true).section_slide(SlideLayout::TitleContent, "A", &bullets(1), None);
        assert_eq!(themed.background(), None);
        let title_color = themed.shapes().iter().find_map(|s| match s {
            Shape::Text(t) => t.paragraphs.first().map(|p| p.color),
            _ => None,
        });
        assert_eq!(title_color, Some(None));
    }
}
