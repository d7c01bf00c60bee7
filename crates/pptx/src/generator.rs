//! The generation pipeline: outline text, template, images, slides, file.

use crate::deck::{Deck, EmbeddedImage};
use crate::render::SlideRenderer;
use crate::template::Template;
use deckgen_core::normalize::sanitize_file_stem;
use deckgen_core::outline::INTRODUCTION;
use deckgen_core::{
    ensure_conclusion, image_queries, mock_outline, DetailLevel, ImageCandidate, ImageSearch,
    LayoutSelector, OutlineParser, Palette, ParsedOutline, Result, SlideLayout, TextGenerator,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Search results requested per image query.
pub const DEFAULT_IMAGES_PER_QUERY: usize = 5;

/// Settings for one deck.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub topic: String,
    pub detail: DetailLevel,
    /// Theme `.pptx`; the blank template is used when unset or unusable.
    pub theme: Option<PathBuf>,
    pub output: PathBuf,
    /// Seed for layout choice and image picks.
    pub seed: Option<u64>,
    /// Search for slide images.
    pub images: bool,
    pub palette: Palette,
    pub images_per_query: usize,
}

impl GenerateOptions {
    pub fn new(topic: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            topic: topic.into(),
            detail: DetailLevel::default(),
            theme: None,
            output: output.into(),
            seed: None,
            images: true,
            palette: Palette::default(),
            images_per_query: DEFAULT_IMAGES_PER_QUERY,
        }
    }
}

/// What was drawn on one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlideReport {
    pub title: String,
    /// Layout actually drawn; `None` for the closing slide.
    pub layout: Option<SlideLayout>,
    pub has_image: bool,
}

/// Summary of a finished deck.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub title: String,
    pub output: PathBuf,
    /// Theme used, or `None` for the blank template.
    pub theme: Option<PathBuf>,
    /// The built-in outline replaced the generated one.
    pub fallback_outline: bool,
    pub slides: Vec<SlideReport>,
}

/// Builds decks from a topic with a text generator and an image search.
pub struct DeckGenerator<T, I> {
    text: T,
    images: I,
    parser: OutlineParser,
}

impl<T: TextGenerator, I: ImageSearch> DeckGenerator<T, I> {
    pub fn new(text: T, images: I) -> Self {
        Self {
            text,
            images,
            parser: OutlineParser::new(),
        }
    }

    pub fn with_parser(mut self, parser: OutlineParser) -> Self {
        self.parser = parser;
        self
    }

    /// The image search in use.
    pub fn images(&self) -> &I {
        &self.images
    }

    /// Outline for `topic`, with the conclusion rule applied. The flag is set
    /// when the built-in outline stood in for the generated one.
    pub fn outline(&self, topic: &str, detail: DetailLevel) -> (ParsedOutline, bool) {
        let (mut parsed, fallback) = match self.text.generate(topic, detail) {
            Ok(raw) => {
                let parsed = self.parser.parse(&raw);
                if parsed.outline.is_empty() {
                    log::warn!("Generated text had no sections; using the built-in outline");
                    (mock_outline(topic, detail), true)
                } else {
                    (parsed, false)
                }
            }
            Err(e) => {
                log::warn!("Text generation failed ({}); using the built-in outline", e);
                (mock_outline(topic, detail), true)
            }
        };
        ensure_conclusion(&mut parsed.outline);
        (parsed, fallback)
    }

    /// Generate a deck and write it to `options.output`.
    ///
    /// Only failing to write the output is an error; text, theme and image
    /// problems fall back locally.
    pub fn generate(&self, options: &GenerateOptions) -> Result<GenerationReport> {
        let (ParsedOutline { title, outline }, fallback_outline) =
            self.outline(&options.topic, options.detail);
        log::info!("Outline '{}' with {} sections", title, outline.len());

        let template = Template::resolve(options.theme.as_deref());
        let theme = template.source().map(Path::to_path_buf);
        let mut deck = Deck::new(template);
        let renderer = SlideRenderer::new(deck.canvas(), options.palette, theme.is_some());
        let mut selector = match options.seed {
            Some(seed) => LayoutSelector::seeded(seed),
            None => LayoutSelector::new(),
        };

        // Downloads live only as long as this call
        let workdir = download_dir(options.images, &std::env::temp_dir());
        let mut slides = Vec::with_capacity(outline.len() + 2);

        let cover = if let Some(workdir) = &workdir {
            let (first_section, first_bullets) = match outline.iter().next() {
                Some(entry) => entry,
                None => (INTRODUCTION, &[][..]),
            };
            let queries = image_queries(&title, first_section, first_bullets);
            self.find_image(&queries, options, selector.rng(), &mut deck, workdir.path())
        } else {
            None
        };
        deck.add_slide(renderer.title_slide(&title, cover.as_ref()));
        slides.push(SlideReport {
            title: title.clone(),
            layout: Some(SlideLayout::Title),
            has_image: cover.is_some(),
        });

        for (i, (section, bullets)) in outline.iter().enumerate() {
            let layout = selector.select(i + 1, section, bullets.len(), options.detail);
            let image = match &workdir {
                Some(workdir) if layout.needs_image() => {
                    let queries = image_queries(&title, section, bullets);
                    self.find_image(&queries, options, selector.rng(), &mut deck, workdir.path())
                }
                _ => None,
            };

            let (slide, drawn) = renderer.section_slide(layout, section, bullets, image.as_ref());
            if drawn != layout {
                log::warn!("No image for '{}'; drawing it as {}", section, drawn);
            }
            log::debug!("Slide {}: '{}' as {}", i + 2, section, drawn);
            deck.add_slide(slide);
            slides.push(SlideReport {
                title: section.to_string(),
                layout: Some(drawn),
                has_image: drawn.needs_image(),
            });
        }

        deck.add_slide(renderer.thank_you_slide());
        slides.push(SlideReport {
            title: crate::render::THANK_YOU.to_string(),
            layout: None,
            has_image: false,
        });

        deck.save(&options.output)?;

        Ok(GenerationReport {
            title,
            output: options.output.clone(),
            theme,
            fallback_outline,
            slides,
        })
    }

    /// First image obtainable from `queries`, picking at random among each
    /// query's results.
    fn find_image(
        &self,
        queries: &[String],
        options: &GenerateOptions,
        rng: &mut StdRng,
        deck: &mut Deck,
        workdir: &Path,
    ) -> Option<EmbeddedImage> {
        for query in queries {
            let candidates = match self.images.search(query, options.images_per_query) {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!("Image search for '{}' failed: {}", query, e);
                    continue;
                }
            };
            let Some(candidate) = candidates.choose(rng) else {
                log::debug!("No images for '{}'", query);
                continue;
            };
            match self.fetch(candidate, deck, workdir) {
                Ok(image) => {
                    log::debug!(
                        "Using image {} ({}x{}) for '{}'",
                        candidate.id,
                        image.width,
                        image.height,
                        query
                    );
                    return Some(image);
                }
                Err(e) => log::warn!("Skipping image {} for '{}': {}", candidate.id, query, e),
            }
        }
        None
    }

    fn fetch(&self, candidate: &ImageCandidate, deck: &mut Deck, workdir: &Path) -> Result<EmbeddedImage> {
        let bytes = self.images.download(candidate)?;
        let path = workdir.join(format!("{}.img", sanitize_file_stem(&candidate.id)));
        std::fs::write(&path, &bytes)?;
        deck.embed_image_file(&path)
    }
}

/// Scratch folder for downloaded images under `parent`. `None` when images
/// are off or the folder cannot be created, in which case slides are drawn
/// without images.
fn download_dir(images: bool, parent: &Path) -> Option<tempfile::TempDir> {
    if !images {
        return None;
    }
    match tempfile::Builder::new().prefix("deckgen-").tempdir_in(parent) {
        Ok(dir) => Some(dir),
        Err(e) => {
            log::warn!(
                "Cannot create a download folder in {} ({}); continuing without images",
                parent.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_dir_only_when_images_on() {
        let parent = tempfile::tempdir().unwrap();
        assert!(download_dir(false, parent.path()).is_none());
        assert!(std::fs::read_dir(parent.path()).unwrap().next().is_none());

        let dir = download_dir(true, parent.path()).unwrap();
        assert!(dir.path().starts_with(parent.path()));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_download_dir_failure_skips_images() {
        let parent = tempfile::tempdir().unwrap();
        let missing = parent.path().join("gone").join("deeper");
        assert!(download_dir(true, &missing).is_none());
    }
}
