//! PPTX (Office Open XML) deck writing and the generation pipeline.
//!
//! A deck is built on a [`Template`] (the built-in blank package or a theme
//! file), drawn slide by slide with [`SlideRenderer`] and saved as a ZIP of
//! XML parts. [`DeckReader`] reads packages back for inspection.

mod blank;
pub mod deck;
pub mod generator;
pub mod reader;
pub mod render;
pub mod shapes;
pub mod template;

pub use deck::{Deck, EmbeddedImage, Slide};
pub use generator::{DeckGenerator, GenerateOptions, GenerationReport, SlideReport};
pub use reader::{DeckReader, DeckSummary, SlideSummary};
pub use render::SlideRenderer;
pub use template::{list_themes, theme_path, Template};
