//! Core domain types, outline parsing, layout selection and geometry
//! for generating slide decks from model-written outlines.

pub mod color;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod normalize;
pub mod outline;
pub mod provider;
pub mod query;
pub mod types;

pub use color::{text_color_for, Palette, Rgb};
pub use error::{Error, Result};
pub use geometry::{Canvas, Rect};
pub use layout::{candidate_weights, LayoutSelector};
pub use normalize::TextCleaner;
pub use outline::{ensure_conclusion, mock_outline, OutlineParser, ParsedOutline};
pub use provider::{ImageCandidate, ImageSearch, Offline, TextGenerator};
pub use query::image_queries;
pub use types::{Bullet, DetailLevel, Outline, SlideLayout, MAX_BULLET_LEVEL};
