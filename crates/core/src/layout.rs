//! Slide layout selection.
//!
//! Position 0 is always the title slide, closing sections always use the
//! conclusion layout and position 1 (the opening section) is always plain
//! title-and-content. Everything else is a weighted random draw for visual
//! variety; seed the selector to make decks reproducible.

use crate::types::{DetailLevel, SlideLayout};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

/// Baseline weight of each drawable layout.
const BASE_WEIGHT: u32 = 2;

/// Extra weight for the favoured group.
const BIAS_WEIGHT: u32 = 4;

/// Bullet count below which image layouts are favoured.
const FEW_BULLETS: usize = 3;

/// Bullet count from which text-heavy layouts are favoured.
const MANY_BULLETS: usize = 5;

/// Layouts that can be drawn at random.
const DRAWABLE: [SlideLayout; 4] = [
    SlideLayout::ImageLeftTextRight,
    SlideLayout::ImageRightTextLeft,
    SlideLayout::TitleContent,
    SlideLayout::TwoColumn,
];

/// Weighted candidate set for a body slide.
///
/// Fewer than three bullets favours the image layouts, five or more favours
/// the text-heavy ones, and detailed decks lean towards text-heavy layouts
/// in every case.
pub fn candidate_weights(detail: DetailLevel, bullet_count: usize) -> Vec<(SlideLayout, u32)> {
    DRAWABLE
        .iter()
        .map(|&layout| {
            let mut weight = BASE_WEIGHT;
            if layout.needs_image() && bullet_count < FEW_BULLETS {
                weight += BIAS_WEIGHT;
            }
            if layout.is_text_heavy() && bullet_count >= MANY_BULLETS {
                weight += BIAS_WEIGHT;
            }
            if layout.is_text_heavy() && detail == DetailLevel::Detailed {
                weight += BASE_WEIGHT;
            }
            (layout, weight)
        })
        .collect()
}

/// Picks a layout for each slide position.
#[derive(Debug)]
pub struct LayoutSelector {
    rng: StdRng,
}

impl LayoutSelector {
    /// Create a selector seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a reproducible selector.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose the layout for the slide at `position` (0 = title slide,
    /// sections start at 1).
    pub fn select(
        &mut self,
        position: usize,
        section_title: &str,
        bullet_count: usize,
        detail: DetailLevel,
    ) -> SlideLayout {
        if position == 0 {
            return SlideLayout::Title;
        }
        if section_title.to_lowercase().contains("conclusion") {
            return SlideLayout::Conclusion;
        }
        if position == 1 {
            return SlideLayout::TitleContent;
        }

        let candidates = candidate_weights(detail, bullet_count);
        candidates
            .choose_weighted(&mut self.rng, |(_, weight)| *weight)
            .map(|(layout, _)| *layout)
            .unwrap_or(SlideLayout::TitleContent)
    }

    /// Access the underlying generator for other random choices in the same
    /// deck (such as picking among image results).
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl Default for LayoutSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn weight_of(weights: &[(SlideLayout, u32)], layout: SlideLayout) -> u32 {
        weights.iter().find(|(l, _)| *l == layout).map(|(_, w)| *w).unwrap_or(0)
    }

    #[test]
    fn test_title_position_always_title() {
        let mut selector = LayoutSelector::seeded(1);
        for detail in [DetailLevel::Simple, DetailLevel::Detailed] {
            for count in [0, 2, 9] {
                assert_eq!(
                    selector.select(0, "Key Conclusions", count, detail),
                    SlideLayout::Title
                );
            }
        }
    }

    #[test]
    fn test_conclusion_override() {
        let mut selector = LayoutSelector::seeded(2);
        for position in 1..20 {
            assert_eq!(
                selector.select(position, "Key Conclusions", position, DetailLevel::Detailed),
                SlideLayout::Conclusion
            );
        }
        assert_eq!(
            selector.select(1, "CONCLUSION", 3, DetailLevel::Simple),
            SlideLayout::Conclusion
        );
    }

    #[test]
    fn test_first_section_is_title_content() {
        let mut selector = LayoutSelector::seeded(3);
        assert_eq!(
            selector.select(1, "Introduction", 1, DetailLevel::Simple),
            SlideLayout::TitleContent
        );
    }

    #[test]
    fn test_random_draw_never_title_or_conclusion() {
        let mut selector = LayoutSelector::seeded(4);
        for i in 0..200 {
            let layout = selector.select(2 + i % 5, "Body", i % 8, DetailLevel::Simple);
            assert_ne!(layout, SlideLayout::Title);
            assert_ne!(layout, SlideLayout::Conclusion);
        }
    }

    #[test]
    fn test_weights_favour_images_for_short_sections() {
        let weights = candidate_weights(DetailLevel::Simple, 2);
        assert!(
            weight_of(&weights, SlideLayout::ImageLeftTextRight)
                > weight_of(&weights, SlideLayout::TitleContent)
        );
        assert!(
            weight_of(&weights, SlideLayout::ImageRightTextLeft)
                > weight_of(&weights, SlideLayout::TwoColumn)
        );
    }

    #[test]
    fn test_weights_favour_text_for_long_sections() {
        let weights = candidate_weights(DetailLevel::Simple, 5);
        assert!(
            weight_of(&weights, SlideLayout::TwoColumn)
                > weight_of(&weights, SlideLayout::ImageLeftTextRight)
        );
    }

    #[test]
    fn test_detailed_leans_text_heavy() {
        let simple = candidate_weights(DetailLevel::Simple, 3);
        let detailed = candidate_weights(DetailLevel::Detailed, 3);
        assert_eq!(
            weight_of(&simple, SlideLayout::TitleContent),
            weight_of(&simple, SlideLayout::ImageLeftTextRight)
        );
        assert!(
            weight_of(&detailed, SlideLayout::TitleContent)
                > weight_of(&detailed, SlideLayout::ImageLeftTextRight)
        );
    }

    #[test]
    fn test_bias_holds_statistically() {
        let mut selector = LayoutSelector::seeded(42);
        let mut counts: HashMap<SlideLayout, usize> = HashMap::new();
        for _ in 0..2000 {
            *counts
                .entry(selector.select(3, "Body", 1, DetailLevel::Simple))
                .or_default() += 1;
        }
        let images = counts.get(&SlideLayout::ImageLeftTextRight).copied().unwrap_or(0)
            + counts.get(&SlideLayout::ImageRightTextLeft).copied().unwrap_or(0);
        let text = counts.get(&SlideLayout::TitleContent).copied().unwrap_or(0)
            + counts.get(&SlideLayout::TwoColumn).copied().unwrap_or(0);
        assert!(images > text * 2, "images={} text={}", images, text);
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let mut a = LayoutSelector::seeded(7);
        let mut b = LayoutSelector::seeded(7);
        for i in 2..50 {
            assert_eq!(
                a.select(i, "Body", i % 7, DetailLevel::Simple),
                b.select(i, "Body", i % 7, DetailLevel::Simple)
            );
        }
    }
}
