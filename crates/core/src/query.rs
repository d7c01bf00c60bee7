//! Search queries for slide images.

use crate::types::Bullet;

/// Words appended to the title and section to widen the search.
const QUERY_SUFFIXES: &[&str] = &["illustration", "concept", "background", "design", "education"];

/// Number of leading words of the first bullet used as a query hint.
const FIRST_BULLET_WORDS: usize = 3;

/// Ordered, de-duplicated image queries for a slide, most specific last.
///
/// The caller tries them in order and stops at the first query that yields a
/// downloadable image.
pub fn image_queries(title: &str, section: &str, bullets: &[Bullet]) -> Vec<String> {
    let title = title.trim();
    let section = section.trim();

    let mut queries = vec![title.to_string(), format!("{} {}", section, title)];
    for suffix in QUERY_SUFFIXES {
        queries.push(format!("{} {} {}", title, section, suffix));
    }
    if let Some(first) = bullets.first() {
        let keywords = first
            .text
            .split_whitespace()
            .take(FIRST_BULLET_WORDS)
            .collect::<Vec<_>>()
            .join(" ");
        if !keywords.is_empty() {
            queries.push(format!("{} {}", title, keywords));
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(queries.len());
    for query in queries {
        let query = query.split_whitespace().collect::<Vec<_>>().join(" ");
        if !query.is_empty() && !unique.iter().any(|q| q.eq_ignore_ascii_case(&query)) {
            unique.push(query);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_order() {
        let bullets = vec![Bullet::top("Chlorophyll absorbs red and blue light")];
        let queries = image_queries("Photosynthesis", "Light Reactions", &bullets);

        assert_eq!(queries[0], "Photosynthesis");
        assert_eq!(queries[1], "Light Reactions Photosynthesis");
        assert_eq!(queries[2], "Photosynthesis Light Reactions illustration");
        assert_eq!(
            queries.last().unwrap(),
            "Photosynthesis Chlorophyll absorbs red"
        );
        assert_eq!(queries.len(), 8);
    }

    #[test]
    fn test_queries_without_bullets() {
        let queries = image_queries("Tides", "Introduction", &[]);
        assert_eq!(queries.len(), 7);
    }

    #[test]
    fn test_queries_deduplicated_and_nonempty() {
        let queries = image_queries("", "", &[]);
        assert!(queries.iter().all(|q| !q.is_empty()));
        let mut sorted = queries.clone();
        sorted.dedup();
        assert_eq!(sorted.len(), queries.len());
        assert_eq!(queries[0], "illustration");
    }
}
