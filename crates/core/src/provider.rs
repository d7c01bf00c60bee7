//! Seams for the remote collaborators: outline text generation and image
//! search.

use crate::error::{Error, Result};
use crate::types::DetailLevel;
use serde::{Deserialize, Serialize};

/// Produces raw outline text for a topic.
pub trait TextGenerator {
    /// Ask for an outline of `topic` at the given level of detail.
    fn generate(&self, topic: &str, detail: DetailLevel) -> Result<String>;
}

/// A single image search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Provider-specific identifier.
    pub id: String,

    /// Where the image bytes can be fetched.
    pub download_url: String,

    /// Human description, used only for logging.
    pub description: Option<String>,
}

/// Finds and downloads images for a query.
pub trait ImageSearch {
    /// Up to `count` candidates for `query`. An empty result is not an error.
    fn search(&self, query: &str, count: usize) -> Result<Vec<ImageCandidate>>;

    /// Fetch the raw bytes of a candidate.
    fn download(&self, candidate: &ImageCandidate) -> Result<Vec<u8>>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn generate(&self, topic: &str, detail: DetailLevel) -> Result<String> {
        (**self).generate(topic, detail)
    }
}

impl<T: ImageSearch + ?Sized> ImageSearch for &T {
    fn search(&self, query: &str, count: usize) -> Result<Vec<ImageCandidate>> {
        (**self).search(query, count)
    }

    fn download(&self, candidate: &ImageCandidate) -> Result<Vec<u8>> {
        (**self).download(candidate)
    }
}

/// Stand-in for both collaborators when no credentials are configured.
///
/// Text generation always fails, so the caller falls back to the built-in
/// outline. Image search finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl TextGenerator for Offline {
    fn generate(&self, _topic: &str, _detail: DetailLevel) -> Result<String> {
        Err(Error::Upstream("text generation is not configured".into()))
    }
}

impl ImageSearch for Offline {
    fn search(&self, _query: &str, _count: usize) -> Result<Vec<ImageCandidate>> {
        Ok(Vec::new())
    }

    fn download(&self, candidate: &ImageCandidate) -> Result<Vec<u8>> {
        Err(Error::Upstream(format!(
            "image download is not configured ({})",
            candidate.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_text_is_recoverable() {
        let err = Offline.generate("Tides", DetailLevel::Simple).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_offline_search_is_empty() {
        assert!(Offline.search("tides", 5).unwrap().is_empty());
    }

    #[test]
    fn test_reference_forwarding() {
        let offline = Offline;
        let by_ref: &dyn ImageSearch = &offline;
        assert!(by_ref.search("anything", 1).unwrap().is_empty());
    }

    #[test]
    fn test_candidate_serde() {
        let candidate = ImageCandidate {
            id: "abc".into(),
            download_url: "https://images.example/abc.jpg".into(),
            description: None,
        };
        let json = serde_json::to_string(&candidate).unwrap();
        let back: ImageCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candidate);
    }
}
