//! Image search and download through the Unsplash API.

use crate::config::UnsplashConfig;
use deckgen_core::{Error, ImageCandidate, ImageSearch, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

/// Unsplash caps `per_page` at 30.
const MAX_PER_PAGE: usize = 30;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    id: String,
    urls: PhotoUrls,
    description: Option<String>,
    alt_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: String,
}

impl From<Photo> for ImageCandidate {
    fn from(photo: Photo) -> Self {
        let description = photo
            .description
            .filter(|d| !d.trim().is_empty())
            .or(photo.alt_description);
        ImageCandidate {
            id: photo.id,
            download_url: photo.urls.regular,
            description,
        }
    }
}

/// Image search backed by Unsplash.
pub struct UnsplashClient {
    config: UnsplashConfig,
    client: Client,
}

impl UnsplashClient {
    pub fn new(config: UnsplashConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Upstream(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

impl ImageSearch for UnsplashClient {
    fn search(&self, query: &str, count: usize) -> Result<Vec<ImageCandidate>> {
        let per_page = count.clamp(1, MAX_PER_PAGE).to_string();
        let response = self
            .client
            .get(format!("{}/search/photos", self.config.base_url))
            .header("Authorization", format!("Client-ID {}", self.config.access_key))
            .header("Accept-Version", "v1")
            .query(&[("query", query), ("per_page", per_page.as_str())])
            .send()
            .map_err(|e| Error::Upstream(format!("Unsplash search failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!("Unsplash returned {} for '{}'", status, query)));
        }

        let body: SearchResponse = response
            .json()
            .map_err(|e| Error::Upstream(format!("Unreadable Unsplash response: {}", e)))?;
        log::debug!("Unsplash: {} results for '{}'", body.results.len(), query);
        Ok(body.results.into_iter().map(ImageCandidate::from).collect())
    }

    fn download(&self, candidate: &ImageCandidate) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&candidate.download_url)
            .send()
            .map_err(|e| Error::Upstream(format!("Download of {} failed: {}", candidate.id, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "Download of {} returned {}",
                candidate.id, status
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::Upstream(format!("Download of {} failed: {}", candidate.id, e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "total": 2,
        "total_pages": 1,
        "results": [
            {
                "id": "abc123",
                "description": null,
                "alt_description": "green leaf in sunlight",
                "urls": {"raw": "https://images.unsplash.com/raw", "regular": "https://images.unsplash.com/regular"}
            },
            {
                "id": "def456",
                "description": "Chloroplasts under a microscope",
                "alt_description": "microscope photo",
                "urls": {"regular": "https://images.unsplash.com/other"}
            }
        ]
    }"#;

    #[test]
    fn test_search_response_maps_to_candidates() {
        let body: SearchResponse = serde_json::from_str(RESPONSE).unwrap();
        let candidates: Vec<ImageCandidate> =
            body.results.into_iter().map(ImageCandidate::from).collect();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, "abc123");
        assert_eq!(candidates[0].download_url, "https://images.unsplash.com/regular");
        assert_eq!(candidates[0].description.as_deref(), Some("green leaf in sunlight"));
        assert_eq!(
            candidates[1].description.as_deref(),
            Some("Chloroplasts under a microscope")
        );
    }

    #[test]
    fn test_missing_results_is_empty() {
        let body: SearchResponse = serde_json::from_str(r#"{"errors":["Rate Limit Exceeded"]}"#).unwrap();
        assert!(body.results.is_empty());
    }
}
