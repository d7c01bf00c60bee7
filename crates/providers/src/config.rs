//! Provider configuration read from the environment.

use std::env;
use std::time::Duration;

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";

/// Settings for the Groq chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl GroqConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Settings for the Unsplash search API.
#[derive(Debug, Clone)]
pub struct UnsplashConfig {
    pub access_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl UnsplashConfig {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: DEFAULT_UNSPLASH_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Credentials and endpoints for both collaborators. A missing key leaves
/// that collaborator unconfigured.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub groq: Option<GroqConfig>,
    pub unsplash: Option<UnsplashConfig>,
}

impl ProviderConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let groq = var("GROQ_API_KEY").map(|key| {
            let mut config = GroqConfig::new(key);
            if let Some(model) = var("GROQ_MODEL") {
                config.model = model;
            }
            if let Some(url) = var("GROQ_BASE_URL") {
                config.base_url = url.trim_end_matches('/').to_string();
            }
            config
        });

        let unsplash = var("UNSPLASH_ACCESS_KEY").map(|key| {
            let mut config = UnsplashConfig::new(key);
            if let Some(url) = var("UNSPLASH_BASE_URL") {
                config.base_url = url.trim_end_matches('/').to_string();
            }
            config
        });

        Self { groq, unsplash }
    }
}
