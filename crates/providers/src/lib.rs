//! Network collaborators: Groq for outline text, Unsplash for images.

pub mod config;
pub mod groq;
pub mod unsplash;

pub use config::{GroqConfig, ProviderConfig, UnsplashConfig};
pub use groq::{outline_prompt, GroqClient};
pub use unsplash::UnsplashClient;
