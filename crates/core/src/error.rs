//! Error types for slide-deck generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating a presentation.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A remote collaborator (text generation or image search) failed or
    /// returned unusable data.
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    /// The requested theme file does not exist.
    #[error("Theme not found: {}", .0.display())]
    ThemeNotFound(PathBuf),

    /// The theme file exists but is not a usable presentation package.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    XmlError(String),

    /// Image bytes could not be decoded or converted.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Failed to build a slide.
    #[error("Render error: {0}")]
    Render(String),
}

impl Error {
    /// Whether the pipeline substitutes a local fallback for this error
    /// instead of aborting the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Upstream(_)
                | Error::ThemeNotFound(_)
                | Error::InvalidTemplate(_)
                | Error::ImageError(_)
        )
    }
}
