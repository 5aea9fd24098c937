//! Error types for answerspace library.

use std::io;
use thiserror::Error;

/// Result type alias for answerspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while editing, rendering or exporting.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A spacer failed validation (negative offset, non-positive height, ...).
    #[error("Invalid spacer: {0}")]
    InvalidSpacer(String),

    /// A spacer style name is not one of the known patterns.
    #[error("Unknown spacer style: {0}")]
    UnknownStyle(String),

    /// No spacer with the given id exists.
    #[error("Spacer not found: {0}")]
    SpacerNotFound(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// The page rasterizer failed to produce an image for a page.
    #[error("Failed to rasterize page {page}: {message}")]
    Rasterization {
        /// 1-indexed page number
        page: usize,
        /// Collaborator error message
        message: String,
    },

    /// An export or view option is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// A background render task panicked or was cancelled by the runtime.
    #[error("Render task failed: {0}")]
    Task(String),

    /// A persisted settings or project blob is malformed.
    #[error("Settings error: {0}")]
    Settings(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding or encoding error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    /// Build a rasterization failure for a 1-indexed page.
    pub fn rasterization(page: usize, message: impl Into<String>) -> Self {
        Error::Rasterization {
            page,
            message: message.into(),
        }
    }

    /// Whether this error was raised at the spacer validation boundary.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::InvalidSpacer(_) | Error::UnknownStyle(_))
    }
}
