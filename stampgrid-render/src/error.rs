use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid grid layout: {reason}")]
    InvalidLayout { reason: String },

    #[error(transparent)]
    Core(#[from] stampgrid_core::CoreError),
}

/// A single image could not be fetched or decoded.
///
/// Always recovered locally by showing the placeholder visual.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImageLoadError {
    #[error("image not found: {path}")]
    NotFound { path: String },

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to decode image: {0}")]
    Decode(String),
}
