//! Vision error types.

use canvas_core::CanvasError;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Failures reported by an external image service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request never completed (connection, timeout, etc.).
    #[error("Service transport failed: {0}")]
    Transport(String),

    /// The service answered with an error.
    #[error("Service rejected the request: {0}")]
    Rejected(String),

    /// The service answered with something we could not use.
    #[error("Invalid service response: {0}")]
    InvalidResponse(String),
}

/// Errors that can occur in vision operations.
#[derive(Debug, Error)]
pub enum VisionError {
    /// No single object is selected.
    #[error("Select an image first")]
    NoSelection,

    /// The selected object is not a bitmap.
    #[error("The selected object is a {0}, not an image")]
    NotAnImage(&'static str),

    /// An edit was requested without instructions.
    #[error("Describe the edit before submitting")]
    EmptyPrompt,

    /// The same kind of operation is already running.
    #[error("{0} is already in progress")]
    Busy(&'static str),

    /// An external service failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Decoding, encoding or compositing a bitmap failed.
    #[error("Raster error: {0}")]
    Raster(String),

    /// The editor refused a mutation.
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

impl VisionError {
    /// Whether the error comes from a failed precondition the user can fix,
    /// as opposed to a service or internal failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoSelection | Self::NotAnImage(_) | Self::EmptyPrompt | Self::Busy(_)
        )
    }
}

impl From<image::ImageError> for VisionError {
    fn from(e: image::ImageError) -> Self {
        Self::Raster(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(VisionError::NoSelection.is_validation());
        assert!(VisionError::NotAnImage("text").is_validation());
        assert!(VisionError::Busy("Segmentation").is_validation());
        assert!(!VisionError::Service(ServiceError::Transport("down".into())).is_validation());
        assert!(!VisionError::Raster("bad".into()).is_validation());
    }
}
