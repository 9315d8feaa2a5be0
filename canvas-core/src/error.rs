//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Object not found in the scene.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// A z-order index outside the scene.
    #[error("Index {index} out of range for scene of {len} objects")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of objects in the scene.
        len: usize,
    },

    /// Invalid operation on an object or the editor.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A history snapshot could not be decoded.
    ///
    /// Snapshots are only ever produced by the engine itself, so this
    /// indicates a defect rather than a user-triggerable condition.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Configuration rejected during validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
