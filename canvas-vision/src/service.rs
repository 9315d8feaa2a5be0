//! External image services.
//!
//! The editor never talks to a transport directly. Applications implement
//! these traits over whatever client they use; tests implement them with
//! in-memory fakes. Timeouts belong to the implementation.

use async_trait::async_trait;

use crate::bitmap::Bitmap;
use crate::error::ServiceError;
use crate::mask::SegmentationMask;

/// Splits an image into candidate regions.
#[async_trait]
pub trait SegmentationService: Send + Sync {
    /// Return candidate masks in the service's preferred order, in the
    /// input bitmap's pixel coordinates.
    async fn segment(&self, image: &Bitmap) -> Result<Vec<SegmentationMask>, ServiceError>;
}

/// Applies a natural-language edit to an image.
#[async_trait]
pub trait ImageEditService: Send + Sync {
    /// Return the edited image.
    async fn edit(&self, image: &Bitmap, instruction: &str) -> Result<Bitmap, ServiceError>;
}

/// Mattes the foreground of an image.
#[async_trait]
pub trait BackgroundRemovalService: Send + Sync {
    /// Return the image with a transparent background.
    async fn remove_background(&self, image: &Bitmap) -> Result<Bitmap, ServiceError>;
}
