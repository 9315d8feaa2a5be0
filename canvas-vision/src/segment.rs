//! Segmentation import: split the active image into cut-out objects.

use std::sync::Arc;

use canvas_core::{EditorHandle, Notice, SceneObject, Transform};

use crate::bitmap::{image_object, rasterize, Bitmap};
use crate::busy::BusyFlag;
use crate::composite::cut_out;
use crate::config::VisionConfig;
use crate::error::{VisionError, VisionResult};
use crate::mask::{filter_masks, SegmentationMask};
use crate::service::SegmentationService;

/// Turns the active image into one object per distinct segment.
pub struct SegmentationPipeline {
    service: Arc<dyn SegmentationService>,
    config: VisionConfig,
    busy: BusyFlag,
}

impl std::fmt::Debug for SegmentationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationPipeline")
            .field("config", &self.config)
            .field("busy", &self.busy)
            .finish_non_exhaustive()
    }
}

impl SegmentationPipeline {
    /// Create a pipeline over a segmentation service.
    #[must_use]
    pub fn new(service: Arc<dyn SegmentationService>, config: VisionConfig) -> Self {
        Self {
            service,
            config,
            busy: BusyFlag::new("Segmentation"),
        }
    }

    /// Whether a segmentation call is pending.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// Segment the active image and add the cut-outs on top of the scene.
    ///
    /// Returns the number of objects added. Success and failure are both
    /// reported through the editor's notifier. A service failure adds
    /// nothing; a mask that cannot be cut out is skipped.
    ///
    /// # Errors
    ///
    /// - [`VisionError::Busy`] if a segmentation call is already pending.
    /// - [`VisionError::NoSelection`] or [`VisionError::NotAnImage`] if the
    ///   active object is missing or not a bitmap.
    /// - [`VisionError::Service`] if the service fails.
    /// - [`VisionError::Raster`] if the source pixels cannot be decoded.
    pub async fn segment(&self, editor: &EditorHandle) -> VisionResult<usize> {
        let result = self.run(editor).await;
        let notice = match &result {
            Ok(count) => Notice::info(added_message(*count)),
            Err(err) => {
                if err.is_validation() {
                    tracing::debug!(error = %err, "Segmentation rejected");
                } else {
                    tracing::error!(error = %err, "Segmentation failed");
                }
                Notice::error(format!("Segmentation failed: {err}"))
            }
        };
        editor.read(|e| e.notify(notice));
        result
    }

    async fn run(&self, editor: &EditorHandle) -> VisionResult<usize> {
        let _guard = self.busy.try_acquire()?;

        let source = editor
            .read(|e| e.active().cloned())
            .ok_or(VisionError::NoSelection)?;
        let bitmap = rasterize(&source)?;
        tracing::info!(
            source = %source.id,
            width = bitmap.width(),
            height = bitmap.height(),
            "Submitting image for segmentation"
        );

        let masks = self.service.segment(&bitmap).await?;
        let masks = filter_masks(masks, bitmap.width(), bitmap.height(), &self.config);

        let objects: Vec<SceneObject> = masks
            .iter()
            .enumerate()
            .filter_map(|(index, mask)| match materialize(&bitmap, mask, &source) {
                Ok(object) => Some(object),
                Err(err) => {
                    tracing::warn!(index, error = %err, "Skipping mask");
                    None
                }
            })
            .collect();

        let count = objects.len();
        editor.write(|e| {
            for (n, object) in objects.into_iter().enumerate() {
                e.add(object.with_label(self.config.segment_label(n + 1)));
            }
        });
        tracing::info!(count, source = %source.id, "Added segments");
        Ok(count)
    }
}

/// Cut out one mask and place it where its pixels sit in the source object.
fn materialize(
    bitmap: &Bitmap,
    mask: &SegmentationMask,
    source: &SceneObject,
) -> VisionResult<SceneObject> {
    let cut = cut_out(bitmap, mask)?;
    let position = source.transform.local_to_scene().map_point(cut.origin);
    let transform = Transform {
        x: position.x,
        y: position.y,
        scale_x: source.transform.scale_x,
        scale_y: source.transform.scale_y,
        rotation: 0.0,
    };
    Ok(image_object(&cut.bitmap)?.with_transform(transform))
}

fn added_message(count: usize) -> String {
    if count == 1 {
        "Added 1 segment".to_string()
    } else {
        format!("Added {count} segments")
    }
}
