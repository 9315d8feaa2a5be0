//! Prompt-driven edits with automatic background removal.
//!
//! An edit adds the service's result as a new object over the original and
//! then mattes it. Matting replaces the object it is given with a
//! transparent version scaled to the same footprint. Matting is best
//! effort: its failures are logged and never shown to the user.

use std::sync::Arc;

use canvas_core::{CanvasError, EditorHandle, Notice, ObjectId, Transform};

use crate::bitmap::{image_object, rasterize};
use crate::busy::BusyFlag;
use crate::config::VisionConfig;
use crate::error::{ServiceError, VisionError, VisionResult};
use crate::service::{BackgroundRemovalService, ImageEditService};

/// Coordinates the edit and background-removal services.
pub struct AiEditOrchestrator {
    edit_service: Arc<dyn ImageEditService>,
    background_service: Arc<dyn BackgroundRemovalService>,
    config: VisionConfig,
    edit_busy: BusyFlag,
    background_busy: BusyFlag,
}

impl std::fmt::Debug for AiEditOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiEditOrchestrator")
            .field("config", &self.config)
            .field("edit_busy", &self.edit_busy)
            .field("background_busy", &self.background_busy)
            .finish_non_exhaustive()
    }
}

impl AiEditOrchestrator {
    /// Create an orchestrator over the two services.
    #[must_use]
    pub fn new(
        edit_service: Arc<dyn ImageEditService>,
        background_service: Arc<dyn BackgroundRemovalService>,
        config: VisionConfig,
    ) -> Self {
        Self {
            edit_service,
            background_service,
            config,
            edit_busy: BusyFlag::new("AI edit"),
            background_busy: BusyFlag::new("Background removal"),
        }
    }

    /// Whether an edit is pending.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.edit_busy.is_busy()
    }

    /// Whether background removal is pending.
    #[must_use]
    pub fn is_removing_background(&self) -> bool {
        self.background_busy.is_busy()
    }

    /// Edit the active image according to `prompt`.
    ///
    /// The result is added over the original with the original's transform,
    /// becomes the active object, and is then matted. Returns the ID of the
    /// final object: the matted one, or the un-matted edit if matting failed.
    /// Failures are reported through the editor's notifier and leave the
    /// original untouched.
    ///
    /// # Errors
    ///
    /// - [`VisionError::EmptyPrompt`] if `prompt` is blank.
    /// - [`VisionError::Busy`] if an edit is already pending.
    /// - [`VisionError::NoSelection`] or [`VisionError::NotAnImage`] if the
    ///   active object is missing or not a bitmap.
    /// - [`VisionError::Service`] if the edit service fails.
    pub async fn edit_with_prompt(
        &self,
        editor: &EditorHandle,
        prompt: &str,
    ) -> VisionResult<ObjectId> {
        match self.run_edit(editor, prompt).await {
            Ok(id) => Ok(id),
            Err(err) => {
                if err.is_validation() {
                    tracing::debug!(error = %err, "AI edit rejected");
                } else {
                    tracing::error!(error = %err, "AI edit failed");
                }
                editor.read(|e| e.notify(Notice::error(format!("AI edit failed: {err}"))));
                Err(err)
            }
        }
    }

    async fn run_edit(&self, editor: &EditorHandle, prompt: &str) -> VisionResult<ObjectId> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(VisionError::EmptyPrompt);
        }
        let _guard = self.edit_busy.try_acquire()?;

        let source = editor
            .read(|e| e.active().cloned())
            .ok_or(VisionError::NoSelection)?;
        let bitmap = rasterize(&source)?;
        tracing::info!(source = %source.id, prompt, "Submitting image for AI edit");

        let edited = self.edit_service.edit(&bitmap, prompt).await?;
        let object = image_object(&edited)?
            .with_transform(source.transform)
            .with_label(self.config.edited_label.clone());

        let edited_id = editor.write(|e| {
            let id = e.add(object);
            e.set_active(Some(id)).map(|()| id)
        })?;
        tracing::info!(source = %source.id, edited = %edited_id, "Added AI edit");

        Ok(self
            .remove_background(editor, edited_id)
            .await
            .unwrap_or(edited_id))
    }

    /// Replace object `id` with a background-free version of itself.
    ///
    /// The result keeps the original's position, rotation and label, and is
    /// scaled uniformly so its larger side matches the original's larger
    /// on-canvas side. The swap is recorded as a removal followed by an add.
    /// Failures are logged only; the original stays in place.
    ///
    /// # Errors
    ///
    /// - [`VisionError::Busy`] if background removal is already pending.
    /// - [`VisionError::Canvas`] if `id` is not in the scene.
    /// - [`VisionError::NotAnImage`] if the object is not a bitmap.
    /// - [`VisionError::Service`] if the service fails or returns an empty image.
    pub async fn remove_background(
        &self,
        editor: &EditorHandle,
        id: ObjectId,
    ) -> VisionResult<ObjectId> {
        let result = self.run_remove_background(editor, id).await;
        if let Err(err) = &result {
            tracing::warn!(object = %id, error = %err, "Background removal failed");
        }
        result
    }

    #[allow(clippy::cast_precision_loss)]
    async fn run_remove_background(
        &self,
        editor: &EditorHandle,
        id: ObjectId,
    ) -> VisionResult<ObjectId> {
        let _guard = self.background_busy.try_acquire()?;

        let source = editor
            .read(|e| e.scene().get(id).cloned())
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        let bitmap = rasterize(&source)?;

        let matted = self.background_service.remove_background(&bitmap).await?;
        let longest = matted.width().max(matted.height());
        if longest == 0 {
            return Err(ServiceError::InvalidResponse("empty image".to_string()).into());
        }

        let (footprint_w, footprint_h) = source.footprint();
        let scale = footprint_w.max(footprint_h) / longest as f32;
        let object = image_object(&matted)?
            .with_transform(Transform {
                scale_x: scale,
                scale_y: scale,
                ..source.transform
            })
            .with_label(source.label.clone())
            .with_selectable(source.selectable)
            .with_interactive(source.interactive);

        let new_id = editor.write(|e| e.replace(id, object))?;
        tracing::info!(original = %id, matted = %new_id, scale, "Replaced with matted image");
        Ok(new_id)
    }
}
