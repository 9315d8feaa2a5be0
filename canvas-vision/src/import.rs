//! Image import.

use canvas_core::{EditorHandle, ObjectId, Point, Transform};

use crate::bitmap::{image_object, Bitmap};
use crate::config::VisionConfig;
use crate::error::VisionResult;

/// Decode `bytes` and add them as an image centered in the visible area.
///
/// Images larger than the visible area are scaled down uniformly to fit;
/// smaller ones keep their native size. The new object becomes active.
///
/// # Errors
///
/// Returns [`VisionError::Raster`](crate::VisionError::Raster) if the bytes
/// are not a decodable image, or
/// [`VisionError::Canvas`](crate::VisionError::Canvas) if it cannot be
/// selected.
#[allow(clippy::cast_precision_loss)]
pub fn import_image(
    editor: &EditorHandle,
    bytes: &[u8],
    config: &VisionConfig,
) -> VisionResult<ObjectId> {
    let bitmap = Bitmap::decode(bytes)?;
    let object = image_object(&bitmap)?.with_label(config.imported_label.clone());
    let (width, height) = (bitmap.width() as f32, bitmap.height() as f32);

    let id = editor.write(|e| {
        let viewport = e.viewport();
        let zoom = viewport.zoom();
        let center = viewport.screen_to_canvas(viewport.center());
        let scale = (viewport.width / zoom / width)
            .min(viewport.height / zoom / height)
            .min(1.0);
        let transform = Transform {
            scale_x: scale,
            scale_y: scale,
            ..Transform::at(
                center.x - width * scale / 2.0,
                center.y - height * scale / 2.0,
            )
        };

        let id = e.add(object.with_transform(transform));
        e.set_active(Some(id)).map(|()| id)
    })?;

    tracing::info!(
        object = %id,
        width = bitmap.width(),
        height = bitmap.height(),
        "Imported image"
    );
    Ok(id)
}

/// Center of the visible area in canvas coordinates.
#[must_use]
pub fn visible_center(editor: &EditorHandle) -> Point {
    editor.read(|e| e.viewport().screen_to_canvas(e.viewport().center()))
}
