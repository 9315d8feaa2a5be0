//! Polygon cut-outs.
//!
//! A cut-out keeps the source pixels that lie inside the mask outline and
//! clears everything else (destination-in), then crops to the mask box.
//! Pixels are tested at their centers; rings combine with the even-odd rule
//! so inner rings punch holes.

use canvas_core::{point_in_rings, Point};
use image::{Rgba, RgbaImage};

use crate::bitmap::Bitmap;
use crate::error::{VisionError, VisionResult};
use crate::mask::SegmentationMask;

/// A cut-out bitmap and where its top-left pixel sat in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct CutOut {
    /// The cropped, masked pixels.
    pub bitmap: Bitmap,
    /// Top-left of the crop in source pixel coordinates.
    pub origin: Point,
}

/// Cut the region outlined by `mask` out of `source`.
///
/// # Errors
///
/// Returns [`VisionError::Raster`] if the mask box misses the image or the
/// outline encloses no pixel centers.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn cut_out(source: &Bitmap, mask: &SegmentationMask) -> VisionResult<CutOut> {
    let (width, height) = (source.width(), source.height());
    let bbox = &mask.bounding_box;

    let x0 = bbox.x.max(0.0).floor() as u32;
    let y0 = bbox.y.max(0.0).floor() as u32;
    let x1 = (bbox.right().min(width as f32).ceil().max(0.0) as u32).min(width);
    let y1 = (bbox.bottom().min(height as f32).ceil().max(0.0) as u32).min(height);
    if x1 <= x0 || y1 <= y0 {
        return Err(VisionError::Raster(format!(
            "Mask box {bbox:?} lies outside the {width}x{height} image"
        )));
    }

    let pixels = source.as_rgba();
    let clear = Rgba([0, 0, 0, 0]);
    let mut kept = 0_usize;
    let cropped = RgbaImage::from_fn(x1 - x0, y1 - y0, |cx, cy| {
        let (sx, sy) = (x0 + cx, y0 + cy);
        let center = Point::new(sx as f32 + 0.5, sy as f32 + 0.5);
        if point_in_rings(center, &mask.polygon) {
            kept += 1;
            *pixels.get_pixel(sx, sy)
        } else {
            clear
        }
    });

    if kept == 0 {
        return Err(VisionError::Raster(
            "Mask outline encloses no pixels".to_string(),
        ));
    }

    Ok(CutOut {
        bitmap: Bitmap::from_rgba(cropped),
        origin: Point::new(x0 as f32, y0 as f32),
    })
}
