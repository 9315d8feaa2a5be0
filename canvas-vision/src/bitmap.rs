//! Bitmaps and their `data:` URI form.
//!
//! Image objects in the scene carry their pixels as PNG data URIs so that
//! history snapshots stay self-contained. This module converts between that
//! form and RGBA pixel buffers.

use base64::Engine;
use canvas_core::{ObjectKind, SceneObject};
use image::{imageops, ImageFormat, RgbaImage};

use crate::error::{VisionError, VisionResult};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// An RGBA8 bitmap at native resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap(RgbaImage);

impl Bitmap {
    /// Wrap an RGBA buffer.
    #[must_use]
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self(image)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Borrow the pixels.
    #[must_use]
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.0
    }

    /// Take the pixels.
    #[must_use]
    pub fn into_rgba(self) -> RgbaImage {
        self.0
    }

    /// Decode any format the `image` crate recognizes.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Raster`] if the bytes are not a decodable image.
    pub fn decode(bytes: &[u8]) -> VisionResult<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self(image.to_rgba8()))
    }

    /// Encode as PNG, the transport format for services.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Raster`] if encoding fails.
    pub fn to_png(&self) -> VisionResult<Vec<u8>> {
        let mut buf = std::io::Cursor::new(Vec::new());
        self.0.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// Encode as a base64 PNG data URI.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Raster`] if encoding fails.
    pub fn to_data_uri(&self) -> VisionResult<String> {
        let png = self.to_png()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png);
        Ok(format!("{PNG_DATA_URI_PREFIX}{encoded}"))
    }

    /// Decode a base64 image data URI, e.g. `data:image/png;base64,iVBORw0KGgo...`.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Raster`] if the URI is malformed, not base64,
    /// or does not contain a decodable image.
    pub fn from_data_uri(uri: &str) -> VisionResult<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| VisionError::Raster("Not a data URI".to_string()))?;

        let (metadata, encoded) = rest
            .split_once(',')
            .ok_or_else(|| VisionError::Raster("Invalid data URI: missing comma".to_string()))?;

        if !metadata.starts_with("image/") || !metadata.ends_with(";base64") {
            return Err(VisionError::Raster(format!(
                "Unsupported data URI metadata: {metadata}"
            )));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| VisionError::Raster(format!("Failed to decode base64: {e}")))?;

        Self::decode(&bytes)
    }

    /// Resample to an exact size.
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> Self {
        Self(imageops::resize(
            &self.0,
            width.max(1),
            height.max(1),
            imageops::FilterType::Triangle,
        ))
    }

    /// Whether every pixel is fully transparent.
    #[must_use]
    pub fn is_fully_transparent(&self) -> bool {
        self.0.pixels().all(|p| p.0[3] == 0)
    }
}

/// Rasterize an image object at its native resolution, independent of its
/// on-screen scale or the current zoom.
///
/// # Errors
///
/// Returns [`VisionError::NotAnImage`] for non-bitmap objects and
/// [`VisionError::Raster`] if the pixel source cannot be decoded.
pub fn rasterize(object: &SceneObject) -> VisionResult<Bitmap> {
    match &object.kind {
        ObjectKind::Image { src, .. } => Bitmap::from_data_uri(src),
        other => Err(VisionError::NotAnImage(other.name())),
    }
}

/// Build an image object from a bitmap.
///
/// # Errors
///
/// Returns [`VisionError::Raster`] if encoding fails.
pub fn image_object(bitmap: &Bitmap) -> VisionResult<SceneObject> {
    Ok(SceneObject::image(
        bitmap.to_data_uri()?,
        bitmap.width(),
        bitmap.height(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(width: u32, height: u32) -> Bitmap {
        Bitmap::from_rgba(RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 128])
            }
        }))
    }

    #[test]
    fn test_data_uri_preserves_pixels() {
        let bitmap = checker(7, 5);
        let uri = bitmap.to_data_uri().expect("encode");
        assert!(uri.starts_with(PNG_DATA_URI_PREFIX));

        let decoded = Bitmap::from_data_uri(&uri).expect("decode");
        assert_eq!(decoded, bitmap);
    }

    #[test]
    fn test_malformed_data_uris() {
        for uri in [
            "https://example.com/a.png",
            "data:image/png;base64",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,rawdata",
            "data:image/png;base64,!!!",
            "data:image/png;base64,aGVsbG8=",
        ] {
            assert!(
                matches!(Bitmap::from_data_uri(uri), Err(VisionError::Raster(_))),
                "{uri} should be rejected"
            );
        }
    }

    #[test]
    fn test_rasterize_uses_native_size() {
        let bitmap = checker(12, 9);
        let object = image_object(&bitmap)
            .expect("object")
            .with_transform(canvas_core::Transform {
                scale_x: 3.0,
                scale_y: 0.25,
                ..canvas_core::Transform::at(40.0, 40.0)
            });
        let raster = rasterize(&object).expect("rasterize");
        assert_eq!((raster.width(), raster.height()), (12, 9));
    }

    #[test]
    fn test_rasterize_rejects_non_images() {
        let text = SceneObject::new(ObjectKind::Text {
            content: "hi".to_string(),
            font_size: 12.0,
            color: "#000".to_string(),
        });
        assert!(matches!(
            rasterize(&text),
            Err(VisionError::NotAnImage("text"))
        ));
    }

    #[test]
    fn test_resized_and_transparency() {
        let clear = Bitmap::from_rgba(RgbaImage::new(4, 4));
        assert!(clear.is_fully_transparent());
        assert!(!checker(4, 4).is_fully_transparent());

        let scaled = checker(10, 4).resized(5, 2);
        assert_eq!((scaled.width(), scaled.height()), (5, 2));
    }
}
