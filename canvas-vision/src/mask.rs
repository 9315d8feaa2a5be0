//! Segmentation masks and the filters applied before materializing them.
//!
//! Filtering runs in three passes over the masks, in the order the service
//! returned them:
//!
//! 1. drop masks whose box spans nearly the whole image,
//! 2. drop near-duplicates of an already accepted box, compared by
//!    intersection over union,
//! 3. drop masks without a usable outline.

use canvas_core::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

use crate::config::VisionConfig;

/// One candidate region returned by the segmentation service, in the
/// source bitmap's pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationMask {
    /// Box around the region.
    pub bounding_box: BoundingBox,
    /// Outline rings; the first is the outer boundary, later rings are holes.
    #[serde(default)]
    pub polygon: Vec<Vec<Point>>,
    /// Service confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f32,
}

impl SegmentationMask {
    /// Whether the outline can enclose any area.
    #[must_use]
    pub fn has_outline(&self) -> bool {
        self.polygon.first().is_some_and(|ring| ring.len() >= 3)
    }
}

/// Apply the whole-image, duplicate and outline filters.
///
/// Dimensions are those of the bitmap the masks were computed on.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn filter_masks(
    masks: Vec<SegmentationMask>,
    width: u32,
    height: u32,
    config: &VisionConfig,
) -> Vec<SegmentationMask> {
    let total = masks.len();
    let (w, h) = (width as f32, height as f32);

    let mut accepted: Vec<SegmentationMask> = Vec::with_capacity(total);
    let mut whole_image = 0;
    let mut duplicates = 0;
    for mask in masks {
        if mask
            .bounding_box
            .covers(w, h, config.whole_image_fraction)
        {
            whole_image += 1;
            continue;
        }
        let max_iou = accepted
            .iter()
            .map(|kept| kept.bounding_box.iou(&mask.bounding_box))
            .fold(0.0_f32, f32::max);
        if max_iou > config.duplicate_iou {
            duplicates += 1;
            continue;
        }
        accepted.push(mask);
    }

    let before_outline = accepted.len();
    accepted.retain(SegmentationMask::has_outline);
    let malformed = before_outline - accepted.len();

    tracing::debug!(
        total,
        whole_image,
        duplicates,
        malformed,
        kept = accepted.len(),
        "Filtered segmentation masks"
    );
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(x: f32, y: f32, w: f32, h: f32) -> SegmentationMask {
        SegmentationMask {
            bounding_box: BoundingBox::new(x, y, w, h),
            polygon: vec![vec![
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ]],
            confidence: 0.9,
        }
    }

    fn filter(masks: Vec<SegmentationMask>) -> Vec<SegmentationMask> {
        filter_masks(masks, 200, 200, &VisionConfig::default())
    }

    #[test]
    fn test_identical_boxes_keep_first() {
        let mut first = mask(10.0, 10.0, 50.0, 50.0);
        first.confidence = 0.1;
        let second = mask(10.0, 10.0, 50.0, 50.0);
        let kept = filter(vec![first.clone(), second]);
        assert_eq!(kept, vec![first]);
    }

    #[test]
    fn test_moderate_overlap_keeps_both() {
        // IoU = 50*40 / (2*2500 - 2000) = 2/3
        let kept = filter(vec![
            mask(0.0, 0.0, 50.0, 50.0),
            mask(10.0, 0.0, 50.0, 50.0),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_duplicate_checked_against_all_accepted() {
        let kept = filter(vec![
            mask(0.0, 0.0, 40.0, 40.0),
            mask(100.0, 100.0, 40.0, 40.0),
            mask(101.0, 100.0, 40.0, 40.0),
        ]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_whole_image_rejected_regardless_of_confidence() {
        let mut whole = mask(0.0, 0.0, 190.0, 195.0);
        whole.confidence = 1.0;
        let tall_strip = mask(0.0, 0.0, 40.0, 200.0);
        let kept = filter(vec![whole, tall_strip.clone()]);
        assert_eq!(kept, vec![tall_strip]);
    }

    #[test]
    fn test_whole_image_does_not_shadow_later_masks() {
        let kept = filter(vec![
            mask(0.0, 0.0, 200.0, 200.0),
            mask(0.0, 0.0, 179.0, 200.0),
        ]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_masks_without_outline_dropped() {
        let mut empty = mask(0.0, 0.0, 30.0, 30.0);
        empty.polygon.clear();
        let mut empty_ring = mask(50.0, 50.0, 30.0, 30.0);
        empty_ring.polygon = vec![Vec::new()];
        let mut line = mask(100.0, 100.0, 30.0, 30.0);
        line.polygon = vec![vec![Point::new(100.0, 100.0), Point::new(130.0, 130.0)]];
        let good = mask(150.0, 0.0, 30.0, 30.0);

        let kept = filter(vec![empty, empty_ring, line, good.clone()]);
        assert_eq!(kept, vec![good]);
    }

    #[test]
    fn test_mask_deserializes_without_polygon() {
        let json = r#"{"bounding_box": {"x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0}}"#;
        let mask: SegmentationMask = serde_json::from_str(json).expect("valid");
        assert!(!mask.has_outline());
        assert!(mask.confidence.abs() < f32::EPSILON);
    }
}
