//! Geometry helpers shared by the scene, viewport and segmentation code.
//!
//! Everything here is pure: boxes, polygons and the local-to-scene mapping
//! used to place cut-outs back onto the object they came from.

use serde::{Deserialize, Serialize};

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Area of the box. Degenerate boxes have zero area.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check if a point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Overlapping region of two boxes, if they overlap with positive area.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }

    /// Intersection-over-union of two boxes, in `[0, 1]`.
    #[must_use]
    pub fn iou(&self, other: &Self) -> f32 {
        let Some(overlap) = self.intersection(other) else {
            return 0.0;
        };
        let inter = overlap.area();
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }

    /// Whether the box spans at least `fraction` of both dimensions of a
    /// `width` x `height` area.
    #[must_use]
    pub fn covers(&self, width: f32, height: f32, fraction: f32) -> bool {
        width > 0.0
            && height > 0.0
            && self.width >= width * fraction
            && self.height >= height * fraction
    }
}

/// Even-odd point-in-polygon test for a single ring.
///
/// Rings with fewer than three vertices contain nothing.
#[must_use]
pub fn point_in_polygon(point: Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Even-odd test across several rings, so inner rings cut holes.
#[must_use]
pub fn point_in_rings(point: Point, rings: &[Vec<Point>]) -> bool {
    rings
        .iter()
        .filter(|ring| point_in_polygon(point, ring))
        .count()
        % 2
        == 1
}

/// Bounding box of a ring, or `None` for an empty ring.
#[must_use]
pub fn polygon_bounds(ring: &[Point]) -> Option<BoundingBox> {
    let first = ring.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &ring[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y))
}

/// Maps coordinates local to an object's pixels into scene coordinates:
/// scale first, then offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalToScene {
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
    /// Horizontal offset applied after scaling.
    pub offset_x: f32,
    /// Vertical offset applied after scaling.
    pub offset_y: f32,
}

impl LocalToScene {
    /// Mapping that leaves coordinates unchanged.
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    /// Map a local point into the scene.
    #[must_use]
    pub fn map_point(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale_x + self.offset_x,
            point.y * self.scale_y + self.offset_y,
        )
    }

    /// Map a local box into the scene.
    #[must_use]
    pub fn map_box(&self, bbox: &BoundingBox) -> BoundingBox {
        let origin = self.map_point(Point::new(bbox.x, bbox.y));
        BoundingBox::new(
            origin.x,
            origin.y,
            bbox.width * self.scale_x,
            bbox.height * self.scale_y,
        )
    }

    /// Compose two mappings: `self` is applied first, then `outer`.
    #[must_use]
    pub fn then(&self, outer: &Self) -> Self {
        Self {
            scale_x: self.scale_x * outer.scale_x,
            scale_y: self.scale_y * outer.scale_y,
            offset_x: self.offset_x * outer.scale_x + outer.offset_x,
            offset_y: self.offset_y * outer.scale_y + outer.offset_y,
        }
    }
}

impl Default for LocalToScene {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + size, y),
            Point::new(x + size, y + size),
            Point::new(x, y + size),
        ]
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = BoundingBox::new(10.0, 10.0, 50.0, 50.0);
        assert!((a.iou(&a) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_iou_disjoint_and_touching() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        let c = BoundingBox::new(50.0, 50.0, 10.0, 10.0);
        assert!(a.iou(&b).abs() < f32::EPSILON);
        assert!(a.iou(&c).abs() < f32::EPSILON);
    }

    #[test]
    fn test_iou_partial_overlap() {
        // Overlap 5x10 = 50, union 100 + 100 - 50 = 150
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, 0.0, 10.0, 10.0);
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
        assert!((a.iou(&b) - b.iou(&a)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_iou_zero_area_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 0.0, 0.0);
        assert!(a.iou(&a).abs() < f32::EPSILON);
    }

    #[test]
    fn test_covers() {
        let whole = BoundingBox::new(0.0, 0.0, 190.0, 185.0);
        assert!(whole.covers(200.0, 200.0, 0.9));

        let wide_only = BoundingBox::new(0.0, 0.0, 200.0, 100.0);
        assert!(!wide_only.covers(200.0, 200.0, 0.9));

        let exact = BoundingBox::new(0.0, 0.0, 180.0, 180.0);
        assert!(exact.covers(200.0, 200.0, 0.9));
    }

    #[test]
    fn test_point_in_polygon() {
        let ring = square(0.0, 0.0, 10.0);
        assert!(point_in_polygon(Point::new(5.0, 5.0), &ring));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &ring));
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &ring[..2]));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // An L shape: the notch at the top right is outside.
        let ring = vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 5.0),
            Point::new(10.0, 5.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(point_in_polygon(Point::new(2.0, 2.0), &ring));
        assert!(point_in_polygon(Point::new(8.0, 8.0), &ring));
        assert!(!point_in_polygon(Point::new(8.0, 2.0), &ring));
    }

    #[test]
    fn test_point_in_rings_hole() {
        let rings = vec![square(0.0, 0.0, 10.0), square(3.0, 3.0, 4.0)];
        assert!(point_in_rings(Point::new(1.0, 1.0), &rings));
        assert!(!point_in_rings(Point::new(5.0, 5.0), &rings));
    }

    #[test]
    fn test_polygon_bounds() {
        let ring = vec![
            Point::new(3.0, 8.0),
            Point::new(-2.0, 4.0),
            Point::new(6.0, 1.0),
        ];
        let b = polygon_bounds(&ring).expect("non-empty");
        assert_eq!(b, BoundingBox::new(-2.0, 1.0, 8.0, 7.0));
        assert!(polygon_bounds(&[]).is_none());
    }

    #[test]
    fn test_local_to_scene() {
        let map = LocalToScene {
            scale_x: 0.5,
            scale_y: 2.0,
            offset_x: 100.0,
            offset_y: 50.0,
        };
        let p = map.map_point(Point::new(20.0, 10.0));
        assert!((p.x - 110.0).abs() < f32::EPSILON);
        assert!((p.y - 70.0).abs() < f32::EPSILON);

        let b = map.map_box(&BoundingBox::new(20.0, 10.0, 40.0, 5.0));
        assert!((b.width - 20.0).abs() < f32::EPSILON);
        assert!((b.height - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_local_to_scene_composition() {
        let inner = LocalToScene {
            scale_x: 2.0,
            scale_y: 2.0,
            offset_x: 5.0,
            offset_y: 5.0,
        };
        let outer = LocalToScene {
            scale_x: 0.5,
            scale_y: 0.5,
            offset_x: 10.0,
            offset_y: 20.0,
        };
        let p = Point::new(3.0, 4.0);
        let composed = inner.then(&outer).map_point(p);
        let stepwise = outer.map_point(inner.map_point(p));
        assert!((composed.x - stepwise.x).abs() < 1e-5);
        assert!((composed.y - stepwise.y).abs() < 1e-5);
    }
}
