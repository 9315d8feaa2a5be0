//! Scene objects - the drawable units of a scene.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{polygon_bounds, BoundingBox, LocalToScene, Point};

/// Unique identifier for a scene object.
///
/// Stable for the lifetime of the object; clones made for the clipboard
/// always receive a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Create a new unique object ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse an ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if `s` is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primitive vector shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Ellipse inscribed in the shape's box.
    Ellipse,
}

/// The content an object draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ObjectKind {
    /// A bitmap.
    Image {
        /// Encoded bitmap, as a `data:` URI.
        src: String,
        /// Native width in pixels.
        width: u32,
        /// Native height in pixels.
        height: u32,
    },

    /// A filled vector shape.
    Shape {
        /// Which primitive.
        shape: ShapeKind,
        /// Unscaled width.
        width: f32,
        /// Unscaled height.
        height: f32,
        /// Fill color as hex.
        fill: String,
    },

    /// A text label.
    Text {
        /// Text content.
        content: String,
        /// Font size in pixels.
        font_size: f32,
        /// Text color as hex.
        color: String,
    },

    /// A freehand or polyline path, in object-local coordinates.
    Path {
        /// Path vertices.
        points: Vec<Point>,
        /// Stroke color as hex.
        stroke: String,
        /// Stroke width in pixels.
        stroke_width: f32,
    },
}

impl ObjectKind {
    /// Short name of the variant, used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Image { .. } => "image",
            Self::Shape { .. } => "shape",
            Self::Text { .. } => "text",
            Self::Path { .. } => "path",
        }
    }

    /// Whether this is a bitmap.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Unscaled size of the content.
    ///
    /// Text is measured with a fixed advance of 0.6 em per character, which
    /// is enough for hit-testing without a font engine.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn native_size(&self) -> (f32, f32) {
        match self {
            Self::Image { width, height, .. } => (*width as f32, *height as f32),
            Self::Shape { width, height, .. } => (*width, *height),
            Self::Text {
                content, font_size, ..
            } => (
                content.chars().count() as f32 * font_size * 0.6,
                font_size * 1.2,
            ),
            Self::Path { points, .. } => {
                polygon_bounds(points).map_or((0.0, 0.0), |b| (b.right(), b.bottom()))
            }
        }
    }
}

/// Placement of an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position of the top-left corner.
    pub x: f32,
    /// Y position of the top-left corner.
    pub y: f32,
    /// Horizontal scale.
    pub scale_x: f32,
    /// Vertical scale.
    pub scale_y: f32,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl Transform {
    /// Transform at a position with unit scale.
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }

    /// Whether every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.scale_x, self.scale_y, self.rotation]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Same transform moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Mapping from object-local pixel coordinates into the scene.
    ///
    /// Rotation is not part of the mapping.
    #[must_use]
    pub fn local_to_scene(&self) -> LocalToScene {
        LocalToScene {
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            offset_x: self.x,
            offset_y: self.y,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(0.0, 0.0)
    }
}

/// A drawable object with content, placement and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier.
    pub id: ObjectId,
    /// Content.
    pub kind: ObjectKind,
    /// Placement.
    pub transform: Transform,
    /// Human-readable origin tag, e.g. "Imported Image" or "Segment 3".
    #[serde(default)]
    pub label: String,
    /// Whether the object can be selected.
    #[serde(default = "default_true")]
    pub selectable: bool,
    /// Whether the object responds to pointer input.
    #[serde(default = "default_true")]
    pub interactive: bool,
}

const fn default_true() -> bool {
    true
}

impl SceneObject {
    /// Create a new object with the given content at the origin.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            kind,
            transform: Transform::default(),
            label: String::new(),
            selectable: true,
            interactive: true,
        }
    }

    /// Create an image object from a `data:` URI and its native size.
    #[must_use]
    pub fn image(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new(ObjectKind::Image {
            src: src.into(),
            width,
            height,
        })
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set whether the object responds to pointer input.
    #[must_use]
    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Set whether the object can be selected.
    #[must_use]
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Whether this object is a bitmap.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        self.kind.is_image()
    }

    /// Unscaled content size.
    #[must_use]
    pub fn native_size(&self) -> (f32, f32) {
        self.kind.native_size()
    }

    /// Size on the canvas after scaling.
    #[must_use]
    pub fn footprint(&self) -> (f32, f32) {
        let (w, h) = self.native_size();
        (
            w * self.transform.scale_x.abs(),
            h * self.transform.scale_y.abs(),
        )
    }

    /// Axis-aligned bounds in scene coordinates, ignoring rotation.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        let (w, h) = self.footprint();
        BoundingBox::new(self.transform.x, self.transform.y, w, h)
    }

    /// Check if a point (in scene coordinates) is within this object.
    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Deep copy with a fresh identity and no link back to `self`.
    #[must_use]
    pub fn detached_clone(&self) -> Self {
        Self {
            id: ObjectId::new(),
            ..self.clone()
        }
    }
}
