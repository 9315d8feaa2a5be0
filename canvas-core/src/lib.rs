//! # Canvas Core
//!
//! In-memory editing engine for a single canvas session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  Editor                     │
//! ├─────────────────────────────────────────────┤
//! │  Scene Graph     │  History                 │
//! │  - Objects       │  - Snapshot per mutation │
//! │  - Z-order       │  - Undo / redo stacks    │
//! │  - Selection     │                          │
//! ├─────────────────────────────────────────────┤
//! │  Viewport        │  Clipboard    │  Input   │
//! │  - Zoom / pan    │  - One slot   │  - Keys  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The engine is synchronous. Asynchronous work (segmentation, AI edits)
//! lives in `canvas-vision` and talks to the editor through an
//! [`EditorHandle`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clipboard;
pub mod config;
pub mod editor;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod handle;
pub mod history;
pub mod scene;
pub mod surface;
pub mod viewport;

pub use clipboard::{Clipboard, ClipboardEntry};
pub use config::EditorConfig;
pub use editor::Editor;
pub use element::{ObjectId, ObjectKind, SceneObject, ShapeKind, Transform};
pub use error::{CanvasError, CanvasResult};
pub use event::{InputEvent, KeyModifiers, Shortcut};
pub use geometry::{
    point_in_polygon, point_in_rings, polygon_bounds, BoundingBox, LocalToScene, Point,
};
pub use handle::EditorHandle;
pub use history::{History, Snapshot};
pub use scene::{Scene, SceneObserver, SharedObserver, SubscriptionId};
pub use surface::{
    Notice, NoticeLevel, Notifier, NullNotifier, NullSurface, RecordingNotifier, RenderSurface,
    SharedSurface,
};
pub use viewport::Viewport;

/// Canvas core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
