//! # Canvas Vision
//!
//! Image operations that depend on external services, layered over
//! [`canvas_core`].
//!
//! ## Operations
//!
//! - **Import**: decode a file and place it fitted in the visible area.
//! - **Segmentation**: split the active image into cut-out objects, one per
//!   distinct region the service finds.
//! - **AI edit**: apply a text instruction to the active image, then matte
//!   the result.
//! - **Background removal**: swap an image for a transparent version at the
//!   same footprint.
//!
//! Services are injected as trait objects ([`SegmentationService`],
//! [`ImageEditService`], [`BackgroundRemovalService`]). Each operation kind
//! rejects a second request while one is pending. The editor is locked only
//! between awaits, so the user can keep working and every mutation is
//! recorded by history in completion order.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod ai_edit;
pub mod bitmap;
pub mod busy;
pub mod composite;
pub mod config;
pub mod error;
pub mod import;
pub mod mask;
pub mod segment;
pub mod service;

pub use ai_edit::AiEditOrchestrator;
pub use bitmap::{image_object, rasterize, Bitmap};
pub use busy::{BusyFlag, BusyGuard};
pub use composite::{cut_out, CutOut};
pub use config::VisionConfig;
pub use error::{ServiceError, VisionError, VisionResult};
pub use import::{import_image, visible_center};
pub use mask::{filter_masks, SegmentationMask};
pub use segment::SegmentationPipeline;
pub use service::{BackgroundRemovalService, ImageEditService, SegmentationService};
