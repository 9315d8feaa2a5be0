//! AI Edit Integration Tests
//!
//! Drives the edit and background-removal flow against in-memory services:
//! - Edit adds a result over the original, then mattes it
//! - Matting failures are silent and keep the un-matted edit
//! - Edit failures are reported and keep the original
//! - Import followed by an edit

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use canvas_core::{
    Editor, EditorConfig, EditorHandle, NoticeLevel, NullSurface, ObjectId, ObjectKind,
    RecordingNotifier, Transform,
};
use canvas_vision::{
    image_object, import_image, rasterize, AiEditOrchestrator, BackgroundRemovalService, Bitmap,
    ImageEditService, ServiceError, VisionConfig, VisionError,
};
use image::{Rgba, RgbaImage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// Fakes
// ============================================================================

/// Route engine logs to the test harness; `RUST_LOG` overrides the level.
fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Returns a solid bitmap of a fixed size and records the prompts it saw.
struct FakeEditor {
    size: (u32, u32),
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl FakeEditor {
    fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            size: (width, height),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            size: (1, 1),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ImageEditService for FakeEditor {
    async fn edit(&self, _image: &Bitmap, instruction: &str) -> Result<Bitmap, ServiceError> {
        self.prompts
            .lock()
            .expect("lock")
            .push(instruction.to_string());
        tokio::task::yield_now().await;
        if self.fail {
            return Err(ServiceError::Rejected("content policy".to_string()));
        }
        Ok(solid(self.size.0, self.size.1, 255))
    }
}

/// Returns a fully transparent bitmap of a fixed size.
struct FakeMatting {
    size: (u32, u32),
    fail: bool,
}

#[async_trait]
impl BackgroundRemovalService for FakeMatting {
    async fn remove_background(&self, _image: &Bitmap) -> Result<Bitmap, ServiceError> {
        if self.fail {
            return Err(ServiceError::Transport("timed out".to_string()));
        }
        Ok(solid(self.size.0, self.size.1, 0))
    }
}

fn matting(width: u32, height: u32) -> Arc<FakeMatting> {
    Arc::new(FakeMatting {
        size: (width, height),
        fail: false,
    })
}

fn failing_matting() -> Arc<FakeMatting> {
    Arc::new(FakeMatting {
        size: (1, 1),
        fail: true,
    })
}

fn solid(width: u32, height: u32, alpha: u8) -> Bitmap {
    Bitmap::from_rgba(RgbaImage::from_pixel(
        width,
        height,
        Rgba([10, 200, 30, alpha]),
    ))
}

struct Fixture {
    handle: EditorHandle,
    notices: Arc<RecordingNotifier>,
    original: ObjectId,
}

fn fixture() -> Fixture {
    init_tracing();
    let notices = Arc::new(RecordingNotifier::new());
    let handle = EditorHandle::new(Editor::with_context(
        EditorConfig::default(),
        Arc::new(Mutex::new(NullSurface)),
        notices.clone(),
    )
    .expect("valid config"));

    let object = image_object(&solid(100, 50, 255))
        .expect("encode")
        .with_transform(Transform {
            scale_x: 2.0,
            scale_y: 2.0,
            rotation: 15.0,
            ..Transform::at(30.0, 70.0)
        });
    let original = handle.write(|e| {
        let id = e.add(object);
        e.set_active(Some(id)).expect("select");
        id
    });

    Fixture {
        handle,
        notices,
        original,
    }
}

// ============================================================================
// Edit + matting
// ============================================================================

#[tokio::test]
async fn test_edit_adds_matted_result_over_original() {
    let fx = fixture();
    let edits = FakeEditor::new(100, 50);
    let orchestrator =
        AiEditOrchestrator::new(edits.clone(), matting(400, 200), VisionConfig::default());

    let id = orchestrator
        .edit_with_prompt(&fx.handle, "  make it blue ")
        .await
        .expect("edit");

    assert_eq!(edits.prompts(), vec!["make it blue"]);
    fx.handle.read(|e| {
        assert_eq!(e.scene().len(), 2);
        assert!(e.scene().contains(fx.original));

        let result = e.active().expect("result is active");
        assert_eq!(result.id, id);
        assert_eq!(result.label, "AI Edited Image");
        assert!((result.transform.x - 30.0).abs() < f32::EPSILON);
        assert!((result.transform.y - 70.0).abs() < f32::EPSILON);
        assert!((result.transform.rotation - 15.0).abs() < f32::EPSILON);

        // 400px matte over a 200px footprint.
        assert!((result.transform.scale_x - 0.5).abs() < f32::EPSILON);
        let (w, h) = result.footprint();
        assert!((w - 200.0).abs() < 1e-3);
        assert!((h - 100.0).abs() < 1e-3);

        let pixels = rasterize(result).expect("rasterize");
        assert!(pixels.is_fully_transparent());
    });
    assert!(fx.notices.notices().is_empty());
    assert!(!orchestrator.is_editing());
    assert!(!orchestrator.is_removing_background());
}

#[tokio::test]
async fn test_matting_swap_is_undoable_step_by_step() {
    let fx = fixture();
    let orchestrator = AiEditOrchestrator::new(
        FakeEditor::new(100, 50),
        matting(100, 50),
        VisionConfig::default(),
    );
    orchestrator
        .edit_with_prompt(&fx.handle, "sharpen")
        .await
        .expect("edit");

    fx.handle.write(|e| {
        // base, original, edit, removal of the edit, matte
        assert_eq!(e.undo_depth(), 5);

        assert!(e.undo().expect("undo"));
        assert_eq!(e.scene().len(), 1);
        assert!(e.undo().expect("undo"));
        let labels: Vec<&str> = e.scene().objects().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["", "AI Edited Image"]);
        let unmatted = &e.scene().objects()[1];
        assert!(!rasterize(unmatted).expect("rasterize").is_fully_transparent());
    });
}

#[tokio::test]
async fn test_matting_failure_keeps_unmatted_edit_silently() {
    let fx = fixture();
    let orchestrator = AiEditOrchestrator::new(
        FakeEditor::new(100, 50),
        failing_matting(),
        VisionConfig::default(),
    );

    let id = orchestrator
        .edit_with_prompt(&fx.handle, "add a hat")
        .await
        .expect("edit still succeeds");

    fx.handle.read(|e| {
        assert_eq!(e.scene().len(), 2);
        let edited = e.scene().get(id).expect("edited");
        assert_eq!(edited.label, "AI Edited Image");
        assert!((edited.transform.scale_x - 2.0).abs() < f32::EPSILON);
        assert!(!rasterize(edited).expect("rasterize").is_fully_transparent());
    });
    assert!(fx.notices.notices().is_empty());
}

#[tokio::test]
async fn test_edit_failure_reported_and_original_kept() {
    let fx = fixture();
    let before = fx.handle.read(|e| e.serialize().expect("serialize"));
    let orchestrator =
        AiEditOrchestrator::new(FakeEditor::failing(), matting(10, 10), VisionConfig::default());

    let result = orchestrator.edit_with_prompt(&fx.handle, "remove the car").await;

    assert!(matches!(
        result,
        Err(VisionError::Service(ServiceError::Rejected(_)))
    ));
    assert_eq!(fx.handle.read(|e| e.serialize().expect("serialize")), before);
    assert_eq!(
        fx.handle.read(|e| e.active().map(|o| o.id)),
        Some(fx.original)
    );

    let notices = fx.notices.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

// ============================================================================
// Preconditions
// ============================================================================

#[tokio::test]
async fn test_blank_prompt_and_missing_selection_rejected() {
    let fx = fixture();
    let edits = FakeEditor::new(10, 10);
    let orchestrator =
        AiEditOrchestrator::new(edits.clone(), matting(10, 10), VisionConfig::default());

    let blank = orchestrator.edit_with_prompt(&fx.handle, "   ").await;
    assert!(matches!(blank, Err(VisionError::EmptyPrompt)));

    fx.handle.write(|e| e.set_active(None).expect("clear"));
    let unselected = orchestrator.edit_with_prompt(&fx.handle, "brighten").await;
    assert!(matches!(unselected, Err(VisionError::NoSelection)));

    assert!(edits.prompts().is_empty());
    assert_eq!(fx.handle.read(|e| e.scene().len()), 1);
    assert_eq!(fx.notices.notices().len(), 2);
}

#[tokio::test]
async fn test_concurrent_edit_rejected() {
    let fx = fixture();
    let edits = FakeEditor::new(100, 50);
    let orchestrator =
        AiEditOrchestrator::new(edits.clone(), matting(100, 50), VisionConfig::default());

    let (first, second) = tokio::join!(
        orchestrator.edit_with_prompt(&fx.handle, "first"),
        orchestrator.edit_with_prompt(&fx.handle, "second")
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(VisionError::Busy(_))));
    assert_eq!(edits.prompts(), vec!["first"]);
}

// ============================================================================
// Background removal on its own
// ============================================================================

#[tokio::test]
async fn test_remove_background_preserves_position_and_label() {
    let fx = fixture();
    fx.handle
        .write(|e| e.update(fx.original, |o| o.label = "Imported Image".into()))
        .expect("label");
    let orchestrator = AiEditOrchestrator::new(
        FakeEditor::new(1, 1),
        matting(50, 100),
        VisionConfig::default(),
    );

    let id = orchestrator
        .remove_background(&fx.handle, fx.original)
        .await
        .expect("matte");

    fx.handle.read(|e| {
        assert!(!e.scene().contains(fx.original));
        let matted = e.scene().get(id).expect("matted");
        assert_eq!(matted.label, "Imported Image");
        assert!((matted.transform.x - 30.0).abs() < f32::EPSILON);
        // Larger side 100px matched to the 200px footprint.
        assert!((matted.transform.scale_x - 2.0).abs() < f32::EPSILON);
        assert!((matted.transform.scale_y - 2.0).abs() < f32::EPSILON);
    });
    assert!(fx.notices.notices().is_empty());
}

#[tokio::test]
async fn test_remove_background_keeps_locked_object_locked() {
    let fx = fixture();
    fx.handle
        .write(|e| {
            e.update(fx.original, |o| {
                o.selectable = false;
                o.interactive = false;
            })
        })
        .expect("lock");
    let orchestrator = AiEditOrchestrator::new(
        FakeEditor::new(1, 1),
        matting(100, 50),
        VisionConfig::default(),
    );

    let id = orchestrator
        .remove_background(&fx.handle, fx.original)
        .await
        .expect("matte");

    fx.handle.read(|e| {
        assert_eq!(e.scene().len(), 1);
        let matted = e.scene().get(id).expect("matted");
        assert!(!matted.selectable);
        assert!(!matted.interactive);
        assert!(e.selection().is_empty());
    });
}

#[tokio::test]
async fn test_remove_background_of_missing_object() {
    let fx = fixture();
    let orchestrator = AiEditOrchestrator::new(
        FakeEditor::new(1, 1),
        matting(10, 10),
        VisionConfig::default(),
    );

    let result = orchestrator
        .remove_background(&fx.handle, ObjectId::new())
        .await;
    assert!(matches!(result, Err(VisionError::Canvas(_))));
    assert_eq!(fx.handle.read(|e| e.scene().len()), 1);
}

// ============================================================================
// Import then edit
// ============================================================================

#[tokio::test]
async fn test_imported_image_can_be_edited() {
    let handle = EditorHandle::default();
    let png = solid(1600, 600, 255).to_png().expect("encode");
    let imported = import_image(&handle, &png, &VisionConfig::default()).expect("import");

    let orchestrator = AiEditOrchestrator::new(
        FakeEditor::new(1600, 600),
        matting(1600, 600),
        VisionConfig::default(),
    );
    let edited = orchestrator
        .edit_with_prompt(&handle, "night sky")
        .await
        .expect("edit");

    handle.read(|e| {
        let source = e.scene().get(imported).expect("imported");
        let result = e.scene().get(edited).expect("edited");
        assert!((source.transform.scale_x - 0.5).abs() < f32::EPSILON);
        assert!((result.transform.scale_x - source.transform.scale_x).abs() < f32::EPSILON);
        assert_eq!(result.bounds(), source.bounds());
        assert!(matches!(
            result.kind,
            ObjectKind::Image {
                width: 1600,
                height: 600,
                ..
            }
        ));
    });
}
