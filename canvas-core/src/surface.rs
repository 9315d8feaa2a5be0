//! Seams to the host application: the rendering surface and user notices.
//!
//! Both are injected into the editor at construction rather than reached
//! through global state.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::scene::{Scene, SceneObserver};

/// The drawing surface the editor presents to.
pub trait RenderSurface: Send {
    /// The scene or viewport changed; redraw at the next opportunity.
    fn request_render(&mut self);
}

/// Surface shared between the editor and the host.
pub type SharedSurface = Arc<Mutex<dyn RenderSurface>>;

/// Surface that ignores render requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn request_render(&mut self) {}
}

/// Forwards scene mutations to a surface as render requests.
pub(crate) struct RenderOnMutate(pub(crate) SharedSurface);

impl SceneObserver for RenderOnMutate {
    fn on_mutate(&mut self, _scene: &Scene) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .request_render();
    }
}

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// An action completed.
    Info,
    /// An action failed or was refused.
    Error,
}

/// A message for the user about the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Human-readable text.
    pub message: String,
}

impl Notice {
    /// Informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Failure notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives user-visible notices.
pub trait Notifier: Send + Sync {
    /// Show a notice to the user.
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, "{}", notice.message);
    }
}

/// Notifier that keeps every notice, for hosts that poll and for tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all notices received so far.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Remove and return all notices received so far.
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
