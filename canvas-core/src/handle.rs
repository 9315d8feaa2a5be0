//! Shared access to an [`Editor`] across asynchronous tasks.
//!
//! Long-running operations hold a cloned handle and take the lock only for
//! short synchronous sections, never across an `.await`. Mutations are
//! therefore applied, and recorded by history, in the order they complete.

use std::sync::{Arc, PoisonError, RwLock};

use crate::Editor;

/// Cheaply cloneable handle to a shared editor.
///
/// # Example
///
/// ```
/// use canvas_core::{EditorHandle, ObjectKind, SceneObject};
///
/// let handle = EditorHandle::default();
/// let id = handle.write(|editor| {
///     editor.add(SceneObject::new(ObjectKind::Text {
///         content: "Hello".to_string(),
///         font_size: 16.0,
///         color: "#000000".to_string(),
///     }))
/// });
/// assert!(handle.read(|editor| editor.scene().contains(id)));
/// ```
#[derive(Debug, Clone)]
pub struct EditorHandle {
    inner: Arc<RwLock<Editor>>,
}

impl EditorHandle {
    /// Wrap an editor.
    #[must_use]
    pub fn new(editor: Editor) -> Self {
        Self {
            inner: Arc::new(RwLock::new(editor)),
        }
    }

    /// Run a closure with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&Editor) -> R) -> R {
        let editor = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&editor)
    }

    /// Run a closure with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut Editor) -> R) -> R {
        let mut editor = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut editor)
    }
}

impl Default for EditorHandle {
    fn default() -> Self {
        Self::new(Editor::default())
    }
}
