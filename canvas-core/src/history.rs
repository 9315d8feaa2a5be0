//! Snapshot-based undo/redo.
//!
//! The history re-serializes the whole object list after every structural
//! mutation instead of diffing. The top of the undo stack is always the
//! live state; the bottom entry is the base state and is never popped.
//!
//! ```text
//!   mutation:  undo ← push(snapshot)     redo.clear()
//!   undo:      redo.push_front(undo.pop())   reload undo.top
//!   redo:      undo.push(redo.pop_front())   reload undo.top
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::scene::{Scene, SceneObserver};
use crate::{CanvasError, CanvasResult, SceneObject};

/// An immutable, fully serialized copy of a scene's object list.
///
/// This is also the save/load format handed to the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    /// Snapshot of an empty scene.
    #[must_use]
    pub fn empty() -> Self {
        Self("[]".to_string())
    }

    /// Serialize a list of objects.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn capture(objects: &[SceneObject]) -> CanvasResult<Self> {
        Ok(Self(serde_json::to_string(objects)?))
    }

    /// Wrap previously saved snapshot text without validating it.
    #[must_use]
    pub fn from_json(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    /// Decode the object list.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CorruptSnapshot`] if the text is not a valid
    /// object list.
    pub fn objects(&self) -> CanvasResult<Vec<SceneObject>> {
        serde_json::from_str(&self.0).map_err(|e| CanvasError::CorruptSnapshot(e.to_string()))
    }

    /// The serialized text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the serialized text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Undo and redo stacks of [`Snapshot`]s.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    /// Front is the most recently undone state.
    redo_stack: VecDeque<Snapshot>,
}

impl History {
    /// Create a history whose only entry is `base`.
    #[must_use]
    pub fn new(base: Snapshot) -> Self {
        Self {
            undo_stack: vec![base],
            redo_stack: VecDeque::new(),
        }
    }

    /// Push a new live state. Any redo branch is discarded.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if !self.redo_stack.is_empty() {
            tracing::debug!(dropped = self.redo_stack.len(), "New edit discards redo branch");
            self.redo_stack.clear();
        }
    }

    /// Step back one entry.
    ///
    /// Returns the state to reload, or `None` when only the base entry is left.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let top = self.undo_stack.pop()?;
        self.redo_stack.push_front(top);
        self.undo_stack.last().cloned()
    }

    /// Step forward one entry.
    ///
    /// Returns the state to reload, or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Snapshot> {
        let next = self.redo_stack.pop_front()?;
        self.undo_stack.push(next.clone());
        Some(next)
    }

    /// Drop both stacks and start again from `base`.
    pub fn reset(&mut self, base: Snapshot) {
        self.undo_stack.clear();
        self.undo_stack.push(base);
        self.redo_stack.clear();
    }

    /// The live state.
    #[must_use]
    pub fn current(&self) -> Option<&Snapshot> {
        self.undo_stack.last()
    }

    /// Whether [`History::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    /// Whether [`History::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Entries on the undo stack, including the base entry.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Entries on the redo stack.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(Snapshot::empty())
    }
}

impl SceneObserver for History {
    fn on_mutate(&mut self, scene: &Scene) {
        match scene.snapshot() {
            Ok(snapshot) => self.record(snapshot),
            Err(e) => tracing::error!("Failed to snapshot scene for history: {e}"),
        }
    }
}
