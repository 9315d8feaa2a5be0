//! The editor: one scene with its history, viewport and clipboard.
//!
//! ```text
//!  input ──► Editor ──► Scene ──on_mutate──► History   (snapshot per mutation)
//!                │             └─on_mutate──► Surface   (render request)
//!                ├──► Viewport ─────────────► Surface   (render request)
//!                └──► Clipboard
//! ```
//!
//! Undo and redo reload the scene with observation suspended, so the reload
//! is not recorded as a new edit, then force a render themselves.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::clipboard::{Clipboard, ClipboardEntry};
use crate::event::{InputEvent, Shortcut};
use crate::history::{History, Snapshot};
use crate::surface::{Notice, Notifier, NullNotifier, NullSurface, RenderOnMutate, SharedSurface};
use crate::{CanvasResult, EditorConfig, ObjectId, Point, Scene, SceneObject, Viewport};

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An editing session over a single scene.
pub struct Editor {
    scene: Scene,
    history: Arc<Mutex<History>>,
    viewport: Viewport,
    clipboard: Clipboard,
    surface: SharedSurface,
    notifier: Arc<dyn Notifier>,
    config: EditorConfig,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("scene", &self.scene)
            .field("viewport", &self.viewport)
            .field("clipboard", &self.clipboard)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Create an editor that renders and notifies nowhere.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Config`](crate::CanvasError::Config) if `config` fails
    /// [`EditorConfig::validate`].
    pub fn new(config: EditorConfig) -> CanvasResult<Self> {
        Self::with_context(
            config,
            Arc::new(Mutex::new(NullSurface)),
            Arc::new(NullNotifier),
        )
    }

    /// Create an editor bound to a host surface and notifier.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Config`](crate::CanvasError::Config) if `config` fails
    /// [`EditorConfig::validate`].
    pub fn with_context(
        config: EditorConfig,
        surface: SharedSurface,
        notifier: Arc<dyn Notifier>,
    ) -> CanvasResult<Self> {
        if let Err(e) = config.validate() {
            tracing::warn!("Rejecting editor configuration: {e}");
            return Err(e);
        }
        Ok(Self::build(config, surface, notifier))
    }

    /// Wire up an editor from an already validated configuration.
    fn build(config: EditorConfig, surface: SharedSurface, notifier: Arc<dyn Notifier>) -> Self {
        let history = Arc::new(Mutex::new(History::new(Snapshot::empty())));
        let mut scene = Scene::new();
        scene.subscribe(history.clone());
        scene.subscribe(Arc::new(Mutex::new(RenderOnMutate(surface.clone()))));

        Self {
            scene,
            history,
            viewport: Viewport::from_config(&config),
            clipboard: Clipboard::new(config.paste_offset),
            surface,
            notifier,
            config,
        }
    }

    /// The scene being edited.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The current viewport.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The clipboard.
    #[must_use]
    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// Configuration the editor was created with.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Send a notice to the user.
    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    fn request_render(&self) {
        lock(&self.surface).request_render();
    }

    // -----------------------------------------------------------------------
    // Scene mutations (all recorded by history)
    // -----------------------------------------------------------------------

    /// Add an object on top of the scene.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        self.scene.add(object)
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`](crate::CanvasError::ObjectNotFound) if the object does not exist.
    pub fn remove(&mut self, id: ObjectId) -> CanvasResult<SceneObject> {
        self.scene.remove(id)
    }

    /// Modify an object's transform or content.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`](crate::CanvasError::ObjectNotFound) if the object does not exist.
    pub fn update<F>(&mut self, id: ObjectId, f: F) -> CanvasResult<()>
    where
        F: FnOnce(&mut SceneObject),
    {
        self.scene.update(id, f)
    }

    /// Move an object to a z-order index.
    ///
    /// # Errors
    ///
    /// See [`Scene::reorder`].
    pub fn reorder(&mut self, id: ObjectId, new_index: usize) -> CanvasResult<()> {
        self.scene.reorder(id, new_index)
    }

    /// Move an object one step up.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`](crate::CanvasError::ObjectNotFound) if the object does not exist.
    pub fn bring_forward(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.scene.bring_forward(id)
    }

    /// Move an object one step down.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`](crate::CanvasError::ObjectNotFound) if the object does not exist.
    pub fn send_backward(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.scene.send_backward(id)
    }

    /// Swap an object for another: a removal followed by an add, each
    /// recorded separately. The replacement becomes the active object if it
    /// is selectable; otherwise the selection is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`](crate::CanvasError::ObjectNotFound) if `id` does not exist; nothing
    /// is added in that case.
    pub fn replace(&mut self, id: ObjectId, replacement: SceneObject) -> CanvasResult<ObjectId> {
        self.scene.remove(id)?;
        let new_id = self.scene.add(replacement);
        self.scene.select_many(&[new_id]);
        Ok(new_id)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Set or clear the active object.
    ///
    /// # Errors
    ///
    /// See [`Scene::set_active`].
    pub fn set_active(&mut self, id: Option<ObjectId>) -> CanvasResult<()> {
        self.scene.set_active(id)?;
        self.request_render();
        Ok(())
    }

    /// Select several objects.
    pub fn select_many(&mut self, ids: &[ObjectId]) {
        self.scene.select_many(ids);
        self.request_render();
    }

    /// The active object, when exactly one object is selected.
    #[must_use]
    pub fn active(&self) -> Option<&SceneObject> {
        self.scene.active()
    }

    /// Currently selected IDs.
    #[must_use]
    pub fn selection(&self) -> Vec<ObjectId> {
        self.scene.selection().to_vec()
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Step back one edit. Returns `false` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CorruptSnapshot`](crate::CanvasError::CorruptSnapshot) if the stored snapshot cannot
    /// be decoded, which indicates a defect. The step is taken back, so the
    /// scene and history still agree.
    pub fn undo(&mut self) -> CanvasResult<bool> {
        let target = lock(&self.history).undo();
        let Some(snapshot) = target else {
            tracing::debug!("Nothing to undo");
            return Ok(false);
        };
        if let Err(e) = self.reload(&snapshot) {
            lock(&self.history).redo();
            return Err(e);
        }
        Ok(true)
    }

    /// Step forward one undone edit. Returns `false` when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CorruptSnapshot`](crate::CanvasError::CorruptSnapshot) if the stored snapshot cannot
    /// be decoded, which indicates a defect. The step is taken back, so the
    /// scene and history still agree.
    pub fn redo(&mut self) -> CanvasResult<bool> {
        let target = lock(&self.history).redo();
        let Some(snapshot) = target else {
            tracing::debug!("Nothing to redo");
            return Ok(false);
        };
        if let Err(e) = self.reload(&snapshot) {
            lock(&self.history).undo();
            return Err(e);
        }
        Ok(true)
    }

    fn reload(&mut self, snapshot: &Snapshot) -> CanvasResult<()> {
        self.scene.suspend_observers();
        let result = self.scene.restore(snapshot);
        self.scene.resume_observers();
        if let Err(e) = &result {
            tracing::error!("History snapshot failed to load: {e}");
        }
        result?;
        self.request_render();
        Ok(())
    }

    /// Whether [`Editor::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        lock(&self.history).can_undo()
    }

    /// Whether [`Editor::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        lock(&self.history).can_redo()
    }

    /// Entries on the undo stack, including the base state.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        lock(&self.history).undo_len()
    }

    /// Entries on the redo stack.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        lock(&self.history).redo_len()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Serialize the scene for saving. Same format as history entries.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> CanvasResult<Snapshot> {
        self.scene.snapshot()
    }

    /// Load a saved scene. History restarts with the loaded state as its base.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CorruptSnapshot`](crate::CanvasError::CorruptSnapshot) if the snapshot cannot be
    /// decoded; the editor is left unchanged.
    pub fn deserialize(&mut self, snapshot: &Snapshot) -> CanvasResult<()> {
        self.scene.suspend_observers();
        let result = self.scene.restore(snapshot);
        self.scene.resume_observers();
        result?;

        self.scene.clear_selection();
        lock(&self.history).reset(snapshot.clone());
        self.request_render();
        tracing::info!(objects = self.scene.len(), "Loaded scene");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Clipboard
    // -----------------------------------------------------------------------

    /// Copy objects into the clipboard. Returns how many were copied.
    ///
    /// Does not touch the scene, so nothing is recorded.
    pub fn copy(&mut self, selection: &[ObjectId]) -> usize {
        let objects = self
            .scene
            .objects()
            .iter()
            .filter(|o| selection.contains(&o.id));
        let count = self.clipboard.store(ClipboardEntry::capture(objects));
        tracing::debug!(count, "Copied to clipboard");
        count
    }

    /// Copy then delete. Returns how many objects were cut.
    pub fn cut(&mut self, selection: &[ObjectId]) -> usize {
        let count = self.copy(selection);
        self.delete_selection(selection);
        count
    }

    /// Paste the clipboard as a new selection. Returns the new IDs.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        let Some(objects) = self.clipboard.paste() else {
            tracing::debug!("Clipboard empty, nothing to paste");
            return Vec::new();
        };
        let ids: Vec<_> = objects.into_iter().map(|o| self.scene.add(o)).collect();
        self.scene.select_many(&ids);
        self.request_render();
        ids
    }

    /// Remove objects. Returns how many were removed; missing IDs are skipped.
    pub fn delete_selection(&mut self, selection: &[ObjectId]) -> usize {
        selection
            .iter()
            .filter(|id| self.scene.remove(**id).is_ok())
            .count()
    }

    // -----------------------------------------------------------------------
    // Viewport (not recorded)
    // -----------------------------------------------------------------------

    /// Zoom by a factor around a screen point (viewport center if `None`).
    pub fn zoom_by(&mut self, factor: f32, anchor: Option<Point>) -> f32 {
        let zoom = self.viewport.zoom_by(factor, anchor);
        self.request_render();
        zoom
    }

    /// Set the zoom, anchored at the viewport center.
    pub fn set_zoom(&mut self, value: f32) -> f32 {
        let zoom = self.viewport.set_zoom(value);
        self.request_render();
        zoom
    }

    /// One zoom step in, around the viewport center.
    pub fn zoom_in(&mut self) -> f32 {
        self.zoom_by(self.config.zoom_step, None)
    }

    /// One zoom step out, around the viewport center.
    pub fn zoom_out(&mut self) -> f32 {
        self.zoom_by(1.0 / self.config.zoom_step, None)
    }

    /// One zoom step per wheel event, anchored at the cursor. Scrolling up
    /// (negative delta) zooms in. A zero delta leaves the zoom alone.
    pub fn zoom_by_wheel(&mut self, delta_y: f32, anchor: Point) -> f32 {
        if delta_y.abs() < f32::EPSILON {
            return self.viewport.zoom();
        }
        let step = self.config.zoom_step;
        let factor = if delta_y < 0.0 { step } else { 1.0 / step };
        self.zoom_by(factor, Some(anchor))
    }

    /// Pan by a screen-space delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.viewport.pan(dx, dy);
        self.request_render();
    }

    /// Reset zoom and pan.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.request_render();
    }

    /// Resize the visible area.
    pub fn resize_viewport(&mut self, width: f32, height: f32) {
        self.viewport.resize(width, height);
        self.request_render();
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Run a keyboard command against the current selection.
    ///
    /// # Errors
    ///
    /// Propagates history reload failures from undo/redo.
    pub fn run_shortcut(&mut self, shortcut: Shortcut) -> CanvasResult<()> {
        let selection = self.selection();
        match shortcut {
            Shortcut::Undo => {
                self.undo()?;
            }
            Shortcut::Redo => {
                self.redo()?;
            }
            Shortcut::Copy => {
                self.copy(&selection);
            }
            Shortcut::Cut => {
                self.cut(&selection);
            }
            Shortcut::Paste => {
                self.paste();
            }
            Shortcut::Delete => {
                self.delete_selection(&selection);
            }
            Shortcut::ZoomIn => {
                self.zoom_in();
            }
            Shortcut::ZoomOut => {
                self.zoom_out();
            }
            Shortcut::ResetView => self.reset_view(),
        }
        Ok(())
    }

    /// Dispatch an input event. Returns `true` if the editor acted on it.
    ///
    /// # Errors
    ///
    /// Propagates history reload failures from undo/redo shortcuts.
    pub fn handle_input(&mut self, event: &InputEvent) -> CanvasResult<bool> {
        match event {
            InputEvent::Pointer {
                x,
                y,
                button: 0,
                pressed: true,
            } => {
                let point = self.viewport.screen_to_canvas(Point::new(*x, *y));
                let hit = self
                    .scene
                    .object_at(point)
                    .filter(|id| self.scene.get(*id).is_some_and(|o| o.selectable));
                self.set_active(hit)?;
                Ok(true)
            }
            InputEvent::Pointer { .. } => Ok(false),
            InputEvent::Wheel { x, y, delta_y } => {
                if delta_y.abs() < f32::EPSILON {
                    return Ok(false);
                }
                self.zoom_by_wheel(*delta_y, Point::new(*x, *y));
                Ok(true)
            }
            InputEvent::Drag { delta_x, delta_y } => {
                self.pan(*delta_x, *delta_y);
                Ok(true)
            }
            InputEvent::Pinch {
                center_x,
                center_y,
                scale,
            } => {
                self.zoom_by(*scale, Some(Point::new(*center_x, *center_y)));
                Ok(true)
            }
            InputEvent::Key {
                key,
                pressed: true,
                modifiers,
            } => match Shortcut::from_key(key, *modifiers) {
                Some(shortcut) => {
                    tracing::debug!(?shortcut, "Running shortcut");
                    self.run_shortcut(shortcut)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            InputEvent::Key { .. } => Ok(false),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::build(
            EditorConfig::default(),
            Arc::new(Mutex::new(NullSurface)),
            Arc::new(NullNotifier),
        )
    }
}
