//! Scene graph store: the ordered collection of objects drawn on the canvas.
//!
//! Objects are kept bottom-most first, so an object's index is its z-order.
//! Every structural change (add, remove, update, reorder, restore) is
//! broadcast to subscribed [`SceneObserver`]s. Observation can be suspended,
//! which the editor does while reloading a history snapshot.

use std::sync::{Arc, Mutex, PoisonError};

use crate::history::Snapshot;
use crate::{CanvasError, CanvasResult, ObjectId, Point, SceneObject};

/// Receives a callback after every structural mutation of a [`Scene`].
pub trait SceneObserver: Send {
    /// Called once per mutation, after it has been applied.
    fn on_mutate(&mut self, scene: &Scene);
}

/// Observer shared between the scene and whoever else owns it.
pub type SharedObserver = Arc<Mutex<dyn SceneObserver>>;

/// Handle returned by [`Scene::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The ordered set of objects in the editor.
#[derive(Default)]
pub struct Scene {
    /// Objects, bottom-most first.
    objects: Vec<SceneObject>,
    /// Currently selected object IDs, in selection order.
    selection: Vec<ObjectId>,
    observers: Vec<(SubscriptionId, SharedObserver)>,
    next_subscription: u64,
    suspended: bool,
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects)
            .field("selection", &self.selection)
            .field("observers", &self.observers.len())
            .field("suspended", &self.suspended)
            .finish()
    }
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Register an observer for structural mutations.
    pub fn subscribe(&mut self, observer: SharedObserver) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    /// Remove an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Stop notifying observers until [`Scene::resume_observers`].
    pub fn suspend_observers(&mut self) {
        self.suspended = true;
    }

    /// Resume notifying observers.
    pub fn resume_observers(&mut self) {
        self.suspended = false;
    }

    /// Whether mutations are currently being broadcast.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        !self.suspended
    }

    fn notify(&self) {
        if self.suspended {
            return;
        }
        for (_, observer) in &self.observers {
            observer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .on_mutate(self);
        }
    }

    // -----------------------------------------------------------------------
    // Structural mutations
    // -----------------------------------------------------------------------

    /// Add an object on top of the stack.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        tracing::debug!(%id, kind = object.kind.name(), "Adding object");
        self.objects.push(object);
        self.notify();
        id
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the
    /// scene; the scene is left unchanged.
    pub fn remove(&mut self, id: ObjectId) -> CanvasResult<SceneObject> {
        let index = self.require_index(id)?;
        let removed = self.objects.remove(index);
        self.selection.retain(|sid| *sid != id);
        self.notify();
        Ok(removed)
    }

    /// Update an object in place.
    ///
    /// The closure may change anything except the object's ID, which is
    /// restored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the
    /// scene, or [`CanvasError::InvalidOperation`] if the closure leaves a
    /// non-finite transform. The object is restored and nobody is notified.
    pub fn update<F>(&mut self, id: ObjectId, f: F) -> CanvasResult<()>
    where
        F: FnOnce(&mut SceneObject),
    {
        let index = self.require_index(id)?;
        let previous = self.objects[index].clone();
        let object = &mut self.objects[index];
        f(object);
        object.id = id;
        if !object.transform.is_finite() {
            tracing::warn!(%id, transform = ?object.transform, "Rejecting non-finite transform");
            *object = previous;
            return Err(CanvasError::InvalidOperation(format!(
                "object {id} would get a non-finite transform"
            )));
        }
        self.notify();
        Ok(())
    }

    /// Move an object to a new z-order index (0 = bottom).
    ///
    /// Moving an object to the index it already occupies is not a mutation
    /// and notifies nobody.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the
    /// scene, or [`CanvasError::IndexOutOfRange`] if `new_index` is past the
    /// top of the stack.
    pub fn reorder(&mut self, id: ObjectId, new_index: usize) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        if new_index >= self.objects.len() {
            tracing::warn!(%id, new_index, len = self.objects.len(), "Reorder index out of range");
            return Err(CanvasError::IndexOutOfRange {
                index: new_index,
                len: self.objects.len(),
            });
        }
        if index == new_index {
            return Ok(());
        }
        let object = self.objects.remove(index);
        self.objects.insert(new_index, object);
        self.notify();
        Ok(())
    }

    /// Move an object one step up.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the scene.
    pub fn bring_forward(&mut self, id: ObjectId) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        let top = self.objects.len() - 1;
        self.reorder(id, (index + 1).min(top))
    }

    /// Move an object one step down.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the scene.
    pub fn send_backward(&mut self, id: ObjectId) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        self.reorder(id, index.saturating_sub(1))
    }

    /// Move an object to the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the scene.
    pub fn bring_to_front(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.require_index(id)?;
        self.reorder(id, self.objects.len() - 1)
    }

    /// Move an object to the bottom of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the scene.
    pub fn send_to_back(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.reorder(id, 0)
    }

    /// Remove every object. Notifies only if the scene was non-empty.
    pub fn clear(&mut self) {
        if self.objects.is_empty() {
            return;
        }
        self.objects.clear();
        self.selection.clear();
        self.notify();
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Whether the object is in the scene.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some()
    }

    /// Z-order index of an object.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// All objects, bottom-most first.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Get the number of objects in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Topmost interactive object under a scene-space point.
    #[must_use]
    pub fn object_at(&self, point: Point) -> Option<ObjectId> {
        self.objects
            .iter()
            .rev()
            .find(|o| o.interactive && o.contains_point(point))
            .map(|o| o.id)
    }

    fn require_index(&self, id: ObjectId) -> CanvasResult<usize> {
        self.index_of(id).ok_or_else(|| {
            tracing::warn!(%id, "Object not found in scene");
            CanvasError::ObjectNotFound(id.to_string())
        })
    }

    // -----------------------------------------------------------------------
    // Selection (not structural, never broadcast)
    // -----------------------------------------------------------------------

    /// Make a single object the active selection, or clear it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ObjectNotFound`] if the object is not in the
    /// scene, and [`CanvasError::InvalidOperation`] if it is not selectable.
    pub fn set_active(&mut self, id: Option<ObjectId>) -> CanvasResult<()> {
        let Some(id) = id else {
            self.selection.clear();
            return Ok(());
        };
        let index = self.require_index(id)?;
        if !self.objects[index].selectable {
            return Err(CanvasError::InvalidOperation(format!(
                "object {id} is not selectable"
            )));
        }
        self.selection = vec![id];
        Ok(())
    }

    /// Select several objects at once. Unknown or unselectable IDs are skipped.
    pub fn select_many(&mut self, ids: &[ObjectId]) {
        self.selection.clear();
        for id in ids {
            match self.get(*id) {
                Some(o) if o.selectable => {
                    if !self.selection.contains(id) {
                        self.selection.push(*id);
                    }
                }
                Some(_) => tracing::debug!(%id, "Skipping unselectable object"),
                None => tracing::warn!(%id, "Cannot select missing object"),
            }
        }
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected IDs, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// The active object: present only when exactly one object is selected.
    #[must_use]
    pub fn active(&self) -> Option<&SceneObject> {
        match self.selection.as_slice() {
            [id] => self.get(*id),
            _ => None,
        }
    }

    /// Selected objects, bottom-most first.
    #[must_use]
    pub fn selected_objects(&self) -> Vec<&SceneObject> {
        self.objects
            .iter()
            .filter(|o| self.selection.contains(&o.id))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Serialize the object list.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot(&self) -> CanvasResult<Snapshot> {
        Snapshot::capture(&self.objects)
    }

    /// Replace the object list with the contents of a snapshot.
    ///
    /// Selected IDs that no longer exist are dropped. This is a structural
    /// mutation and notifies observers unless they are suspended.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::CorruptSnapshot`] if the snapshot cannot be
    /// decoded; the scene is left unchanged.
    pub fn restore(&mut self, snapshot: &Snapshot) -> CanvasResult<()> {
        self.objects = snapshot.objects()?;
        let objects = &self.objects;
        self.selection
            .retain(|id| objects.iter().any(|o| o.id == *id));
        self.notify();
        Ok(())
    }
}
