//! Single-slot clipboard holding detached copies of scene objects.

use crate::SceneObject;

/// Detached copies of one or more objects taken at copy/cut time.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    objects: Vec<SceneObject>,
}

impl ClipboardEntry {
    /// Deep-copy the given objects, keeping their relative placement.
    pub fn capture<'a>(objects: impl IntoIterator<Item = &'a SceneObject>) -> Self {
        Self {
            objects: objects.into_iter().map(SceneObject::detached_clone).collect(),
        }
    }

    /// The held copies.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Number of held objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the entry holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn shift(&mut self, dx: f32, dy: f32) {
        for object in &mut self.objects {
            object.transform = object.transform.translated(dx, dy);
        }
    }
}

/// Clipboard with one slot; a new copy replaces whatever was held.
#[derive(Debug, Clone)]
pub struct Clipboard {
    slot: Option<ClipboardEntry>,
    offset: f32,
}

impl Clipboard {
    /// Create an empty clipboard that offsets every paste by `offset` on both axes.
    #[must_use]
    pub fn new(offset: f32) -> Self {
        Self { slot: None, offset }
    }

    /// Replace the slot contents. Returns how many objects are now held.
    pub fn store(&mut self, entry: ClipboardEntry) -> usize {
        let len = entry.len();
        self.slot = if entry.is_empty() { None } else { Some(entry) };
        len
    }

    /// Produce a fresh set of objects to paste.
    ///
    /// The held entry is moved by the paste offset first, so each paste
    /// steps away from both the source and the previous paste. Returned
    /// objects have new IDs.
    pub fn paste(&mut self) -> Option<Vec<SceneObject>> {
        let offset = self.offset;
        let entry = self.slot.as_mut()?;
        entry.shift(offset, offset);
        Some(entry.objects.iter().map(SceneObject::detached_clone).collect())
    }

    /// The held entry, if any.
    #[must_use]
    pub fn entry(&self) -> Option<&ClipboardEntry> {
        self.slot.as_ref()
    }

    /// Whether anything is held.
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.slot.is_some()
    }

    /// Empty the slot.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(15.0)
    }
}
