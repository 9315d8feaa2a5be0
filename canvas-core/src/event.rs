//! Input events for canvas interaction.

use serde::{Deserialize, Serialize};

/// All input events the editor can receive. Coordinates are screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer (mouse) button event.
    Pointer {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
        /// Mouse button (0 = left, 1 = middle, 2 = right).
        button: u8,
        /// Whether the button is pressed.
        pressed: bool,
    },

    /// Mouse wheel over the canvas.
    Wheel {
        /// Cursor X coordinate.
        x: f32,
        /// Cursor Y coordinate.
        y: f32,
        /// Vertical scroll amount; negative scrolls up (zooms in).
        delta_y: f32,
    },

    /// Drag on empty canvas, panning the view.
    Drag {
        /// Delta X from last position.
        delta_x: f32,
        /// Delta Y from last position.
        delta_y: f32,
    },

    /// Pinch to zoom gesture.
    Pinch {
        /// Center X coordinate.
        center_x: f32,
        /// Center Y coordinate.
        center_y: f32,
        /// Scale factor (1.0 = no change).
        scale: f32,
    },

    /// Keyboard event.
    Key {
        /// Key name, e.g. `"z"`, `"Delete"`.
        key: String,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        modifiers: KeyModifiers,
    },
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Editor commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shortcut {
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
    /// Copy the selection.
    Copy,
    /// Cut the selection.
    Cut,
    /// Paste the clipboard.
    Paste,
    /// Delete the selection.
    Delete,
    /// Zoom in around the viewport center.
    ZoomIn,
    /// Zoom out around the viewport center.
    ZoomOut,
    /// Reset zoom and pan.
    ResetView,
}

impl Shortcut {
    /// Resolve a key press to a command.
    #[must_use]
    pub fn from_key(key: &str, modifiers: KeyModifiers) -> Option<Self> {
        let key = key.to_lowercase();
        if modifiers.command() {
            return match key.as_str() {
                "z" if modifiers.shift => Some(Self::Redo),
                "z" => Some(Self::Undo),
                "y" => Some(Self::Redo),
                "c" => Some(Self::Copy),
                "x" => Some(Self::Cut),
                "v" => Some(Self::Paste),
                "+" | "=" => Some(Self::ZoomIn),
                "-" => Some(Self::ZoomOut),
                "0" => Some(Self::ResetView),
                _ => None,
            };
        }
        match key.as_str() {
            "delete" | "backspace" => Some(Self::Delete),
            _ => None,
        }
    }
}
