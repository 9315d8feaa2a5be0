//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::{CanvasError, CanvasResult};

/// Tunables for the editor. Every field has a default, so partial JSON works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial viewport width in pixels.
    pub viewport_width: f32,
    /// Initial viewport height in pixels.
    pub viewport_height: f32,
    /// Smallest allowed zoom factor.
    pub min_zoom: f32,
    /// Largest allowed zoom factor.
    pub max_zoom: f32,
    /// Zoom multiplier for one button press or wheel notch.
    pub zoom_step: f32,
    /// Offset applied on both axes to every paste.
    pub paste_offset: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            zoom_step: 1.1,
            paste_offset: 15.0,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Serialization`] for malformed JSON and
    /// [`CanvasError::Config`] if validation fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Config`] describing the first invalid field.
    pub fn validate(&self) -> CanvasResult<()> {
        let finite = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("zoom_step", self.zoom_step),
            ("paste_offset", self.paste_offset),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CanvasError::Config(format!("{name} must be finite")));
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(CanvasError::Config("viewport must have positive size".into()));
        }
        if self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            return Err(CanvasError::Config(format!(
                "zoom range [{}, {}] is invalid",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_step <= 1.0 {
            return Err(CanvasError::Config("zoom_step must be greater than 1".into()));
        }
        if self.paste_offset.abs() < f32::EPSILON {
            return Err(CanvasError::Config(
                "paste_offset must be non-zero so pastes never cover their source".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        EditorConfig::default().validate().expect("valid");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"max_zoom": 8.0}"#).expect("valid");
        assert!((config.max_zoom - 8.0).abs() < f32::EPSILON);
        assert!((config.paste_offset - 15.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            EditorConfig::from_json(r#"{"min_zoom": 2.0, "max_zoom": 1.0}"#),
            Err(CanvasError::Config(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"paste_offset": 0.0}"#),
            Err(CanvasError::Config(_))
        ));
        assert!(matches!(
            EditorConfig::from_json(r#"{"zoom_step": 0.5}"#),
            Err(CanvasError::Config(_))
        ));
        assert!(matches!(
            EditorConfig::from_json("not json"),
            Err(CanvasError::Serialization(_))
        ));
    }
}
