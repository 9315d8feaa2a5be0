//! Vision configuration.

use canvas_core::{CanvasError, CanvasResult};
use serde::{Deserialize, Serialize};

/// Thresholds and labels for the vision pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// A mask whose box spans at least this fraction of both image
    /// dimensions is treated as the whole image and dropped.
    pub whole_image_fraction: f32,
    /// Masks whose intersection over union with an accepted mask exceeds
    /// this are dropped.
    pub duplicate_iou: f32,
    /// Label prefix for cut-outs; a 1-based counter is appended.
    pub segment_label_prefix: String,
    /// Label for AI-edited results.
    pub edited_label: String,
    /// Label for imported images.
    pub imported_label: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            whole_image_fraction: 0.9,
            duplicate_iou: 0.9,
            segment_label_prefix: "Segment".to_string(),
            edited_label: "AI Edited Image".to_string(),
            imported_label: "Imported Image".to_string(),
        }
    }
}

impl VisionConfig {
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

    /// Check that the thresholds are fractions.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::Config`] describing the first invalid field.
    pub fn validate(&self) -> CanvasResult<()> {
        for (name, value) in [
            ("whole_image_fraction", self.whole_image_fraction),
            ("duplicate_iou", self.duplicate_iou),
        ] {
            if value.is_nan() || value <= 0.0 || value > 1.0 {
                return Err(CanvasError::Config(format!(
                    "{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if self.segment_label_prefix.trim().is_empty() {
            return Err(CanvasError::Config(
                "segment_label_prefix must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Label for the `n`-th (1-based) segment added in one call.
    #[must_use]
    pub fn segment_label(&self, n: usize) -> String {
        format!("{} {n}", self.segment_label_prefix)
    }
}
