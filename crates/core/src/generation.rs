//! Fixed generation parameters sent with every prediction.
//!
//! Both product flows share one model version and one set of sampler
//! settings; only the prompt text differs.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Model version used for line-art generation.
pub const DEFAULT_MODEL_VERSION: &str =
    "c221b2b8ef527988fb59bf24a8b97c4561f1c671f73bd389f866bfb27c061316";

/// Suppresses artifacts that ruin a printable coloring page.
pub const DEFAULT_NEGATIVE_PROMPT: &str =
    "blurry, bad, text, watermark, signature, color, photorealistic, shadows, gradient";

pub const DEFAULT_NUM_OUTPUTS: u32 = 1;
pub const DEFAULT_WIDTH: u32 = 768;
pub const DEFAULT_HEIGHT: u32 = 768;
pub const DEFAULT_INFERENCE_STEPS: u32 = 30;
pub const DEFAULT_GUIDANCE_SCALE: f64 = 7.5;

/// Largest edge the provider accepts.
const MAX_DIMENSION: u32 = 1024;
/// Provider dimensions must be multiples of this.
const DIMENSION_STEP: u32 = 8;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Sampler settings attached to every prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub negative_prompt: String,
    pub num_outputs: u32,
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            negative_prompt: DEFAULT_NEGATIVE_PROMPT.to_string(),
            num_outputs: DEFAULT_NUM_OUTPUTS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            num_inference_steps: DEFAULT_INFERENCE_STEPS,
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
        }
    }
}

impl GenerationSettings {
    /// Check that the settings are within the ranges the provider accepts.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.num_outputs == 0 {
            return Err(CoreError::Validation("num_outputs must be at least 1".into()));
        }
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > MAX_DIMENSION || value % DIMENSION_STEP != 0 {
                return Err(CoreError::Validation(format!(
                    "{name} must be a multiple of {DIMENSION_STEP} in 1..={MAX_DIMENSION}, got {value}"
                )));
            }
        }
        if self.num_inference_steps == 0 {
            return Err(CoreError::Validation(
                "num_inference_steps must be at least 1".into(),
            ));
        }
        if !(self.guidance_scale.is_finite() && self.guidance_scale > 0.0) {
            return Err(CoreError::Validation(format!(
                "guidance_scale must be positive, got {}",
                self.guidance_scale
            )));
        }
        Ok(())
    }
}
