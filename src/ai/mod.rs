//! AI service integration for image editing and object detection
//!
//! Every operation sends one or more images plus an instruction to Gemini and
//! hands the response to [`crate::interpret`] or [`crate::detection`].

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiDetectionClient, GeminiImageEditClient};
pub use mock::{MockDetectionClient, MockImageEditClient};

use crate::ai::gemini::types::InlineData;
use crate::detection::DetectedObject;
use crate::models::{Hotspot, UpscaleTarget};
use crate::Result;
use async_trait::async_trait;

/// Image-producing operations. Each returns a `data:` URL of the result.
#[async_trait]
pub trait ImageEditService: Send + Sync {
    /// Localized edit focused on `hotspot`.
    async fn edit(&self, image: &InlineData, instruction: &str, hotspot: Hotspot)
        -> Result<String>;

    /// Stylistic filter over the whole image.
    async fn apply_filter(&self, image: &InlineData, filter: &str) -> Result<String>;

    /// Photorealistic global adjustment.
    async fn apply_adjustment(&self, image: &InlineData, adjustment: &str) -> Result<String>;

    async fn replace_background(&self, image: &InlineData, background: &str) -> Result<String>;

    /// Places each of `objects` into `background` as `instruction` describes.
    async fn composite(
        &self,
        background: &InlineData,
        objects: &[InlineData],
        instruction: &str,
    ) -> Result<String>;

    async fn upscale(&self, image: &InlineData, target: UpscaleTarget) -> Result<String>;
}

#[async_trait]
pub trait ObjectDetectionService: Send + Sync {
    async fn detect_objects(&self, image: &InlineData) -> Result<Vec<DetectedObject>>;
}

/// Context label used in messages for an upscale to `target`.
pub fn upscale_context(target: UpscaleTarget) -> String {
    format!("upscale to {}", target)
}
