//! Pixshop - AI photo editing on top of Gemini image generation
//!
//! Sends images and natural-language instructions to a hosted generative-image
//! model and turns whatever comes back into either an image data URL or a
//! classified, human-readable failure.

pub mod ai;
pub mod app;
pub mod detection;
pub mod error;
pub mod interpret;
pub mod models;
pub mod presets;
pub mod prompts;

pub use error::{Error, Result};
