pub mod client;
pub mod detect;
pub mod edit;
pub mod types;

pub use client::GeminiHttpClient;
pub use detect::GeminiDetectionClient;
pub use edit::GeminiImageEditClient;

/// Builds a `user` content holding the images followed by the prompt text.
pub(crate) fn user_content(images: &[&types::InlineData], prompt: String) -> types::Content {
    let mut parts: Vec<types::Part> = images
        .iter()
        .map(|image| types::Part::InlineData {
            inline_data: (*image).clone(),
        })
        .collect();
    parts.push(types::Part::Text { text: prompt });

    types::Content {
        role: Some("user".to_string()),
        parts,
    }
}
