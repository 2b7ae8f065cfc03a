use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerationConfig, InlineData};
use super::user_content;
use crate::ai::{upscale_context, ImageEditService};
use crate::interpret::interpret;
use crate::models::{Hotspot, UpscaleTarget};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiImageEditClient {
    http: GeminiHttpClient,
}

impl GeminiImageEditClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(
            api_key,
            model,
            Duration::from_secs(crate::models::DEFAULT_TIMEOUT_SECS),
            reqwest::Client::new(),
        )
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    /// Sends `images` and `prompt`, then interprets the reply for `context`.
    async fn generate(
        &self,
        images: &[&InlineData],
        prompt: String,
        context: &str,
    ) -> Result<String> {
        tracing::info!(
            "Requesting {} from {} with {} image(s)",
            context,
            self.http.model(),
            images.len()
        );

        let request = GenerateContentRequest {
            contents: vec![user_content(images, prompt)],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
                ..Default::default()
            }),
        };

        let response = self.http.generate_content(&request).await?;
        Ok(interpret(&response, context)?)
    }
}

#[async_trait]
impl ImageEditService for GeminiImageEditClient {
    async fn edit(
        &self,
        image: &InlineData,
        instruction: &str,
        hotspot: Hotspot,
    ) -> Result<String> {
        let prompt = prompts::render(
            prompts::EDIT,
            &[
                ("instruction", instruction),
                ("x", &hotspot.x.to_string()),
                ("y", &hotspot.y.to_string()),
            ],
        );
        self.generate(&[image], prompt, "edit").await
    }

    async fn apply_filter(&self, image: &InlineData, filter: &str) -> Result<String> {
        let prompt = prompts::render(prompts::FILTER, &[("filter", filter)]);
        self.generate(&[image], prompt, "filter").await
    }

    async fn apply_adjustment(&self, image: &InlineData, adjustment: &str) -> Result<String> {
        let prompt = prompts::render(prompts::ADJUSTMENT, &[("adjustment", adjustment)]);
        self.generate(&[image], prompt, "adjustment").await
    }

    async fn replace_background(&self, image: &InlineData, background: &str) -> Result<String> {
        let prompt = prompts::render(prompts::BACKGROUND, &[("background", background)]);
        self.generate(&[image], prompt, "background replacement").await
    }

    async fn composite(
        &self,
        background: &InlineData,
        objects: &[InlineData],
        instruction: &str,
    ) -> Result<String> {
        if objects.is_empty() {
            return Err(Error::InvalidInput(
                "Composition needs at least one object image".to_string(),
            ));
        }

        let prompt = prompts::render(
            prompts::COMPOSITE,
            &[
                ("instruction", instruction),
                ("object_count", &objects.len().to_string()),
            ],
        );
        let images: Vec<&InlineData> = std::iter::once(background).chain(objects).collect();
        self.generate(&images, prompt, "composition").await
    }

    async fn upscale(&self, image: &InlineData, target: UpscaleTarget) -> Result<String> {
        let prompt = prompts::render(
            prompts::UPSCALE,
            &[
                ("target", target.label()),
                ("long_edge", &target.long_edge().to_string()),
            ],
        );
        self.generate(&[image], prompt, &upscale_context(target)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use crate::interpret::InterpretError;
    use wiremock::matchers::{body_partial_json, body_string_contains};
    use wiremock::{MockServer, ResponseTemplate};

    const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

    fn make_client(server: &MockServer) -> GeminiImageEditClient {
        GeminiImageEditClient::new("key".to_string(), DEFAULT_MODEL.to_string())
            .with_base_url(server.uri())
    }

    fn input() -> InlineData {
        InlineData {
            mime_type: "image/png".to_string(),
            data: "aW5wdXQ=".to_string(),
        }
    }

    #[tokio::test]
    async fn test_edit_returns_data_url() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("(x: 12, y: 34)"))
            .and(body_string_contains("remove the lamp post"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::image_body("image/png", "b3V0cHV0")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = make_client(&server)
            .edit(&input(), "remove the lamp post", Hotspot { x: 12, y: 34 })
            .await
            .unwrap();
        assert_eq!(result, "data:image/png;base64,b3V0cHV0");
    }

    #[tokio::test]
    async fn test_request_carries_image_and_modalities() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_partial_json(serde_json::json!({
                "contents": [{
                    "role": "user",
                    "parts": [{ "inlineData": { "mimeType": "image/png", "data": "aW5wdXQ=" } }]
                }],
                "generationConfig": { "responseModalities": ["IMAGE", "TEXT"] }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::image_body("image/png", "AAAA")),
            )
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .apply_filter(&input(), "Anime")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_text_reply_is_no_image_returned() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_body("I cannot do that.")),
            )
            .mount(&server)
            .await;

        let err = make_client(&server)
            .apply_adjustment(&input(), "make it warmer")
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            Error::Interpret(InterpretError::NoImageReturned { context, .. }) if context == "adjustment"
        ));
        assert!(err.to_string().contains("I cannot do that."));
    }

    #[tokio::test]
    async fn test_blocked_background_replacement() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .replace_background(&input(), "a beach at sunset")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Interpret(InterpretError::RequestBlocked { .. })
        ));
    }

    #[tokio::test]
    async fn test_composite_sends_background_first() {
        let server = MockServer::start().await;

        let object = InlineData {
            mime_type: "image/jpeg".to_string(),
            data: "b2JqZWN0".to_string(),
        };

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("following 1 image(s)"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "aW5wdXQ=" } },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "b2JqZWN0" } }
                    ]
                }]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::image_body("image/png", "AAAA")),
            )
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server)
            .composite(&input(), &[object], "put the vase on the table")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_composite_without_objects_is_rejected() {
        let server = MockServer::start().await;

        let err = make_client(&server)
            .composite(&input(), &[], "nothing to place")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_upscale_context_in_safety_failure() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_string_contains("4K resolution"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{ "finishReason": "SAFETY" }]
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .upscale(&input(), UpscaleTarget::FourK)
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("upscale to 4K"));
        assert!(message.contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_api_error_returns_ai_provider_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .edit(&input(), "anything", Hotspot { x: 0, y: 0 })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
