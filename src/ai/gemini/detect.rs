use super::client::GeminiHttpClient;
use super::types::{GenerateContentRequest, GenerationConfig, InlineData};
use super::user_content;
use crate::ai::ObjectDetectionService;
use crate::detection::{parse_detection_response, response_schema, DetectedObject};
use crate::{prompts, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiDetectionClient {
    http: GeminiHttpClient,
}

impl GeminiDetectionClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(
            api_key,
            model,
            Duration::from_secs(crate::models::DEFAULT_DETECTION_TIMEOUT_SECS),
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
}

#[async_trait]
impl ObjectDetectionService for GeminiDetectionClient {
    async fn detect_objects(&self, image: &InlineData) -> Result<Vec<DetectedObject>> {
        tracing::debug!(
            "Detecting objects in {} image via Gemini ({})",
            image.mime_type,
            self.http.model()
        );

        let request = GenerateContentRequest {
            contents: vec![user_content(&[image], prompts::DETECTION.to_string())],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(response_schema()),
                ..Default::default()
            }),
        };

        let response = self.http.generate_content(&request).await?;
        Ok(parse_detection_response(&response)?)
    }
}
