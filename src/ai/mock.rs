use super::gemini::types::InlineData;
use super::{ImageEditService, ObjectDetectionService};
use crate::detection::DetectedObject;
use crate::interpret::InterpretError;
use crate::models::{Hotspot, UpscaleTarget};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// 1x1 PNG, returned when no image responses were configured.
const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAIAAACQd1PeAAAADElEQVR4nGP4z8AAAAMBAQDJ/pLvAAAAAElFTkSuQmCC";

/// One recorded call against [`MockImageEditClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct EditCall {
    pub operation: &'static str,
    pub instruction: String,
    pub hotspot: Option<Hotspot>,
    pub image_count: usize,
}

pub struct MockImageEditClient {
    image_responses: Arc<Mutex<Vec<String>>>,
    failure: Option<InterpretError>,
    calls: Arc<Mutex<Vec<EditCall>>>,
}

impl MockImageEditClient {
    pub fn new() -> Self {
        Self {
            image_responses: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a data URL to return. Responses cycle once exhausted.
    pub fn with_image_response(self, data_url: String) -> Self {
        self.image_responses.lock().unwrap().push(data_url);
        self
    }

    /// Make every call fail with `failure`.
    pub fn with_failure(mut self, failure: InterpretError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<EditCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        operation: &'static str,
        instruction: &str,
        hotspot: Option<Hotspot>,
        image_count: usize,
    ) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(EditCall {
            operation,
            instruction: instruction.to_string(),
            hotspot,
            image_count,
        });

        if let Some(failure) = &self.failure {
            return Err(Error::Interpret(failure.clone()));
        }

        let responses = self.image_responses.lock().unwrap();
        if responses.is_empty() {
            Ok(format!("data:image/png;base64,{}", TINY_PNG_BASE64))
        } else {
            let index = (calls.len() - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

impl Default for MockImageEditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageEditService for MockImageEditClient {
    async fn edit(
        &self,
        _image: &InlineData,
        instruction: &str,
        hotspot: Hotspot,
    ) -> Result<String> {
        self.record("edit", instruction, Some(hotspot), 1)
    }

    async fn apply_filter(&self, _image: &InlineData, filter: &str) -> Result<String> {
        self.record("filter", filter, None, 1)
    }

    async fn apply_adjustment(&self, _image: &InlineData, adjustment: &str) -> Result<String> {
        self.record("adjustment", adjustment, None, 1)
    }

    async fn replace_background(&self, _image: &InlineData, background: &str) -> Result<String> {
        self.record("background", background, None, 1)
    }

    async fn composite(
        &self,
        _background: &InlineData,
        objects: &[InlineData],
        instruction: &str,
    ) -> Result<String> {
        self.record("composite", instruction, None, 1 + objects.len())
    }

    async fn upscale(&self, _image: &InlineData, target: UpscaleTarget) -> Result<String> {
        self.record("upscale", target.label(), None, 1)
    }
}

pub struct MockDetectionClient {
    objects: Vec<DetectedObject>,
    call_count: Arc<Mutex<usize>>,
}

impl MockDetectionClient {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_object(mut self, object: DetectedObject) -> Self {
        self.objects.push(object);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockDetectionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectDetectionService for MockDetectionClient {
    async fn detect_objects(&self, _image: &InlineData) -> Result<Vec<DetectedObject>> {
        *self.call_count.lock().unwrap() += 1;
        Ok(self.objects.clone())
    }
}
