//! Application orchestration: load inputs, run one operation, save the result.

use crate::ai::gemini::types::InlineData;
use crate::ai::mime::{decode_data_url, extension_for_mime};
use crate::ai::{
    GeminiDetectionClient, GeminiImageEditClient, ImageEditService, ObjectDetectionService,
};
use crate::detection::DetectedObject;
use crate::models::{Config, Hotspot, UpscaleTarget};
use crate::{Error, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// Where a localized edit should focus.
#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Point(Hotspot),
    /// Label of an object to find with detection first.
    Object(String),
}

/// A single user-facing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Edit {
        input: PathBuf,
        instruction: String,
        target: EditTarget,
    },
    Filter {
        input: PathBuf,
        filter: String,
    },
    Adjust {
        input: PathBuf,
        adjustment: String,
    },
    Background {
        input: PathBuf,
        background: String,
    },
    Composite {
        background: PathBuf,
        objects: Vec<PathBuf>,
        instruction: String,
    },
    Upscale {
        input: PathBuf,
        target: UpscaleTarget,
    },
    Detect {
        input: PathBuf,
    },
}

impl Operation {
    /// Short name used for output file names.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Edit { .. } => "edit",
            Operation::Filter { .. } => "filter",
            Operation::Adjust { .. } => "adjust",
            Operation::Background { .. } => "background",
            Operation::Composite { .. } => "composite",
            Operation::Upscale { .. } => "upscale",
            Operation::Detect { .. } => "detections",
        }
    }
}

#[derive(Debug, Clone)]
pub enum RunOutput {
    Image {
        path: PathBuf,
        mime_type: String,
    },
    Detections {
        path: PathBuf,
        objects: Vec<DetectedObject>,
    },
}

/// An input image, validated and ready to send.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub payload: InlineData,
    pub width: u32,
    pub height: u32,
}

impl LoadedImage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        Ok(Self {
            payload: InlineData::from_bytes(bytes),
            width: decoded.width(),
            height: decoded.height(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let loaded = Self::from_bytes(&bytes)?;
        info!(
            "Loaded {} ({}x{}, {})",
            path.display(),
            loaded.width,
            loaded.height,
            loaded.payload.mime_type
        );
        Ok(loaded)
    }

    fn contains(&self, hotspot: Hotspot) -> bool {
        hotspot.x < self.width && hotspot.y < self.height
    }

    fn clamp(&self, hotspot: Hotspot) -> Hotspot {
        Hotspot {
            x: hotspot.x.min(self.width.saturating_sub(1)),
            y: hotspot.y.min(self.height.saturating_sub(1)),
        }
    }
}

/// Coordinates editing and detection services for one CLI invocation.
pub struct App {
    editor: Box<dyn ImageEditService>,
    detector: Box<dyn ObjectDetectionService>,
    output_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub editor: Box<dyn ImageEditService>,
    pub detector: Box<dyn ObjectDetectionService>,
}

impl App {
    pub fn with_services(services: AppServices, output_dir: PathBuf) -> Self {
        Self {
            editor: services.editor,
            detector: services.detector,
            output_dir,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;

        let date = Local::now().format("%Y-%m-%d").to_string();
        let session_id = Uuid::new_v4();
        let output_dir = config
            .output_root
            .join(format!("{}_{}", date, session_id));

        // Reuse one HTTP connection pool across both clients.
        let http_client = reqwest::Client::new();
        let timeout = Duration::from_secs(config.timeout_secs);

        info!("Image model: {}", config.image_model);
        info!("Detection model: {}", config.detection_model);

        let editor = GeminiImageEditClient::new_with_client(
            config.gemini_api_key.clone(),
            config.image_model.clone(),
            timeout,
            http_client.clone(),
        );
        let detector = GeminiDetectionClient::new_with_client(
            config.gemini_api_key,
            config.detection_model,
            timeout,
            http_client,
        );

        Ok(Self::with_services(
            AppServices {
                editor: Box::new(editor),
                detector: Box::new(detector),
            },
            output_dir,
        ))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run one operation and write its result under the output directory.
    pub async fn run(&self, operation: Operation) -> Result<RunOutput> {
        let name = operation.name();
        info!("Running {}", name);

        let data_url = match operation {
            Operation::Edit {
                input,
                instruction,
                target,
            } => {
                let image = LoadedImage::from_path(&input)?;
                let hotspot = self.resolve_hotspot(&image, &target).await?;
                self.editor
                    .edit(&image.payload, &instruction, hotspot)
                    .await?
            }
            Operation::Filter { input, filter } => {
                let image = LoadedImage::from_path(&input)?;
                self.editor.apply_filter(&image.payload, &filter).await?
            }
            Operation::Adjust { input, adjustment } => {
                let image = LoadedImage::from_path(&input)?;
                self.editor
                    .apply_adjustment(&image.payload, &adjustment)
                    .await?
            }
            Operation::Background { input, background } => {
                let image = LoadedImage::from_path(&input)?;
                self.editor
                    .replace_background(&image.payload, &background)
                    .await?
            }
            Operation::Composite {
                background,
                objects,
                instruction,
            } => {
                if objects.is_empty() {
                    return Err(Error::InvalidInput(
                        "Composition needs at least one object image".to_string(),
                    ));
                }
                let background = LoadedImage::from_path(&background)?;
                let objects = objects
                    .iter()
                    .map(|path| LoadedImage::from_path(path).map(|image| image.payload))
                    .collect::<Result<Vec<_>>>()?;
                self.editor
                    .composite(&background.payload, &objects, &instruction)
                    .await?
            }
            Operation::Upscale { input, target } => {
                let image = LoadedImage::from_path(&input)?;
                self.editor.upscale(&image.payload, target).await?
            }
            Operation::Detect { input } => {
                let image = LoadedImage::from_path(&input)?;
                let objects = self.detector.detect_objects(&image.payload).await?;
                let path = self.save_detections(&objects)?;
                return Ok(RunOutput::Detections { path, objects });
            }
        };

        let (path, mime_type) = self.save_image(name, &data_url)?;
        Ok(RunOutput::Image { path, mime_type })
    }

    async fn resolve_hotspot(&self, image: &LoadedImage, target: &EditTarget) -> Result<Hotspot> {
        match target {
            EditTarget::Point(hotspot) => {
                if !image.contains(*hotspot) {
                    return Err(Error::InvalidInput(format!(
                        "Hotspot ({}, {}) is outside the {}x{} image",
                        hotspot.x, hotspot.y, image.width, image.height
                    )));
                }
                Ok(*hotspot)
            }
            EditTarget::Object(label) => {
                let objects = self.detector.detect_objects(&image.payload).await?;
                let wanted = label.trim().to_lowercase();
                let object = objects
                    .iter()
                    .find(|o| o.label.trim().to_lowercase() == wanted)
                    .ok_or_else(|| {
                        let found: Vec<&str> = objects.iter().map(|o| o.label.as_str()).collect();
                        Error::InvalidInput(format!(
                            "No detected object labelled '{}' (found: [{}])",
                            label,
                            found.join(", ")
                        ))
                    })?;

                let hotspot = image.clamp(object.center());
                info!(
                    "Targeting '{}' at ({}, {})",
                    object.label, hotspot.x, hotspot.y
                );
                Ok(hotspot)
            }
        }
    }

    fn save_image(&self, name: &str, data_url: &str) -> Result<(PathBuf, String)> {
        let decoded = decode_data_url(data_url)?;
        fs::create_dir_all(&self.output_dir)?;

        let filename = format!(
            "{}_{}.{}",
            name,
            Uuid::new_v4(),
            extension_for_mime(&decoded.mime_type)
        );
        let path = self.output_dir.join(filename);
        fs::write(&path, &decoded.bytes)?;
        info!(
            "Saved {} ({} bytes) to {}",
            decoded.mime_type,
            decoded.bytes.len(),
            path.display()
        );

        Ok((path, decoded.mime_type))
    }

    fn save_detections(&self, objects: &[DetectedObject]) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let path = self
            .output_dir
            .join(format!("detections_{}.json", Uuid::new_v4()));
        fs::write(&path, serde_json::to_string_pretty(objects)?)?;
        info!("Saved {} detection(s) to {}", objects.len(), path.display());

        Ok(path)
    }
}
