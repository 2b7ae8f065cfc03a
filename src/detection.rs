//! Object detection payloads
//!
//! The detection call asks the model for a JSON array of labelled boxes. An
//! empty reply means nothing was found, which is not an error.

use crate::ai::gemini::types::GenerateContentResponse;
use crate::interpret::{block_reason, blocked_error, InterpretError};
use crate::models::Hotspot;
use serde::{Deserialize, Serialize};

/// Axis-aligned box in the pixel space of the submitted image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub label: String,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

impl DetectedObject {
    /// Center of the box, as an edit hotspot. Negative coordinates clamp to 0.
    pub fn center(&self) -> Hotspot {
        let b = &self.bounding_box;
        Hotspot {
            x: ((b.x1 + b.x2) / 2.0).round().max(0.0) as u32,
            y: ((b.y1 + b.y2) / 2.0).round().max(0.0) as u32,
        }
    }
}

/// JSON schema handed to Gemini so the reply is an array of labelled boxes.
pub fn response_schema() -> serde_json::Value {
    let coordinate = serde_json::json!({ "type": "NUMBER" });
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "label": { "type": "STRING" },
                "box": {
                    "type": "OBJECT",
                    "properties": {
                        "x1": coordinate,
                        "y1": coordinate,
                        "x2": coordinate,
                        "y2": coordinate
                    },
                    "required": ["x1", "y1", "x2", "y2"]
                }
            },
            "required": ["label", "box"]
        }
    })
}

/// Parses a detection response into labelled boxes.
///
/// A block reason fails as [`InterpretError::RequestBlocked`]. Empty text is
/// an empty list. Anything that is not a JSON array of well-formed objects
/// fails as [`InterpretError::MalformedDetectionPayload`].
pub fn parse_detection_response(
    response: &GenerateContentResponse,
) -> std::result::Result<Vec<DetectedObject>, InterpretError> {
    if let Some((reason, message)) = block_reason(response) {
        tracing::warn!("Detection request blocked: {}", reason);
        return Err(blocked_error(reason, message));
    }

    let text = response.text().unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        tracing::info!("Detection returned no objects");
        return Ok(Vec::new());
    }

    let malformed = |detail: String| {
        tracing::warn!("Malformed detection payload ({}): {}", detail, text);
        InterpretError::MalformedDetectionPayload { detail }
    };

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| malformed(format!("not valid JSON: {}", e)))?;

    if !value.is_array() {
        return Err(malformed("expected a JSON array".to_string()));
    }

    let objects: Vec<DetectedObject> = serde_json::from_value(value)
        .map_err(|e| malformed(format!("unexpected element shape: {}", e)))?;

    tracing::info!("Detected {} object(s)", objects.len());
    Ok(objects)
}
