//! Image MIME sniffing and data URL handling.

use crate::{Error, Result};

pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/png",
                &bytes[..bytes.len().min(4)]
            );
            "image/png"
        }
    }
}

/// File extension used when saving an image of the given MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// A data URL split into its MIME type and decoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Decodes a `data:<mime>;base64,<body>` URL.
pub fn decode_data_url(url: &str) -> Result<DecodedDataUrl> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| Error::InvalidInput("Data URL must start with 'data:'".to_string()))?;

    let (mime_type, body) = rest.split_once(";base64,").ok_or_else(|| {
        Error::InvalidInput("Data URL must be base64-encoded (missing ';base64,')".to_string())
    })?;

    use base64::Engine as _;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body.trim())
        .map_err(|e| Error::InvalidInput(format!("Failed to decode data URL body: {}", e)))?;

    Ok(DecodedDataUrl {
        mime_type: mime_type.to_string(),
        bytes,
    })
}
