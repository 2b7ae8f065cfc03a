//! Named filter and adjustment presets.

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub prompt: &'static str,
}

pub const FILTERS: &[Preset] = &[
    Preset {
        name: "Synthwave",
        prompt: "Apply a vibrant 80s synthwave aesthetic with neon magenta and cyan glows, and subtle scan lines.",
    },
    Preset {
        name: "Anime",
        prompt: "Give the image a vibrant Japanese anime style, with bold outlines, cel-shading, and saturated colors.",
    },
    Preset {
        name: "Lomo",
        prompt: "Apply a Lomography-style cross-processing film effect with high-contrast, oversaturated colors, and dark vignetting.",
    },
    Preset {
        name: "Glitch",
        prompt: "Transform the image into a futuristic holographic projection with digital glitch effects and chromatic aberration.",
    },
];

pub const ADJUSTMENTS: &[Preset] = &[
    Preset {
        name: "Blur Background",
        prompt: "Apply a realistic depth-of-field effect, making the background blurry while keeping the main subject in sharp focus.",
    },
    Preset {
        name: "Enhance Details",
        prompt: "Slightly enhance the sharpness and details of the image without making it look unnatural.",
    },
    Preset {
        name: "Warmer Lighting",
        prompt: "Adjust the color temperature to give the image warmer, golden-hour style lighting.",
    },
    Preset {
        name: "Studio Light",
        prompt: "Add dramatic, professional studio lighting to the main subject.",
    },
];

/// Case-insensitive lookup; dashes and underscores match spaces.
pub fn find<'a>(presets: &'a [Preset], name: &str) -> Option<&'a Preset> {
    let wanted = normalize(name);
    presets.iter().find(|p| normalize(p.name) == wanted)
}

/// Picks the instruction from a preset name or a free-form prompt.
///
/// Exactly one of the two must be given.
pub fn resolve(presets: &[Preset], preset: Option<&str>, prompt: Option<&str>) -> Result<String> {
    match (preset, prompt.map(str::trim).filter(|p| !p.is_empty())) {
        (Some(name), None) => find(presets, name).map(|p| p.prompt.to_string()).ok_or_else(|| {
            let names: Vec<&str> = presets.iter().map(|p| p.name).collect();
            Error::InvalidInput(format!(
                "Unknown preset '{}'. Available: {}",
                name,
                names.join(", ")
            ))
        }),
        (None, Some(prompt)) => Ok(prompt.to_string()),
        (Some(_), Some(_)) => Err(Error::InvalidInput(
            "Use either a preset or a custom prompt, not both".to_string(),
        )),
        (None, None) => Err(Error::InvalidInput(
            "A preset or a non-empty custom prompt is required".to_string(),
        )),
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find(FILTERS, "anime").unwrap().name, "Anime");
        assert_eq!(find(ADJUSTMENTS, "blur-background").unwrap().name, "Blur Background");
        assert_eq!(find(ADJUSTMENTS, " studio_light ").unwrap().name, "Studio Light");
    }

    #[test]
    fn test_find_unknown() {
        assert!(find(FILTERS, "sepia").is_none());
        assert!(find(FILTERS, "Blur Background").is_none());
    }

    #[test]
    fn test_resolve_preset_or_prompt() {
        assert_eq!(
            resolve(FILTERS, Some("lomo"), None).unwrap(),
            find(FILTERS, "Lomo").unwrap().prompt
        );
        assert_eq!(
            resolve(ADJUSTMENTS, None, Some("  make it moody ")).unwrap(),
            "make it moody"
        );
    }

    #[test]
    fn test_resolve_rejects_bad_combinations() {
        assert!(matches!(
            resolve(FILTERS, Some("sepia"), None),
            Err(Error::InvalidInput(msg)) if msg.contains("Synthwave")
        ));
        assert!(resolve(FILTERS, Some("Anime"), Some("also this")).is_err());
        assert!(resolve(FILTERS, None, Some("   ")).is_err());
        assert!(resolve(FILTERS, None, None).is_err());
    }

    #[test]
    fn test_preset_names_are_unique() {
        for presets in [FILTERS, ADJUSTMENTS] {
            for (i, a) in presets.iter().enumerate() {
                assert!(presets[i + 1..].iter().all(|b| normalize(a.name) != normalize(b.name)));
            }
        }
    }
}
