pub const EDIT: &str = include_str!("../data/prompts/edit.txt");
pub const FILTER: &str = include_str!("../data/prompts/filter.txt");
pub const ADJUSTMENT: &str = include_str!("../data/prompts/adjustment.txt");
pub const BACKGROUND: &str = include_str!("../data/prompts/background.txt");
pub const COMPOSITE: &str = include_str!("../data/prompts/composite.txt");
pub const UPSCALE: &str = include_str!("../data/prompts/upscale.txt");
pub const DETECTION: &str = include_str!("../data/prompts/detection.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
