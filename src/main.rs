use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pixshop::app::{App, EditTarget, Operation, RunOutput};
use pixshop::models::{Hotspot, UpscaleTarget};
use pixshop::presets;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pixshop")]
#[command(about = "AI photo editing powered by Gemini")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Localized edit at a point, or at a detected object.
    Edit {
        input: PathBuf,
        /// What to change, e.g. "remove the person in the background".
        #[arg(long)]
        prompt: String,
        #[arg(long, requires = "y", conflicts_with = "object")]
        x: Option<u32>,
        #[arg(long, requires = "x", conflicts_with = "object")]
        y: Option<u32>,
        /// Detect objects first and edit the one with this label.
        #[arg(long, required_unless_present = "x")]
        object: Option<String>,
    },
    /// Apply a stylistic filter.
    Filter(PresetArgs),
    /// Apply a photorealistic global adjustment.
    Adjust(PresetArgs),
    /// Replace the background behind the main subject.
    Background {
        input: PathBuf,
        /// Description of the new background.
        #[arg(long)]
        prompt: String,
    },
    /// Place object images into a background scene.
    Composite {
        background: PathBuf,
        #[arg(required = true)]
        objects: Vec<PathBuf>,
        #[arg(long)]
        prompt: String,
    },
    /// Upscale to 2K or 4K.
    Upscale {
        input: PathBuf,
        #[arg(long, default_value = "4K")]
        target: UpscaleTarget,
    },
    /// Detect objects and print them as JSON.
    Detect { input: PathBuf },
    /// List the built-in filter and adjustment presets.
    Presets,
}

#[derive(Debug, Args)]
struct PresetArgs {
    input: PathBuf,
    /// Name of a built-in preset (see `pixshop presets`).
    #[arg(long)]
    preset: Option<String>,
    /// Custom instruction instead of a preset.
    #[arg(long)]
    prompt: Option<String>,
}

fn print_presets() {
    for (title, list) in [("Filters", presets::FILTERS), ("Adjustments", presets::ADJUSTMENTS)] {
        println!("{}:", title);
        for preset in list {
            println!("  {:<16} {}", preset.name, preset.prompt);
        }
    }
}

/// `None` for commands that need no app, like `presets`.
fn to_operation(command: Command) -> pixshop::Result<Option<Operation>> {
    Ok(Some(match command {
        Command::Edit {
            input,
            prompt,
            x,
            y,
            object,
        } => {
            let target = match (object, x, y) {
                (Some(label), _, _) => EditTarget::Object(label),
                (None, Some(x), Some(y)) => EditTarget::Point(Hotspot { x, y }),
                _ => {
                    return Err(pixshop::Error::InvalidInput(
                        "Edit needs --x/--y or --object".to_string(),
                    ))
                }
            };
            Operation::Edit {
                input,
                instruction: prompt,
                target,
            }
        }
        Command::Filter(args) => Operation::Filter {
            filter: presets::resolve(
                presets::FILTERS,
                args.preset.as_deref(),
                args.prompt.as_deref(),
            )?,
            input: args.input,
        },
        Command::Adjust(args) => Operation::Adjust {
            adjustment: presets::resolve(
                presets::ADJUSTMENTS,
                args.preset.as_deref(),
                args.prompt.as_deref(),
            )?,
            input: args.input,
        },
        Command::Background { input, prompt } => Operation::Background {
            input,
            background: prompt,
        },
        Command::Composite {
            background,
            objects,
            prompt,
        } => Operation::Composite {
            background,
            objects,
            instruction: prompt,
        },
        Command::Upscale { input, target } => Operation::Upscale { input, target },
        Command::Detect { input } => Operation::Detect { input },
        Command::Presets => return Ok(None),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixshop=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let operation = match to_operation(args.command) {
        Ok(Some(operation)) => operation,
        Ok(None) => {
            print_presets();
            return Ok(());
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    let app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize app: {}", e);
            std::process::exit(1);
        }
    };
    info!("Output directory: {}", app.output_dir().display());

    match app.run(operation).await {
        Ok(RunOutput::Image { path, mime_type }) => {
            info!("Wrote {} result", mime_type);
            println!("{}", path.display());
            Ok(())
        }
        Ok(RunOutput::Detections { path, objects }) => {
            println!("{}", serde_json::to_string_pretty(&objects)?);
            info!("Wrote detections to {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn operation(args: &[&str]) -> pixshop::Result<Option<Operation>> {
        let cli = CliArgs::try_parse_from(std::iter::once("pixshop").chain(args.iter().copied()))
            .unwrap();
        to_operation(cli.command)
    }

    #[test]
    fn test_edit_at_point() {
        let op = operation(&[
            "edit", "photo.png", "--prompt", "remove the cup", "--x", "10", "--y", "20",
        ])
        .unwrap();
        assert_eq!(
            op,
            Some(Operation::Edit {
                input: PathBuf::from("photo.png"),
                instruction: "remove the cup".to_string(),
                target: EditTarget::Point(Hotspot { x: 10, y: 20 }),
            })
        );
    }

    #[test]
    fn test_edit_at_object() {
        let op = operation(&["edit", "photo.png", "--prompt", "make it red", "--object", "car"]).unwrap();
        assert_eq!(
            op,
            Some(Operation::Edit {
                input: PathBuf::from("photo.png"),
                instruction: "make it red".to_string(),
                target: EditTarget::Object("car".to_string()),
            })
        );
    }

    #[test]
    fn test_edit_without_target_is_invalid() {
        let command = Command::Edit {
            input: PathBuf::from("photo.png"),
            prompt: "brighten".to_string(),
            x: Some(5),
            y: None,
            object: None,
        };
        assert!(matches!(
            to_operation(command),
            Err(pixshop::Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_edit_cli_rejects_point_and_object_together() {
        let result = CliArgs::try_parse_from([
            "pixshop", "edit", "photo.png", "--prompt", "x", "--x", "1", "--y", "2", "--object", "car",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_resolves_preset() {
        let op = operation(&["filter", "photo.png", "--preset", "synthwave"]).unwrap();
        assert_eq!(
            op,
            Some(Operation::Filter {
                input: PathBuf::from("photo.png"),
                filter: presets::FILTERS[0].prompt.to_string(),
            })
        );
    }

    #[test]
    fn test_filter_custom_prompt() {
        let op = operation(&["filter", "photo.png", "--prompt", "  make it look like a sketch "]).unwrap();
        assert_eq!(
            op,
            Some(Operation::Filter {
                input: PathBuf::from("photo.png"),
                filter: "make it look like a sketch".to_string(),
            })
        );
    }

    #[test]
    fn test_adjust_resolves_preset() {
        let op = operation(&["adjust", "photo.png", "--preset", "studio-light"]).unwrap();
        assert_eq!(
            op,
            Some(Operation::Adjust {
                input: PathBuf::from("photo.png"),
                adjustment: "Add dramatic, professional studio lighting to the main subject."
                    .to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_preset_is_invalid() {
        let err = operation(&["adjust", "photo.png", "--preset", "sepia"]).unwrap_err();
        assert!(matches!(err, pixshop::Error::InvalidInput(msg) if msg.contains("sepia")));
    }

    #[test]
    fn test_background_composite_upscale_and_detect() {
        assert_eq!(
            operation(&["background", "photo.png", "--prompt", "a beach"]).unwrap(),
            Some(Operation::Background {
                input: PathBuf::from("photo.png"),
                background: "a beach".to_string(),
            })
        );
        assert_eq!(
            operation(&["composite", "room.png", "lamp.png", "cat.png", "--prompt", "place them"])
                .unwrap(),
            Some(Operation::Composite {
                background: PathBuf::from("room.png"),
                objects: vec![PathBuf::from("lamp.png"), PathBuf::from("cat.png")],
                instruction: "place them".to_string(),
            })
        );
        assert_eq!(
            operation(&["upscale", "photo.png"]).unwrap(),
            Some(Operation::Upscale {
                input: PathBuf::from("photo.png"),
                target: UpscaleTarget::FourK,
            })
        );
        assert_eq!(
            operation(&["upscale", "photo.png", "--target", "2k"]).unwrap(),
            Some(Operation::Upscale {
                input: PathBuf::from("photo.png"),
                target: UpscaleTarget::TwoK,
            })
        );
        assert_eq!(
            operation(&["detect", "photo.png"]).unwrap(),
            Some(Operation::Detect {
                input: PathBuf::from("photo.png"),
            })
        );
    }

    #[test]
    fn test_presets_needs_no_operation() {
        assert_eq!(operation(&["presets"]).unwrap(), None);
    }
}
