//! User-Friendly Error Formatting
//!
//! Turns an error chain from a diff run into a message with a short
//! explanation and hints for the most common causes.

use std::fmt::Write;

use crate::error::DiffError;

/// Broad cause of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Input,
    Config,
    Internal,
    Output,
    Other,
}

fn categorize(error: &anyhow::Error) -> Category {
    for cause in error.chain() {
        if let Some(diff) = cause.downcast_ref::<DiffError>() {
            return match diff {
                DiffError::InvalidInput { .. } | DiffError::Image(_) => Category::Input,
                DiffError::InvalidConfig(_) => Category::Config,
                DiffError::MotionOutOfBounds { .. } => Category::Internal,
                DiffError::Io(_) => Category::Output,
            };
        }
        if cause.downcast_ref::<image::ImageError>().is_some() {
            return Category::Input;
        }
        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return Category::Config;
        }
    }

    let message = error.to_string();
    if message.contains("config") {
        Category::Config
    } else if message.contains("output") || message.contains("write") {
        Category::Output
    } else if message.contains("image") || message.contains("input") {
        Category::Input
    } else {
        Category::Other
    }
}

/// Format error for user consumption
///
/// The technical error chain is always included at the end.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(output).ok();
    writeln!(
        output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(output).ok();

    match categorize(error) {
        Category::Input => format_input_error(&mut output),
        Category::Config => format_config_error(&mut output),
        Category::Internal => format_internal_error(&mut output),
        Category::Output => format_output_error(&mut output),
        Category::Other => format_generic_error(&mut output, &error.to_string()),
    }

    writeln!(output).ok();
    writeln!(
        output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(output, "Technical Details:").ok();
    writeln!(output).ok();
    writeln!(output, "{:#}", error).ok();
    writeln!(output).ok();
    writeln!(
        output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(output, "Run with -vv for a log of every stage.").ok();

    output
}

fn format_input_error(output: &mut String) {
    writeln!(output, "Input Image Error").ok();
    writeln!(output).ok();
    writeln!(output, "One of the input images could not be used.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. File missing or unreadable").ok();
    writeln!(output, "     → Check both input paths").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Unsupported file format").ok();
    writeln!(output, "     → PNG, JPEG and BMP can be read").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Empty image").ok();
    writeln!(output, "     → Both images need at least one pixel").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The options could not be used. No image was read.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Even window size").ok();
    writeln!(
        output,
        "     → --brush-width, --inner-hl-window and --outer-hl-window must be odd"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Inner window larger than outer window").ok();
    writeln!(output, "     → --inner-hl-window must not exceed --outer-hl-window").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Invalid TOML in --config file").ok();
    writeln!(output, "     → Check for typos and unknown log levels").ok();
}

fn format_internal_error(output: &mut String) {
    writeln!(output, "Internal Error").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "The computed motion field pointed outside the image. This is a bug,"
    )
    .ok();
    writeln!(output, "not a problem with the inputs.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Please report it with both input images attached").ok();
}

fn format_output_error(output: &mut String) {
    writeln!(output, "Output Error").ok();
    writeln!(output).ok();
    writeln!(output, "The visualization could not be written.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Output directory does not exist").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Unknown output extension").ok();
    writeln!(output, "     → Use .png, .jpg or .bmp").ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "Diff Error").ok();
    writeln!(output).ok();
    writeln!(output, "Error: {}", error).ok();
}
