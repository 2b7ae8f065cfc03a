//! Interpretation of image-generation responses
//!
//! Every image operation ends the same way: the model's response is either an
//! image or one of a small set of failures. Classification is ordered, and the
//! first matching rule wins:
//!
//! 1. a prompt-level block reason
//! 2. the first inline image part of the first candidate
//! 3. a finish reason other than `STOP`
//! 4. non-empty text explaining why no image came back
//! 5. nothing useful at all

use crate::ai::gemini::types::{GenerateContentResponse, InlineData, FINISH_REASON_STOP};
use thiserror::Error;

const REPHRASE_GUIDANCE: &str = "This can happen due to safety filters or if the request is too complex. Please try rephrasing your prompt to be more direct.";

/// Classified failure of a single model call. None of these are retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    #[error("Request was blocked. Reason: {reason}.{}", suffix(.message))]
    RequestBlocked {
        reason: String,
        message: Option<String>,
    },

    #[error("Image generation for {context} stopped unexpectedly. Reason: {reason}. This often relates to safety settings.")]
    AbnormalFinish { context: String, reason: String },

    #[error("The AI model did not return an image for the {context}. {}", explain(.text))]
    NoImageReturned {
        context: String,
        text: Option<String>,
    },

    #[error("The AI model returned an invalid format for object detection: {detail}")]
    MalformedDetectionPayload { detail: String },
}

fn suffix(message: &Option<String>) -> String {
    match message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => format!(" {}", m),
        _ => String::new(),
    }
}

fn explain(text: &Option<String>) -> String {
    match text {
        Some(text) => format!("The model responded with text: \"{}\"", text),
        None => REPHRASE_GUIDANCE.to_string(),
    }
}

/// What a response amounts to, before any error is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    Blocked {
        reason: &'a str,
        message: Option<&'a str>,
    },
    ImageFound(&'a InlineData),
    AbnormalStop(&'a str),
    TextOnly(String),
    Empty,
}

/// Returns the block reason and optional message when the prompt was refused.
pub(crate) fn block_reason(response: &GenerateContentResponse) -> Option<(&str, Option<&str>)> {
    let feedback = response.prompt_feedback.as_ref()?;
    let reason = feedback.block_reason.as_deref().filter(|r| !r.is_empty())?;
    Some((reason, feedback.block_reason_message.as_deref()))
}

pub(crate) fn blocked_error(reason: &str, message: Option<&str>) -> InterpretError {
    InterpretError::RequestBlocked {
        reason: reason.to_string(),
        message: message.map(str::to_string),
    }
}

/// Classifies a response without building messages or logging.
pub fn classify(response: &GenerateContentResponse) -> Outcome<'_> {
    if let Some((reason, message)) = block_reason(response) {
        return Outcome::Blocked { reason, message };
    }

    let candidate = response.first_candidate();

    if let Some(inline_data) = candidate.and_then(|c| c.first_inline_data()) {
        return Outcome::ImageFound(inline_data);
    }

    if let Some(reason) = candidate
        .and_then(|c| c.finish_reason.as_deref())
        .filter(|r| !r.is_empty())
    {
        if reason != FINISH_REASON_STOP {
            return Outcome::AbnormalStop(reason);
        }
    }

    match response.text() {
        Some(text) if !text.trim().is_empty() => Outcome::TextOnly(text.trim().to_string()),
        _ => Outcome::Empty,
    }
}

/// Turns a response into an image data URL, or a classified failure.
///
/// `context` names the operation ("edit", "filter", "upscale to 4K", ...) and
/// only shows up in failure messages.
pub fn interpret(
    response: &GenerateContentResponse,
    context: &str,
) -> std::result::Result<String, InterpretError> {
    match classify(response) {
        Outcome::Blocked { reason, message } => {
            tracing::warn!(
                "Request for {} blocked: {} ({})",
                context,
                reason,
                message.unwrap_or("no message")
            );
            Err(blocked_error(reason, message))
        }
        Outcome::ImageFound(inline_data) => {
            tracing::info!(
                "Received image ({}) for {}",
                inline_data.mime_type,
                context
            );
            Ok(inline_data.to_data_url())
        }
        Outcome::AbnormalStop(reason) => {
            tracing::warn!("Image generation for {} stopped with {}", context, reason);
            Err(InterpretError::AbnormalFinish {
                context: context.to_string(),
                reason: reason.to_string(),
            })
        }
        Outcome::TextOnly(text) => {
            tracing::warn!("Model returned text instead of an image for {}: {}", context, text);
            Err(InterpretError::NoImageReturned {
                context: context.to_string(),
                text: Some(text),
            })
        }
        Outcome::Empty => {
            tracing::warn!("Model returned neither image nor text for {}", context);
            Err(InterpretError::NoImageReturned {
                context: context.to_string(),
                text: None,
            })
        }
    }
}
