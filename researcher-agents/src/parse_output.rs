//! Lenient parsing of JSON replies from models without structured output

use researcher_core::{ErrorContext, ResearchError, ResearchResult};
use serde::de::DeserializeOwned;
use tracing::debug;

const PREVIEW_CHARS: usize = 200;

/// Parse a model reply into `T`
///
/// Tries the whole reply, then each fenced ```json block, then the span from
/// the first `{` to the last `}`.
pub fn parse_typed_output<T: DeserializeOwned>(text: &str) -> ResearchResult<T> {
    let trimmed = text.trim();
    let mut last_error = match serde_json::from_str::<T>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };

    for block in fenced_json_blocks(trimmed) {
        match serde_json::from_str::<T>(block) {
            Ok(value) => {
                debug!("Parsed model output from fenced block");
                return Ok(value);
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    if let Some(span) = outer_object(trimmed) {
        match serde_json::from_str::<T>(span) {
            Ok(value) => {
                debug!("Parsed model output from embedded object");
                return Ok(value);
            }
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(output_parse_error(trimmed, &last_error))
}

/// Parse a reply strictly as a single JSON document
pub fn parse_strict_output<T: DeserializeOwned>(text: &str) -> ResearchResult<T> {
    serde_json::from_str::<T>(text.trim()).map_err(|e| output_parse_error(text, &e.to_string()))
}

fn output_parse_error(text: &str, reason: &str) -> ResearchError {
    ResearchError::OutputParse {
        message: format!("Failed to parse model output as JSON: {}", reason),
        preview: preview(text),
        context: ErrorContext::new("parse_output").with_operation("parse_typed_output"),
    }
}

fn fenced_json_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("```") {
        let after = &rest[start + 3..];
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let lang = after[..body_start].trim();
        let body = &after[body_start..];
        let Some(end) = body.find("```") else {
            break;
        };
        if lang.is_empty() || lang.eq_ignore_ascii_case("json") {
            blocks.push(body[..end].trim());
        }
        rest = &body[end + 3..];
    }
    blocks
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
