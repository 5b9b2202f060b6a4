//! Anthropic text completions
//!
//! Endpoint: POST /v1/completions with `stream: true`.
//! Each `completion` event carries its text in a top-level `completion`
//! field; `ping` and `error` events carry none.

use super::{secret_header, TextFragment};
use crate::errors::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

pub const BASE_URL: &str = "https://api.anthropic.com";

pub const COMPLETION_PATH: &str = "/v1/completions";

pub const API_VERSION: &str = "2023-06-01";

const API_KEY_HEADER: &str = "x-api-key";

const VERSION_HEADER: &str = "anthropic-version";

/// Streaming text completion request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens_to_sample: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    completion: Option<String>,

    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default, rename = "type")]
    kind: Option<String>,

    #[serde(default)]
    message: Option<String>,
}

/// Wrap the prompt in the Human/Assistant turn markers
pub fn format_prompt(prompt: &str) -> String {
    format!("\n\nHuman: {}\n\nAssistant:", prompt)
}

pub fn request_body<'a>(model: &'a str, prompt: &str, max_tokens: u32) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        prompt: format_prompt(prompt),
        max_tokens_to_sample: max_tokens,
        stream: true,
    }
}

pub fn auth_headers(credential: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(API_KEY_HEADER),
        secret_header(credential)?,
    );
    headers.insert(
        HeaderName::from_static(VERSION_HEADER),
        HeaderValue::from_static(API_VERSION),
    );
    Ok(headers)
}

/// Text of a `completion` event, or `None` for anything else
pub fn extract_fragment(payload: &str) -> Option<TextFragment> {
    let chunk: CompletionChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::debug!(error = %err, payload, "skipping unparseable completion chunk");
            return None;
        }
    };

    if let Some(error) = chunk.error {
        tracing::debug!(
            kind = error.kind.as_deref().unwrap_or("unknown"),
            message = error.message.as_deref().unwrap_or(""),
            "provider reported an error event"
        );
        return None;
    }

    let completion = chunk.completion.filter(|text| !text.is_empty())?;
    Some(TextFragment::new(&completion))
}
