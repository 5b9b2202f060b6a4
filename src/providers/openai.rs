//! OpenAI chat completions
//!
//! Endpoint: POST /v1/chat/completions with `stream: true`.
//! Each event payload is a `chat.completion.chunk`; text arrives in
//! `choices[0].delta.content`.

use super::{secret_header, TextFragment};
use crate::errors::Result;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde::{Deserialize, Serialize};

pub const BASE_URL: &str = "https://api.openai.com";

pub const COMPLETION_PATH: &str = "/v1/chat/completions";

/// Streaming chat request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// One streamed chunk; only the fields needed for text are modelled
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

pub fn request_body<'a>(model: &'a str, prompt: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: prompt,
        }],
        stream: true,
    }
}

pub fn auth_headers(credential: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, secret_header(&format!("Bearer {}", credential))?);
    Ok(headers)
}

/// Incremental text of a chunk, or `None` for role/finish/usage chunks
pub fn extract_fragment(payload: &str) -> Option<TextFragment> {
    let chunk: ChatChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::debug!(error = %err, payload, "skipping unparseable chat chunk");
            return None;
        }
    };

    let content = chunk
        .choices
        .into_iter()
        .next()?
        .delta?
        .content
        .filter(|text| !text.is_empty())?;

    Some(TextFragment::new(&content))
}
