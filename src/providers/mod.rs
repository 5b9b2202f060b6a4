//! Provider registry
//!
//! The set of supported providers is closed: each variant knows its endpoint,
//! how to authenticate, how to shape a streaming request, and how to pull
//! text out of one SSE payload. Adding a provider means adding a variant and
//! a sibling module with the same three functions.

pub mod anthropic;
pub mod openai;

use crate::errors::{Result, SayError};
use reqwest::header::{HeaderMap, HeaderValue};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Default `max_tokens_to_sample` for completion-style providers
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provider {
    /// Chat completions API, `choices[].delta.content` chunks
    OpenAi,

    /// Legacy text completions API, top-level `completion` chunks
    Anthropic,
}

/// Per-request knobs that are not part of the prompt itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A piece of generated text carried by one SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFragment {
    text: String,
}

impl TextFragment {
    /// Wrap extracted text, turning literal `\n` escapes into line breaks
    pub fn new(text: &str) -> Self {
        Self {
            text: unescape_newlines(text).into_owned(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Replace each two-character `\n` sequence with a real newline
///
/// Any other backslash sequence is left untouched.
pub fn unescape_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\\n") {
        Cow::Owned(text.replace("\\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

impl Provider {
    /// Every provider, in display order
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Anthropic];

    /// Name used in the config file and routing table
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Scheme and host of the public API
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => openai::BASE_URL,
            Provider::Anthropic => anthropic::BASE_URL,
        }
    }

    /// Path of the streaming completion endpoint
    pub fn completion_path(&self) -> &'static str {
        match self {
            Provider::OpenAi => openai::COMPLETION_PATH,
            Provider::Anthropic => anthropic::COMPLETION_PATH,
        }
    }

    /// JSON request body asking for a streamed completion
    pub fn request_body(
        &self,
        model: &str,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<serde_json::Value> {
        let body = match self {
            Provider::OpenAi => serde_json::to_value(openai::request_body(model, prompt))?,
            Provider::Anthropic => {
                serde_json::to_value(anthropic::request_body(model, prompt, options.max_tokens))?
            }
        };
        Ok(body)
    }

    /// Authentication headers carrying the opaque credential
    pub fn auth_headers(&self, credential: &str) -> Result<HeaderMap> {
        match self {
            Provider::OpenAi => openai::auth_headers(credential),
            Provider::Anthropic => anthropic::auth_headers(credential),
        }
    }

    /// Text carried by one SSE payload, if any
    pub fn extract(&self, payload: &str) -> Option<TextFragment> {
        match self {
            Provider::OpenAi => openai::extract_fragment(payload),
            Provider::Anthropic => anthropic::extract_fragment(payload),
        }
    }
}

/// Header value that is never printed in debug output
pub(crate) fn secret_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        SayError::Config("API key contains characters not allowed in an HTTP header".to_string())
    })?;
    header.set_sensitive(true);
    Ok(header)
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = SayError;

    fn from_str(s: &str) -> Result<Self> {
        Provider::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = Provider::ALL.iter().map(|p| p.name()).collect();
                SayError::Config(format!(
                    "Unknown provider '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}
