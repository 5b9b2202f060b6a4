//! Streaming completion client
//!
//! One POST per prompt, with the response body fed through the SSE decoder
//! and the provider's extractor:
//! - HTTP/1.1 streaming via reqwest
//! - Fragments written and flushed to the sink as they arrive
//! - Non-2xx responses surfaced as errors, never decoded

use crate::errors::{Result, SayError};
use crate::providers::{CompletionOptions, Provider};
use crate::streaming::sse::{EventStreamDecoder, Termination};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use std::fmt;
use std::io::Write;
use std::pin::Pin;
use std::time::Duration;

/// Connection establishment timeout (30 seconds)
///
/// There is no overall deadline; a long answer may stream for minutes.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest error body kept in a status error
const MAX_ERROR_BODY: usize = 2048;

/// Response body as a boxed byte stream
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Outcome of a completed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Events decoded, including those without text
    pub events: usize,

    /// Fragments written to the sink
    pub fragments: usize,

    pub termination: Termination,
}

/// Streaming client bound to one provider and credential
#[derive(Clone)]
pub struct StreamingClient {
    client: Client,
    provider: Provider,
    credential: String,
    base_url: String,
    options: CompletionOptions,
}

impl StreamingClient {
    /// Create client against the provider's public endpoint
    pub fn new(provider: Provider, credential: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(SayError::Http)?;

        Ok(Self {
            client,
            provider,
            credential: credential.into(),
            base_url: provider.default_base_url().to_string(),
            options: CompletionOptions::default(),
        })
    }

    /// Point the client at another host (proxies, mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Cap on generated tokens, for providers that require one
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = max_tokens;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Full URL of the completion endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.provider.completion_path())
    }

    /// Send the request and return a decoder over the response body
    ///
    /// Fails on connection errors and on any non-2xx status.
    pub async fn open_stream(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<EventStreamDecoder<BodyStream>> {
        let url = self.endpoint();
        let body = self.provider.request_body(model, prompt, &self.options)?;
        let headers = self.provider.auth_headers(&self.credential)?;

        tracing::info!(provider = %self.provider, model, url = %url, "sending streaming request");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| SayError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(status = status.as_u16(), "provider rejected request");
            return Err(SayError::Status {
                status: status.as_u16(),
                body: truncate(error_text.trim(), MAX_ERROR_BODY),
            });
        }

        let stream: BodyStream = Box::pin(
            response
                .bytes_stream()
                .map(|result| result.map_err(|e| SayError::Stream(e.to_string()))),
        );

        Ok(EventStreamDecoder::new(stream))
    }

    /// Stream a completion for `prompt` into `sink`
    ///
    /// Each fragment is written and flushed before the next event is read.
    /// On error, whatever was already written stays written.
    pub async fn stream_completion<W: Write>(
        &self,
        model: &str,
        prompt: &str,
        sink: &mut W,
    ) -> Result<StreamSummary> {
        let mut decoder = self.open_stream(model, prompt).await?;
        let mut fragments = 0;

        while let Some(event) = decoder.next_event().await? {
            if let Some(fragment) = self.provider.extract(event.payload()) {
                sink.write_all(fragment.as_str().as_bytes())?;
                sink.flush()?;
                fragments += 1;
            }
        }

        let summary = StreamSummary {
            events: decoder.events_decoded(),
            fragments,
            termination: decoder.termination().unwrap_or(Termination::EndOfInput),
        };
        tracing::info!(
            events = summary.events,
            fragments = summary.fragments,
            termination = ?summary.termination,
            "stream complete"
        );

        Ok(summary)
    }
}

impl fmt::Debug for StreamingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingClient")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("credential", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
