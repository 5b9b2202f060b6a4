//! Streaming module
//!
//! Provides the provider-agnostic SSE decoder and the HTTP client that
//! drives it.

pub mod client;
pub mod sse;

// Re-export commonly used types
pub use client::{BodyStream, StreamSummary, StreamingClient};
pub use sse::{EventStreamDecoder, RawEvent, Termination, DONE_SENTINEL, MAX_LINE_SIZE};
