//! llmsay - stream LLM completions to the terminal
//!
//! Sends one prompt to a hosted model and writes the answer as it arrives.
//!
//! # Architecture
//!
//! - **streaming::sse**: provider-agnostic Server-Sent-Events decoder
//! - **providers**: closed set of providers, each with request shape,
//!   auth headers and payload extractor
//! - **streaming::client**: HTTP transport tying the two together
//! - **routing / config / cli**: model table, credential store, terminal I/O

pub mod errors;
pub mod providers;
pub mod routing;
pub mod streaming;

// Re-export commonly used types
pub use errors::{Result, SayError};
pub use providers::{Provider, TextFragment};
pub use routing::ModelRouter;
pub use streaming::{StreamSummary, StreamingClient, Termination};

// Configuration & interface
pub mod cli;
pub mod config;
pub mod logging;

pub use config::Credentials;
