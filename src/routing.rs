//! Model routing table
//!
//! Maps a model name to the provider that serves it. The table is a plain
//! value handed to whoever dispatches requests, so tests and callers can
//! swap in their own mapping.

use crate::config::Credentials;
use crate::errors::{Result, SayError};
use crate::providers::Provider;
use crate::streaming::StreamingClient;
use std::collections::BTreeMap;
use std::path::Path;

/// Default model when none is given
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Model name → provider mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRouter {
    routes: BTreeMap<String, Provider>,
}

impl ModelRouter {
    /// Create an empty router
    pub fn new() -> Self {
        Self {
            routes: BTreeMap::new(),
        }
    }

    /// Router preloaded with the built-in models
    pub fn builtin() -> Self {
        Self::new()
            .with_route("gpt-4", Provider::OpenAi)
            .with_route("gpt-4o", Provider::OpenAi)
            .with_route("gpt-3.5-turbo", Provider::OpenAi)
            .with_route("claude-2", Provider::Anthropic)
    }

    /// Add or replace a route, builder style
    pub fn with_route(mut self, model: impl Into<String>, provider: Provider) -> Self {
        self.insert(model, provider);
        self
    }

    pub fn insert(&mut self, model: impl Into<String>, provider: Provider) {
        self.routes.insert(model.into(), provider);
    }

    /// Provider serving `model`
    ///
    /// Fails without touching the network when the model is unknown.
    pub fn resolve(&self, model: &str) -> Result<Provider> {
        self.routes
            .get(model)
            .copied()
            .ok_or_else(|| SayError::UnknownModel {
                model: model.to_string(),
            })
    }

    /// Build the streaming client for `model`
    ///
    /// Routing and credential lookup both happen before any I/O, so a bad
    /// model name or missing key never reaches the network.
    pub fn client_for(&self, model: &str, credentials: &Credentials) -> Result<StreamingClient> {
        let provider = self.resolve(model)?;
        let key = credentials.key_for(provider)?;
        StreamingClient::new(provider, key)
    }

    /// Build the streaming client for `model` from the credential file
    ///
    /// The model is resolved before `config_path` is opened, so an unknown
    /// model fails without reading the file.
    pub fn client_from_config(&self, model: &str, config_path: &Path) -> Result<StreamingClient> {
        self.resolve(model)?;
        let credentials = Credentials::load(config_path)?;
        self.client_for(model, &credentials)
    }

    /// All routes, sorted by model name
    pub fn routes(&self) -> impl Iterator<Item = (&str, Provider)> {
        self.routes.iter().map(|(model, provider)| (model.as_str(), *provider))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::builtin()
    }
}
