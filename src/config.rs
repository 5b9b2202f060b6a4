//! Credential store for llmsay
//!
//! TOML file with one table per provider:
//!
//! ```toml
//! [openai]
//! key = "sk-..."
//! ```
//!
//! Location: `<config dir>/llmsay/config.toml`

use crate::errors::{Result, SayError};
use crate::providers::Provider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Stored credential for one provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredential {
    #[serde(default)]
    pub key: String,
}

/// All stored credentials, keyed by provider name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials {
    providers: BTreeMap<String, ProviderCredential>,
}

impl Credentials {
    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().ok_or_else(|| {
            SayError::Config("Could not determine config directory".to_string())
        })?;
        Ok(base.join("llmsay").join("config.toml"))
    }

    /// Load credentials; a missing file is an error
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SayError::Config(format!(
                "No config file at {}. Run: llmsay configure -p <provider> -k <key>",
                path.display()
            )));
        }
        Self::read(path)
    }

    /// Load credentials, starting empty when the file does not exist yet
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SayError::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save credentials to file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SayError::Config(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SayError::Config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Store or replace the key for a provider
    pub fn set_key(&mut self, provider: Provider, key: impl Into<String>) {
        self.providers.insert(
            provider.name().to_string(),
            ProviderCredential { key: key.into() },
        );
    }

    /// Key for a provider; absent or empty keys are a configuration error
    pub fn key_for(&self, provider: Provider) -> Result<&str> {
        self.providers
            .get(provider.name())
            .map(|entry| entry.key.as_str())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| SayError::MissingCredential {
                provider: provider.name().to_string(),
            })
    }

    /// Names of every provider with a stored entry
    pub fn provider_names(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
