//! Digest configuration.
//!
//! Loaded once at startup from a YAML file and passed around by reference;
//! nothing mutates it afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid YAML or a required key is missing.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required value is present but empty.
    #[error("Missing required config value: {0}")]
    MissingField(String),
}

/// One wiki whose change feed is summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiSource {
    /// Display name used in the digest header.
    pub name: String,
    /// Host (and optional port) the wiki is served from.
    pub netloc: String,
    /// Path prefix page paths are shown relative to.
    pub base_path: String,
    /// Timeline feed endpoint, without query string.
    pub feed_url_base: String,
}

/// Full configuration for a digest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Messaging group the digest is posted to.
    pub group_id: u64,
    /// Bearer token for the messages API. Only needed for posting, so it
    /// may be left out until a token has been fetched.
    #[serde(default)]
    pub access_token: String,
    /// Messages API endpoint.
    pub messages_url: String,
    /// Ledger of previously reported ranges.
    pub history_file_path: PathBuf,
    /// Wikis to report on, in output order.
    pub wikis: Vec<WikiSource>,

    /// Link-shortening endpoint. Long links are posted when absent.
    #[serde(default, alias = "goo_gl_api_url")]
    pub shortener_api_url: Option<String>,
    /// Log destination. Logs go to stderr when absent.
    #[serde(default)]
    pub logfile_path: Option<PathBuf>,

    // OAuth app credentials, only needed for the token exchange.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub auth_url: Option<String>,
}

impl DigestConfig {
    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self =
            serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty values in required fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require("messages_url", &self.messages_url)?;
        if self.history_file_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("history_file_path".to_string()));
        }
        if self.wikis.is_empty() {
            return Err(ConfigError::MissingField("wikis".to_string()));
        }
        for (i, wiki) in self.wikis.iter().enumerate() {
            require(&format!("wikis[{i}].name"), &wiki.name)?;
            require(&format!("wikis[{i}].netloc"), &wiki.netloc)?;
            require(&format!("wikis[{i}].base_path"), &wiki.base_path)?;
            require(&format!("wikis[{i}].feed_url_base"), &wiki.feed_url_base)?;
        }
        Ok(())
    }
}

fn require(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingField(name.to_string()))
    } else {
        Ok(())
    }
}
