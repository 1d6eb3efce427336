//! CLI configuration
//!
//! Values are layered: built-in defaults, then `omnidesk.toml`, then
//! `OMNIDESK_*` environment variables. Command line flags are applied last
//! by the caller.

use anyhow::{Context, Result};
use omnidesk_http::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the REST API, including the `/api` prefix
    pub api_url: String,

    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,

    /// Custom user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl Settings {
    /// Load settings
    ///
    /// An explicitly given `file` must exist; otherwise `default_file` is
    /// read when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or a value has the wrong type
    pub fn load(file: Option<&Path>, default_file: &Path) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?;

        builder = match file {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::from(default_file).required(false)),
        };

        let settings = builder
            .add_source(config::Environment::with_prefix("OMNIDESK").try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        Ok(settings.try_deserialize()?)
    }

    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}
