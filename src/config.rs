//! Content API configuration
//!
//! The origin is resolved once and injected; nothing in the crate reads the
//! environment on its own except [`ContentConfig::from_env`].

use crate::error::{CmsError, Result};
use std::time::Duration;

/// Environment variable holding the content API origin
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Environment variable holding an optional API token
pub const API_TOKEN_ENV: &str = "CMS_API_TOKEN";

/// Origin used when none is configured
pub const DEFAULT_ORIGIN: &str = "http://localhost:1337";

/// Collection endpoint for team members
pub const TEAM_MEMBERS_PATH: &str = "/api/team-members";

/// Content API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    /// Scheme + host (+ port), no trailing slash
    pub origin: String,
    /// Collection resource path
    pub resource_path: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            resource_path: TEAM_MEMBERS_PATH.to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ContentConfig {
    /// Create a config for an explicit origin
    pub fn new(origin: impl Into<String>) -> Self {
        Self::default().with_origin(origin)
    }

    /// Resolve from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(origin) = lookup(API_URL_ENV) {
            config = config.with_origin(origin);
        }
        config.api_token = lookup(API_TOKEN_ENV).filter(|t| !t.trim().is_empty());
        config
    }

    /// Set the origin; blank values fall back to the default
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let trimmed = origin.trim().trim_end_matches('/');
        self.origin = if trimmed.is_empty() {
            DEFAULT_ORIGIN.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }

    /// Set the collection resource path
    pub fn with_resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = path.into();
        self
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check that the origin is an absolute http(s) URL
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.origin)
            .map_err(|e| CmsError::config(format!("Invalid origin {:?}: {}", self.origin, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(CmsError::config(format!(
                "Unsupported origin scheme {:?}",
                other
            ))),
        }
    }
}
