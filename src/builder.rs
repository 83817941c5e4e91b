//! CmsBuilder for configuring and constructing detail loaders
//!
//! ## Table of Contents
//! - **CmsBuilder**: Builder pattern over `ContentConfig`

use crate::client::ContentClient;
use crate::config::ContentConfig;
use crate::error::Result;
use crate::loader::DetailLoader;
use std::time::Duration;
use tracing::info;

/// Builder for an HTTP-backed [`DetailLoader`]
#[derive(Debug, Clone, Default)]
pub struct CmsBuilder {
    config: ContentConfig,
}

impl CmsBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the process environment
    pub fn from_env() -> Self {
        Self::from_config(ContentConfig::from_env())
    }

    /// Start from an explicit configuration
    pub fn from_config(config: ContentConfig) -> Self {
        Self { config }
    }

    /// Set the content origin
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.config = self.config.with_origin(origin);
        self
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.with_token(token);
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Set the collection resource path
    pub fn with_resource_path(mut self, path: impl Into<String>) -> Self {
        self.config = self.config.with_resource_path(path);
        self
    }

    /// Configuration built so far
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Build the HTTP client only
    pub fn build_client(self) -> Result<ContentClient> {
        ContentClient::new(self.config)
    }

    /// Build the loader
    pub fn build(self) -> Result<DetailLoader<ContentClient>> {
        info!(
            origin = %self.config.origin,
            path = %self.config.resource_path,
            auth = self.config.api_token.is_some(),
            "Building detail loader"
        );
        Ok(DetailLoader::new(self.build_client()?))
    }
}
