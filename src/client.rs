//! HTTP client for the content API

use crate::config::ContentConfig;
use crate::error::{CmsError, Result};
use crate::query::CollectionQuery;
use crate::source::ContentSource;
use crate::types::{CollectionResponse, TeamMember};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Content API client
#[derive(Clone)]
pub struct ContentClient {
    client: Client,
    config: ContentConfig,
}

impl ContentClient {
    /// Create a client from the process environment
    pub fn from_env() -> Result<Self> {
        Self::new(ContentConfig::from_env())
    }

    /// Create a client with explicit configuration
    pub fn new(config: ContentConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CmsError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Run a collection query and decode the envelope
    pub async fn get_collection(&self, query: &CollectionQuery) -> Result<CollectionResponse<TeamMember>> {
        let url = query.to_url(&self.config)?;
        debug!(url = %url, "Fetching collection");

        let resp = self.add_auth(self.client.get(url.clone())).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CmsError::status(status.as_u16(), url.as_str()));
        }

        let envelope: CollectionResponse<TeamMember> = resp.json().await?;
        Ok(envelope)
    }

    /// Check that the content API answers at all
    pub async fn health(&self) -> Result<bool> {
        let url = crate::media::join_url(&self.config.origin, "/_health");
        let resp = self.add_auth(self.client.get(url)).send().await?;
        Ok(resp.status().is_success())
    }
}

#[async_trait]
impl ContentSource for ContentClient {
    async fn fetch_members(&self, query: &CollectionQuery) -> Result<CollectionResponse<TeamMember>> {
        self.get_collection(query).await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
