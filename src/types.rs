//! Content types for the team member collection
//!
//! ## Table of Contents
//! - **Slug**: Stable URL-safe record key
//! - **TeamMember**: The fetched record
//! - **MediaRef**: Image reference relative to the content origin
//! - **RichText**: Markdown string or rich-text block list
//! - **CollectionResponse**: `{ data: [...], meta }` envelope

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Decode `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Stable, URL-safe key identifying a record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    /// Create a slug; the value is not validated
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Image reference as returned by a populated media relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// Media id
    pub id: u64,
    /// Accessibility label
    #[serde(default)]
    pub alternative_text: Option<String>,
    /// File display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Path relative to the content origin
    pub url: String,
}

/// Rich-text content, kept exactly as delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RichText {
    /// Markdown or plain string
    Text(String),
    /// Structured block list
    Blocks(Vec<serde_json::Value>),
}

impl RichText {
    /// Flatten to plain text, one line per top-level block
    pub fn to_plain_text(&self) -> String {
        match self {
            RichText::Text(text) => text.clone(),
            RichText::Blocks(blocks) => blocks
                .iter()
                .map(|block| {
                    let mut line = String::new();
                    collect_text(block, &mut line);
                    line
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

fn collect_text(node: &serde_json::Value, out: &mut String) {
    if let Some(text) = node.get("text").and_then(|t| t.as_str()) {
        out.push_str(text);
    }
    if let Some(children) = node.get("children").and_then(|c| c.as_array()) {
        for child in children {
            collect_text(child, out);
        }
    }
}

/// A team member record
///
/// The detail query restricts fields, so the API may leave out `slug`, the
/// timestamps and `locale`; they come back as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Numeric id
    pub id: u64,
    /// Document id (v5 APIs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Display name; empty when the API sends `null`
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Short description
    #[serde(default)]
    pub description: Option<String>,
    /// Free-form rich-text content
    #[serde(default)]
    pub content: Option<RichText>,
    /// Lookup key
    #[serde(default)]
    pub slug: Option<Slug>,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Publication time
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Locale tag
    #[serde(default)]
    pub locale: Option<String>,
    /// Primary photo
    #[serde(default)]
    pub photo: Option<MediaRef>,
    /// Secondary photo
    #[serde(default)]
    pub photo1: Option<MediaRef>,
}

/// Pagination block of the response `meta`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page
    pub page: u32,
    /// Page size
    pub page_size: u32,
    /// Number of pages
    pub page_count: u32,
    /// Total matching records
    pub total: u64,
}

/// Response `meta`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Pagination info, when the API includes it
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Collection response envelope
///
/// Only the first record has to decode; later records that don't are
/// dropped with a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResponse<T> {
    /// Matching records
    #[serde(
        deserialize_with = "lenient_records",
        bound(deserialize = "T: DeserializeOwned")
    )]
    pub data: Vec<T>,
    /// Response metadata
    #[serde(default)]
    pub meta: ResponseMeta,
}

fn lenient_records<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    let mut records = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(err) if index > 0 => warn!(index, error = %err, "Skipping undecodable record"),
            Err(err) => return Err(D::Error::custom(err)),
        }
    }
    Ok(records)
}

impl<T> CollectionResponse<T> {
    /// Take the first record, dropping the rest
    pub fn into_first(self) -> Option<T> {
        self.data.into_iter().next()
    }
}
