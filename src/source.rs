//! Content sources
//!
//! ## Table of Contents
//! - **ContentSource**: Trait for anything that can answer a collection query
//! - **MemorySource**: In-memory source (tests, previews, offline rendering)

use crate::error::Result;
use crate::query::{CollectionQuery, FilterOp};
use crate::types::{CollectionResponse, TeamMember};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Trait for team member content backends
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a collection query
    async fn fetch_members(&self, query: &CollectionQuery) -> Result<CollectionResponse<TeamMember>>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    async fn fetch_members(&self, query: &CollectionQuery) -> Result<CollectionResponse<TeamMember>> {
        (**self).fetch_members(query).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// In-memory source
///
/// Evaluates filter terms on `slug`, `name` and `locale`; terms on other
/// fields never match.
#[derive(Debug, Default)]
pub struct MemorySource {
    members: RwLock<Vec<TeamMember>>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source holding `members`
    pub fn with_members(members: Vec<TeamMember>) -> Self {
        Self {
            members: RwLock::new(members),
        }
    }

    /// Add a record
    pub fn insert(&self, member: TeamMember) {
        self.members.write().push(member);
    }

    /// Number of records held
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// True when no records are held
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }
}

fn field_value<'a>(member: &'a TeamMember, field: &str) -> Option<&'a str> {
    match field {
        "slug" => member.slug.as_ref().map(|s| s.as_str()),
        "name" => Some(member.name.as_str()),
        "locale" => member.locale.as_deref(),
        _ => None,
    }
}

fn matches(member: &TeamMember, field: &str, op: FilterOp, value: &str) -> bool {
    let Some(actual) = field_value(member, field) else {
        return false;
    };
    match op {
        FilterOp::Eq => actual == value,
        FilterOp::Ne => actual != value,
        FilterOp::Contains => actual.contains(value),
        FilterOp::ContainsI => actual.to_lowercase().contains(&value.to_lowercase()),
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn fetch_members(&self, query: &CollectionQuery) -> Result<CollectionResponse<TeamMember>> {
        let data: Vec<TeamMember> = self
            .members
            .read()
            .iter()
            .filter(|m| query.filter_terms().all(|(field, op, value)| matches(m, field, op, value)))
            .cloned()
            .collect();

        debug!(matched = data.len(), "Memory source query");
        Ok(CollectionResponse {
            data,
            meta: Default::default(),
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
