//! # teamcms
//!
//! A typed client for a headless content API that loads a team member
//! record by slug and turns it into a detail-page view.
//!
//! ## Features
//!
//! - **Query Builder**: populate / fields / filters in nested bracket encoding
//! - **Content Sources**: HTTP client over `reqwest`, in-memory source for tests
//! - **Detail Loader**: observable load state, stale responses discarded
//! - **View Model**: "Loading..." / "No member found" / full detail view
//! - **Hover**: scale tween with scoped pointer listeners
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use teamcms::{CmsBuilder, DetailView};
//!
//! #[tokio::main]
//! async fn main() -> teamcms::Result<()> {
//!     let builder = CmsBuilder::from_env();
//!     let config = builder.config().clone();
//!     let loader = builder.build()?;
//!
//!     let state = loader.load("jane-doe").await;
//!     println!("{}", DetailView::from_state(&state, &config));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod hover;
pub mod loader;
pub mod media;
pub mod query;
pub mod source;
pub mod types;
pub mod view;

// Re-exports for ergonomic API
pub use builder::CmsBuilder;
pub use client::ContentClient;
pub use config::{ContentConfig, API_URL_ENV, DEFAULT_ORIGIN};
pub use error::{CmsError, ErrorKind, Result};
pub use hover::{HoverAnimation, HoverEffect, ListenerRegistry, PointerEvent};
pub use loader::{DetailLoader, LoadFailure, LoadState};
pub use media::join_url;
pub use query::{team_member_by_slug, CollectionQuery, FilterOp};
pub use source::{ContentSource, MemorySource};
pub use types::{CollectionResponse, MediaRef, RichText, Slug, TeamMember};
pub use view::{DetailView, ImageView, MemberView};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::CmsBuilder;
    pub use crate::config::ContentConfig;
    pub use crate::error::Result;
    pub use crate::loader::{DetailLoader, LoadState};
    pub use crate::source::ContentSource;
    pub use crate::types::{Slug, TeamMember};
    pub use crate::view::DetailView;
}
