//! Presentation model for the team member detail page

use crate::config::ContentConfig;
use crate::loader::LoadState;
use crate::types::{MediaRef, TeamMember};
use serde::Serialize;
use std::fmt;

/// Text shown while a fetch is outstanding
pub const LOADING_MESSAGE: &str = "Loading...";

/// Text shown when no record could be bound
pub const NOT_FOUND_MESSAGE: &str = "No member found";

const PRIMARY_ALT: &str = "Team member photo";
const SECONDARY_ALT: &str = "Additional photo";
const PRIMARY_SIZE: u32 = 500;
const SECONDARY_SIZE: u32 = 100;

/// A displayable image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    /// Media id, identifies the element across re-renders
    pub id: u64,
    /// Fetchable address
    pub src: String,
    /// Alternative text
    pub alt: String,
    /// Intrinsic width
    pub width: u32,
    /// Intrinsic height
    pub height: u32,
}

impl ImageView {
    fn from_media(media: &MediaRef, origin: &str, fallback_alt: &str, size: u32) -> Self {
        Self {
            id: media.id,
            src: media.resolve(origin),
            alt: media.alt_or(fallback_alt).to_string(),
            width: size,
            height: size,
        }
    }
}

/// A bound team member, ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    /// Display name
    pub name: String,
    /// Short description
    pub description: String,
    /// Content as plain text
    pub content: String,
    /// Primary photo; hover-scaled
    pub primary: Option<ImageView>,
    /// Secondary photo
    pub secondary: Option<ImageView>,
}

impl MemberView {
    /// Build from a record, resolving images against `origin`
    pub fn from_member(member: &TeamMember, origin: &str) -> Self {
        Self {
            name: member.name.clone(),
            description: member.description.clone().unwrap_or_default(),
            content: member
                .content
                .as_ref()
                .map(|c| c.to_plain_text())
                .unwrap_or_default(),
            primary: member
                .photo
                .as_ref()
                .map(|m| ImageView::from_media(m, origin, PRIMARY_ALT, PRIMARY_SIZE)),
            secondary: member
                .photo1
                .as_ref()
                .map(|m| ImageView::from_media(m, origin, SECONDARY_ALT, SECONDARY_SIZE)),
        }
    }
}

/// What the detail page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DetailView {
    /// "Loading..."
    Loading,
    /// "No member found"
    NotFound,
    /// The full detail view
    Member(MemberView),
}

impl DetailView {
    /// Derive the view for a load state
    pub fn from_state(state: &LoadState, config: &ContentConfig) -> Self {
        match state {
            LoadState::Loading => DetailView::Loading,
            LoadState::NotFound | LoadState::Failed(_) => DetailView::NotFound,
            LoadState::Found(member) => DetailView::Member(MemberView::from_member(member, &config.origin)),
        }
    }

    /// Status message, for the non-detail views
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DetailView::Loading => Some(LOADING_MESSAGE),
            DetailView::NotFound => Some(NOT_FOUND_MESSAGE),
            DetailView::Member(_) => None,
        }
    }

    /// Primary image, the hover target
    pub fn primary_image(&self) -> Option<&ImageView> {
        match self {
            DetailView::Member(member) => member.primary.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for DetailView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let member = match self {
            DetailView::Member(member) => member,
            other => return write!(f, "{}", other.message().unwrap_or_default()),
        };

        writeln!(f, "{}", member.name)?;
        if !member.description.is_empty() {
            writeln!(f, "{}", member.description)?;
        }
        if !member.content.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", member.content)?;
        }
        for image in member.primary.iter().chain(member.secondary.iter()) {
            writeln!(f, "[{}] {} ({}x{})", image.alt, image.src, image.width, image.height)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmsError;
    use crate::loader::LoadFailure;
    use crate::types::RichText;

    fn media(id: u64, alt: Option<&str>, url: &str) -> MediaRef {
        MediaRef {
            id,
            alternative_text: alt.map(str::to_string),
            name: "file.png".to_string(),
            url: url.to_string(),
        }
    }

    fn member() -> TeamMember {
        TeamMember {
            id: 1,
            document_id: None,
            name: "Jane Doe".to_string(),
            description: Some("Engineer".to_string()),
            content: Some(RichText::Text("Builds bridges.".to_string())),
            slug: None,
            created_at: None,
            updated_at: None,
            published_at: None,
            locale: None,
            photo: Some(media(10, None, "/uploads/a.png")),
            photo1: Some(media(11, Some("Jane at work"), "/uploads/b.png")),
        }
    }

    #[test]
    fn test_messages() {
        let config = ContentConfig::default();
        let loading = DetailView::from_state(&LoadState::Loading, &config);
        assert_eq!(loading.message(), Some("Loading..."));

        let empty = DetailView::from_state(&LoadState::NotFound, &config);
        assert_eq!(empty.to_string(), "No member found");

        let failed = LoadState::Failed(LoadFailure::from(&CmsError::network("down")));
        assert_eq!(DetailView::from_state(&failed, &config), DetailView::NotFound);
    }

    #[test]
    fn test_member_view_images() {
        let config = ContentConfig::new("http://x");
        let view = DetailView::from_state(&LoadState::Found(Box::new(member())), &config);

        let primary = view.primary_image().unwrap();
        assert_eq!(primary.src, "http://x/uploads/a.png");
        assert_eq!(primary.alt, "Team member photo");
        assert_eq!((primary.width, primary.height), (500, 500));

        let DetailView::Member(member_view) = &view else {
            panic!("expected member view");
        };
        let secondary = member_view.secondary.as_ref().unwrap();
        assert_eq!(secondary.alt, "Jane at work");
        assert_eq!((secondary.width, secondary.height), (100, 100));
    }

    #[test]
    fn test_missing_primary_degrades() {
        let mut record = member();
        record.photo = None;
        record.photo1 = None;

        let view = DetailView::from_state(&LoadState::Found(Box::new(record)), &ContentConfig::default());
        assert!(view.primary_image().is_none());
        assert_eq!(view.to_string(), "Jane Doe\nEngineer\n\nBuilds bridges.\n");
    }
}
