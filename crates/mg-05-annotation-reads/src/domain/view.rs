//! Response shapes of `GET /annotations`.

use serde::Serialize;
use shared_types::{Annotation, Comment, Profile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorProfile {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl AuthorProfile {
    pub fn placeholder(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            avatar: None,
        }
    }
}

impl From<Profile> for AuthorProfile {
    fn from(profile: Profile) -> Self {
        Self {
            display_name: profile.display_name,
            avatar: profile.avatar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_profile: AuthorProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationView {
    #[serde(flatten)]
    pub annotation: Annotation,
    /// Oldest first.
    pub comments: Vec<CommentView>,
    pub author_profile: AuthorProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResponse {
    pub annotations: Vec<AnnotationView>,
}
