//! Domain records and their create/update inputs.
//!
//! The same structs are used for the JSON API and for stored documents; the
//! store's own `_id` key is never part of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;

/// Generates a fresh record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A grouping of articles with a display color.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique id.
    pub id: String,
    /// Display name, copied onto articles at write time.
    pub name: String,
    /// Free form description.
    pub description: String,
    /// Opaque display hint, usually a CSS color.
    pub color: String,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Input for [`CategoryRepository::create`](crate::CategoryRepository::create).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    /// Display name.
    pub name: String,
    /// Free form description.
    pub description: String,
    /// Display hint.
    pub color: String,
}

/// A news article.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique id.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Rich text body, stored verbatim.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Referenced category. Not enforced by the store.
    pub category_id: String,
    /// Name of the category as of the last write that touched `category_id`.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Reference to an uploaded image.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Visibility flag.
    #[serde(default)]
    pub published: bool,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Time of the last update.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Input for [`ArticleRepository::create`](crate::ArticleRepository::create).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    /// Headline.
    pub title: String,
    /// Body.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Category to file the article under.
    pub category_id: String,
    /// Optional image reference.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Visibility flag, unpublished when omitted.
    #[serde(default)]
    pub published: bool,
}

/// Partial update of an article. Only `Some` fields are written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleChanges {
    /// New headline.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New author.
    pub author: Option<String>,
    /// New category; re-resolves the cached category name.
    pub category_id: Option<String>,
    /// New image reference.
    pub image_url: Option<String>,
    /// New visibility.
    pub published: Option<bool>,
}

impl ArticleChanges {
    /// Returns `true` when no field would be written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.author.is_none()
            && self.category_id.is_none()
            && self.image_url.is_none()
            && self.published.is_none()
    }
}

/// A reader comment attached to an article.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique id.
    pub id: String,
    /// Article the comment belongs to.
    pub article_id: String,
    /// Author display name.
    pub author: String,
    /// Comment text.
    pub content: String,
    /// Moderation flag.
    #[serde(default)]
    pub approved: bool,
    /// Creation time.
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Input for [`CommentRepository::create`](crate::CommentRepository::create).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Article to attach to; must exist.
    pub article_id: String,
    /// Author display name.
    pub author: String,
    /// Comment text.
    pub content: String,
}
