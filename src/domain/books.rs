use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{BookId, CommentId, UserId};

/// Lowest and highest rating a user may give a book.
pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub added_by: UserId,
    /// Arithmetic mean of all current ratings, 0 when there are none.
    /// Maintained by the repository in the same transaction as every
    /// rating mutation.
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Creator identity embedded in book listings, mirroring what the
/// public API exposes about a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorInfo {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// A book with `added_by` resolved to the creating user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookWithCreator {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub average_rating: f64,
    pub created_at: DateTime<Utc>,
    pub added_by: CreatorInfo,
}

impl BookWithCreator {
    pub fn new(book: Book, added_by: CreatorInfo) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            genre: book.genre,
            description: book.description,
            cover_image: book.cover_image,
            average_rating: book.average_rating,
            created_at: book.created_at,
            added_by,
        }
    }
}

/// Full detail view: the book plus its engagement records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: BookWithCreator,
    pub ratings: Vec<Rating>,
    pub likes: Vec<UserId>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

/// Result of a rating upsert: the refreshed average and entry count.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average_rating: f64,
    pub ratings_count: i64,
}

/// Result of a like toggle: the caller's new membership and the set size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: i64,
}

/// A comment with its author resolved to a displayable username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub user_id: UserId,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl NewBook {
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self.genre = normalize_optional_field(self.genre);
        self.description = normalize_optional_field(self.description);
        self.cover_image = normalize_optional_field(self.cover_image);
        self
    }
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
}

impl UpdateBook {
    pub fn normalize(mut self) -> Self {
        self.title = normalize_optional_field(self.title);
        self.author = normalize_optional_field(self.author);
        self.genre = normalize_optional_field(self.genre);
        self.description = normalize_optional_field(self.description);
        self.cover_image = normalize_optional_field(self.cover_image);
        self
    }

    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.author.is_some()
            || self.genre.is_some()
            || self.description.is_some()
            || self.cover_image.is_some()
    }
}

/// Whether a rating value falls within the accepted closed interval.
pub fn rating_in_range(value: f64) -> bool {
    value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value)
}

fn normalize_optional_field(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
