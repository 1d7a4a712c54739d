use serde::{Deserialize, Serialize};

/// Fallback description when the upstream catalog has none.
pub const MISSING_DESCRIPTION: &str = "No description available";

/// Fallback author when the upstream catalog lists none.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A search result from the upstream catalog, reshaped into the same
/// outline as a [`crate::domain::books::Book`] so clients can render
/// both from one code path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogBook {
    pub google_id: String,
    pub title: String,
    /// All listed authors joined by `", "`, or [`UNKNOWN_AUTHOR`].
    pub author: String,
    pub description: String,
    /// Thumbnail URL, or an empty string when the catalog has no cover.
    pub cover_image: String,
    pub published_date: Option<String>,
    pub categories: Vec<String>,
}
