use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::domain::catalog::{CatalogBook, MISSING_DESCRIPTION, UNKNOWN_AUTHOR};

/// Default upstream catalog endpoint (Google Books volumes API).
pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RESULTS: u32 = 20;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Request(String),
    #[error("catalog returned status {0}")]
    Status(u16),
    #[error("catalog returned an unreadable response: {0}")]
    Decode(String),
}

/// Thin client for the upstream book catalog. One request per search, no
/// retries, no caching; failures surface to the caller immediately.
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CatalogBook>, CatalogError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query), ("maxResults", &MAX_RESULTS.to_string())])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "catalog search request failed");
                CatalogError::Request(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "catalog search returned non-success");
            return Err(CatalogError::Status(status.as_u16()));
        }

        let volumes: VolumesResponse = response
            .json()
            .await
            .map_err(|err| CatalogError::Decode(err.to_string()))?;

        Ok(volumes
            .items
            .unwrap_or_default()
            .into_iter()
            .map(into_catalog_book)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    items: Option<Vec<Volume>>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    id: String,
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Option<Vec<String>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "imageLinks", default)]
    image_links: Option<ImageLinks>,
    #[serde(rename = "publishedDate", default)]
    published_date: Option<String>,
    #[serde(default)]
    categories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
}

fn into_catalog_book(volume: Volume) -> CatalogBook {
    let info = volume.volume_info;
    let author = match info.authors {
        Some(authors) if !authors.is_empty() => authors.join(", "),
        _ => UNKNOWN_AUTHOR.to_string(),
    };

    CatalogBook {
        google_id: volume.id,
        title: info.title.unwrap_or_default(),
        author,
        description: info
            .description
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
        cover_image: info
            .image_links
            .and_then(|links| links.thumbnail)
            .unwrap_or_default(),
        published_date: info.published_date,
        categories: info.categories.unwrap_or_default(),
    }
}
