//! Thin Open Library REST client.

use std::time::Duration;

use tracing::debug;

use bookhub_core::error::AppError;
use bookhub_core::result::AppResult;
use bookhub_entity::book::BookDraft;

use crate::models::Edition;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Per-request timeout. The dispatcher imposes none, so the source owns
/// its own bound on how long a scrape may block.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the Open Library edition API.
#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenLibraryClient {
    /// Creates a client against the default API host.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom API host.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches an edition by ISBN and converts it into a draft.
    ///
    /// Returns `Ok(None)` when the ISBN is unknown to Open Library or the
    /// record is unusable; other failures (network, decode) are errors.
    pub async fn fetch_by_isbn(&self, isbn: &str) -> AppResult<Option<BookDraft>> {
        let digits: String = isbn
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
            .collect();
        if digits.is_empty() {
            return Ok(None);
        }

        let url = format!("{}/isbn/{}.json", self.base_url, digits);
        debug!(url = %url, "Querying Open Library");

        let response = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service(format!("Open Library request failed: {e}"))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(AppError::external_service(format!(
                "Open Library returned status {}",
                response.status()
            )));
        }

        let edition: Edition = response.json().await.map_err(|e| {
            AppError::external_service(format!("Open Library response decode failed: {e}"))
        })?;

        Ok(edition.into_draft(&digits))
    }
}

impl Default for OpenLibraryClient {
    fn default() -> Self {
        Self::new()
    }
}
