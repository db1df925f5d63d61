//! Scrape query value object.

use serde::{Deserialize, Serialize};

/// Search terms handed to scraping sources.
///
/// At least one field is expected to be set; sources decide which fields
/// they can act on and return nothing for queries they cannot serve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeQuery {
    /// ISBN-13 or ISBN-10, digits and dashes accepted.
    pub isbn: Option<String>,
    /// Title search term.
    pub title: Option<String>,
    /// Author search term.
    pub author: Option<String>,
}

impl ScrapeQuery {
    /// Query by ISBN.
    pub fn by_isbn(isbn: impl Into<String>) -> Self {
        Self {
            isbn: Some(isbn.into()),
            ..Self::default()
        }
    }

    /// Query by title.
    pub fn by_title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Whether the query carries no usable terms.
    pub fn is_empty(&self) -> bool {
        self.isbn.is_none() && self.title.is_none() && self.author.is_none()
    }
}
