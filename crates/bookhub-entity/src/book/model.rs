//! Book draft model.

use serde::{Deserialize, Serialize};

/// A book record in flight — the value shaped by scrape-parse and
/// enrichment pipelines before the catalog layer saves it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookDraft {
    /// Book title.
    pub title: String,
    /// Authors, in display order.
    pub authors: Vec<String>,
    /// ISBN-13 (digits only), if known.
    pub isbn: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Publication year.
    pub published_year: Option<i32>,
    /// Page count.
    pub page_count: Option<i32>,
    /// Catalog description / blurb.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_url: Option<String>,
    /// Aggregated rating on a 0.0–5.0 scale.
    pub rating: Option<f64>,
    /// Arbitrary enrichment data contributed by plugins.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BookDraft {
    /// Create a draft with just a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the authors.
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// Set the ISBN.
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// Set the rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    /// Insert an enrichment value under a key.
    pub fn with_extra(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}
