//! Open Library response models and draft conversion.

use serde::Deserialize;

use bookhub_entity::book::BookDraft;

/// An edition record as returned by `https://openlibrary.org/isbn/{isbn}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Edition {
    /// Edition title.
    pub title: Option<String>,
    /// Publisher names.
    #[serde(default)]
    pub publishers: Vec<String>,
    /// Free-text publication date (e.g. `"March 1998"`, `"1998"`).
    pub publish_date: Option<String>,
    /// Page count.
    pub number_of_pages: Option<i32>,
    /// Statement of responsibility (e.g. `"by Frank Herbert"`).
    pub by_statement: Option<String>,
    /// Description, plain or wrapped in a typed value object.
    pub description: Option<TextValue>,
    /// Cover image identifiers.
    #[serde(default)]
    pub covers: Vec<i64>,
}

/// Open Library sometimes returns plain strings and sometimes
/// `{"type": ..., "value": ...}` objects for text fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextValue {
    /// Plain string form.
    Plain(String),
    /// Typed value-object form.
    Typed {
        /// The wrapped text.
        value: String,
    },
}

impl TextValue {
    /// Extracts the text regardless of form.
    pub fn into_text(self) -> String {
        match self {
            Self::Plain(text) => text,
            Self::Typed { value } => value,
        }
    }
}

impl Edition {
    /// Converts the edition into a book draft. Returns `None` when the
    /// record carries no title — a draft without one is useless upstream.
    pub fn into_draft(self, isbn: &str) -> Option<BookDraft> {
        let title = self.title?;
        let authors = self
            .by_statement
            .map(|statement| {
                vec![
                    statement
                        .trim_start_matches("by ")
                        .trim_end_matches('.')
                        .trim()
                        .to_string(),
                ]
            })
            .unwrap_or_default();

        Some(BookDraft {
            title,
            authors,
            isbn: Some(isbn.to_string()),
            publisher: self.publishers.into_iter().next(),
            published_year: self.publish_date.as_deref().and_then(parse_year),
            page_count: self.number_of_pages,
            description: self.description.map(TextValue::into_text),
            cover_url: self
                .covers
                .first()
                .map(|id| format!("https://covers.openlibrary.org/b/id/{id}-L.jpg")),
            rating: None,
            extra: serde_json::Map::new(),
        })
    }
}

/// Extracts a four-digit year from a free-text publication date.
pub fn parse_year(publish_date: &str) -> Option<i32> {
    let bytes = publish_date.as_bytes();
    let mut run_start = None;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            let start = *run_start.get_or_insert(i);
            if i - start == 3 {
                let boundary_ok = bytes.get(i + 1).is_none_or(|next| !next.is_ascii_digit());
                if boundary_ok {
                    return publish_date[start..=i].parse().ok();
                }
            }
        } else {
            run_start = None;
        }
    }
    None
}
