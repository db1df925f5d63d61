//! All hook point definitions with typed payloads.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookhub_core::error::AppError;
use bookhub_entity::book::{BookDraft, ScrapeQuery};

/// Enumeration of all hook points in the system.
///
/// Wire names follow the dot convention (`scrape.fetch.custom`) and are
/// what durable registration rows store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookPoint {
    // ── Scraping ──
    /// Fired before a scrape attempt starts.
    #[serde(rename = "scrape.before")]
    ScrapeBefore,
    /// Source chain: the first source able to serve the query wins.
    #[serde(rename = "scrape.fetch.custom")]
    ScrapeFetchCustom,
    /// Pipeline normalizing a fetched draft.
    #[serde(rename = "scrape.parse")]
    ScrapeParse,
    /// Pipeline shaping a parsed draft before it is handed back.
    #[serde(rename = "scrape.data.modify")]
    ScrapeDataModify,
    /// Fired when a scrape attempt failed.
    #[serde(rename = "scrape.error")]
    ScrapeError,

    // ── Catalog ──
    /// Fired before a catalog record is written.
    #[serde(rename = "book.before.save")]
    BookBeforeSave,
    /// Fired after a catalog record was written.
    #[serde(rename = "book.after.save")]
    BookAfterSave,
    /// Datum chain: the first plugin able to produce the named datum wins.
    #[serde(rename = "book.data.get")]
    BookDataGet,
    /// Enrichment pipeline over a draft.
    #[serde(rename = "book.data.modify")]
    BookDataModify,
}

/// How handler return values combine for a hook point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Broadcast; return values discarded.
    Notify,
    /// Sequential transforming pipeline (fold).
    Apply,
    /// First non-empty result wins; remaining listeners skipped.
    FetchFirst,
}

impl HookPoint {
    /// Returns the dot-convention wire name of this hook point.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScrapeBefore => "scrape.before",
            Self::ScrapeFetchCustom => "scrape.fetch.custom",
            Self::ScrapeParse => "scrape.parse",
            Self::ScrapeDataModify => "scrape.data.modify",
            Self::ScrapeError => "scrape.error",
            Self::BookBeforeSave => "book.before.save",
            Self::BookAfterSave => "book.after.save",
            Self::BookDataGet => "book.data.get",
            Self::BookDataModify => "book.data.modify",
        }
    }

    /// Returns the dispatch mode call sites use for this hook point.
    pub fn mode(&self) -> DispatchMode {
        match self {
            Self::ScrapeBefore | Self::ScrapeError | Self::BookBeforeSave | Self::BookAfterSave => {
                DispatchMode::Notify
            }
            Self::ScrapeParse | Self::ScrapeDataModify | Self::BookDataModify => DispatchMode::Apply,
            Self::ScrapeFetchCustom | Self::BookDataGet => DispatchMode::FetchFirst,
        }
    }
}

impl FromStr for HookPoint {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scrape.before" => Ok(Self::ScrapeBefore),
            "scrape.fetch.custom" => Ok(Self::ScrapeFetchCustom),
            "scrape.parse" => Ok(Self::ScrapeParse),
            "scrape.data.modify" => Ok(Self::ScrapeDataModify),
            "scrape.error" => Ok(Self::ScrapeError),
            "book.before.save" => Ok(Self::BookBeforeSave),
            "book.after.save" => Ok(Self::BookAfterSave),
            "book.data.get" => Ok(Self::BookDataGet),
            "book.data.modify" => Ok(Self::BookDataModify),
            other => Err(AppError::validation(format!("Unknown hook point: {other}"))),
        }
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Context passed to hook handlers — named optional fields instead of a
/// positional argument bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookPayload {
    /// The hook point being fired.
    pub hook: HookPoint,
    /// The catalog record the event concerns, if any.
    pub book_id: Option<Uuid>,
    /// Search terms, for scrape hooks.
    pub query: Option<ScrapeQuery>,
    /// Name of the scrape source involved, if any.
    pub source: Option<String>,
    /// Free-text detail (e.g. the error text for `scrape.error`, or the
    /// datum key for `book.data.get`).
    pub message: Option<String>,
    /// Anything call sites want to attach beyond the named fields.
    pub extra: HashMap<String, serde_json::Value>,
    /// When the event was fired.
    pub timestamp: DateTime<Utc>,
}

impl HookPayload {
    /// Creates a new hook payload.
    pub fn new(hook: HookPoint) -> Self {
        Self {
            hook,
            book_id: None,
            query: None,
            source: None,
            message: None,
            extra: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Sets the book ID.
    pub fn with_book_id(mut self, book_id: Uuid) -> Self {
        self.book_id = Some(book_id);
        self
    }

    /// Sets the scrape query.
    pub fn with_query(mut self, query: ScrapeQuery) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the scrape source name.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// Sets the free-text detail.
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Attaches an extra value under a key.
    pub fn with_extra(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    /// Gets an extra value by key.
    pub fn get_extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Gets an extra string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }
}

/// Value threaded through `apply` pipelines and returned by fetch chains.
///
/// Pipeline listeners are expected to return the variant they received;
/// the dispatcher logs (but does not reject) a variant change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HookValue {
    /// A book draft flowing through scrape/enrichment pipelines.
    Draft(BookDraft),
    /// A free-form JSON value, for datum chains.
    Json(serde_json::Value),
    /// A text fragment.
    Text(String),
}

impl HookValue {
    /// The variant name, used when logging shape changes.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Draft(_) => "draft",
            Self::Json(_) => "json",
            Self::Text(_) => "text",
        }
    }

    /// Borrows the draft, if this is a draft value.
    pub fn as_draft(&self) -> Option<&BookDraft> {
        match self {
            Self::Draft(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value into a draft, if this is a draft value.
    pub fn into_draft(self) -> Option<BookDraft> {
        match self {
            Self::Draft(d) => Some(d),
            _ => None,
        }
    }

    /// Borrows the JSON value, if this is a JSON value.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Borrows the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_point_roundtrip() {
        for hook in [
            HookPoint::ScrapeBefore,
            HookPoint::ScrapeFetchCustom,
            HookPoint::ScrapeParse,
            HookPoint::ScrapeDataModify,
            HookPoint::ScrapeError,
            HookPoint::BookBeforeSave,
            HookPoint::BookAfterSave,
            HookPoint::BookDataGet,
            HookPoint::BookDataModify,
        ] {
            let parsed: HookPoint = hook.as_str().parse().expect("should parse");
            assert_eq!(parsed, hook);
        }
    }

    #[test]
    fn test_unknown_hook_point_rejected() {
        assert!("scrape.nonsense".parse::<HookPoint>().is_err());
    }

    #[test]
    fn test_payload_builders() {
        let payload = HookPayload::new(HookPoint::ScrapeError)
            .with_source("openlibrary")
            .with_message("connection refused")
            .with_extra("attempt", serde_json::json!(2));
        assert_eq!(payload.source.as_deref(), Some("openlibrary"));
        assert_eq!(payload.message.as_deref(), Some("connection refused"));
        assert_eq!(payload.get_extra("attempt"), Some(&serde_json::json!(2)));
        assert!(payload.get_str("attempt").is_none());
    }

    #[test]
    fn test_value_accessors() {
        let value = HookValue::Draft(BookDraft::new("Solaris"));
        assert_eq!(value.variant_name(), "draft");
        assert!(value.as_json().is_none());
        assert_eq!(value.into_draft().expect("draft").title, "Solaris");
    }
}
