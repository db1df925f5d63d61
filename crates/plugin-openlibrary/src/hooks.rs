//! Hook implementations for the Open Library plugin.

use std::sync::Arc;

use async_trait::async_trait;

use bookhub_core::result::AppResult;
use bookhub_entity::book::BookDraft;
use bookhub_plugin::api::context::PluginLogService;
use bookhub_plugin::hooks::definitions::{HookPayload, HookValue};
use bookhub_plugin::hooks::registry::HookHandler;

use crate::client::OpenLibraryClient;

/// `scrape.fetch.custom` handler — serves ISBN queries from Open Library.
#[derive(Debug)]
pub struct FetchHook {
    client: Arc<OpenLibraryClient>,
}

impl FetchHook {
    /// Creates a new fetch handler.
    pub fn new(client: Arc<OpenLibraryClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HookHandler for FetchHook {
    fn id(&self) -> &str {
        "openlibrary.fetch"
    }

    fn plugin_id(&self) -> &str {
        "openlibrary"
    }

    async fn handle(
        &self,
        payload: &HookPayload,
        _value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>> {
        // Only ISBN lookups can be served; pass everything else down the chain.
        let Some(isbn) = payload.query.as_ref().and_then(|q| q.isbn.as_deref()) else {
            return Ok(None);
        };

        let draft = self.client.fetch_by_isbn(isbn).await?;
        Ok(draft.map(HookValue::Draft))
    }
}

/// `scrape.parse` handler — normalizes whitespace and ISBN formatting.
#[derive(Debug)]
pub struct ParseHook;

#[async_trait]
impl HookHandler for ParseHook {
    fn id(&self) -> &str {
        "openlibrary.parse"
    }

    fn plugin_id(&self) -> &str {
        "openlibrary"
    }

    async fn handle(
        &self,
        _payload: &HookPayload,
        value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>> {
        let Some(draft) = value.and_then(HookValue::as_draft) else {
            return Ok(None);
        };
        Ok(Some(HookValue::Draft(normalize_draft(draft.clone()))))
    }
}

/// `scrape.before` / `scrape.error` handler — writes scrape diagnostics
/// to the plugin's log stream.
pub struct ScrapeLogHook {
    /// Stable callback reference (differs per subscribed hook).
    id: &'static str,
    /// Log level to record at.
    level: &'static str,
    logs: Arc<dyn PluginLogService>,
}

impl std::fmt::Debug for ScrapeLogHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapeLogHook").field("id", &self.id).finish()
    }
}

impl ScrapeLogHook {
    /// Creates the `scrape.before` diagnostic handler.
    pub fn before(logs: Arc<dyn PluginLogService>) -> Self {
        Self {
            id: "openlibrary.log.before",
            level: "info",
            logs,
        }
    }

    /// Creates the `scrape.error` diagnostic handler.
    pub fn error(logs: Arc<dyn PluginLogService>) -> Self {
        Self {
            id: "openlibrary.log.error",
            level: "error",
            logs,
        }
    }
}

#[async_trait]
impl HookHandler for ScrapeLogHook {
    fn id(&self) -> &str {
        self.id
    }

    fn plugin_id(&self) -> &str {
        "openlibrary"
    }

    fn default_priority(&self) -> i32 {
        // Diagnostics run after the interesting listeners.
        50
    }

    async fn handle(
        &self,
        payload: &HookPayload,
        _value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>> {
        let detail = payload.message.as_deref().unwrap_or("-");
        let source = payload.source.as_deref().unwrap_or("-");
        self.logs
            .append(
                self.level,
                &format!("{} source={} detail={}", payload.hook, source, detail),
            )
            .await?;
        Ok(None)
    }
}

/// Normalizes a scraped draft: collapses stray whitespace and strips ISBN
/// separators.
pub fn normalize_draft(mut draft: BookDraft) -> BookDraft {
    draft.title = collapse_whitespace(&draft.title);
    draft.authors = draft
        .authors
        .iter()
        .map(|author| collapse_whitespace(author))
        .filter(|author| !author.is_empty())
        .collect();
    draft.isbn = draft.isbn.map(|isbn| {
        isbn.chars()
            .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
            .collect::<String>()
            .to_uppercase()
    });
    draft.publisher = draft.publisher.map(|p| collapse_whitespace(&p));
    draft
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
