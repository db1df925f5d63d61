//! Hook implementations for the ratings plugin.
//!
//! Overrides live in plugin settings under `rating.{isbn}` with a
//! `default_rating` fallback, so operators can curate ratings without a
//! separate table.

use std::sync::Arc;

use async_trait::async_trait;

use bookhub_core::result::AppResult;
use bookhub_plugin::api::context::PluginSettingsService;
use bookhub_plugin::hooks::definitions::{HookPayload, HookValue};
use bookhub_plugin::hooks::registry::HookHandler;

/// Looks up the rating for an ISBN: per-ISBN override first, then the
/// `default_rating` fallback.
async fn lookup_rating(
    settings: &Arc<dyn PluginSettingsService>,
    isbn: Option<&str>,
) -> AppResult<Option<f64>> {
    if let Some(isbn) = isbn {
        if let Some(value) = settings.get(&format!("rating.{isbn}")).await? {
            if let Ok(rating) = value.parse::<f64>() {
                return Ok(Some(rating));
            }
        }
    }

    match settings.get("default_rating").await? {
        Some(value) => Ok(value.parse::<f64>().ok()),
        None => Ok(None),
    }
}

/// `book.data.modify` handler — fills a missing rating on the draft.
pub struct EnrichHook {
    settings: Arc<dyn PluginSettingsService>,
}

impl std::fmt::Debug for EnrichHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichHook").finish()
    }
}

impl EnrichHook {
    /// Creates a new enrichment handler.
    pub fn new(settings: Arc<dyn PluginSettingsService>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl HookHandler for EnrichHook {
    fn id(&self) -> &str {
        "ratings.enrich"
    }

    fn plugin_id(&self) -> &str {
        "ratings"
    }

    async fn handle(
        &self,
        _payload: &HookPayload,
        value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>> {
        let Some(draft) = value.and_then(HookValue::as_draft) else {
            return Ok(None);
        };
        if draft.rating.is_some() {
            return Ok(None);
        }

        match lookup_rating(&self.settings, draft.isbn.as_deref()).await? {
            Some(rating) => {
                let mut enriched = draft.clone();
                enriched.rating = Some(rating);
                Ok(Some(HookValue::Draft(enriched)))
            }
            None => Ok(None),
        }
    }
}

/// `book.data.get` handler — serves the `rating` datum.
///
/// Expects the datum name in `payload.message` and the ISBN under the
/// `isbn` extra.
pub struct RatingDatumHook {
    settings: Arc<dyn PluginSettingsService>,
}

impl std::fmt::Debug for RatingDatumHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingDatumHook").finish()
    }
}

impl RatingDatumHook {
    /// Creates a new datum handler.
    pub fn new(settings: Arc<dyn PluginSettingsService>) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl HookHandler for RatingDatumHook {
    fn id(&self) -> &str {
        "ratings.datum"
    }

    fn plugin_id(&self) -> &str {
        "ratings"
    }

    async fn handle(
        &self,
        payload: &HookPayload,
        _value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>> {
        if payload.message.as_deref() != Some("rating") {
            return Ok(None);
        }

        let rating = lookup_rating(&self.settings, payload.get_str("isbn")).await?;
        Ok(rating.map(|r| HookValue::Json(serde_json::json!(r))))
    }
}
