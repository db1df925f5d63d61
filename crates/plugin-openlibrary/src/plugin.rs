//! Open Library plugin — registers with the BookHub plugin system.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use bookhub_core::result::AppResult;
use bookhub_plugin::api::context::PluginContext;
use bookhub_plugin::hooks::definitions::HookPoint;
use bookhub_plugin::registry::{HookSubscription, Plugin, PluginInfo};

use crate::client::{DEFAULT_BASE_URL, OpenLibraryClient};
use crate::hooks::{FetchHook, ParseHook, ScrapeLogHook};

/// Entry symbol this plugin is linked under; manifests reference it.
pub const ENTRY: &str = "openlibrary_plugin";

/// Open Library scraping source plugin.
#[derive(Debug)]
pub struct OpenLibraryPlugin {
    ctx: PluginContext,
    client: Arc<OpenLibraryClient>,
}

/// Constructs the plugin; wired into the manager as the builder for
/// [`ENTRY`].
pub fn create(ctx: PluginContext) -> Arc<dyn Plugin> {
    Arc::new(OpenLibraryPlugin {
        ctx,
        client: Arc::new(OpenLibraryClient::new()),
    })
}

#[async_trait]
impl Plugin for OpenLibraryPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "openlibrary".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Open Library scraping source".to_string(),
            author: "BookHub Team".to_string(),
        }
    }

    fn subscriptions(&self) -> Vec<HookSubscription> {
        vec![
            HookSubscription::new(
                HookPoint::ScrapeFetchCustom,
                Arc::new(FetchHook::new(self.client.clone())),
            ),
            HookSubscription::new(HookPoint::ScrapeParse, Arc::new(ParseHook)),
            HookSubscription::new(
                HookPoint::ScrapeBefore,
                Arc::new(ScrapeLogHook::before(self.ctx.logs.clone())),
            ),
            HookSubscription::new(
                HookPoint::ScrapeError,
                Arc::new(ScrapeLogHook::error(self.ctx.logs.clone())),
            ),
        ]
    }

    async fn on_install(&self, ctx: &PluginContext) -> AppResult<()> {
        // Seed defaults only when absent so reinstall keeps operator edits.
        if ctx.settings.get("base_url").await?.is_none() {
            ctx.settings.set("base_url", DEFAULT_BASE_URL).await?;
        }
        ctx.logs.append("info", "openlibrary installed").await?;
        Ok(())
    }

    async fn on_activate(&self, ctx: &PluginContext) -> AppResult<()> {
        info!("Open Library scrape source activating");
        ctx.logs.append("info", "openlibrary activated").await?;
        Ok(())
    }

    async fn on_deactivate(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "openlibrary deactivated").await?;
        Ok(())
    }

    async fn on_uninstall(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "openlibrary uninstalled").await?;
        Ok(())
    }
}
