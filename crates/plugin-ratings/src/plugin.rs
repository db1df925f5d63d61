//! Ratings plugin — registers with the BookHub plugin system.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use bookhub_core::result::AppResult;
use bookhub_plugin::api::context::PluginContext;
use bookhub_plugin::hooks::definitions::HookPoint;
use bookhub_plugin::registry::{HookSubscription, Plugin, PluginInfo};

use crate::hooks::{EnrichHook, RatingDatumHook};

/// Entry symbol this plugin is linked under; manifests reference it.
pub const ENTRY: &str = "ratings_plugin";

/// Rating enrichment plugin.
#[derive(Debug)]
pub struct RatingsPlugin {
    ctx: PluginContext,
}

/// Constructs the plugin; wired into the manager as the builder for
/// [`ENTRY`].
pub fn create(ctx: PluginContext) -> Arc<dyn Plugin> {
    Arc::new(RatingsPlugin { ctx })
}

#[async_trait]
impl Plugin for RatingsPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "ratings".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Settings-backed rating enrichment".to_string(),
            author: "BookHub Team".to_string(),
        }
    }

    fn subscriptions(&self) -> Vec<HookSubscription> {
        vec![
            HookSubscription::new(
                HookPoint::BookDataModify,
                Arc::new(EnrichHook::new(self.ctx.settings.clone())),
            ),
            HookSubscription::new(
                HookPoint::BookDataGet,
                Arc::new(RatingDatumHook::new(self.ctx.settings.clone())),
            ),
        ]
    }

    async fn on_install(&self, ctx: &PluginContext) -> AppResult<()> {
        if ctx.settings.get("default_rating").await?.is_none() {
            ctx.settings.set("default_rating", "3.0").await?;
        }
        ctx.logs.append("info", "ratings installed").await?;
        Ok(())
    }

    async fn on_activate(&self, ctx: &PluginContext) -> AppResult<()> {
        info!("Ratings enrichment activating");
        ctx.logs.append("info", "ratings activated").await?;
        Ok(())
    }

    async fn on_deactivate(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "ratings deactivated").await?;
        Ok(())
    }

    async fn on_uninstall(&self, ctx: &PluginContext) -> AppResult<()> {
        ctx.logs.append("info", "ratings uninstalled").await?;
        Ok(())
    }
}
