//! # bookhub-plugin-sdk
//!
//! SDK for developing BookHub plugins.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bookhub_plugin_sdk::prelude::*;
//!
//! #[derive(Debug)]
//! struct MyPlugin;
//!
//! #[async_trait]
//! impl Plugin for MyPlugin {
//!     fn info(&self) -> PluginInfo {
//!         PluginInfo {
//!             name: "my-plugin".to_string(),
//!             version: "1.0.0".to_string(),
//!             description: "A sample plugin".to_string(),
//!             author: "Developer".to_string(),
//!         }
//!     }
//!
//!     fn subscriptions(&self) -> Vec<HookSubscription> {
//!         vec![HookSubscription::new(
//!             HookPoint::BookDataModify,
//!             ClosureHandler::shared("my-plugin", "my-plugin.enrich", |_payload, value| async move {
//!                 Ok(value)
//!             }),
//!         )]
//!     }
//!
//!     async fn on_install(&self, _ctx: &PluginContext) -> AppResult<()> { Ok(()) }
//!     async fn on_activate(&self, _ctx: &PluginContext) -> AppResult<()> { Ok(()) }
//!     async fn on_deactivate(&self, _ctx: &PluginContext) -> AppResult<()> { Ok(()) }
//!     async fn on_uninstall(&self, _ctx: &PluginContext) -> AppResult<()> { Ok(()) }
//! }
//! ```

pub mod handler;

/// Prelude for convenient imports.
pub mod prelude {
    pub use async_trait::async_trait;

    pub use bookhub_core::error::AppError;
    pub use bookhub_core::result::AppResult;
    pub use bookhub_entity::book::{BookDraft, ScrapeQuery};
    pub use bookhub_plugin::api::context::{
        PluginContext, PluginLogService, PluginSettingsService,
    };
    pub use bookhub_plugin::hooks::definitions::{
        DispatchMode, HookPayload, HookPoint, HookValue,
    };
    pub use bookhub_plugin::hooks::registry::{HookHandler, DEFAULT_PRIORITY};
    pub use bookhub_plugin::registry::{HookSubscription, Plugin, PluginInfo};

    pub use crate::handler::ClosureHandler;
}
