//! Closure-based hook handler for quick handler creation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use bookhub_core::result::AppResult;
use bookhub_plugin::hooks::definitions::{HookPayload, HookValue};
use bookhub_plugin::hooks::registry::{DEFAULT_PRIORITY, HookHandler};

type HandlerFn = Arc<
    dyn Fn(
            HookPayload,
            Option<HookValue>,
        ) -> Pin<Box<dyn Future<Output = AppResult<Option<HookValue>>> + Send>>
        + Send
        + Sync,
>;

/// A [`HookHandler`] built from an async closure.
///
/// The closure receives an owned payload and pipeline value, so it can be
/// moved into spawned work without lifetime gymnastics.
pub struct ClosureHandler {
    /// Stable callback reference.
    id: String,
    /// Owning plugin name.
    plugin_id: String,
    /// Default priority.
    priority: i32,
    /// Handler function.
    func: HandlerFn,
}

impl std::fmt::Debug for ClosureHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureHandler")
            .field("id", &self.id)
            .field("plugin_id", &self.plugin_id)
            .field("priority", &self.priority)
            .field("func", &"<closure>")
            .finish()
    }
}

impl ClosureHandler {
    /// Creates a new closure-based handler.
    pub fn new<F, Fut>(plugin_id: &str, id: &str, func: F) -> Self
    where
        F: Fn(HookPayload, Option<HookValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Option<HookValue>>> + Send + 'static,
    {
        Self {
            id: id.to_string(),
            plugin_id: plugin_id.to_string(),
            priority: DEFAULT_PRIORITY,
            func: Arc::new(move |payload, value| Box::pin(func(payload, value))),
        }
    }

    /// Creates a new handler already wrapped for registration.
    pub fn shared<F, Fut>(plugin_id: &str, id: &str, func: F) -> Arc<dyn HookHandler>
    where
        F: Fn(HookPayload, Option<HookValue>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Option<HookValue>>> + Send + 'static,
    {
        Arc::new(Self::new(plugin_id, id, func))
    }

    /// Sets the default priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl HookHandler for ClosureHandler {
    fn id(&self) -> &str {
        &self.id
    }

    fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    fn default_priority(&self) -> i32 {
        self.priority
    }

    async fn handle(
        &self,
        payload: &HookPayload,
        value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>> {
        (self.func)(payload.clone(), value.cloned()).await
    }
}
