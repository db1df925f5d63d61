//! Hook registry — plugins register handlers by hook point with priority
//! ordering.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use bookhub_core::result::AppResult;

use super::definitions::{HookPayload, HookPoint, HookValue};

/// Default dispatch priority for registrations that do not specify one.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Trait for hook handler implementations.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Stable callback reference for this handler (e.g.
    /// `"openlibrary.fetch"`). Persisted in durable registration rows and
    /// used as the idempotency key for re-registration.
    fn id(&self) -> &str;

    /// Returns the plugin name owning this handler.
    fn plugin_id(&self) -> &str;

    /// Priority used when a registration does not specify one.
    fn default_priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Handles a hook invocation.
    ///
    /// `value` is the current pipeline value for `apply` dispatch and
    /// `None` otherwise. Returning `Some` replaces the pipeline value
    /// (`apply`) or claims the result (`fetch_first`); returning `None`
    /// leaves the value unchanged / passes to the next listener.
    async fn handle(
        &self,
        payload: &HookPayload,
        value: Option<&HookValue>,
    ) -> AppResult<Option<HookValue>>;
}

/// Handle identifying one registration, returned by [`HookRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationHandle {
    /// The hook point registered against.
    pub hook: HookPoint,
    /// The handler's stable callback reference.
    pub handler_ref: String,
}

/// Entry in the hook registry.
#[derive(Debug)]
struct HookEntry {
    /// The handler.
    handler: Arc<dyn HookHandler>,
    /// Priority (lower = earlier execution).
    priority: i32,
    /// Registration sequence, assigned once at first registration.
    /// Tie-break for equal priorities; survives in-place replacement.
    seq: u64,
    /// Plugin that registered this handler.
    plugin_id: String,
}

/// Registry of hook handlers organized by hook point.
///
/// Mutation takes the write lock; dispatch reads a copy-on-read snapshot
/// so no lock is held while listeners run.
#[derive(Debug)]
pub struct HookRegistry {
    /// Hook point → list of entries, kept sorted by `(priority, seq)`.
    handlers: RwLock<HashMap<HookPoint, Vec<HookEntry>>>,
    /// Next registration sequence number.
    next_seq: AtomicU64,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Registers a handler for a specific hook point.
    ///
    /// Idempotent on `(hook, handler.id())`: re-registering replaces the
    /// existing entry's handler and priority in place (the new priority
    /// wins) and keeps the original sequence number, so a priority tie
    /// re-registered in the same order reproduces the same dispatch order.
    pub async fn register(
        &self,
        hook: HookPoint,
        handler: Arc<dyn HookHandler>,
        priority: i32,
    ) -> RegistrationHandle {
        let handler_ref = handler.id().to_string();
        let plugin_id = handler.plugin_id().to_string();

        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(hook).or_default();

        if let Some(existing) = entries.iter_mut().find(|e| e.handler.id() == handler_ref) {
            existing.priority = priority;
            existing.handler = handler;
        } else {
            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            entries.push(HookEntry {
                handler,
                priority,
                seq,
                plugin_id: plugin_id.clone(),
            });
        }

        entries.sort_by_key(|e| (e.priority, e.seq));

        info!(
            hook = %hook,
            plugin_id = %plugin_id,
            handler = %handler_ref,
            priority = priority,
            "Hook handler registered"
        );

        RegistrationHandle { hook, handler_ref }
    }

    /// Registers a handler with its own default priority.
    pub async fn register_default(
        &self,
        hook: HookPoint,
        handler: Arc<dyn HookHandler>,
    ) -> RegistrationHandle {
        let priority = handler.default_priority();
        self.register(hook, handler, priority).await
    }

    /// Removes a specific registration; no-op when already absent.
    pub async fn unregister(&self, handle: &RegistrationHandle) {
        let mut handlers = self.handlers.write().await;
        if let Some(entries) = handlers.get_mut(&handle.hook) {
            entries.retain(|e| e.handler.id() != handle.handler_ref);
            if entries.is_empty() {
                handlers.remove(&handle.hook);
            }
        }
    }

    /// Unregisters all handlers owned by a plugin.
    pub async fn clear_plugin(&self, plugin_id: &str) {
        let mut handlers = self.handlers.write().await;

        for entries in handlers.values_mut() {
            entries.retain(|e| e.plugin_id != plugin_id);
        }

        handlers.retain(|_, entries| !entries.is_empty());

        info!(plugin_id = %plugin_id, "All hooks unregistered for plugin");
    }

    /// Removes all registrations for one hook point, or every registration
    /// when `hook` is `None`.
    pub async fn clear(&self, hook: Option<HookPoint>) {
        let mut handlers = self.handlers.write().await;
        match hook {
            Some(hook) => {
                handlers.remove(&hook);
            }
            None => handlers.clear(),
        }
    }

    /// Returns a snapshot of the active handlers for a hook point, in
    /// dispatch order. The snapshot does not observe later mutation.
    pub async fn listeners(&self, hook: &HookPoint) -> Vec<Arc<dyn HookHandler>> {
        let handlers = self.handlers.read().await;
        handlers
            .get(hook)
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns whether any handlers are registered for a hook point.
    pub async fn has_listeners(&self, hook: &HookPoint) -> bool {
        let handlers = self.handlers.read().await;
        handlers
            .get(hook)
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Returns the number of handlers registered for a hook point.
    pub async fn listener_count(&self, hook: &HookPoint) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(hook).map(|entries| entries.len()).unwrap_or(0)
    }

    /// Returns all hook points with at least one registration.
    pub async fn registered_hooks(&self) -> Vec<HookPoint> {
        let handlers = self.handlers.read().await;
        handlers.keys().copied().collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct NamedHandler {
        id: String,
    }

    #[async_trait]
    impl HookHandler for NamedHandler {
        fn id(&self) -> &str {
            &self.id
        }

        fn plugin_id(&self) -> &str {
            "test"
        }

        async fn handle(
            &self,
            _payload: &HookPayload,
            _value: Option<&HookValue>,
        ) -> AppResult<Option<HookValue>> {
            Ok(None)
        }
    }

    fn handler(id: &str) -> Arc<dyn HookHandler> {
        Arc::new(NamedHandler { id: id.to_string() })
    }

    #[tokio::test]
    async fn test_priority_then_sequence_order() {
        let registry = HookRegistry::new();
        registry
            .register(HookPoint::ScrapeParse, handler("a"), 5)
            .await;
        registry
            .register(HookPoint::ScrapeParse, handler("b"), 1)
            .await;
        registry
            .register(HookPoint::ScrapeParse, handler("c"), 5)
            .await;

        let order: Vec<String> = registry
            .listeners(&HookPoint::ScrapeParse)
            .await
            .iter()
            .map(|h| h.id().to_string())
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_reregistration_replaces_in_place() {
        let registry = HookRegistry::new();
        registry
            .register(HookPoint::BookDataGet, handler("a"), 5)
            .await;
        registry
            .register(HookPoint::BookDataGet, handler("a"), 1)
            .await;

        assert_eq!(registry.listener_count(&HookPoint::BookDataGet).await, 1);
    }

    #[tokio::test]
    async fn test_unregister_is_noop_when_absent() {
        let registry = HookRegistry::new();
        let handle = registry
            .register(HookPoint::BookDataGet, handler("a"), 5)
            .await;
        registry.unregister(&handle).await;
        registry.unregister(&handle).await;

        assert!(!registry.has_listeners(&HookPoint::BookDataGet).await);
    }

    #[tokio::test]
    async fn test_clear_single_hook() {
        let registry = HookRegistry::new();
        registry
            .register(HookPoint::BookDataGet, handler("a"), 5)
            .await;
        registry
            .register(HookPoint::ScrapeParse, handler("b"), 5)
            .await;

        registry.clear(Some(HookPoint::BookDataGet)).await;

        assert!(!registry.has_listeners(&HookPoint::BookDataGet).await);
        assert!(registry.has_listeners(&HookPoint::ScrapeParse).await);

        registry.clear(None).await;
        assert!(registry.registered_hooks().await.is_empty());
    }
}
