//! Hook dispatcher — fires hooks and combines listener results per
//! dispatch mode.
//!
//! All three modes are fail-soft at the listener boundary: a listener
//! error is logged with hook name and plugin identity and never
//! propagates into the code that fired the event.
//!
//! - `notify` — broadcast; a failing listener does not stop the rest.
//! - `apply` — fold; a failing listener keeps the pre-listener value and
//!   the pipeline continues.
//! - `fetch_first` — chain; an error counts as "no result, try next".
//!
//! The dispatcher imposes no timeout on listeners; listeners doing I/O
//! own their timeout configuration.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::definitions::{DispatchMode, HookPayload, HookValue};
use super::registry::{HookHandler, HookRegistry};

/// Dispatches hooks to registered handlers.
#[derive(Debug)]
pub struct HookDispatcher {
    /// Hook registry.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Fire-and-forget broadcast. Invokes every listener in order with the
    /// same payload; return values are discarded.
    pub async fn notify(&self, payload: &HookPayload) {
        self.check_mode(payload, DispatchMode::Notify);
        let listeners = self.registry.listeners(&payload.hook).await;
        if listeners.is_empty() {
            return;
        }

        debug!(
            hook = %payload.hook,
            listener_count = listeners.len(),
            "Dispatching notify hook"
        );

        for handler in &listeners {
            if let Err(e) = handler.handle(payload, None).await {
                error!(
                    hook = %payload.hook,
                    plugin_id = %handler.plugin_id(),
                    handler = %handler.id(),
                    error = %e,
                    "Hook listener failed; continuing with remaining listeners"
                );
            }
        }
    }

    /// Sequential transforming pipeline. The first listener receives
    /// `initial`; each listener's returned value feeds the next. With no
    /// listeners registered, `initial` is returned unchanged.
    pub async fn apply(&self, payload: &HookPayload, initial: HookValue) -> HookValue {
        self.check_mode(payload, DispatchMode::Apply);
        let listeners = self.registry.listeners(&payload.hook).await;
        if listeners.is_empty() {
            return initial;
        }

        debug!(
            hook = %payload.hook,
            listener_count = listeners.len(),
            "Dispatching apply hook"
        );

        let mut value = initial;
        for handler in &listeners {
            match handler.handle(payload, Some(&value)).await {
                Ok(Some(next)) => {
                    if next.variant_name() != value.variant_name() {
                        warn!(
                            hook = %payload.hook,
                            plugin_id = %handler.plugin_id(),
                            handler = %handler.id(),
                            from = value.variant_name(),
                            to = next.variant_name(),
                            "Pipeline listener changed the value shape"
                        );
                    }
                    value = next;
                }
                Ok(None) => {}
                Err(e) => {
                    error!(
                        hook = %payload.hook,
                        plugin_id = %handler.plugin_id(),
                        handler = %handler.id(),
                        error = %e,
                        "Pipeline listener failed; keeping previous value"
                    );
                }
            }
        }
        value
    }

    /// Short-circuiting chain. Listeners are tried in priority order; the
    /// first to return a value wins and the rest are skipped. Returns
    /// `None` when no listener produced a result.
    pub async fn fetch_first(&self, payload: &HookPayload) -> Option<HookValue> {
        self.check_mode(payload, DispatchMode::FetchFirst);
        let listeners = self.registry.listeners(&payload.hook).await;
        if listeners.is_empty() {
            return None;
        }

        debug!(
            hook = %payload.hook,
            listener_count = listeners.len(),
            "Dispatching fetch-first hook"
        );

        for handler in &listeners {
            match handler.handle(payload, None).await {
                Ok(Some(value)) => {
                    debug!(
                        hook = %payload.hook,
                        plugin_id = %handler.plugin_id(),
                        handler = %handler.id(),
                        "Fetch chain satisfied"
                    );
                    return Some(value);
                }
                Ok(None) => {}
                Err(e) => {
                    error!(
                        hook = %payload.hook,
                        plugin_id = %handler.plugin_id(),
                        handler = %handler.id(),
                        error = %e,
                        "Fetch listener failed; trying next source"
                    );
                }
            }
        }
        None
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }

    /// Flags call sites firing a hook through the wrong dispatch mode.
    fn check_mode(&self, payload: &HookPayload, used: DispatchMode) {
        let declared = payload.hook.mode();
        if declared != used {
            warn!(
                hook = %payload.hook,
                declared = ?declared,
                used = ?used,
                "Hook fired through a dispatch mode it is not declared for"
            );
        }
    }
}
