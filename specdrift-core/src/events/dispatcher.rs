//! EventDispatcher — synchronous event dispatch with zero overhead when empty.

use std::sync::Arc;

use super::handler::RunEventHandler;
use super::types::*;

/// Synchronous event dispatcher wrapping a list of handlers.
///
/// When no handlers are registered, `emit` iterates over an empty Vec —
/// effectively zero cost.
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn RunEventHandler>>,
}

impl EventDispatcher {
    /// Create a new empty dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an event handler.
    pub fn register(&mut self, handler: Arc<dyn RunEventHandler>) {
        self.handlers.push(handler);
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Emit an event to all registered handlers.
    /// Handlers that panic are caught and do not prevent subsequent
    /// handlers from receiving the event.
    fn emit<F: Fn(&dyn RunEventHandler)>(&self, f: F) {
        for handler in &self.handlers {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                f(handler.as_ref());
            }));
            if result.is_err() {
                tracing::warn!("event handler panicked; continuing dispatch");
            }
        }
    }

    pub fn emit_run_started(&self, event: &RunStartedEvent) {
        self.emit(|h| h.on_run_started(event));
    }

    pub fn emit_run_complete(&self, event: &RunCompleteEvent) {
        self.emit(|h| h.on_run_complete(event));
    }

    pub fn emit_module_check_started(&self, event: &ModuleCheckStartedEvent) {
        self.emit(|h| h.on_module_check_started(event));
    }

    pub fn emit_module_check_complete(&self, event: &ModuleCheckCompleteEvent) {
        self.emit(|h| h.on_module_check_complete(event));
    }

    pub fn emit_gap_detected(&self, event: &GapDetectedEvent) {
        self.emit(|h| h.on_gap_detected(event));
    }

    pub fn emit_judgment_deferred(&self, event: &JudgmentDeferredEvent) {
        self.emit(|h| h.on_judgment_deferred(event));
    }

    pub fn emit_provider_degraded(&self, event: &ProviderDegradedEvent) {
        self.emit(|h| h.on_provider_degraded(event));
    }

    pub fn emit_report_recorded(&self, event: &ReportRecordedEvent) {
        self.emit(|h| h.on_report_recorded(event));
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
