//! The run event handler trait. All methods default to no-ops so
//! handlers implement only what they observe.

use super::types::*;

/// Observer for run lifecycle events. Implementations must be `Send +
/// Sync`; dispatch is synchronous on the emitting thread.
pub trait RunEventHandler: Send + Sync {
    fn on_run_started(&self, _event: &RunStartedEvent) {}
    fn on_run_complete(&self, _event: &RunCompleteEvent) {}
    fn on_module_check_started(&self, _event: &ModuleCheckStartedEvent) {}
    fn on_module_check_complete(&self, _event: &ModuleCheckCompleteEvent) {}
    fn on_gap_detected(&self, _event: &GapDetectedEvent) {}
    fn on_judgment_deferred(&self, _event: &JudgmentDeferredEvent) {}
    fn on_provider_degraded(&self, _event: &ProviderDegradedEvent) {}
    fn on_report_recorded(&self, _event: &ReportRecordedEvent) {}
}
