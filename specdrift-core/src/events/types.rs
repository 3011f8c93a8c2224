//! Event payload types for the run lifecycle.

use crate::model::{GapType, Priority, RunId, RunStatus};

/// Payload for `on_run_started`.
#[derive(Debug, Clone)]
pub struct RunStartedEvent {
    pub run_id: RunId,
    pub modules: Vec<String>,
}

/// Payload for `on_run_complete`.
#[derive(Debug, Clone)]
pub struct RunCompleteEvent {
    pub run_id: RunId,
    pub status: RunStatus,
    pub gap_count: usize,
    pub duration_ms: u64,
}

/// Payload for `on_module_check_started`.
#[derive(Debug, Clone)]
pub struct ModuleCheckStartedEvent {
    pub run_id: RunId,
    pub module: String,
}

/// Payload for `on_module_check_complete`.
#[derive(Debug, Clone)]
pub struct ModuleCheckCompleteEvent {
    pub run_id: RunId,
    pub module: String,
    pub gap_count: usize,
    pub score: Option<f64>,
}

/// Payload for `on_gap_detected`.
#[derive(Debug, Clone)]
pub struct GapDetectedEvent {
    pub run_id: RunId,
    pub gap_type: GapType,
    pub priority: Priority,
    pub module: String,
    pub subject: String,
}

/// Payload for `on_judgment_deferred`.
#[derive(Debug, Clone)]
pub struct JudgmentDeferredEvent {
    pub run_id: RunId,
    pub rule_id: String,
    pub module: String,
    pub subject: String,
}

/// Payload for `on_provider_degraded`.
#[derive(Debug, Clone)]
pub struct ProviderDegradedEvent {
    pub run_id: RunId,
    pub timeout_ms: u64,
}

/// Payload for `on_report_recorded`.
#[derive(Debug, Clone)]
pub struct ReportRecordedEvent {
    pub run_id: RunId,
}
