//! JSON reporter — the report's serde form, pretty-printed.

use specdrift_core::model::Report;

use super::Reporter;

/// JSON reporter for machine consumption (CI, dashboards).
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn generate(&self, report: &Report) -> Result<String, String> {
        serde_json::to_string_pretty(report).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use specdrift_core::model::{RunId, RunStatus};

    use super::*;

    #[test]
    fn output_round_trips_through_serde() {
        let report = Report {
            run_id: RunId::generate(),
            timestamp: 0,
            spec_revision: "abc".to_string(),
            code_revision: "def".to_string(),
            modules: vec!["Billing".to_string()],
            gaps: vec![],
            module_scores: vec![],
            warnings: vec![],
            status: RunStatus::Complete,
        };
        let rendered = JsonReporter.generate(&report).unwrap();
        let parsed: Report = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, report);
    }
}
