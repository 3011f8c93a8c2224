//! Gap classification and prioritization.
//!
//! Maps violated findings to the gap taxonomy and assigns a priority
//! that is a pure function of the rule and the pair's severity
//! attributes. Output ordering is the stable tie-break `(priority,
//! module, subject)` required for diffable reports.

use specdrift_core::model::{
    AttrValue, Evidence, Finding, Gap, SpecFact,
};
use specdrift_core::types::collections::FxHashMap;

use crate::registry::RuleRegistry;

/// Classify violated findings into gaps. Non-violated findings produce
/// nothing. `spec_facts` supplies the severity attributes escalation
/// predicates inspect.
pub fn classify(
    findings: &[Finding],
    registry: &RuleRegistry,
    spec_facts: &[SpecFact],
) -> Vec<Gap> {
    let rules_by_id: FxHashMap<&str, _> = registry
        .rules()
        .iter()
        .map(|r| (r.id.as_str(), r))
        .collect();
    let specs_by_key: FxHashMap<_, &SpecFact> =
        spec_facts.iter().map(|f| (&f.key, f)).collect();

    let mut gaps: Vec<Gap> = findings
        .iter()
        .filter(|f| f.violated)
        .filter_map(|finding| {
            let rule = rules_by_id.get(finding.rule_id.as_str())?;
            let spec = specs_by_key.get(&finding.key).copied();

            let mut priority = rule.default_priority;
            if let Some(attr) = &rule.escalate_when {
                if spec
                    .and_then(|s| s.attributes.get(attr))
                    .and_then(AttrValue::as_bool)
                    == Some(true)
                {
                    priority = priority.escalated();
                }
            }

            Some(Gap {
                gap_type: rule.gap_type,
                priority,
                module: finding.key.module.clone(),
                subject: finding.key.subject.clone(),
                description: describe(finding),
                decision_options: decision_options(&finding.evidence),
            })
        })
        .collect();

    // Stable tie-break: priority, then module, then subject.
    gaps.sort_by(|a, b| {
        (a.priority, &a.module, &a.subject).cmp(&(b.priority, &b.module, &b.subject))
    });
    gaps
}

fn describe(finding: &Finding) -> String {
    match &finding.evidence {
        Evidence::SpecOnly => format!(
            "{} '{}' is specified but not present in code (rule {})",
            finding.key.kind, finding.key.subject, finding.rule_id
        ),
        Evidence::CodeOnly => format!(
            "{} '{}' exists in code but not in the specification (rule {})",
            finding.key.kind, finding.key.subject, finding.rule_id
        ),
        Evidence::AttrMismatch {
            attr,
            spec_value,
            code_value,
        } => format!(
            "{} '{}': attribute '{attr}' disagrees (spec: {spec_value:?}, code: {code_value:?}; rule {})",
            finding.key.kind, finding.key.subject, finding.rule_id
        ),
        Evidence::None => format!(
            "{} '{}' violates rule {}",
            finding.key.kind, finding.key.subject, finding.rule_id
        ),
    }
}

/// The engine measures distance; choosing a direction is the user's
/// call. Offer the sensible options for the evidence at hand.
fn decision_options(evidence: &Evidence) -> Vec<String> {
    match evidence {
        Evidence::SpecOnly => vec![
            "implement the specified subject".to_string(),
            "remove or defer the specification section".to_string(),
        ],
        Evidence::CodeOnly => vec![
            "document the implementation in the specification".to_string(),
            "remove the undocumented implementation".to_string(),
        ],
        Evidence::AttrMismatch { .. } | Evidence::None => vec![
            "update the code to match the specification".to_string(),
            "update the specification to match the code".to_string(),
            "accept the delta".to_string(),
        ],
    }
}
