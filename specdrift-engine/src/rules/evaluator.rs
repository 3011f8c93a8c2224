//! Parallel rule evaluation with deterministic output.
//!
//! Tree walks are pure functions of the fact pair, independent across
//! pairs and across rules, so they fan out under rayon. A stable re-sort
//! by `(module, subject, rule_id)` afterwards makes the finding sequence
//! positionally identical across runs regardless of scheduling.

use rayon::prelude::*;
use specdrift_core::model::{
    CodeFact, Evidence, Finding, LeafOutcome, PendingJudgment, Rule, SpecFact,
};
use specdrift_core::traits::Cancellable;

use super::join::{join_facts, FactPair};
use super::walker;
use crate::registry::RuleRegistry;

/// Output of one evaluation pass.
#[derive(Debug, Default)]
pub struct EvalOutput {
    pub findings: Vec<Finding>,
    pub pending: Vec<PendingJudgment>,
    /// True when cancellation cut the pass short. The caller records the
    /// run as cancelled instead of complete.
    pub cancelled: bool,
}

/// Evaluate every applicable rule against every joined pair in scope.
pub fn evaluate(
    spec_facts: &[SpecFact],
    code_facts: &[CodeFact],
    registry: &RuleRegistry,
    scope: &[String],
    cancel: &dyn Cancellable,
) -> EvalOutput {
    let pairs = join_facts(spec_facts, code_facts, scope);

    // Work items: one (rule, pair) per applicable combination.
    let work: Vec<(&Rule, &FactPair<'_>)> = registry
        .rules()
        .iter()
        .flat_map(|rule| {
            pairs
                .iter()
                .filter(move |pair| pair.key.kind == rule.applies_to)
                .map(move |pair| (rule, pair))
        })
        .collect();

    let results: Vec<Option<PairOutcome>> = work
        .par_iter()
        .map(|(rule, pair)| {
            // Cooperative cancellation between pairs; the current leaf
            // walk is bounded and cheap, so no mid-walk check is needed.
            if cancel.is_cancelled() {
                return None;
            }
            Some(evaluate_pair(rule, pair))
        })
        .collect();

    let cancelled = results.iter().any(Option::is_none);
    let mut output = EvalOutput {
        cancelled,
        ..Default::default()
    };
    for outcome in results.into_iter().flatten() {
        match outcome {
            PairOutcome::Finding(f) => output.findings.push(f),
            PairOutcome::Pending(p) => output.pending.push(p),
        }
    }

    // Stable re-sort: module, then subject, then rule id.
    output.findings.sort_by(|a, b| {
        (&a.key.module, &a.key.subject, &a.rule_id).cmp(&(
            &b.key.module,
            &b.key.subject,
            &b.rule_id,
        ))
    });
    output.pending.sort_by(|a, b| {
        (&a.key.module, &a.key.subject, &a.rule_id).cmp(&(
            &b.key.module,
            &b.key.subject,
            &b.rule_id,
        ))
    });
    output
}

enum PairOutcome {
    Finding(Finding),
    Pending(PendingJudgment),
}

fn evaluate_pair(rule: &Rule, pair: &FactPair<'_>) -> PairOutcome {
    if rule.requires_judgment {
        return PairOutcome::Pending(pending_for(rule, pair));
    }

    let result = walker::walk(rule, pair);
    match result.outcome {
        LeafOutcome::RequiresJudgment => PairOutcome::Pending(pending_for(rule, pair)),
        outcome => PairOutcome::Finding(Finding {
            rule_id: rule.id.clone(),
            key: pair.key.clone(),
            violated: outcome == LeafOutcome::Violated,
            evidence: if outcome == LeafOutcome::Violated {
                result.evidence
            } else {
                Evidence::None
            },
        }),
    }
}

fn pending_for(rule: &Rule, pair: &FactPair<'_>) -> PendingJudgment {
    PendingJudgment {
        rule_id: rule.id.clone(),
        key: pair.key.clone(),
        prompt: rule
            .judgment_prompt
            .clone()
            .unwrap_or_else(|| format!("Decide rule {} for {}", rule.id, pair.key)),
    }
}
