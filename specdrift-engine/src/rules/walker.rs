//! The generic decision-tree walker.
//!
//! Pure function of one rule and one fact pair: evaluates one predicate
//! per node, follows exactly one edge, and reaches a leaf in at most
//! `nodes.len()` steps (forward-only references are enforced at load
//! time). No allocation on the satisfied path.

use specdrift_core::model::{
    AttrValue, Evidence, LeafOutcome, NodeRef, Predicate, Rule, Side,
};

use super::join::FactPair;

/// Outcome of walking one rule over one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkResult {
    pub outcome: LeafOutcome,
    pub evidence: Evidence,
    /// Predicates evaluated before reaching the leaf.
    pub steps: usize,
}

/// Walk `rule`'s tree over `pair` from the root node.
pub fn walk(rule: &Rule, pair: &FactPair<'_>) -> WalkResult {
    let mut current = if rule.nodes.is_empty() {
        // Validated at load time only for requires_judgment rules.
        return WalkResult {
            outcome: LeafOutcome::RequiresJudgment,
            evidence: Evidence::None,
            steps: 0,
        };
    } else {
        0
    };

    let mut steps = 0;
    let mut evidence = Evidence::None;

    loop {
        let node = &rule.nodes[current];
        steps += 1;
        let (taken, pred_evidence) = eval_predicate(&node.predicate, pair);
        if let Some(e) = pred_evidence {
            evidence = e;
        }
        let edge = if taken { node.on_true } else { node.on_false };
        match edge {
            NodeRef::Node(next) => current = next,
            NodeRef::Leaf(outcome) => {
                if outcome != LeafOutcome::Violated {
                    evidence = Evidence::None;
                }
                return WalkResult {
                    outcome,
                    evidence,
                    steps,
                };
            }
        }
    }
}

fn side_attr<'a>(pair: &FactPair<'a>, side: Side, attr: &str) -> Option<&'a AttrValue> {
    match side {
        Side::Spec => pair.spec.and_then(|f| f.attributes.get(attr)),
        Side::Code => pair.code.and_then(|f| f.attributes.get(attr)),
    }
}

/// Evaluate one predicate. Returns the branch taken plus any evidence a
/// violated leaf downstream should carry.
fn eval_predicate(predicate: &Predicate, pair: &FactPair<'_>) -> (bool, Option<Evidence>) {
    match predicate {
        Predicate::SpecOnly => {
            let taken = pair.spec_only();
            (taken, taken.then_some(Evidence::SpecOnly))
        }
        Predicate::CodeOnly => {
            let taken = pair.code_only();
            (taken, taken.then_some(Evidence::CodeOnly))
        }
        Predicate::BothPresent => (pair.spec.is_some() && pair.code.is_some(), None),
        Predicate::AttrPresent { attr, side } => (side_attr(pair, *side, attr).is_some(), None),
        Predicate::AttrEquals { attr, side, value } => {
            let actual = side_attr(pair, *side, attr);
            let taken = actual == Some(value);
            let evidence = (!taken).then(|| Evidence::AttrMismatch {
                attr: attr.clone(),
                spec_value: side_attr(pair, Side::Spec, attr).cloned(),
                code_value: side_attr(pair, Side::Code, attr).cloned(),
            });
            (taken, evidence)
        }
        Predicate::AttrsAgree { attr } => {
            let spec_value = side_attr(pair, Side::Spec, attr);
            let code_value = side_attr(pair, Side::Code, attr);
            let taken = spec_value.is_some() && spec_value == code_value;
            let evidence = (!taken).then(|| Evidence::AttrMismatch {
                attr: attr.clone(),
                spec_value: spec_value.cloned(),
                code_value: code_value.cloned(),
            });
            (taken, evidence)
        }
        Predicate::SpecAttrsMatch => {
            let Some(spec) = pair.spec else {
                return (false, Some(Evidence::CodeOnly));
            };
            let Some(code) = pair.code else {
                return (false, Some(Evidence::SpecOnly));
            };
            for (attr, spec_value) in &spec.attributes {
                let code_value = code.attributes.get(attr);
                if code_value != Some(spec_value) {
                    return (
                        false,
                        Some(Evidence::AttrMismatch {
                            attr: attr.clone(),
                            spec_value: Some(spec_value.clone()),
                            code_value: code_value.cloned(),
                        }),
                    );
                }
            }
            (true, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use specdrift_core::model::{
        CodeFact, DecisionNode, FactKey, FactKind, GapType, Priority, SourceLocation, SpecFact,
    };

    use super::*;

    fn spec_fact(attrs: &[(&str, AttrValue)]) -> SpecFact {
        SpecFact::new(
            FactKey::new("Billing", FactKind::EntityDef, "Invoice"),
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
            SourceLocation {
                document: "d.md".to_string(),
                line: 1,
            },
        )
    }

    fn code_fact(attrs: &[(&str, AttrValue)]) -> CodeFact {
        CodeFact {
            key: FactKey::new("Billing", FactKind::EntityDef, "Invoice"),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            provenance: String::new(),
        }
    }

    fn two_node_rule() -> Rule {
        Rule {
            id: "t".to_string(),
            version: 1,
            applies_to: FactKind::EntityDef,
            nodes: vec![
                DecisionNode {
                    predicate: Predicate::SpecOnly,
                    on_true: NodeRef::Leaf(LeafOutcome::Violated),
                    on_false: NodeRef::Node(1),
                },
                DecisionNode {
                    predicate: Predicate::AttrsAgree {
                        attr: "tenant_scoped".to_string(),
                    },
                    on_true: NodeRef::Leaf(LeafOutcome::Satisfied),
                    on_false: NodeRef::Leaf(LeafOutcome::Violated),
                },
            ],
            gap_type: GapType::MultiTenancyGap,
            default_priority: Priority::P3,
            requires_judgment: false,
            judgment_prompt: None,
            escalate_when: None,
        }
    }

    #[test]
    fn disagreeing_attrs_violate_with_mismatch_evidence() {
        let spec = spec_fact(&[("tenant_scoped", AttrValue::Bool(true))]);
        let code = code_fact(&[("tenant_scoped", AttrValue::Bool(false))]);
        let key = spec.key.clone();
        let pair = FactPair {
            key: &key,
            spec: Some(&spec),
            code: Some(&code),
        };

        let result = walk(&two_node_rule(), &pair);
        assert_eq!(result.outcome, LeafOutcome::Violated);
        assert_eq!(result.steps, 2);
        assert!(matches!(
            result.evidence,
            Evidence::AttrMismatch { ref attr, .. } if attr == "tenant_scoped"
        ));
    }

    #[test]
    fn spec_only_pair_violates_at_the_first_node() {
        let spec = spec_fact(&[]);
        let key = spec.key.clone();
        let pair = FactPair {
            key: &key,
            spec: Some(&spec),
            code: None,
        };

        let result = walk(&two_node_rule(), &pair);
        assert_eq!(result.outcome, LeafOutcome::Violated);
        assert_eq!(result.steps, 1);
        assert_eq!(result.evidence, Evidence::SpecOnly);
    }

    #[test]
    fn satisfied_walks_carry_no_evidence() {
        let spec = spec_fact(&[("tenant_scoped", AttrValue::Bool(true))]);
        let code = code_fact(&[("tenant_scoped", AttrValue::Bool(true))]);
        let key = spec.key.clone();
        let pair = FactPair {
            key: &key,
            spec: Some(&spec),
            code: Some(&code),
        };

        let result = walk(&two_node_rule(), &pair);
        assert_eq!(result.outcome, LeafOutcome::Satisfied);
        assert_eq!(result.evidence, Evidence::None);
    }

    #[test]
    fn walk_length_is_bounded_by_node_count() {
        let rule = two_node_rule();
        let spec = spec_fact(&[]);
        let key = spec.key.clone();
        let pair = FactPair {
            key: &key,
            spec: Some(&spec),
            code: None,
        };
        assert!(walk(&rule, &pair).steps <= rule.nodes.len());
    }
}
