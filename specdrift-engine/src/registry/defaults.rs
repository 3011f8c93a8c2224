//! The compiled-in default rule set.
//!
//! Covers the common gap taxonomy entries so `check` works without a
//! registry file. A user-supplied registry replaces this set entirely.

use specdrift_core::model::{
    DecisionNode, FactKind, GapType, LeafOutcome, NodeRef, Predicate, Priority, Rule,
};

fn leaf(outcome: LeafOutcome) -> NodeRef {
    NodeRef::Leaf(outcome)
}

fn rule(
    id: &str,
    applies_to: FactKind,
    nodes: Vec<DecisionNode>,
    gap_type: GapType,
    default_priority: Priority,
) -> Rule {
    Rule {
        id: id.to_string(),
        version: 1,
        applies_to,
        nodes,
        gap_type,
        default_priority,
        requires_judgment: false,
        judgment_prompt: None,
        escalate_when: None,
    }
}

/// Build the built-in rules.
pub fn builtin_rules() -> Vec<Rule> {
    let mut rules = Vec::new();

    // Spec describes an entity the code does not implement.
    let mut r = rule(
        "entity-implemented",
        FactKind::EntityDef,
        vec![DecisionNode {
            predicate: Predicate::SpecOnly,
            on_true: leaf(LeafOutcome::Violated),
            on_false: leaf(LeafOutcome::Satisfied),
        }],
        GapType::SpecCodeDelta,
        Priority::P2,
    );
    r.escalate_when = Some("persisted".to_string());
    rules.push(r);

    // Tenancy isolation: when the spec marks a subject tenant-scoped,
    // the code side must agree. Escalates on persisted tenant data.
    let mut r = rule(
        "tenant-isolation",
        FactKind::EntityDef,
        vec![
            DecisionNode {
                predicate: Predicate::AttrPresent {
                    attr: "tenant_scoped".to_string(),
                    side: specdrift_core::model::Side::Spec,
                },
                on_true: NodeRef::Node(1),
                on_false: leaf(LeafOutcome::Satisfied),
            },
            DecisionNode {
                predicate: Predicate::SpecOnly,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: NodeRef::Node(2),
            },
            DecisionNode {
                predicate: Predicate::AttrsAgree {
                    attr: "tenant_scoped".to_string(),
                },
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: leaf(LeafOutcome::Violated),
            },
        ],
        GapType::MultiTenancyGap,
        Priority::P3,
    );
    r.escalate_when = Some("tenant_scoped".to_string());
    rules.push(r);

    // State machine parity: specified transitions must exist in code.
    rules.push(rule(
        "state-machine-parity",
        FactKind::StateMachine,
        vec![
            DecisionNode {
                predicate: Predicate::SpecOnly,
                on_true: leaf(LeafOutcome::Violated),
                on_false: NodeRef::Node(1),
            },
            DecisionNode {
                predicate: Predicate::CodeOnly,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: NodeRef::Node(2),
            },
            DecisionNode {
                predicate: Predicate::AttrsAgree {
                    attr: "transitions".to_string(),
                },
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: leaf(LeafOutcome::Violated),
            },
        ],
        GapType::StateMachineGap,
        Priority::P3,
    ));

    // Permission parity: every specified role/action grant must match.
    rules.push(rule(
        "permission-parity",
        FactKind::Permission,
        vec![
            DecisionNode {
                predicate: Predicate::SpecOnly,
                on_true: leaf(LeafOutcome::Violated),
                on_false: NodeRef::Node(1),
            },
            DecisionNode {
                predicate: Predicate::CodeOnly,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: NodeRef::Node(2),
            },
            DecisionNode {
                predicate: Predicate::SpecAttrsMatch,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: leaf(LeafOutcome::Violated),
            },
        ],
        GapType::PermissionGap,
        Priority::P2,
    ));

    // API contract parity.
    rules.push(rule(
        "api-contract-parity",
        FactKind::ApiContract,
        vec![
            DecisionNode {
                predicate: Predicate::SpecOnly,
                on_true: leaf(LeafOutcome::Violated),
                on_false: NodeRef::Node(1),
            },
            DecisionNode {
                predicate: Predicate::CodeOnly,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: NodeRef::Node(2),
            },
            DecisionNode {
                predicate: Predicate::SpecAttrsMatch,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: leaf(LeafOutcome::Violated),
            },
        ],
        GapType::ApiContractGap,
        Priority::P2,
    ));

    // Tenancy rule facts extracted from annotations.
    rules.push(rule(
        "tenancy-rule-implemented",
        FactKind::TenancyRule,
        vec![
            DecisionNode {
                predicate: Predicate::SpecOnly,
                on_true: leaf(LeafOutcome::Violated),
                on_false: NodeRef::Node(1),
            },
            DecisionNode {
                predicate: Predicate::CodeOnly,
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: NodeRef::Node(2),
            },
            DecisionNode {
                predicate: Predicate::AttrsAgree {
                    attr: "tenant_scoped".to_string(),
                },
                on_true: leaf(LeafOutcome::Satisfied),
                on_false: leaf(LeafOutcome::Violated),
            },
        ],
        GapType::MultiTenancyGap,
        Priority::P3,
    ));

    // Workflow intent cannot be decided structurally — always deferred
    // to the judgment worker.
    let mut r = rule(
        "workflow-intent",
        FactKind::Workflow,
        vec![],
        GapType::WorkflowGap,
        Priority::P3,
    );
    r.requires_judgment = true;
    r.judgment_prompt = Some(
        "Compare the specified workflow description with the implemented steps \
         and decide whether the implementation honors the specified intent."
            .to_string(),
    );
    rules.push(r);

    rules
}

#[cfg(test)]
mod tests {
    use crate::registry::validate::validate_tree;

    use super::*;

    #[test]
    fn every_builtin_rule_validates() {
        for rule in builtin_rules() {
            validate_tree(&rule).unwrap_or_else(|e| panic!("rule {} invalid: {e}", rule.id));
        }
    }

    #[test]
    fn builtin_ids_are_unique() {
        let rules = builtin_rules();
        let mut ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }
}
