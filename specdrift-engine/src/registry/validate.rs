//! Tree-shape validation for compiled rules.
//!
//! Node references must be forward-only (a node may only point at a
//! higher index), which rules out cycles by construction and bounds
//! every walk at `nodes.len()` steps.

use specdrift_core::model::{NodeRef, Rule};

/// Validate a compiled rule's decision tree.
pub fn validate_tree(rule: &Rule) -> Result<(), String> {
    if rule.nodes.is_empty() {
        if rule.requires_judgment {
            return Ok(());
        }
        return Err("rule has no nodes and is not marked requires_judgment".to_string());
    }

    for (idx, node) in rule.nodes.iter().enumerate() {
        for (edge, target) in [("on_true", node.on_true), ("on_false", node.on_false)] {
            if let NodeRef::Node(t) = target {
                if t >= rule.nodes.len() {
                    return Err(format!(
                        "node {idx} {edge} references out-of-range node {t}"
                    ));
                }
                if t <= idx {
                    return Err(format!(
                        "node {idx} {edge} references node {t}; references must be forward-only"
                    ));
                }
            }
        }
    }

    if rule.requires_judgment && rule.judgment_prompt.is_none() {
        return Err("requires_judgment rule has no judgment_prompt".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use specdrift_core::model::{
        DecisionNode, FactKind, GapType, LeafOutcome, Predicate, Priority,
    };

    use super::*;

    fn rule_with_nodes(nodes: Vec<DecisionNode>) -> Rule {
        Rule {
            id: "t".to_string(),
            version: 1,
            applies_to: FactKind::EntityDef,
            nodes,
            gap_type: GapType::SpecCodeDelta,
            default_priority: Priority::P3,
            requires_judgment: false,
            judgment_prompt: None,
            escalate_when: None,
        }
    }

    #[test]
    fn backward_reference_is_rejected() {
        let nodes = vec![
            DecisionNode {
                predicate: Predicate::BothPresent,
                on_true: NodeRef::Node(1),
                on_false: NodeRef::Leaf(LeafOutcome::Satisfied),
            },
            DecisionNode {
                predicate: Predicate::SpecOnly,
                on_true: NodeRef::Node(0),
                on_false: NodeRef::Leaf(LeafOutcome::Satisfied),
            },
        ];
        let err = validate_tree(&rule_with_nodes(nodes)).unwrap_err();
        assert!(err.contains("forward-only"));
    }

    #[test]
    fn empty_tree_requires_judgment_flag() {
        let mut rule = rule_with_nodes(vec![]);
        assert!(validate_tree(&rule).is_err());
        rule.requires_judgment = true;
        rule.judgment_prompt = Some("decide".to_string());
        assert!(validate_tree(&rule).is_ok());
    }
}
