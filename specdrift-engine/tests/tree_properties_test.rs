//! Property tests over generated decision trees and fact pairs.
//!
//! Trees are generated with forward-only references, the same shape the
//! registry validator admits. Every walk must terminate within the node
//! count and every tree must have exactly one more leaf than nodes.

use std::collections::BTreeMap;

use proptest::prelude::*;
use specdrift_core::model::{
    AttrValue, DecisionNode, FactKey, FactKind, GapType, LeafOutcome, NodeRef, Predicate,
    Priority, Rule, Side, SourceLocation, SpecFact,
};
use specdrift_engine::rules::{join_facts, walk};

fn leaf_strategy() -> impl Strategy<Value = NodeRef> {
    prop_oneof![
        Just(NodeRef::Leaf(LeafOutcome::Satisfied)),
        Just(NodeRef::Leaf(LeafOutcome::Violated)),
    ]
}

fn predicate_strategy() -> impl Strategy<Value = Predicate> {
    let attr = prop_oneof![
        Just("persisted".to_string()),
        Just("tenant_scoped".to_string()),
        Just("currency".to_string()),
    ];
    prop_oneof![
        Just(Predicate::SpecOnly),
        Just(Predicate::CodeOnly),
        Just(Predicate::BothPresent),
        Just(Predicate::SpecAttrsMatch),
        attr.clone().prop_map(|attr| Predicate::AttrsAgree { attr }),
        (attr, prop_oneof![Just(Side::Spec), Just(Side::Code)])
            .prop_map(|(attr, side)| Predicate::AttrPresent { attr, side }),
    ]
}

/// A linear chain of `n` nodes: every node except the last continues to
/// the next node on one randomly chosen edge and exits to a leaf on the
/// other; the last node exits on both edges.
fn tree_strategy(max_nodes: usize) -> impl Strategy<Value = Vec<DecisionNode>> {
    (1..=max_nodes).prop_flat_map(|n| {
        let nodes: Vec<_> = (0..n)
            .map(move |i| {
                (predicate_strategy(), leaf_strategy(), leaf_strategy(), any::<bool>()).prop_map(
                    move |(predicate, exit_a, exit_b, continue_on_true)| {
                        if i + 1 < n {
                            let next = NodeRef::Node(i + 1);
                            if continue_on_true {
                                DecisionNode {
                                    predicate,
                                    on_true: next,
                                    on_false: exit_a,
                                }
                            } else {
                                DecisionNode {
                                    predicate,
                                    on_true: exit_a,
                                    on_false: next,
                                }
                            }
                        } else {
                            DecisionNode {
                                predicate,
                                on_true: exit_a,
                                on_false: exit_b,
                            }
                        }
                    },
                )
            })
            .collect();
        nodes
    })
}

fn attrs_strategy() -> impl Strategy<Value = BTreeMap<String, AttrValue>> {
    proptest::collection::btree_map(
        prop_oneof![
            Just("persisted".to_string()),
            Just("tenant_scoped".to_string()),
            Just("currency".to_string()),
        ],
        prop_oneof![
            any::<bool>().prop_map(AttrValue::Bool),
            (0i64..100).prop_map(AttrValue::Int),
            Just(AttrValue::Str("USD".to_string())),
        ],
        0..4,
    )
}

fn rule_with(nodes: Vec<DecisionNode>) -> Rule {
    Rule {
        id: "generated".to_string(),
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

fn spec_fact(attributes: BTreeMap<String, AttrValue>) -> SpecFact {
    SpecFact::new(
        FactKey {
            module: "Billing".to_string(),
            kind: FactKind::EntityDef,
            subject: "Invoice".to_string(),
        },
        attributes,
        SourceLocation {
            document: "billing.md".to_string(),
            line: 1,
        },
    )
}

proptest! {
    #[test]
    fn every_tree_has_one_more_leaf_than_nodes(nodes in tree_strategy(8)) {
        let n = nodes.len();
        let mut leaves = 0usize;
        for node in &nodes {
            for edge in [node.on_true, node.on_false] {
                if matches!(edge, NodeRef::Leaf(_)) {
                    leaves += 1;
                }
            }
        }
        // Each interior node contributes one continuation edge and one
        // exit; the last node exits twice. Leaf edges are nodes + 1.
        prop_assert_eq!(leaves, n + 1);
        prop_assert_eq!(rule_with(nodes).leaf_count(), n + 1);
    }

    #[test]
    fn walks_terminate_within_the_node_count(
        nodes in tree_strategy(8),
        spec_attrs in attrs_strategy(),
    ) {
        let rule = rule_with(nodes);
        let facts = vec![spec_fact(spec_attrs)];
        let pairs = join_facts(&facts, &[], &[]);
        prop_assert_eq!(pairs.len(), 1);

        let result = walk(&rule, &pairs[0]);
        prop_assert!(result.steps >= 1);
        prop_assert!(result.steps <= rule.nodes.len());
    }

    #[test]
    fn walking_twice_is_identical(
        nodes in tree_strategy(6),
        spec_attrs in attrs_strategy(),
    ) {
        let rule = rule_with(nodes);
        let facts = vec![spec_fact(spec_attrs)];
        let pairs = join_facts(&facts, &[], &[]);
        prop_assert_eq!(walk(&rule, &pairs[0]), walk(&rule, &pairs[0]));
    }
}
