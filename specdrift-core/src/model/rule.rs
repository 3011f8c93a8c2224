//! Rules as data — XOR decision trees loaded from the rule registry.
//!
//! Every node has exactly one predicate and exactly two outward edges, so
//! a tree with `n` nodes has exactly `n + 1` leaves and every walk
//! terminates in at most `n` steps. No AND/OR branching exists at the
//! node level, which keeps path count linear in node count.

use serde::{Deserialize, Serialize};

use super::fact::{AttrValue, FactKind};
use super::gap::{GapType, Priority};

/// Which side of a fact pair a predicate inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Spec,
    Code,
}

/// The predicate vocabulary. Tagged variants, interpreted by the tree
/// walker — extending the vocabulary is a registry schema change, not
/// dynamic code loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum Predicate {
    /// The pair has a spec fact but no code fact.
    SpecOnly,
    /// The pair has a code fact but no spec fact.
    CodeOnly,
    /// Both sides are present.
    BothPresent,
    /// The named attribute on `side` equals `value`.
    AttrEquals {
        attr: String,
        side: Side,
        value: AttrValue,
    },
    /// The named attribute exists on `side`.
    AttrPresent { attr: String, side: Side },
    /// The named attribute is present on both sides with equal values.
    AttrsAgree { attr: String },
    /// Every spec-side attribute is present on the code side with an
    /// equal value (the code side may carry extras).
    SpecAttrsMatch,
}

/// Outcome at a leaf of the decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafOutcome {
    Violated,
    Satisfied,
    RequiresJudgment,
}

/// An edge target: another node (by index) or a leaf outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRef {
    Node(usize),
    Leaf(LeafOutcome),
}

/// A single XOR decision node: one predicate, two edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionNode {
    pub predicate: Predicate,
    pub on_true: NodeRef,
    pub on_false: NodeRef,
}

/// A named, versioned compliance rule.
///
/// Node 0 is the root. Node references are forward-only (a node may only
/// reference higher indices), which the registry validates at load time —
/// the walk cannot cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub version: u32,
    pub applies_to: FactKind,
    pub nodes: Vec<DecisionNode>,
    pub gap_type: GapType,
    pub default_priority: Priority,
    /// Rules that cannot reach a deterministic leaf are deferred to the
    /// external judgment worker instead of being walked natively.
    pub requires_judgment: bool,
    /// Prompt payload forwarded with a deferred fact pair.
    pub judgment_prompt: Option<String>,
    /// Escalate priority one level when this attribute is truthy on the
    /// spec side of a violated pair.
    pub escalate_when: Option<String>,
}

impl Rule {
    /// Leaf count of an XOR tree: one more than its node count.
    pub fn leaf_count(&self) -> usize {
        self.nodes.len() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_count_is_linear_in_nodes() {
        let node = DecisionNode {
            predicate: Predicate::BothPresent,
            on_true: NodeRef::Leaf(LeafOutcome::Satisfied),
            on_false: NodeRef::Leaf(LeafOutcome::Violated),
        };
        let rule = Rule {
            id: "r".to_string(),
            version: 1,
            applies_to: FactKind::EntityDef,
            nodes: vec![node.clone(), node.clone(), node],
            gap_type: GapType::SpecCodeDelta,
            default_priority: Priority::P3,
            requires_judgment: false,
            judgment_prompt: None,
            escalate_when: None,
        };
        assert_eq!(rule.leaf_count(), 4);
    }
}
