//! Findings — the raw outcome of one rule walked over one fact pair.

use serde::{Deserialize, Serialize};

use super::fact::{AttrValue, FactKey};

/// Why a walk ended where it did: the disagreeing attributes, or which
/// side of the pair was absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    /// Subject exists only in the specification.
    SpecOnly,
    /// Subject exists only in the code.
    CodeOnly,
    /// Named attributes disagreed between the two sides.
    AttrMismatch {
        attr: String,
        spec_value: Option<AttrValue>,
        code_value: Option<AttrValue>,
    },
    /// The walk reached a satisfied leaf with nothing to report.
    None,
}

/// Output of one rule evaluation against one fact pair. Ephemeral —
/// findings live only until classification within the same run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub key: FactKey,
    pub violated: bool,
    pub evidence: Evidence,
}

/// A fact pair deferred to the external judgment worker. Emitted by the
/// engine and never awaited synchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingJudgment {
    pub rule_id: String,
    pub key: FactKey,
    /// Structured prompt payload for the judgment worker.
    pub prompt: String,
}
