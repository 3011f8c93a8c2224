//! Spec-side and code-side facts, joined by a shared key schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed vocabulary of fact kinds shared by both sides.
///
/// Records arriving from the code-fact provider with a kind outside this
/// enum are dropped by the adapter with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FactKind {
    EntityDef,
    StateMachine,
    Permission,
    ApiContract,
    TenancyRule,
    Workflow,
    Event,
}

impl FactKind {
    /// Parse a kind from its wire name. Returns `None` for unrecognized kinds.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "EntityDef" | "entity_def" => Some(Self::EntityDef),
            "StateMachine" | "state_machine" => Some(Self::StateMachine),
            "Permission" | "permission" => Some(Self::Permission),
            "ApiContract" | "api_contract" => Some(Self::ApiContract),
            "TenancyRule" | "tenancy_rule" => Some(Self::TenancyRule),
            "Workflow" | "workflow" => Some(Self::Workflow),
            "Event" | "event" => Some(Self::Event),
            _ => None,
        }
    }

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EntityDef => "EntityDef",
            Self::StateMachine => "StateMachine",
            Self::Permission => "Permission",
            Self::ApiContract => "ApiContract",
            Self::TenancyRule => "TenancyRule",
            Self::Workflow => "Workflow",
            Self::Event => "Event",
        }
    }
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The join key matching spec facts to code facts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactKey {
    pub module: String,
    pub kind: FactKind,
    pub subject: String,
}

impl FactKey {
    pub fn new(module: impl Into<String>, kind: FactKind, subject: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            kind,
            subject: subject.into(),
        }
    }
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.module, self.kind, self.subject)
    }
}

/// A scalar (or list-of-scalar) attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Where in the specification corpus a fact was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub document: String,
    pub line: usize,
}

/// A single normalized assertion extracted from the specification corpus.
///
/// Immutable for a given corpus revision; the id is derived from the key
/// and source location so identical corpus content yields identical facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecFact {
    pub id: String,
    pub key: FactKey,
    /// BTreeMap keeps attribute iteration order deterministic.
    pub attributes: BTreeMap<String, AttrValue>,
    pub location: SourceLocation,
}

impl SpecFact {
    pub fn new(
        key: FactKey,
        attributes: BTreeMap<String, AttrValue>,
        location: SourceLocation,
    ) -> Self {
        let id = format!("{key}@{}:{}", location.document, location.line);
        Self {
            id,
            key,
            attributes,
            location,
        }
    }
}

/// The code-side counterpart, supplied by the external code-fact provider.
/// A point-in-time snapshot; never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFact {
    pub key: FactKey,
    pub attributes: BTreeMap<String, AttrValue>,
    /// Opaque provider-side origin (file path, symbol, etc.).
    pub provenance: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_wire_name() {
        for kind in [
            FactKind::EntityDef,
            FactKind::StateMachine,
            FactKind::Permission,
            FactKind::ApiContract,
            FactKind::TenancyRule,
            FactKind::Workflow,
            FactKind::Event,
        ] {
            assert_eq!(FactKind::parse_str(kind.as_str()), Some(kind));
        }
        assert_eq!(FactKind::parse_str("Widget"), None);
    }

    #[test]
    fn spec_fact_id_is_deterministic() {
        let key = FactKey::new("Billing", FactKind::EntityDef, "Invoice");
        let loc = SourceLocation {
            document: "billing.md".to_string(),
            line: 12,
        };
        let a = SpecFact::new(key.clone(), BTreeMap::new(), loc.clone());
        let b = SpecFact::new(key, BTreeMap::new(), loc);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "Billing/EntityDef/Invoice@billing.md:12");
    }
}
