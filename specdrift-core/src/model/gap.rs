//! Gaps — classified, prioritized findings surfaced to the user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The 12-entry gap taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    SpecCodeDelta,
    MissingEntity,
    StateMachineGap,
    PermissionGap,
    MultiTenancyGap,
    ApiContractGap,
    ValidationGap,
    WorkflowGap,
    EventGap,
    NamingDrift,
    StaleSpec,
    AmbiguousSpec,
}

impl GapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpecCodeDelta => "Spec-Code Delta",
            Self::MissingEntity => "Missing Entity",
            Self::StateMachineGap => "State Machine Gap",
            Self::PermissionGap => "Permission Gap",
            Self::MultiTenancyGap => "Multi-Tenancy Gap",
            Self::ApiContractGap => "API Contract Gap",
            Self::ValidationGap => "Validation Gap",
            Self::WorkflowGap => "Workflow Gap",
            Self::EventGap => "Event Gap",
            Self::NamingDrift => "Naming Drift",
            Self::StaleSpec => "Stale Spec",
            Self::AmbiguousSpec => "Ambiguous Spec",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "Spec-Code Delta" => Some(Self::SpecCodeDelta),
            "Missing Entity" => Some(Self::MissingEntity),
            "State Machine Gap" => Some(Self::StateMachineGap),
            "Permission Gap" => Some(Self::PermissionGap),
            "Multi-Tenancy Gap" => Some(Self::MultiTenancyGap),
            "API Contract Gap" => Some(Self::ApiContractGap),
            "Validation Gap" => Some(Self::ValidationGap),
            "Workflow Gap" => Some(Self::WorkflowGap),
            "Event Gap" => Some(Self::EventGap),
            "Naming Drift" => Some(Self::NamingDrift),
            "Stale Spec" => Some(Self::StaleSpec),
            "Ambiguous Spec" => Some(Self::AmbiguousSpec),
            _ => None,
        }
    }
}

impl fmt::Display for GapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gap priority, P1 highest. Derives `Ord` so P1 sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    P3,
    P4,
}

impl Priority {
    /// Escalate one level, saturating at P1.
    pub fn escalated(self) -> Self {
        match self {
            Self::P1 | Self::P2 => Self::P1,
            Self::P3 => Self::P2,
            Self::P4 => Self::P3,
        }
    }

    /// Weight used in module score computation.
    pub fn weight(self) -> u32 {
        match self {
            Self::P1 => 8,
            Self::P2 => 4,
            Self::P3 => 2,
            Self::P4 => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "P1" => Some(Self::P1),
            "P2" => Some(Self::P2),
            "P3" => Some(Self::P3),
            "P4" => Some(Self::P4),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, prioritized finding. Priority is fixed at creation and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub gap_type: GapType,
    pub priority: Priority,
    pub module: String,
    pub subject: String,
    pub description: String,
    /// Decision options offered to the user (update code, update spec,
    /// accept the delta). The engine only reports; it never decides.
    pub decision_options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_p1_first() {
        let mut ps = vec![Priority::P4, Priority::P1, Priority::P3, Priority::P2];
        ps.sort();
        assert_eq!(
            ps,
            vec![Priority::P1, Priority::P2, Priority::P3, Priority::P4]
        );
    }

    #[test]
    fn escalation_saturates_at_p1() {
        assert_eq!(Priority::P1.escalated(), Priority::P1);
        assert_eq!(Priority::P2.escalated(), Priority::P1);
        assert_eq!(Priority::P4.escalated(), Priority::P3);
    }
}
