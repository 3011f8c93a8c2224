//! The rule registry — declarative rules loaded from TOML.
//!
//! Rules are data, not code: a new rule never requires recompiling the
//! engine. Schema violations in a single rule must not prevent loading
//! the rest of the registry (collect-and-report, not fail-fast). The
//! registry is read-only during evaluation; a reload takes effect with
//! the next scheduled run.

pub mod defaults;
pub mod toml_rules;
pub mod validate;

use std::path::Path;

use specdrift_core::errors::{RegistryError, RuleLoadIssue};
use specdrift_core::model::{FactKind, Rule};

/// An immutable set of compiled rules plus the issues collected while
/// loading them.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    issues: Vec<RuleLoadIssue>,
}

impl RuleRegistry {
    /// The compiled-in default rule set.
    pub fn builtin() -> Self {
        Self {
            rules: defaults::builtin_rules(),
            issues: Vec::new(),
        }
    }

    /// Load a registry from a TOML string. Invalid rules are skipped and
    /// recorded as issues; only an unparseable file or a file defining
    /// rules of which none are valid is an error.
    pub fn load_from_str(toml_str: &str, origin: &str) -> Result<Self, RegistryError> {
        let (rules, issues) = toml_rules::load(toml_str, origin)?;
        if rules.is_empty() && !issues.is_empty() {
            return Err(RegistryError::NoValidRules {
                issue_count: issues.len(),
            });
        }
        for issue in &issues {
            tracing::warn!(rule_id = %issue.rule_id, message = %issue.message, "skipping invalid rule");
        }
        Ok(Self { rules, issues })
    }

    /// Load a registry from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|_| RegistryError::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::load_from_str(&content, &path.display().to_string())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules applicable to a fact kind, in registry order.
    pub fn rules_for(&self, kind: FactKind) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.applies_to == kind)
    }

    pub fn issues(&self) -> &[RuleLoadIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
