//! Joining spec facts and code facts on their shared key.
//!
//! One-sided pairs are first-class: a subject present only in the spec
//! (not yet implemented) or only in the code (undocumented) is exactly
//! the input most gap rules exist to see.

use specdrift_core::model::{CodeFact, FactKey, SpecFact};
use specdrift_core::types::collections::FxHashMap;

/// A joined (or one-sided) fact pair.
#[derive(Debug, Clone, Copy)]
pub struct FactPair<'a> {
    pub key: &'a FactKey,
    pub spec: Option<&'a SpecFact>,
    pub code: Option<&'a CodeFact>,
}

impl FactPair<'_> {
    pub fn spec_only(&self) -> bool {
        self.spec.is_some() && self.code.is_none()
    }

    pub fn code_only(&self) -> bool {
        self.spec.is_none() && self.code.is_some()
    }
}

/// Join the two fact sets on `(module, kind, subject)`, restricted to
/// `scope` modules (empty scope means all). Output is sorted by key so
/// downstream iteration order never depends on hash-map layout.
///
/// When the spec corpus yields duplicate facts for one key the first by
/// source location wins; the provider side keeps the first record.
pub fn join_facts<'a>(
    spec_facts: &'a [SpecFact],
    code_facts: &'a [CodeFact],
    scope: &[String],
) -> Vec<FactPair<'a>> {
    let in_scope = |module: &str| scope.is_empty() || scope.iter().any(|m| m == module);

    let mut by_key: FxHashMap<&'a FactKey, (Option<&'a SpecFact>, Option<&'a CodeFact>)> =
        FxHashMap::default();

    for fact in spec_facts {
        if !in_scope(&fact.key.module) {
            continue;
        }
        let entry = by_key.entry(&fact.key).or_default();
        if entry.0.is_none() {
            entry.0 = Some(fact);
        }
    }
    for fact in code_facts {
        if !in_scope(&fact.key.module) {
            continue;
        }
        let entry = by_key.entry(&fact.key).or_default();
        if entry.1.is_none() {
            entry.1 = Some(fact);
        }
    }

    let mut pairs: Vec<FactPair<'a>> = by_key
        .into_iter()
        .map(|(key, (spec, code))| FactPair { key, spec, code })
        .collect();
    pairs.sort_by(|a, b| a.key.cmp(b.key));
    pairs
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use specdrift_core::model::{FactKind, SourceLocation};

    use super::*;

    fn spec(module: &str, subject: &str) -> SpecFact {
        SpecFact::new(
            FactKey::new(module, FactKind::EntityDef, subject),
            BTreeMap::new(),
            SourceLocation {
                document: "d.md".to_string(),
                line: 1,
            },
        )
    }

    fn code(module: &str, subject: &str) -> CodeFact {
        CodeFact {
            key: FactKey::new(module, FactKind::EntityDef, subject),
            attributes: BTreeMap::new(),
            provenance: String::new(),
        }
    }

    #[test]
    fn one_sided_pairs_survive_the_join() {
        let specs = vec![spec("Billing", "Invoice"), spec("Billing", "Refund")];
        let codes = vec![code("Billing", "Invoice"), code("Billing", "Ledger")];
        let pairs = join_facts(&specs, &codes, &[]);

        assert_eq!(pairs.len(), 3);
        // Sorted by key: Invoice, Ledger, Refund.
        assert_eq!(pairs[0].key.subject, "Invoice");
        assert!(pairs[0].spec.is_some() && pairs[0].code.is_some());
        assert!(pairs[1].code_only());
        assert!(pairs[2].spec_only());
    }

    #[test]
    fn scope_filters_modules() {
        let specs = vec![spec("Billing", "Invoice"), spec("Auth", "User")];
        let pairs = join_facts(&specs, &[], &["Auth".to_string()]);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].key.module, "Auth");
    }
}
