//! Markdown section recognition and fact building.
//!
//! The corpus schema is fixed: `## Entity: Name`, `## States: Name`,
//! `## Permissions: Name`, and `## Api: METHOD /path` sections, each
//! carrying a `module:` line, attribute bullets, tables, and tenancy
//! annotations. Prose sections without a recognized marker are skipped
//! silently; sections with a recognized marker but malformed content
//! produce a parse warning and are skipped.

use std::collections::BTreeMap;

use specdrift_core::model::{
    AttrValue, FactKey, FactKind, RunWarning, SourceLocation, SpecFact,
};

use super::tables::{parse_scalar, parse_table};

/// One recognized section of a document: header line index (1-based),
/// section keyword, subject, and body lines.
struct Section<'a> {
    line: usize,
    keyword: &'a str,
    subject: &'a str,
    body: Vec<&'a str>,
}

/// Extract facts from one document, appending to `facts` / `warnings`.
pub fn extract_document(
    path: &str,
    content: &str,
    facts: &mut Vec<SpecFact>,
    warnings: &mut Vec<RunWarning>,
) {
    for section in split_sections(content) {
        let location = SourceLocation {
            document: path.to_string(),
            line: section.line,
        };
        match section.keyword {
            "Entity" => build_entity(&section, location, facts, warnings),
            "States" => build_state_machine(&section, location, facts, warnings),
            "Permissions" => build_permissions(&section, location, facts, warnings),
            "Api" => build_api_contract(&section, location, facts, warnings),
            other => warnings.push(RunWarning::Parse {
                document: path.to_string(),
                line: section.line,
                message: format!("unrecognized section keyword '{other}'"),
            }),
        }
    }
}

/// Split a document into recognized `## Keyword: Subject` sections.
/// Headers without a `Keyword: Subject` shape are prose and are skipped.
fn split_sections(content: &str) -> Vec<Section<'_>> {
    let mut sections: Vec<Section<'_>> = Vec::new();
    let mut current: Option<Section<'_>> = None;

    for (idx, raw) in content.lines().enumerate() {
        if let Some(rest) = raw.strip_prefix("## ") {
            if let Some(section) = current.take() {
                sections.push(section);
            }
            current = rest.split_once(':').map(|(keyword, subject)| Section {
                line: idx + 1,
                keyword: keyword.trim(),
                subject: subject.trim(),
                body: Vec::new(),
            });
        } else if raw.starts_with('#') {
            // Any other heading level ends the current section.
            if let Some(section) = current.take() {
                sections.push(section);
            }
        } else if let Some(section) = current.as_mut() {
            section.body.push(raw);
        }
    }
    if let Some(section) = current.take() {
        sections.push(section);
    }
    sections
}

/// The `module:` line required in every recognized section.
fn section_module(section: &Section<'_>) -> Option<String> {
    section.body.iter().find_map(|line| {
        line.trim()
            .strip_prefix("module:")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    })
}

/// `- name: value` attribute bullets.
fn bullet_attributes(section: &Section<'_>) -> BTreeMap<String, AttrValue> {
    let mut attrs = BTreeMap::new();
    for line in &section.body {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("- ") {
            if let Some((name, value)) = rest.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    attrs.insert(name.to_string(), parse_scalar(value));
                }
            }
        }
    }
    attrs
}

fn missing_module(section: &Section<'_>, location: &SourceLocation, warnings: &mut Vec<RunWarning>) {
    warnings.push(RunWarning::Parse {
        document: location.document.clone(),
        line: location.line,
        message: format!("section '{}' has no module: line", section.subject),
    });
}

fn build_entity(
    section: &Section<'_>,
    location: SourceLocation,
    facts: &mut Vec<SpecFact>,
    warnings: &mut Vec<RunWarning>,
) {
    let Some(module) = section_module(section) else {
        missing_module(section, &location, warnings);
        return;
    };

    let mut attrs = bullet_attributes(section);
    let tenancy = section.body.iter().find_map(|line| match line.trim() {
        "@tenant-scoped" => Some(true),
        "@tenant-shared" => Some(false),
        _ => None,
    });
    if let Some(scoped) = tenancy {
        attrs.insert("tenant_scoped".to_string(), AttrValue::Bool(scoped));
    }

    facts.push(SpecFact::new(
        FactKey::new(module.clone(), FactKind::EntityDef, section.subject),
        attrs,
        location.clone(),
    ));

    // Tenancy annotations additionally yield a TenancyRule fact so
    // tenancy rules can join without inspecting entity internals.
    if let Some(scoped) = tenancy {
        let mut tenancy_attrs = BTreeMap::new();
        tenancy_attrs.insert("tenant_scoped".to_string(), AttrValue::Bool(scoped));
        facts.push(SpecFact::new(
            FactKey::new(module, FactKind::TenancyRule, section.subject),
            tenancy_attrs,
            location,
        ));
    }
}

fn build_state_machine(
    section: &Section<'_>,
    location: SourceLocation,
    facts: &mut Vec<SpecFact>,
    warnings: &mut Vec<RunWarning>,
) {
    let Some(module) = section_module(section) else {
        missing_module(section, &location, warnings);
        return;
    };
    let Some(table) = parse_table(&section.body) else {
        warnings.push(RunWarning::Parse {
            document: location.document.clone(),
            line: location.line,
            message: format!("states section '{}' has no transition table", section.subject),
        });
        return;
    };
    if table.header.len() != 3 {
        warnings.push(RunWarning::Parse {
            document: location.document.clone(),
            line: location.line,
            message: format!(
                "states section '{}' table must have 3 columns (from, event, to)",
                section.subject
            ),
        });
        return;
    }

    let mut states: Vec<String> = Vec::new();
    let mut transitions: Vec<AttrValue> = Vec::new();
    for row in &table.rows {
        for state in [&row[0], &row[2]] {
            if !states.contains(state) {
                states.push(state.clone());
            }
        }
        transitions.push(AttrValue::Str(format!("{}->{}->{}", row[0], row[1], row[2])));
    }
    states.sort();

    let mut attrs = BTreeMap::new();
    attrs.insert(
        "states".to_string(),
        AttrValue::List(states.into_iter().map(AttrValue::Str).collect()),
    );
    attrs.insert("transitions".to_string(), AttrValue::List(transitions));

    facts.push(SpecFact::new(
        FactKey::new(module, FactKind::StateMachine, section.subject),
        attrs,
        location,
    ));
}

fn build_permissions(
    section: &Section<'_>,
    location: SourceLocation,
    facts: &mut Vec<SpecFact>,
    warnings: &mut Vec<RunWarning>,
) {
    let Some(module) = section_module(section) else {
        missing_module(section, &location, warnings);
        return;
    };
    let Some(table) = parse_table(&section.body) else {
        warnings.push(RunWarning::Parse {
            document: location.document.clone(),
            line: location.line,
            message: format!(
                "permissions section '{}' has no permission table",
                section.subject
            ),
        });
        return;
    };
    if table.header.len() != 3 {
        warnings.push(RunWarning::Parse {
            document: location.document.clone(),
            line: location.line,
            message: format!(
                "permissions section '{}' table must have 3 columns (role, action, allowed)",
                section.subject
            ),
        });
        return;
    }

    // One attribute per (role, action) cell: "role.action" = allowed.
    let mut attrs = BTreeMap::new();
    for row in &table.rows {
        attrs.insert(format!("{}.{}", row[0], row[1]), parse_scalar(&row[2]));
    }

    facts.push(SpecFact::new(
        FactKey::new(module, FactKind::Permission, section.subject),
        attrs,
        location,
    ));
}

fn build_api_contract(
    section: &Section<'_>,
    location: SourceLocation,
    facts: &mut Vec<SpecFact>,
    warnings: &mut Vec<RunWarning>,
) {
    let Some(module) = section_module(section) else {
        missing_module(section, &location, warnings);
        return;
    };
    facts.push(SpecFact::new(
        FactKey::new(module, FactKind::ApiContract, section.subject),
        bullet_attributes(section),
        location,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"# Billing spec

Some prose.

## Entity: Invoice
module: Billing
@tenant-scoped
- persisted: true
- currency: USD

## States: Invoice
module: Billing

| from | event | to |
|------|-------|----|
| Draft | submit | Open |
| Open | pay | Paid |

## Permissions: Invoice
module: Billing

| role | action | allowed |
|------|--------|---------|
| admin | delete | true |
| viewer | delete | false |

## Api: GET /invoices
module: Billing
- status: 200
"#;

    fn extract_doc(content: &str) -> (Vec<SpecFact>, Vec<RunWarning>) {
        let mut facts = Vec::new();
        let mut warnings = Vec::new();
        extract_document("billing.md", content, &mut facts, &mut warnings);
        (facts, warnings)
    }

    #[test]
    fn extracts_all_recognized_sections() {
        let (facts, warnings) = extract_doc(DOC);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        // Entity + TenancyRule + StateMachine + Permission + ApiContract.
        assert_eq!(facts.len(), 5);

        let entity = facts
            .iter()
            .find(|f| f.key.kind == FactKind::EntityDef)
            .unwrap();
        assert_eq!(entity.key.module, "Billing");
        assert_eq!(entity.key.subject, "Invoice");
        assert_eq!(
            entity.attributes.get("tenant_scoped"),
            Some(&AttrValue::Bool(true))
        );

        let sm = facts
            .iter()
            .find(|f| f.key.kind == FactKind::StateMachine)
            .unwrap();
        let AttrValue::List(transitions) = &sm.attributes["transitions"] else {
            panic!("transitions should be a list");
        };
        assert_eq!(transitions.len(), 2);

        let perm = facts
            .iter()
            .find(|f| f.key.kind == FactKind::Permission)
            .unwrap();
        assert_eq!(
            perm.attributes.get("admin.delete"),
            Some(&AttrValue::Bool(true))
        );
    }

    #[test]
    fn missing_module_line_warns_and_skips() {
        let (facts, warnings) = extract_doc("## Entity: Orphan\n- a: 1\n");
        assert!(facts.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], RunWarning::Parse { line: 1, .. }));
    }

    #[test]
    fn unrecognized_keyword_warns_but_other_sections_survive() {
        let doc = "## Widget: X\nmodule: M\n\n## Entity: Real\nmodule: M\n- a: 1\n";
        let (facts, warnings) = extract_doc(doc);
        assert_eq!(facts.len(), 1);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn prose_headings_are_skipped_silently() {
        let (facts, warnings) = extract_doc("# Title\n\n## Overview\n\nJust prose.\n");
        assert!(facts.is_empty());
        assert!(warnings.is_empty());
    }
}
