//! Code fact adapter — pure translation of externally supplied records.
//!
//! The engine never extracts code facts itself; an external provider
//! runs the language-specific analysis and delivers raw records. This
//! layer only validates kinds and shapes values. Unrecognized kinds are
//! dropped with a warning, never a crash.

pub mod provider;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use specdrift_core::model::{AttrValue, CodeFact, FactKey, FactKind, RunWarning};

/// The wire shape delivered by the code-fact provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCodeFact {
    pub module: String,
    pub kind: String,
    pub subject: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub provenance: String,
}

/// Normalize raw records into typed code facts.
///
/// Records with an unrecognized `kind` are dropped with a logged warning
/// and an `UnrecognizedKind` entry. Output is sorted by key so the fact
/// sequence is deterministic regardless of provider ordering.
pub fn normalize(raw: Vec<RawCodeFact>) -> (Vec<CodeFact>, Vec<RunWarning>) {
    let mut facts = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();

    for record in raw {
        let Some(kind) = FactKind::parse_str(&record.kind) else {
            tracing::warn!(
                kind = %record.kind,
                module = %record.module,
                subject = %record.subject,
                "dropping code fact with unrecognized kind"
            );
            warnings.push(RunWarning::UnrecognizedKind {
                kind: record.kind,
                module: record.module,
                subject: record.subject,
            });
            continue;
        };

        let mut attributes = BTreeMap::new();
        for (name, value) in &record.attributes {
            flatten_value(name, value, &mut attributes);
        }

        facts.push(CodeFact {
            key: FactKey::new(record.module, kind, record.subject),
            attributes,
            provenance: record.provenance,
        });
    }

    facts.sort_by(|a, b| a.key.cmp(&b.key));
    (facts, warnings)
}

/// Map a JSON value onto `AttrValue`, flattening nested objects with
/// dotted keys. Nulls are dropped.
fn flatten_value(name: &str, value: &serde_json::Value, out: &mut BTreeMap<String, AttrValue>) {
    match value {
        serde_json::Value::Null => {}
        serde_json::Value::Bool(b) => {
            out.insert(name.to_string(), AttrValue::Bool(*b));
        }
        serde_json::Value::Number(n) => {
            let attr = if let Some(i) = n.as_i64() {
                AttrValue::Int(i)
            } else {
                AttrValue::Float(n.as_f64().unwrap_or(0.0))
            };
            out.insert(name.to_string(), attr);
        }
        serde_json::Value::String(s) => {
            out.insert(name.to_string(), AttrValue::Str(s.clone()));
        }
        serde_json::Value::Array(items) => {
            let list = items.iter().filter_map(scalar_of).collect();
            out.insert(name.to_string(), AttrValue::List(list));
        }
        serde_json::Value::Object(map) => {
            for (key, nested) in map {
                flatten_value(&format!("{name}.{key}"), nested, out);
            }
        }
    }
}

fn scalar_of(value: &serde_json::Value) -> Option<AttrValue> {
    match value {
        serde_json::Value::Bool(b) => Some(AttrValue::Bool(*b)),
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => AttrValue::Int(i),
            None => AttrValue::Float(n.as_f64()?),
        }),
        serde_json::Value::String(s) => Some(AttrValue::Str(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(kind: &str) -> RawCodeFact {
        RawCodeFact {
            module: "Billing".to_string(),
            kind: kind.to_string(),
            subject: "Invoice".to_string(),
            attributes: serde_json::Map::new(),
            provenance: "src/billing/invoice.ts".to_string(),
        }
    }

    #[test]
    fn unrecognized_kind_is_dropped_with_warning() {
        let (facts, warnings) = normalize(vec![raw("EntityDef"), raw("Widget")]);
        assert_eq!(facts.len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(&warnings[0], RunWarning::UnrecognizedKind { kind, .. } if kind == "Widget"));
    }

    #[test]
    fn nested_objects_flatten_with_dotted_keys() {
        let mut record = raw("entity_def");
        record.attributes = serde_json::json!({
            "tenant": { "scoped": true },
            "fields": ["id", "amount"]
        })
        .as_object()
        .unwrap()
        .clone();

        let (facts, _) = normalize(vec![record]);
        assert_eq!(
            facts[0].attributes.get("tenant.scoped"),
            Some(&AttrValue::Bool(true))
        );
        assert!(matches!(
            facts[0].attributes.get("fields"),
            Some(AttrValue::List(items)) if items.len() == 2
        ));
    }

    #[test]
    fn output_is_sorted_by_key() {
        let mut b = raw("EntityDef");
        b.subject = "Payment".to_string();
        let (facts, _) = normalize(vec![b, raw("EntityDef")]);
        assert_eq!(facts[0].key.subject, "Invoice");
        assert_eq!(facts[1].key.subject, "Payment");
    }
}
