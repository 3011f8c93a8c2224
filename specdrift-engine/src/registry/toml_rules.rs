//! TOML rule definitions and their compilation into `Rule` values.

use serde::Deserialize;
use specdrift_core::errors::{RegistryError, RuleLoadIssue};
use specdrift_core::model::{
    AttrValue, DecisionNode, FactKind, GapType, LeafOutcome, NodeRef, Predicate, Priority, Rule,
    Side,
};

use super::validate;

/// A TOML-defined rule, pre-compilation.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlRuleDef {
    pub id: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub applies_to: String,
    #[serde(default)]
    pub nodes: Vec<TomlNodeDef>,
    pub gap_type: String,
    pub default_priority: String,
    #[serde(default)]
    pub requires_judgment: bool,
    pub judgment_prompt: Option<String>,
    pub escalate_when: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

fn default_version() -> u32 {
    1
}

/// A TOML-defined decision node. `on_true` / `on_false` are either a
/// node index or a leaf name.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlNodeDef {
    pub predicate: String,
    pub attr: Option<String>,
    pub side: Option<String>,
    pub value: Option<toml::Value>,
    pub on_true: TomlRefDef,
    pub on_false: TomlRefDef,
}

/// An edge target in TOML: integer node index or leaf name string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TomlRefDef {
    Index(usize),
    Leaf(String),
}

#[derive(Debug, Clone, Deserialize)]
struct TomlRuleFile {
    #[serde(default)]
    rules: Vec<TomlRuleDef>,
}

/// Parse and compile a TOML registry string.
/// Per-rule failures land in the issue list; the file itself failing to
/// parse is a registry error.
pub fn load(
    toml_str: &str,
    origin: &str,
) -> Result<(Vec<Rule>, Vec<RuleLoadIssue>), RegistryError> {
    let file: TomlRuleFile = toml::from_str(toml_str).map_err(|e| RegistryError::ParseError {
        path: origin.to_string(),
        message: e.to_string(),
    })?;

    let mut rules = Vec::new();
    let mut issues = Vec::new();
    for def in file.rules {
        if def.enabled == Some(false) {
            continue;
        }
        let id = def.id.clone();
        match compile(def) {
            Ok(rule) => rules.push(rule),
            Err(message) => issues.push(RuleLoadIssue {
                rule_id: id,
                message,
            }),
        }
    }
    Ok((rules, issues))
}

/// Compile a single definition, validating the tree shape.
fn compile(def: TomlRuleDef) -> Result<Rule, String> {
    let applies_to = FactKind::parse_str(&def.applies_to)
        .ok_or_else(|| format!("unknown applies_to kind '{}'", def.applies_to))?;
    let gap_type = parse_gap_type(&def.gap_type)
        .ok_or_else(|| format!("unknown gap_type '{}'", def.gap_type))?;
    let default_priority = Priority::parse_str(&def.default_priority)
        .ok_or_else(|| format!("unknown priority '{}'", def.default_priority))?;

    let mut nodes = Vec::with_capacity(def.nodes.len());
    for node in &def.nodes {
        nodes.push(DecisionNode {
            predicate: compile_predicate(node)?,
            on_true: compile_ref(&node.on_true)?,
            on_false: compile_ref(&node.on_false)?,
        });
    }

    let rule = Rule {
        id: def.id,
        version: def.version,
        applies_to,
        nodes,
        gap_type,
        default_priority,
        requires_judgment: def.requires_judgment,
        judgment_prompt: def.judgment_prompt,
        escalate_when: def.escalate_when,
    };
    validate::validate_tree(&rule)?;
    Ok(rule)
}

fn compile_predicate(node: &TomlNodeDef) -> Result<Predicate, String> {
    let attr = || {
        node.attr
            .clone()
            .ok_or_else(|| format!("predicate '{}' requires an attr", node.predicate))
    };
    let side = || -> Result<Side, String> {
        match node.side.as_deref() {
            Some("spec") | None => Ok(Side::Spec),
            Some("code") => Ok(Side::Code),
            Some(other) => Err(format!("unknown side '{other}'")),
        }
    };

    match node.predicate.as_str() {
        "spec_only" => Ok(Predicate::SpecOnly),
        "code_only" => Ok(Predicate::CodeOnly),
        "both_present" => Ok(Predicate::BothPresent),
        "attr_present" => Ok(Predicate::AttrPresent {
            attr: attr()?,
            side: side()?,
        }),
        "attr_equals" => Ok(Predicate::AttrEquals {
            attr: attr()?,
            side: side()?,
            value: toml_scalar(
                node.value
                    .as_ref()
                    .ok_or_else(|| "attr_equals requires a value".to_string())?,
            )?,
        }),
        "attrs_agree" => Ok(Predicate::AttrsAgree { attr: attr()? }),
        "spec_attrs_match" => Ok(Predicate::SpecAttrsMatch),
        other => Err(format!("unknown predicate '{other}'")),
    }
}

fn compile_ref(def: &TomlRefDef) -> Result<NodeRef, String> {
    match def {
        TomlRefDef::Index(i) => Ok(NodeRef::Node(*i)),
        TomlRefDef::Leaf(name) => match name.as_str() {
            "violated" => Ok(NodeRef::Leaf(LeafOutcome::Violated)),
            "satisfied" => Ok(NodeRef::Leaf(LeafOutcome::Satisfied)),
            "requires_judgment" => Ok(NodeRef::Leaf(LeafOutcome::RequiresJudgment)),
            other => Err(format!("unknown leaf '{other}'")),
        },
    }
}

fn toml_scalar(value: &toml::Value) -> Result<AttrValue, String> {
    match value {
        toml::Value::Boolean(b) => Ok(AttrValue::Bool(*b)),
        toml::Value::Integer(i) => Ok(AttrValue::Int(*i)),
        toml::Value::Float(f) => Ok(AttrValue::Float(*f)),
        toml::Value::String(s) => Ok(AttrValue::Str(s.clone())),
        other => Err(format!("unsupported predicate value: {other}")),
    }
}

fn parse_gap_type(s: &str) -> Option<GapType> {
    match s {
        "spec_code_delta" => Some(GapType::SpecCodeDelta),
        "missing_entity" => Some(GapType::MissingEntity),
        "state_machine_gap" => Some(GapType::StateMachineGap),
        "permission_gap" => Some(GapType::PermissionGap),
        "multi_tenancy_gap" => Some(GapType::MultiTenancyGap),
        "api_contract_gap" => Some(GapType::ApiContractGap),
        "validation_gap" => Some(GapType::ValidationGap),
        "workflow_gap" => Some(GapType::WorkflowGap),
        "event_gap" => Some(GapType::EventGap),
        "naming_drift" => Some(GapType::NamingDrift),
        "stale_spec" => Some(GapType::StaleSpec),
        "ambiguous_spec" => Some(GapType::AmbiguousSpec),
        _ => None,
    }
}
