use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::de;
use serde::de::MapAccess;
use serde::de::SeqAccess;
use serde::de::Visitor;
use serde_json::Value;

use super::RoleState;
use super::RuleTable;
use super::RuleTableIssue;
use crate::error::LoadError;
use crate::policy::normalize_policy_name;

const RULE_FIELDS: &[&str] = &["roleName", "permission", "shouldHave", "requiresLicense"];

/// JSON tree that keeps every object entry in document order. Unlike
/// [`Value`], a key repeated within one object is not collapsed.
enum Node {
    Object(Vec<(String, Node)>),
    Array(Vec<Node>),
    Scalar(Value),
}

impl Node {
    fn into_value(self) -> Value {
        match self {
            Node::Scalar(value) => value,
            Node::Array(items) => Value::Array(items.into_iter().map(Node::into_value).collect()),
            Node::Object(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(key, node)| (key, node.into_value()))
                    .collect(),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Scalar(Value::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Scalar(Value::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Scalar(Value::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Scalar(Value::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Scalar(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Scalar(Value::Null))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Node, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Node, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::new();
        while let Some(entry) = map.next_entry::<String, Node>()? {
            entries.push(entry);
        }
        Ok(Node::Object(entries))
    }
}

/// Parses `{ policy: { value: [rule, ...] } }`. Walks the document by hand so
/// every error can name the policy, value and index it concerns, and so keys
/// repeated within an object are kept and reported instead of overwritten.
pub(super) fn parse_document(contents: &str) -> Result<RuleTable, LoadError> {
    if contents.trim().is_empty() {
        return Err(LoadError::Empty);
    }
    let document: Node = serde_json::from_str(contents)
        .map_err(|err| LoadError::malformed("document", err.to_string()))?;
    let Node::Object(policies) = document else {
        return Err(LoadError::malformed(
            "document",
            "expected an object keyed by policy name",
        ));
    };

    let mut table = RuleTable::default();
    let mut seen_keys = HashSet::new();
    for (source_name, values) in policies {
        if source_name.trim().is_empty() {
            return Err(LoadError::EmptyPolicyName);
        }
        let Node::Object(values) = values else {
            return Err(LoadError::malformed(
                format!("policy '{source_name}'"),
                "expected an object keyed by policy value",
            ));
        };
        let name = normalize_policy_name(&source_name).into_owned();
        if !seen_keys.insert(source_name.clone()) {
            table.document_issues.push(RuleTableIssue::RepeatedPolicyKey {
                policy: name.clone(),
                key: source_name.clone(),
            });
        }
        parse_policy(&mut table, &name, &source_name, values)?;
        let sources = table.source_names.entry(name).or_default();
        if !sources.contains(&source_name) {
            sources.push(source_name);
        }
    }
    Ok(table)
}

fn parse_policy(
    table: &mut RuleTable,
    name: &str,
    source_name: &str,
    values: Vec<(String, Node)>,
) -> Result<(), LoadError> {
    let slots = table.policies.entry(name.to_string()).or_default();
    let mut seen_values = HashSet::new();
    for (value, rules) in values {
        let Node::Array(rules) = rules else {
            return Err(LoadError::malformed(
                format!("{source_name}.{value}"),
                "expected an array of rules",
            ));
        };
        if !seen_values.insert(value.clone()) {
            table.document_issues.push(RuleTableIssue::RepeatedValueKey {
                policy: name.to_string(),
                value: value.clone(),
            });
        }
        let slot = slots.entry(value.clone()).or_default();
        for (index, rule) in rules.into_iter().enumerate() {
            let location = format!("{source_name}.{value}[{index}]");
            slot.push(parse_rule(rule, &location)?);
        }
    }
    Ok(())
}

fn parse_rule(rule: Node, location: &str) -> Result<RoleState, LoadError> {
    let Node::Object(fields) = rule else {
        return Err(LoadError::malformed(location, "expected a rule object"));
    };
    let mut seen = HashSet::new();
    for (key, _) in &fields {
        if !RULE_FIELDS.contains(&key.as_str()) {
            return Err(LoadError::UnknownField {
                location: location.to_string(),
                field: key.clone(),
            });
        }
        if !seen.insert(key.as_str()) {
            return Err(LoadError::malformed(
                location,
                format!("field '{key}' appears more than once"),
            ));
        }
    }
    let state: RoleState = serde_json::from_value(Node::Object(fields).into_value())
        .map_err(|err| LoadError::malformed(location, err.to_string()))?;
    if state.role_name.is_empty() {
        return Err(LoadError::malformed(location, "roleName must not be empty"));
    }
    if state.permission.is_empty() {
        return Err(LoadError::malformed(location, "permission must not be empty"));
    }
    Ok(state)
}
