use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use indexmap::IndexSet;
use serde::Serialize;

use super::RuleTable;

/// Something about a rule table that makes its outcome depend on ordering
/// rather than on intent. The resolver never consults these; they exist for
/// strict loading and for tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleTableIssue {
    /// The same assertion appears twice under one policy value.
    DuplicateRule {
        policy: String,
        value: String,
        role_name: String,
        permission: String,
        first: usize,
        second: usize,
    },
    /// One policy value both grants and revokes the same permission; the later
    /// rule wins.
    ContradictoryRule {
        policy: String,
        value: String,
        role_name: String,
        permission: String,
        first: usize,
        second: usize,
    },
    /// The document spells out the same policy key twice at the top level.
    /// Both blocks are kept in declared order.
    RepeatedPolicyKey { policy: String, key: String },
    /// One policy object repeats a value key. The rule lists are concatenated.
    RepeatedValueKey { policy: String, value: String },
    /// Several source keys normalized to the same policy name.
    MergedPolicyName { policy: String, sources: Vec<String> },
    /// More than one policy controls the same role permission, so the result
    /// depends on which policy is applied last.
    CrossPolicyOverlap {
        role_name: String,
        permission: String,
        policies: Vec<String>,
    },
}

impl fmt::Display for RuleTableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleTableIssue::DuplicateRule {
                policy,
                value,
                role_name,
                permission,
                first,
                second,
            } => write!(
                f,
                "{policy}.{value}: rules {first} and {second} both assert {role_name}/{permission}"
            ),
            RuleTableIssue::ContradictoryRule {
                policy,
                value,
                role_name,
                permission,
                first,
                second,
            } => write!(
                f,
                "{policy}.{value}: rules {first} and {second} disagree on {role_name}/{permission}"
            ),
            RuleTableIssue::RepeatedPolicyKey { policy, key } => {
                write!(f, "{policy}: key '{key}' appears more than once in the document")
            }
            RuleTableIssue::RepeatedValueKey { policy, value } => {
                write!(f, "{policy}.{value}: value appears more than once under the policy")
            }
            RuleTableIssue::MergedPolicyName { policy, sources } => write!(
                f,
                "{policy}: declared under several names ({})",
                sources.join(", ")
            ),
            RuleTableIssue::CrossPolicyOverlap {
                role_name,
                permission,
                policies,
            } => write!(
                f,
                "{role_name}/{permission}: controlled by several policies ({})",
                policies.join(", ")
            ),
        }
    }
}

pub(super) fn validate(table: &RuleTable) -> Vec<RuleTableIssue> {
    let mut issues = table.document_issues.clone();
    let mut owners: IndexMap<(&str, &str), IndexSet<&str>> = IndexMap::new();

    for policy in table.policy_names() {
        let sources = table.source_names(policy);
        if sources.len() > 1 {
            issues.push(RuleTableIssue::MergedPolicyName {
                policy: policy.to_string(),
                sources: sources.to_vec(),
            });
        }
    }

    for (policy, value, rules) in table.iter() {
        let mut seen: HashMap<(&str, &str), (usize, bool)> = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            let key = (rule.role_name.as_str(), rule.permission.as_str());
            owners.entry(key).or_default().insert(policy);
            if let Some((first, should_have)) = seen.insert(key, (index, rule.should_have)) {
                let (policy, value) = (policy.to_string(), value.to_string());
                let (role_name, permission) = (rule.role_name.clone(), rule.permission.clone());
                issues.push(if should_have == rule.should_have {
                    RuleTableIssue::DuplicateRule {
                        policy,
                        value,
                        role_name,
                        permission,
                        first,
                        second: index,
                    }
                } else {
                    RuleTableIssue::ContradictoryRule {
                        policy,
                        value,
                        role_name,
                        permission,
                        first,
                        second: index,
                    }
                });
            }
        }
    }

    for ((role_name, permission), policies) in owners {
        if policies.len() > 1 {
            issues.push(RuleTableIssue::CrossPolicyOverlap {
                role_name: role_name.to_string(),
                permission: permission.to_string(),
                policies: policies.into_iter().map(str::to_string).collect(),
            });
        }
    }

    issues
}
