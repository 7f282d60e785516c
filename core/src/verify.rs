//! Checks that a rule table is honoured end to end.
//!
//! For every (policy, value) pair the table declares, the configuration is set
//! to that value, the catalog is resolved, and each assertion of the pair is
//! compared with the result.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::license::LicenseGate;
use crate::policy::PolicySourceMut;
use crate::resolver::RoleResolver;
use crate::roles::RoleCatalog;
use crate::rule_table::RoleState;
use crate::rule_table::RuleTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub policy: String,
    pub value: String,
    pub role_name: String,
    pub permission: String,
    pub expected: bool,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.expected { "to have" } else { "not to have" };
        write!(
            f,
            "expected '{}' {verb} '{}' permission when '{}' is set to '{}'",
            self.role_name, self.permission, self.policy, self.value
        )
    }
}

/// Resolves once per (policy, value) pair starting from `template` and
/// reports every assertion the result contradicts.
///
/// Policies the configuration does not know are skipped. Assertions on roles
/// missing from `base_roles` are not checked. When the license gate blocks an
/// assertion the permission is expected to keep its base state.
pub fn verify_table<C>(
    table: &RuleTable,
    base_roles: &RoleCatalog,
    template: &C,
    licensed: bool,
) -> Vec<Violation>
where
    C: PolicySourceMut + Clone,
{
    let resolver = RoleResolver::new(table);
    let gate = LicenseGate::new(licensed);
    let mut violations = Vec::new();

    for (policy, value, rules) in table.iter() {
        let mut config = template.clone();
        if config.set_policy(policy, value).is_err() {
            continue;
        }
        let resolved = resolver.resolve(base_roles, &config, licensed);

        let mut checked = HashSet::new();
        for rule in rules {
            if !checked.insert((rule.role_name.as_str(), rule.permission.as_str())) {
                continue;
            }
            let (Some(base), Some(role)) = (
                base_roles.get(&rule.role_name),
                resolved.get(&rule.role_name),
            ) else {
                continue;
            };
            // The last assertion the gate lets through is the one that holds.
            let expected = effective_assertion(rules, &rule.role_name, &rule.permission, gate)
                .unwrap_or_else(|| base.has_permission(&rule.permission));
            if role.has_permission(&rule.permission) != expected {
                violations.push(Violation {
                    policy: policy.to_string(),
                    value: value.to_string(),
                    role_name: rule.role_name.clone(),
                    permission: rule.permission.clone(),
                    expected,
                });
            }
        }
    }

    violations
}

fn effective_assertion(
    rules: &[RoleState],
    role_name: &str,
    permission: &str,
    gate: LicenseGate,
) -> Option<bool> {
    rules
        .iter()
        .rev()
        .find(|rule| {
            rule.role_name == role_name && rule.permission == permission && gate.permits(rule)
        })
        .map(|rule| rule.should_have)
}
