//! Computes role permissions from policy values.
//!
//! Resolution never touches the caller's catalog: it clones the base roles,
//! walks every policy in rule-table order, reads that policy's configured
//! value and applies the matching assertions in declared order. A later
//! assertion about the same role permission overrides an earlier one.

use serde::Serialize;
use tracing::debug;
use tracing::trace;

use crate::error::LoadError;
use crate::license::LicenseGate;
use crate::policy::PolicySource;
use crate::roles::RoleCatalog;
use crate::rule_table;
use crate::rule_table::RuleTable;

/// A membership change the resolver actually made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionChange {
    pub policy: String,
    pub value: String,
    pub role_name: String,
    pub permission: String,
    pub granted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The configuration has no field for the policy.
    UnknownPolicy,
    /// The rule requires a license and the deployment has none.
    Unlicensed,
    /// The rule names a role the catalog does not contain.
    UnknownRole,
}

/// A policy or rule the resolver passed over. `value`, `role_name` and
/// `permission` are absent when a whole policy was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub policy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    pub reason: SkipReason,
}

/// Resolved catalog plus an account of how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub roles: RoleCatalog,
    pub changes: Vec<PermissionChange>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone, Copy)]
pub struct RoleResolver<'t> {
    table: &'t RuleTable,
}

impl<'t> RoleResolver<'t> {
    pub fn new(table: &'t RuleTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'t RuleTable {
        self.table
    }

    pub fn resolve<C>(&self, base_roles: &RoleCatalog, config: &C, licensed: bool) -> RoleCatalog
    where
        C: PolicySource + ?Sized,
    {
        self.explain(base_roles, config, licensed).roles
    }

    pub fn explain<C>(&self, base_roles: &RoleCatalog, config: &C, licensed: bool) -> Resolution
    where
        C: PolicySource + ?Sized,
    {
        let gate = LicenseGate::new(licensed);
        let mut roles = base_roles.clone();
        let mut changes = Vec::new();
        let mut skipped = Vec::new();

        for policy in self.table.policy_names() {
            let value = match config.read_policy(policy) {
                Ok(value) => value,
                Err(err) => {
                    debug!("skipping policy {policy}: {err}");
                    skipped.push(Skipped {
                        policy: policy.to_string(),
                        value: None,
                        role_name: None,
                        permission: None,
                        reason: SkipReason::UnknownPolicy,
                    });
                    continue;
                }
            };

            let rules = self.table.lookup(policy, value);
            if rules.is_empty() {
                trace!("no rules registered for {policy}={value}");
            }
            for rule in rules {
                let skip = |reason| Skipped {
                    policy: policy.to_string(),
                    value: Some(value.to_string()),
                    role_name: Some(rule.role_name.clone()),
                    permission: Some(rule.permission.clone()),
                    reason,
                };
                if !gate.permits(rule) {
                    trace!(
                        "{policy}={value}: {}/{} requires a license",
                        rule.role_name, rule.permission
                    );
                    skipped.push(skip(SkipReason::Unlicensed));
                    continue;
                }
                let Some(role) = roles.get_mut(&rule.role_name) else {
                    trace!("{policy}={value}: role {} not in catalog", rule.role_name);
                    skipped.push(skip(SkipReason::UnknownRole));
                    continue;
                };
                if role.set_permission(&rule.permission, rule.should_have) {
                    changes.push(PermissionChange {
                        policy: policy.to_string(),
                        value: value.to_string(),
                        role_name: rule.role_name.clone(),
                        permission: rule.permission.clone(),
                        granted: rule.should_have,
                    });
                }
            }
        }

        debug!(
            changes = changes.len(),
            skipped = skipped.len(),
            licensed,
            "resolved role permissions"
        );
        Resolution {
            roles,
            changes,
            skipped,
        }
    }
}

/// Resolves against the embedded rule table. Fails only when that table
/// cannot be loaded.
pub fn resolve<C>(base_roles: &RoleCatalog, config: &C, licensed: bool) -> Result<RoleCatalog, LoadError>
where
    C: PolicySource + ?Sized,
{
    let table = rule_table::embedded()?;
    Ok(RoleResolver::new(table).resolve(base_roles, config, licensed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use maplit::btreemap;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn catalog(roles: &[(&str, &[&str])]) -> RoleCatalog {
        roles
            .iter()
            .map(|(name, permissions)| {
                (
                    (*name).to_string(),
                    Role::new(*name).with_permissions(permissions.iter().copied()),
                )
            })
            .collect()
    }

    fn config(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn later_rule_in_a_value_wins() {
        let table = RuleTable::load_from_str(
            r#"{"p": {"v": [
                {"roleName": "r", "permission": "x", "shouldHave": true},
                {"roleName": "r", "permission": "x", "shouldHave": false}
            ]}}"#,
        )
        .expect("table");
        let base = catalog(&[("r", &[])]);
        let resolved = RoleResolver::new(&table).resolve(&base, &config(&[("P", "v")]), true);
        assert!(!resolved["r"].has_permission("x"));
    }

    #[test]
    fn later_policy_in_the_table_wins() {
        let table = RuleTable::load_from_str(
            r#"{
                "b": {"on": [{"roleName": "r", "permission": "x", "shouldHave": false}]},
                "a": {"on": [{"roleName": "r", "permission": "x", "shouldHave": true}]}
            }"#,
        )
        .expect("table");
        let base = catalog(&[("r", &[])]);
        let resolver = RoleResolver::new(&table);
        let resolved = resolver.resolve(&base, &config(&[("A", "on"), ("B", "on")]), true);
        assert!(resolved["r"].has_permission("x"));
    }

    #[test]
    fn explain_records_changes_and_skips() {
        let table = RuleTable::load_from_str(
            r#"{
                "p": {"v": [
                    {"roleName": "r", "permission": "keep", "shouldHave": true},
                    {"roleName": "r", "permission": "drop", "shouldHave": false},
                    {"roleName": "r", "permission": "paid", "shouldHave": true, "requiresLicense": true},
                    {"roleName": "ghost", "permission": "x", "shouldHave": true}
                ]},
                "missing": {"v": [{"roleName": "r", "permission": "y", "shouldHave": true}]}
            }"#,
        )
        .expect("table");
        let base = catalog(&[("r", &["keep", "drop"])]);
        let resolution = RoleResolver::new(&table).explain(&base, &config(&[("P", "v")]), false);

        assert_eq!(
            resolution.changes,
            vec![PermissionChange {
                policy: "P".to_string(),
                value: "v".to_string(),
                role_name: "r".to_string(),
                permission: "drop".to_string(),
                granted: false,
            }]
        );
        let reasons: Vec<(String, SkipReason)> = resolution
            .skipped
            .iter()
            .map(|s| (s.policy.clone(), s.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("P".to_string(), SkipReason::Unlicensed),
                ("P".to_string(), SkipReason::UnknownRole),
                ("Missing".to_string(), SkipReason::UnknownPolicy),
            ]
        );
        assert_eq!(
            resolution.roles,
            btreemap! { "r".to_string() => Role::new("r").with_permissions(["keep"]) }
        );
    }

    #[test]
    fn empty_table_returns_a_copy() {
        let table = RuleTable::empty();
        let base = catalog(&[("r", &["x"])]);
        let resolved = RoleResolver::new(&table).resolve(&base, &config(&[]), true);
        assert_eq!(resolved, base);
    }
}
