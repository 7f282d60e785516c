//! Declarative table mapping policy values to role permission assertions.
//!
//! The table is pure data: for every (policy name, policy value) pair it holds
//! the ordered [`RoleState`] assertions to apply. Declaration order of the
//! source document is preserved at every level, and policy names are stored
//! in their normalized form (see [`normalize_policy_name`]).

mod loader;
mod validate;

use std::fs;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;
use tracing::error;
use tracing::info;

use crate::error::LoadError;
use crate::policy::normalize_policy_name;

pub use validate::RuleTableIssue;

/// One assertion: when the owning policy has the owning value, `role_name`
/// must (or must not) hold `permission`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoleState {
    pub role_name: String,
    pub permission: String,
    pub should_have: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_license: bool,
}

impl RoleState {
    pub fn new(role_name: impl Into<String>, permission: impl Into<String>, should_have: bool) -> Self {
        Self {
            role_name: role_name.into(),
            permission: permission.into(),
            should_have,
            requires_license: false,
        }
    }

    pub fn licensed_only(mut self) -> Self {
        self.requires_license = true;
        self
    }
}

type PolicyValues = IndexMap<String, Vec<RoleState>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    policies: IndexMap<String, PolicyValues>,
    /// Source spellings that normalized to each policy name.
    source_names: IndexMap<String, Vec<String>>,
    /// Keys the source document repeats within one object.
    document_issues: Vec<RuleTableIssue>,
}

static EMBEDDED: OnceLock<Result<RuleTable, LoadError>> = OnceLock::new();

/// The rule table shipped with the crate, loaded strictly on first use and
/// shared for the rest of the process. Concurrent first callers wait for a
/// single load; a load failure is returned to every caller.
pub fn embedded() -> Result<&'static RuleTable, LoadError> {
    EMBEDDED
        .get_or_init(|| {
            let loaded = RuleTable::load_embedded();
            match &loaded {
                Ok(table) => info!(
                    policies = table.len(),
                    rules = table.rule_count(),
                    "loaded embedded rule table"
                ),
                Err(err) => error!("failed to load embedded rule table: {err}"),
            }
            loaded
        })
        .as_ref()
        .map_err(Clone::clone)
}

impl RuleTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load_embedded() -> Result<Self, LoadError> {
        static DATA: &str = include_str!("policies_roles_mapping.json");
        Self::load_strict_from_str(DATA)
    }

    pub fn load_from_str(contents: &str) -> Result<Self, LoadError> {
        loader::parse_document(contents)
    }

    pub fn load_from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|err| LoadError::io("<reader>", &err))?;
        Self::load_from_str(&buf)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|err| LoadError::io(path, &err))?;
        Self::load_from_str(&contents)
    }

    /// Loads the document and rejects it when [`RuleTable::validate`] reports
    /// anything.
    pub fn load_strict_from_str(contents: &str) -> Result<Self, LoadError> {
        Self::load_from_str(contents)?.into_strict()
    }

    pub fn load_strict_from_path(path: &Path) -> Result<Self, LoadError> {
        Self::load_from_path(path)?.into_strict()
    }

    fn into_strict(self) -> Result<Self, LoadError> {
        let issues = self.validate();
        if issues.is_empty() {
            Ok(self)
        } else {
            Err(LoadError::Rejected {
                issues: issues.iter().map(ToString::to_string).collect(),
            })
        }
    }

    /// Ordered assertions for the pair; empty when nothing is registered.
    pub fn lookup(&self, policy_name: &str, policy_value: &str) -> &[RoleState] {
        self.policies
            .get(normalize_policy_name(policy_name).as_ref())
            .and_then(|values| values.get(policy_value))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Normalized policy names in declaration order.
    pub fn policy_names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    /// Values registered for a policy, in declaration order.
    pub fn values(&self, policy_name: &str) -> impl Iterator<Item = &str> {
        self.policies
            .get(normalize_policy_name(policy_name).as_ref())
            .into_iter()
            .flat_map(|values| values.keys().map(String::as_str))
    }

    /// Every (policy, value, rules) triple in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &[RoleState])> {
        self.policies.iter().flat_map(|(policy, values)| {
            values
                .iter()
                .map(move |(value, rules)| (policy.as_str(), value.as_str(), rules.as_slice()))
        })
    }

    pub fn contains_policy(&self, policy_name: &str) -> bool {
        self.policies
            .contains_key(normalize_policy_name(policy_name).as_ref())
    }

    /// Number of policies.
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.policies
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn validate(&self) -> Vec<RuleTableIssue> {
        validate::validate(self)
    }

    fn source_names(&self, policy_name: &str) -> &[String] {
        self.source_names
            .get(policy_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = r#"{
        "inviteGuests": {
            "TEAM_ADMIN": [
                {"roleName": "channel_admin", "permission": "manage_channel_roles", "shouldHave": true}
            ],
            "EVERYONE": []
        },
        "RestrictPostDelete": {
            "all": [
                {"roleName": "channel_user", "permission": "delete_post", "shouldHave": true, "requiresLicense": true}
            ]
        }
    }"#;

    #[test]
    fn lookup_is_insensitive_to_first_letter_case() {
        let table = RuleTable::load_from_str(TABLE).expect("table");
        let expected = vec![RoleState::new("channel_admin", "manage_channel_roles", true)];
        assert_eq!(table.lookup("InviteGuests", "TEAM_ADMIN"), expected.as_slice());
        assert_eq!(table.lookup("inviteGuests", "TEAM_ADMIN"), expected.as_slice());
        assert!(table.lookup("InviteGuests", "team_admin").is_empty());
        assert!(table.lookup("InviteGuests", "EVERYONE").is_empty());
        assert!(table.lookup("Unknown", "TEAM_ADMIN").is_empty());
    }

    #[test]
    fn enumeration_follows_declaration_order() {
        let table = RuleTable::load_from_str(TABLE).expect("table");
        let names: Vec<&str> = table.policy_names().collect();
        assert_eq!(names, vec!["InviteGuests", "RestrictPostDelete"]);
        let values: Vec<&str> = table.values("inviteGuests").collect();
        assert_eq!(values, vec!["TEAM_ADMIN", "EVERYONE"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rule_count(), 2);
        assert!(table.contains_policy("restrictPostDelete"));
    }

    #[test]
    fn license_flag_is_optional() {
        let table = RuleTable::load_from_str(TABLE).expect("table");
        assert!(!table.lookup("InviteGuests", "TEAM_ADMIN")[0].requires_license);
        assert!(table.lookup("RestrictPostDelete", "all")[0].requires_license);
    }

    #[test]
    fn embedded_table_loads_strictly() {
        let table = embedded().expect("embedded rule table");
        assert!(!table.is_empty());
        assert!(table.validate().is_empty());
        assert!(std::ptr::eq(table, embedded().expect("cached")));
    }

    #[test]
    fn strict_load_rejects_duplicates() {
        let doc = r#"{"p": {"v": [
            {"roleName": "r", "permission": "x", "shouldHave": true},
            {"roleName": "r", "permission": "x", "shouldHave": true}
        ]}}"#;
        assert!(RuleTable::load_from_str(doc).is_ok());
        let err = RuleTable::load_strict_from_str(doc).unwrap_err();
        assert!(matches!(err, LoadError::Rejected { ref issues } if issues.len() == 1));
    }
}
