//! Built-in roles and the role catalog handed to the resolver.

use std::collections::BTreeMap;
use std::io::Read;

use indexmap::IndexSet;
use serde::Deserialize;
use serde::Serialize;

use crate::error::CatalogError;
use crate::permissions::*;

pub const SYSTEM_ADMIN_ROLE: &str = "system_admin";
pub const SYSTEM_USER_ROLE: &str = "system_user";
pub const SYSTEM_POST_ALL_ROLE: &str = "system_post_all";
pub const SYSTEM_POST_ALL_PUBLIC_ROLE: &str = "system_post_all_public";
pub const TEAM_ADMIN_ROLE: &str = "team_admin";
pub const TEAM_USER_ROLE: &str = "team_user";
pub const TEAM_POST_ALL_ROLE: &str = "team_post_all";
pub const TEAM_POST_ALL_PUBLIC_ROLE: &str = "team_post_all_public";
pub const CHANNEL_ADMIN_ROLE: &str = "channel_admin";
pub const CHANNEL_USER_ROLE: &str = "channel_user";

/// Role name to role definition. Ordered by name so serialized catalogs are
/// stable across runs.
pub type RoleCatalog = BTreeMap<String, Role>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub built_in: bool,
    #[serde(default)]
    pub permissions: IndexSet<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: String::new(),
            description: String::new(),
            built_in: false,
            permissions: IndexSet::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Makes the permission's membership equal `present`. Returns `true` when
    /// the role changed. Removal keeps the order of the remaining entries.
    pub fn set_permission(&mut self, permission: &str, present: bool) -> bool {
        if present {
            if self.permissions.contains(permission) {
                false
            } else {
                self.permissions.insert(permission.to_string())
            }
        } else {
            self.permissions.shift_remove(permission)
        }
    }
}

fn built_in(name: &str, display_name: &str, description: &str, permissions: &[&str]) -> Role {
    Role {
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: description.to_string(),
        built_in: true,
        permissions: permissions.iter().map(|p| (*p).to_string()).collect(),
    }
}

/// The platform's built-in roles before any policy is applied.
///
/// Permissions governed by license-restricted policies start in the state an
/// unlicensed deployment grants, since those rules are skipped there.
pub fn default_roles() -> RoleCatalog {
    let channel_user = built_in(
        CHANNEL_USER_ROLE,
        "authentication.roles.channel_user.name",
        "authentication.roles.channel_user.description",
        &[
            READ_CHANNEL,
            ADD_REACTION,
            REMOVE_REACTION,
            MANAGE_PUBLIC_CHANNEL_MEMBERS,
            UPLOAD_FILE,
            GET_PUBLIC_LINK,
            CREATE_POST,
            USE_SLASH_COMMANDS,
            MANAGE_PRIVATE_CHANNEL_MEMBERS,
            DELETE_POST,
            EDIT_POST,
            MANAGE_PUBLIC_CHANNEL_PROPERTIES,
            MANAGE_PRIVATE_CHANNEL_PROPERTIES,
            DELETE_PUBLIC_CHANNEL,
            DELETE_PRIVATE_CHANNEL,
        ],
    );
    let channel_admin = built_in(
        CHANNEL_ADMIN_ROLE,
        "authentication.roles.channel_admin.name",
        "authentication.roles.channel_admin.description",
        &[MANAGE_CHANNEL_ROLES],
    );
    let team_user = built_in(
        TEAM_USER_ROLE,
        "authentication.roles.team_user.name",
        "authentication.roles.team_user.description",
        &[
            LIST_TEAM_CHANNELS,
            JOIN_PUBLIC_CHANNELS,
            READ_PUBLIC_CHANNEL,
            VIEW_TEAM,
            CREATE_PUBLIC_CHANNEL,
            CREATE_PRIVATE_CHANNEL,
            INVITE_USER,
            ADD_USER_TO_TEAM,
        ],
    );
    let team_post_all = built_in(
        TEAM_POST_ALL_ROLE,
        "authentication.roles.team_post_all.name",
        "authentication.roles.team_post_all.description",
        &[CREATE_POST],
    );
    let team_post_all_public = built_in(
        TEAM_POST_ALL_PUBLIC_ROLE,
        "authentication.roles.team_post_all_public.name",
        "authentication.roles.team_post_all_public.description",
        &[CREATE_POST_PUBLIC],
    );
    let team_admin = built_in(
        TEAM_ADMIN_ROLE,
        "authentication.roles.team_admin.name",
        "authentication.roles.team_admin.description",
        &[
            EDIT_OTHERS_POSTS,
            REMOVE_USER_FROM_TEAM,
            MANAGE_TEAM,
            IMPORT_TEAM,
            MANAGE_TEAM_ROLES,
            MANAGE_CHANNEL_ROLES,
            MANAGE_OTHERS_WEBHOOKS,
            MANAGE_SLASH_COMMANDS,
            MANAGE_OTHERS_SLASH_COMMANDS,
            MANAGE_WEBHOOKS,
            DELETE_POST,
            DELETE_OTHERS_POSTS,
        ],
    );
    let system_user = built_in(
        SYSTEM_USER_ROLE,
        "authentication.roles.global_user.name",
        "authentication.roles.global_user.description",
        &[CREATE_DIRECT_CHANNEL, CREATE_GROUP_CHANNEL, CREATE_TEAM],
    );
    let system_post_all = built_in(
        SYSTEM_POST_ALL_ROLE,
        "authentication.roles.system_post_all.name",
        "authentication.roles.system_post_all.description",
        &[CREATE_POST],
    );
    let system_post_all_public = built_in(
        SYSTEM_POST_ALL_PUBLIC_ROLE,
        "authentication.roles.system_post_all_public.name",
        "authentication.roles.system_post_all_public.description",
        &[CREATE_POST_PUBLIC],
    );

    // The system admin holds every permission of the narrower roles.
    let mut system_admin = built_in(
        SYSTEM_ADMIN_ROLE,
        "authentication.roles.global_admin.name",
        "authentication.roles.global_admin.description",
        &[],
    );
    for role in [
        &system_user,
        &system_post_all,
        &system_post_all_public,
        &team_user,
        &team_post_all,
        &team_post_all_public,
        &team_admin,
        &channel_user,
        &channel_admin,
    ] {
        system_admin
            .permissions
            .extend(role.permissions.iter().cloned());
    }
    system_admin.permissions.extend(
        [
            MANAGE_SYSTEM,
            MANAGE_ROLES,
            CREATE_USER_ACCESS_TOKEN,
            PERMANENT_DELETE_USER,
            INVITE_GUEST,
            MANAGE_GUESTS,
        ]
        .map(str::to_string),
    );

    [
        system_admin,
        system_user,
        system_post_all,
        system_post_all_public,
        team_admin,
        team_user,
        team_post_all,
        team_post_all_public,
        channel_admin,
        channel_user,
    ]
    .into_iter()
    .map(|role| (role.name.clone(), role))
    .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<Role>),
    Map(BTreeMap<String, Role>),
}

/// Parses a role catalog from JSON, either a list of roles or an object keyed
/// by role name.
pub fn load_catalog<R: Read>(reader: R) -> Result<RoleCatalog, CatalogError> {
    let document: CatalogDocument = serde_json::from_reader(reader)?;
    let mut catalog = RoleCatalog::new();
    match document {
        CatalogDocument::List(roles) => {
            for role in roles {
                if catalog.contains_key(&role.name) {
                    return Err(CatalogError::DuplicateRole { name: role.name });
                }
                catalog.insert(role.name.clone(), role);
            }
        }
        CatalogDocument::Map(roles) => {
            for (key, role) in roles {
                if key != role.name {
                    return Err(CatalogError::MismatchedKey {
                        key,
                        name: role.name,
                    });
                }
                catalog.insert(key, role);
            }
        }
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_permission_reports_changes() {
        let mut role = Role::new("tester").with_permissions(["a", "b", "c"]);
        assert!(!role.set_permission("a", true));
        assert!(role.set_permission("d", true));
        assert!(role.set_permission("b", false));
        assert!(!role.set_permission("b", false));
        let order: Vec<&str> = role.permissions.iter().map(String::as_str).collect();
        assert_eq!(order, vec!["a", "c", "d"]);
    }

    #[test]
    fn system_admin_is_a_superset_of_every_default_role() {
        let catalog = default_roles();
        let admin = &catalog[SYSTEM_ADMIN_ROLE];
        for role in catalog.values() {
            for permission in &role.permissions {
                assert!(
                    admin.has_permission(permission),
                    "system_admin is missing {permission} from {}",
                    role.name
                );
            }
        }
    }

    #[test]
    fn loads_catalog_from_list_and_map() {
        let list = r#"[{"name": "member", "permissions": ["read_channel"]}]"#;
        let catalog = load_catalog(list.as_bytes()).expect("list catalog");
        assert!(catalog["member"].has_permission(READ_CHANNEL));

        let map = r#"{"member": {"name": "member", "permissions": []}}"#;
        let catalog = load_catalog(map.as_bytes()).expect("map catalog");
        assert!(catalog["member"].permissions.is_empty());
    }

    #[test]
    fn rejects_duplicate_and_mismatched_roles() {
        let list = r#"[{"name": "member"}, {"name": "member"}]"#;
        assert!(matches!(
            load_catalog(list.as_bytes()),
            Err(CatalogError::DuplicateRole { name }) if name == "member"
        ));

        let map = r#"{"member": {"name": "guest"}}"#;
        assert!(matches!(
            load_catalog(map.as_bytes()),
            Err(CatalogError::MismatchedKey { .. })
        ));
    }
}
