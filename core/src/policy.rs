//! Reads policy values out of the configuration by name.
//!
//! Policy names map to configuration fields through a fixed accessor table
//! rather than runtime introspection, so an unknown name is an explicit
//! [`UnknownPolicyError`] instead of a silent miss.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::config::Config;
use crate::error::UnknownPolicyError;

/// Configuration namespace a policy lives in. Service-level fields are
/// consulted before team-level ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyTier {
    Service,
    Team,
}

impl fmt::Display for PolicyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyTier::Service => f.write_str("service"),
            PolicyTier::Team => f.write_str("team"),
        }
    }
}

/// Accessor pair for one string-valued policy field.
pub struct PolicyField {
    pub name: &'static str,
    pub tier: PolicyTier,
    get: fn(&Config) -> &String,
    get_mut: fn(&mut Config) -> &mut String,
}

impl PolicyField {
    pub fn read<'a>(&self, config: &'a Config) -> &'a str {
        (self.get)(config)
    }

    pub fn write(&self, config: &mut Config, value: &str) {
        *(self.get_mut)(config) = value.to_string();
    }
}

impl fmt::Debug for PolicyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyField")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish()
    }
}

macro_rules! policy_field {
    ($name:literal, $tier:ident, $section:ident . $field:ident) => {
        PolicyField {
            name: $name,
            tier: PolicyTier::$tier,
            get: {
                fn get(config: &Config) -> &String {
                    &config.$section.$field
                }
                get
            },
            get_mut: {
                fn get_mut(config: &mut Config) -> &mut String {
                    &mut config.$section.$field
                }
                get_mut
            },
        }
    };
}

static SERVICE_FIELDS: &[PolicyField] = &[
    policy_field!("RestrictPostDelete", Service, service_settings.restrict_post_delete),
    policy_field!("AllowEditPost", Service, service_settings.allow_edit_post),
];

static TEAM_FIELDS: &[PolicyField] = &[
    policy_field!("RestrictTeamInvite", Team, team_settings.restrict_team_invite),
    policy_field!("InviteGuests", Team, team_settings.invite_guests),
    policy_field!(
        "RestrictPublicChannelCreation",
        Team,
        team_settings.restrict_public_channel_creation
    ),
    policy_field!(
        "RestrictPrivateChannelCreation",
        Team,
        team_settings.restrict_private_channel_creation
    ),
    policy_field!(
        "RestrictPublicChannelManagement",
        Team,
        team_settings.restrict_public_channel_management
    ),
    policy_field!(
        "RestrictPrivateChannelManagement",
        Team,
        team_settings.restrict_private_channel_management
    ),
    policy_field!(
        "RestrictPublicChannelDeletion",
        Team,
        team_settings.restrict_public_channel_deletion
    ),
    policy_field!(
        "RestrictPrivateChannelDeletion",
        Team,
        team_settings.restrict_private_channel_deletion
    ),
    policy_field!(
        "RestrictPrivateChannelManageMembers",
        Team,
        team_settings.restrict_private_channel_manage_members
    ),
];

/// Canonical form of a policy name: first character upper-cased, the rest
/// untouched (`inviteGuests` becomes `InviteGuests`).
pub fn normalize_policy_name(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.to_uppercase().next() != Some(first) => {
            let mut normalized = String::with_capacity(name.len());
            normalized.extend(first.to_uppercase());
            normalized.push_str(chars.as_str());
            Cow::Owned(normalized)
        }
        _ => Cow::Borrowed(name),
    }
}

/// Every policy the configuration exposes, service tier first.
pub fn known_policies() -> impl Iterator<Item = &'static PolicyField> {
    SERVICE_FIELDS.iter().chain(TEAM_FIELDS.iter())
}

/// Finds the field backing `name`, checking the service tier before the team
/// tier.
pub fn find_policy(name: &str) -> Option<&'static PolicyField> {
    let name = normalize_policy_name(name);
    SERVICE_FIELDS
        .iter()
        .find(|field| field.name == name)
        .or_else(|| TEAM_FIELDS.iter().find(|field| field.name == name))
}

/// Current value of the named policy in `config`.
pub fn read_policy<'a>(config: &'a Config, name: &str) -> Result<&'a str, UnknownPolicyError> {
    find_policy(name)
        .map(|field| field.read(config))
        .ok_or_else(|| UnknownPolicyError::new(name))
}

/// Anything the resolver can ask for policy values.
pub trait PolicySource {
    fn read_policy(&self, name: &str) -> Result<&str, UnknownPolicyError>;
}

/// A policy source whose values can be overridden by name.
pub trait PolicySourceMut: PolicySource {
    fn set_policy(&mut self, name: &str, value: &str) -> Result<(), UnknownPolicyError>;
}

impl PolicySource for Config {
    fn read_policy(&self, name: &str) -> Result<&str, UnknownPolicyError> {
        read_policy(self, name)
    }
}

impl PolicySourceMut for Config {
    fn set_policy(&mut self, name: &str, value: &str) -> Result<(), UnknownPolicyError> {
        let field = find_policy(name).ok_or_else(|| UnknownPolicyError::new(name))?;
        field.write(self, value);
        Ok(())
    }
}

impl PolicySource for BTreeMap<String, String> {
    fn read_policy(&self, name: &str) -> Result<&str, UnknownPolicyError> {
        self.get(normalize_policy_name(name).as_ref())
            .or_else(|| self.get(name))
            .map(String::as_str)
            .ok_or_else(|| UnknownPolicyError::new(name))
    }
}

impl PolicySourceMut for BTreeMap<String, String> {
    fn set_policy(&mut self, name: &str, value: &str) -> Result<(), UnknownPolicyError> {
        self.insert(normalize_policy_name(name).into_owned(), value.to_string());
        Ok(())
    }
}

impl PolicySource for HashMap<String, String> {
    fn read_policy(&self, name: &str) -> Result<&str, UnknownPolicyError> {
        self.get(normalize_policy_name(name).as_ref())
            .or_else(|| self.get(name))
            .map(String::as_str)
            .ok_or_else(|| UnknownPolicyError::new(name))
    }
}

impl PolicySourceMut for HashMap<String, String> {
    fn set_policy(&mut self, name: &str, value: &str) -> Result<(), UnknownPolicyError> {
        self.insert(normalize_policy_name(name).into_owned(), value.to_string());
        Ok(())
    }
}
