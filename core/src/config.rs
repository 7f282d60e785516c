//! Two-tier platform configuration consulted by the policy reader.
//!
//! Field names follow the platform's PascalCase configuration keys so that
//! exported configuration documents load unchanged. Missing fields take the
//! platform defaults and unknown fields are ignored.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

pub const PERMISSIONS_ALL: &str = "all";
pub const PERMISSIONS_CHANNEL_ADMIN: &str = "channel_admin";
pub const PERMISSIONS_TEAM_ADMIN: &str = "team_admin";
pub const PERMISSIONS_SYSTEM_ADMIN: &str = "system_admin";

pub const ALLOW_EDIT_POST_ALWAYS: &str = "always";
pub const ALLOW_EDIT_POST_NEVER: &str = "never";
pub const ALLOW_EDIT_POST_TIME_LIMIT: &str = "time_limit";

pub const INVITE_GUESTS_EVERYONE: &str = "EVERYONE";
pub const INVITE_GUESTS_TEAM_ADMIN: &str = "TEAM_ADMIN";
pub const INVITE_GUESTS_SYSTEM_ADMIN: &str = "SYSTEM_ADMIN";
pub const INVITE_GUESTS_DISABLED: &str = "DISABLED";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Config {
    pub service_settings: ServiceSettings,
    pub team_settings: TeamSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSettings {
    pub restrict_post_delete: String,
    pub allow_edit_post: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            restrict_post_delete: PERMISSIONS_ALL.to_string(),
            allow_edit_post: ALLOW_EDIT_POST_ALWAYS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TeamSettings {
    pub restrict_team_invite: String,
    pub invite_guests: String,
    pub restrict_public_channel_creation: String,
    pub restrict_private_channel_creation: String,
    pub restrict_public_channel_management: String,
    pub restrict_private_channel_management: String,
    pub restrict_public_channel_deletion: String,
    pub restrict_private_channel_deletion: String,
    pub restrict_private_channel_manage_members: String,
}

impl Default for TeamSettings {
    fn default() -> Self {
        Self {
            restrict_team_invite: PERMISSIONS_ALL.to_string(),
            invite_guests: INVITE_GUESTS_DISABLED.to_string(),
            restrict_public_channel_creation: PERMISSIONS_ALL.to_string(),
            restrict_private_channel_creation: PERMISSIONS_ALL.to_string(),
            restrict_public_channel_management: PERMISSIONS_ALL.to_string(),
            restrict_private_channel_management: PERMISSIONS_ALL.to_string(),
            restrict_public_channel_deletion: PERMISSIONS_ALL.to_string(),
            restrict_private_channel_deletion: PERMISSIONS_ALL.to_string(),
            restrict_private_channel_manage_members: PERMISSIONS_ALL.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Loads a configuration document, choosing the parser by file extension.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                });
            }
        };
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [TeamSettings]
            InviteGuests = "TEAM_ADMIN"
            SomeFutureSetting = true
            "#,
        )
        .expect("parse");
        assert_eq!(config.team_settings.invite_guests, INVITE_GUESTS_TEAM_ADMIN);
        assert_eq!(config.team_settings.restrict_team_invite, PERMISSIONS_ALL);
        assert_eq!(config.service_settings, ServiceSettings::default());
    }

    #[test]
    fn json_uses_platform_keys() {
        let config = Config::from_json_str(
            r#"{"ServiceSettings": {"RestrictPostDelete": "system_admin"}}"#,
        )
        .expect("parse");
        assert_eq!(
            config.service_settings.restrict_post_delete,
            PERMISSIONS_SYSTEM_ADMIN
        );
        assert_eq!(config.team_settings, TeamSettings::default());
    }

    #[test]
    fn load_from_path_dispatches_on_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).expect("create");
        writeln!(file, "[ServiceSettings]\nAllowEditPost = \"never\"").expect("write");
        let config = Config::load_from_path(&path).expect("load");
        assert_eq!(config.service_settings.allow_edit_post, ALLOW_EDIT_POST_NEVER);

        let err = Config::load_from_path(&dir.path().join("config.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat { .. }));
    }
}
