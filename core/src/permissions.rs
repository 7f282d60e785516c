//! Permission identifiers granted by the built-in roles.
//!
//! Permissions are opaque strings as far as the resolver is concerned; these
//! constants exist so the default catalog and tests do not repeat literals.

pub const INVITE_USER: &str = "invite_user";
pub const INVITE_GUEST: &str = "invite_guest";
pub const ADD_USER_TO_TEAM: &str = "add_user_to_team";
pub const REMOVE_USER_FROM_TEAM: &str = "remove_user_from_team";
pub const VIEW_TEAM: &str = "view_team";
pub const LIST_TEAM_CHANNELS: &str = "list_team_channels";
pub const JOIN_PUBLIC_CHANNELS: &str = "join_public_channels";
pub const READ_PUBLIC_CHANNEL: &str = "read_public_channel";
pub const MANAGE_TEAM: &str = "manage_team";
pub const MANAGE_TEAM_ROLES: &str = "manage_team_roles";
pub const IMPORT_TEAM: &str = "import_team";
pub const CREATE_TEAM: &str = "create_team";

pub const CREATE_PUBLIC_CHANNEL: &str = "create_public_channel";
pub const CREATE_PRIVATE_CHANNEL: &str = "create_private_channel";
pub const MANAGE_PUBLIC_CHANNEL_PROPERTIES: &str = "manage_public_channel_properties";
pub const MANAGE_PRIVATE_CHANNEL_PROPERTIES: &str = "manage_private_channel_properties";
pub const DELETE_PUBLIC_CHANNEL: &str = "delete_public_channel";
pub const DELETE_PRIVATE_CHANNEL: &str = "delete_private_channel";
pub const MANAGE_PUBLIC_CHANNEL_MEMBERS: &str = "manage_public_channel_members";
pub const MANAGE_PRIVATE_CHANNEL_MEMBERS: &str = "manage_private_channel_members";
pub const MANAGE_CHANNEL_ROLES: &str = "manage_channel_roles";
pub const READ_CHANNEL: &str = "read_channel";
pub const CREATE_DIRECT_CHANNEL: &str = "create_direct_channel";
pub const CREATE_GROUP_CHANNEL: &str = "create_group_channel";

pub const CREATE_POST: &str = "create_post";
pub const CREATE_POST_PUBLIC: &str = "create_post_public";
pub const EDIT_POST: &str = "edit_post";
pub const EDIT_OTHERS_POSTS: &str = "edit_others_posts";
pub const DELETE_POST: &str = "delete_post";
pub const DELETE_OTHERS_POSTS: &str = "delete_others_posts";
pub const ADD_REACTION: &str = "add_reaction";
pub const REMOVE_REACTION: &str = "remove_reaction";
pub const UPLOAD_FILE: &str = "upload_file";
pub const GET_PUBLIC_LINK: &str = "get_public_link";
pub const USE_SLASH_COMMANDS: &str = "use_slash_commands";

pub const MANAGE_WEBHOOKS: &str = "manage_webhooks";
pub const MANAGE_OTHERS_WEBHOOKS: &str = "manage_others_webhooks";
pub const MANAGE_SLASH_COMMANDS: &str = "manage_slash_commands";
pub const MANAGE_OTHERS_SLASH_COMMANDS: &str = "manage_others_slash_commands";
pub const CREATE_USER_ACCESS_TOKEN: &str = "create_user_access_token";
pub const PERMANENT_DELETE_USER: &str = "permanent_delete_user";
pub const MANAGE_SYSTEM: &str = "manage_system";
pub const MANAGE_ROLES: &str = "manage_roles";
pub const MANAGE_GUESTS: &str = "manage_guests";
