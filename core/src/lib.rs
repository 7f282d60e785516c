//! Policy-to-permission resolution for built-in roles.
//!
//! Administrators pick values for named policies ("who may invite guests",
//! "who may delete posts"). A declarative [`RuleTable`] maps every policy
//! value to role permission assertions, and the [`RoleResolver`] applies them
//! to a copy of the default role catalog.

pub mod config;
pub mod error;
mod license;
pub mod permissions;
pub mod policy;
mod resolver;
pub mod roles;
pub mod rule_table;
mod verify;

pub use config::Config;
pub use config::ServiceSettings;
pub use config::TeamSettings;
pub use error::CatalogError;
pub use error::ConfigError;
pub use error::LoadError;
pub use error::UnknownPolicyError;
pub use license::LicenseGate;
pub use policy::PolicySource;
pub use policy::PolicySourceMut;
pub use policy::PolicyTier;
pub use policy::read_policy;
pub use resolver::PermissionChange;
pub use resolver::Resolution;
pub use resolver::RoleResolver;
pub use resolver::SkipReason;
pub use resolver::Skipped;
pub use resolver::resolve;
pub use roles::Role;
pub use roles::RoleCatalog;
pub use roles::default_roles;
pub use rule_table::RoleState;
pub use rule_table::RuleTable;
pub use rule_table::RuleTableIssue;
pub use verify::Violation;
pub use verify::verify_table;
