use crate::rule_table::RoleState;

/// Point-in-time licensing fact supplied by the host. Rules flagged
/// `requires_license` only apply to licensed deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LicenseGate {
    licensed: bool,
}

impl LicenseGate {
    pub const fn new(licensed: bool) -> Self {
        Self { licensed }
    }

    pub const fn is_licensed(self) -> bool {
        self.licensed
    }

    pub fn permits(self, rule: &RoleState) -> bool {
        self.licensed || !rule.requires_license
    }
}

impl From<bool> for LicenseGate {
    fn from(licensed: bool) -> Self {
        Self::new(licensed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlicensed_gate_blocks_only_restricted_rules() {
        let open = RoleState::new("team_user", "invite_user", true);
        let restricted = RoleState::new("team_user", "invite_guest", true).licensed_only();

        let gate = LicenseGate::new(false);
        assert!(gate.permits(&open));
        assert!(!gate.permits(&restricted));

        let gate = LicenseGate::from(true);
        assert!(gate.permits(&open));
        assert!(gate.permits(&restricted));
    }
}
