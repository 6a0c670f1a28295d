//! Organization-specific authorization rule applied after a successful bind

use crate::directory::{DirectoryAttributes, MEMBERSHIPS};

/// Organizational units whose members are always admitted
pub const PRIVILEGED_UNITS: &[&str] = &["doc"];

/// Group common names that admit members of any other unit
pub const ALLOWED_GROUPS: &[&str] = &["doc-all-students", "doc-staff-group"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Distinguished name places the account in a privileged unit
    PrivilegedUnit,
    /// Account belongs to an allow-listed group
    AllowedGroup,
    Rejected,
}

impl PolicyDecision {
    pub fn is_authorized(self) -> bool {
        !matches!(self, PolicyDecision::Rejected)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthorizationPolicy {
    privileged_units: &'static [&'static str],
    allowed_groups: &'static [&'static str],
}

impl Default for AuthorizationPolicy {
    fn default() -> Self {
        Self {
            privileged_units: PRIVILEGED_UNITS,
            allowed_groups: ALLOWED_GROUPS,
        }
    }
}

impl AuthorizationPolicy {
    /// Decide whether an authenticated account may use the service.
    ///
    /// Missing attributes count as empty sets.
    pub fn evaluate(&self, attributes: &DirectoryAttributes) -> PolicyDecision {
        if attributes
            .organizational_units()
            .any(|ou| self.privileged_units.contains(&ou))
        {
            return PolicyDecision::PrivilegedUnit;
        }

        let member_of_allowed = attributes
            .grouped(MEMBERSHIPS)
            .is_some_and(|groups| groups.values("CN").any(|cn| self.allowed_groups.contains(&cn)));

        if member_of_allowed {
            PolicyDecision::AllowedGroup
        } else {
            PolicyDecision::Rejected
        }
    }
}
