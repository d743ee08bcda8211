//! Vendor organization lifecycle.
//!
//! PENDING_VERIFICATION resolves to APPROVED or REJECTED; an approved
//! vendor is activated and deactivated by the platform owner. REJECTED
//! has no outgoing transitions — a rejected vendor is recreated, never
//! resurrected.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::guard::{Lifecycle, Rule, Source};
use super::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgState {
    PendingVerification,
    Approved,
    Rejected,
    Active,
    Inactive,
}

impl OrgState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgState::PendingVerification => "PENDING_VERIFICATION",
            OrgState::Approved => "APPROVED",
            OrgState::Rejected => "REJECTED",
            OrgState::Active => "ACTIVE",
            OrgState::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<OrgState> {
        match s {
            "PENDING_VERIFICATION" => Some(OrgState::PendingVerification),
            "APPROVED" => Some(OrgState::Approved),
            "REJECTED" => Some(OrgState::Rejected),
            "ACTIVE" => Some(OrgState::Active),
            "INACTIVE" => Some(OrgState::Inactive),
            _ => None,
        }
    }
}

impl fmt::Display for OrgState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const VERIFIER_ROLES: &[Role] = &[Role::SuperAdmin, Role::HrAdmin];
const OWNER_ROLES: &[Role] = &[Role::SuperAdmin];

static RULES: &[Rule<OrgState>] = &[
    Rule {
        name: "approve",
        from: Source::Exact(OrgState::PendingVerification),
        to: OrgState::Approved,
        permission: None,
        roles: Some(VERIFIER_ROLES),
        org_scoped: false,
        self_org_from: None,
    },
    Rule {
        name: "reject",
        from: Source::Exact(OrgState::PendingVerification),
        to: OrgState::Rejected,
        permission: None,
        roles: Some(VERIFIER_ROLES),
        org_scoped: false,
        self_org_from: None,
    },
    Rule {
        name: "activate",
        from: Source::OneOf(&[OrgState::Approved, OrgState::Inactive]),
        to: OrgState::Active,
        permission: None,
        roles: Some(OWNER_ROLES),
        org_scoped: false,
        self_org_from: None,
    },
    Rule {
        name: "deactivate",
        from: Source::OneOf(&[OrgState::Approved, OrgState::Active]),
        to: OrgState::Inactive,
        permission: None,
        roles: Some(OWNER_ROLES),
        org_scoped: false,
        self_org_from: None,
    },
];

pub static LIFECYCLE: Lifecycle<OrgState> = Lifecycle {
    entity: "organization",
    rules: RULES,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::Permissions;
    use crate::workflow::{Actor, OrgKind, Subject};

    fn actor(role: Role) -> Actor {
        Actor {
            user_id: 1,
            role,
            org_id: Some(1),
            org_kind: OrgKind::Solventek,
            permissions: Permissions::default(),
        }
    }

    fn org(state: OrgState) -> Subject<OrgState> {
        Subject {
            state,
            owning_org: Some(4),
        }
    }

    #[test]
    fn pending_resolves_by_verifier_roles() {
        for role in [Role::SuperAdmin, Role::HrAdmin] {
            let a = actor(role);
            let pending = org(OrgState::PendingVerification);
            assert!(LIFECYCLE.can_apply(&a, &pending, "approve"));
            assert!(LIFECYCLE.can_apply(&a, &pending, "reject"));
        }
        for role in [Role::Ta, Role::Employee, Role::Vendor] {
            let a = actor(role);
            let pending = org(OrgState::PendingVerification);
            assert!(LIFECYCLE.available(&a, &pending).is_empty());
        }
    }

    #[test]
    fn activation_is_owner_only() {
        let approved = org(OrgState::Approved);
        assert!(LIFECYCLE.can_apply(&actor(Role::SuperAdmin), &approved, "activate"));
        assert!(LIFECYCLE.can_apply(&actor(Role::SuperAdmin), &approved, "deactivate"));
        assert!(!LIFECYCLE.can_apply(&actor(Role::HrAdmin), &approved, "activate"));
    }

    #[test]
    fn active_and_inactive_toggle() {
        let a = actor(Role::SuperAdmin);
        assert!(LIFECYCLE.can_apply(&a, &org(OrgState::Inactive), "activate"));
        assert!(LIFECYCLE.can_apply(&a, &org(OrgState::Active), "deactivate"));
        assert!(!LIFECYCLE.can_apply(&a, &org(OrgState::Active), "activate"));
    }

    #[test]
    fn rejected_is_a_one_way_door() {
        let a = actor(Role::SuperAdmin);
        let rejected = org(OrgState::Rejected);
        assert!(LIFECYCLE.available(&a, &rejected).is_empty());
        assert!(!LIFECYCLE.can_apply(&a, &rejected, "approve"));
    }

    #[test]
    fn state_tags_round_trip() {
        for s in [
            OrgState::PendingVerification,
            OrgState::Approved,
            OrgState::Rejected,
            OrgState::Active,
            OrgState::Inactive,
        ] {
            assert_eq!(OrgState::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrgState::parse("SUSPENDED"), None);
    }
}
