//! Lifecycle rules for the three entity kinds that move through staged
//! pipelines: job postings, candidate applications, and vendor
//! organizations.
//!
//! The rule tables are immutable, process-wide constants; evaluating them
//! is pure computation over an [`Actor`] and an entity [`Subject`]
//! snapshot. Nothing in this module performs I/O or touches the session —
//! handlers resolve the actor once and pass it in explicitly.

pub mod application;
pub mod guard;
pub mod job;
pub mod organization;

pub use guard::{Lifecycle, Rule, Source, Subject};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::auth::session::Permissions;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    HrAdmin,
    Ta,
    Employee,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::HrAdmin => "HR_ADMIN",
            Role::Ta => "TA",
            Role::Employee => "EMPLOYEE",
            Role::Vendor => "VENDOR",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "HR_ADMIN" => Some(Role::HrAdmin),
            "TA" => Some(Role::Ta),
            "EMPLOYEE" => Some(Role::Employee),
            "VENDOR" => Some(Role::Vendor),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of organization a user belongs to: the internal staffing company
/// or an external vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgKind {
    Solventek,
    Vendor,
}

impl OrgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgKind::Solventek => "SOLVENTEK",
            OrgKind::Vendor => "VENDOR",
        }
    }

    pub fn parse(s: &str) -> Option<OrgKind> {
        match s {
            "SOLVENTEK" => Some(OrgKind::Solventek),
            "VENDOR" => Some(OrgKind::Vendor),
            _ => None,
        }
    }
}

impl fmt::Display for OrgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller a guard decision is made for. Assembled from the session by
/// `auth::session::current_actor` and threaded through every rule
/// evaluation — there is no ambient "current user" state.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
    pub org_id: Option<i64>,
    pub org_kind: OrgKind,
    pub permissions: Permissions,
}

impl Actor {
    /// Organization affinity: true when the actor's organization is the
    /// entity's owning organization. `None` on either side never matches.
    pub fn owns(&self, owning_org: Option<i64>) -> bool {
        match (self.org_id, owning_org) {
            (Some(mine), Some(theirs)) => mine == theirs,
            _ => false,
        }
    }
}
