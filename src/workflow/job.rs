//! Job posting lifecycle.
//!
//! Happy path: DRAFT → SUBMITTED → ADMIN_VERIFIED → TA_ENRICHED →
//! ADMIN_FINAL_VERIFIED → PUBLISHED. A published posting can be paused
//! (reversible) or closed (terminal); resume is the only backward edge.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::guard::{Lifecycle, Rule, Source};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Draft,
    Submitted,
    AdminVerified,
    TaEnriched,
    AdminFinalVerified,
    Published,
    Paused,
    Closed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Draft => "DRAFT",
            JobState::Submitted => "SUBMITTED",
            JobState::AdminVerified => "ADMIN_VERIFIED",
            JobState::TaEnriched => "TA_ENRICHED",
            JobState::AdminFinalVerified => "ADMIN_FINAL_VERIFIED",
            JobState::Published => "PUBLISHED",
            JobState::Paused => "PAUSED",
            JobState::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<JobState> {
        match s {
            "DRAFT" => Some(JobState::Draft),
            "SUBMITTED" => Some(JobState::Submitted),
            "ADMIN_VERIFIED" => Some(JobState::AdminVerified),
            "TA_ENRICHED" => Some(JobState::TaEnriched),
            "ADMIN_FINAL_VERIFIED" => Some(JobState::AdminFinalVerified),
            "PUBLISHED" => Some(JobState::Published),
            "PAUSED" => Some(JobState::Paused),
            "CLOSED" => Some(JobState::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `verify` accepts a freshly submitted posting from any qualified admin,
/// or a DRAFT reviewed by its own organization (`self_org_from`) — the
/// self-service path does not require JOB_VERIFY.
static RULES: &[Rule<JobState>] = &[
    Rule {
        name: "submit",
        from: Source::Exact(JobState::Draft),
        to: JobState::Submitted,
        permission: Some("JOB_SUBMIT"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
    Rule {
        name: "verify",
        from: Source::OneOf(&[JobState::Submitted, JobState::Draft]),
        to: JobState::AdminVerified,
        permission: Some("JOB_VERIFY"),
        roles: None,
        org_scoped: false,
        self_org_from: Some(JobState::Draft),
    },
    Rule {
        name: "enrich",
        from: Source::Exact(JobState::AdminVerified),
        to: JobState::TaEnriched,
        permission: Some("JOB_ENRICH"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
    Rule {
        name: "final_verify",
        from: Source::Exact(JobState::TaEnriched),
        to: JobState::AdminFinalVerified,
        permission: Some("JOB_APPROVE"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
    Rule {
        name: "publish",
        from: Source::Exact(JobState::AdminFinalVerified),
        to: JobState::Published,
        permission: Some("JOB_PUBLISH"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
    Rule {
        name: "pause",
        from: Source::Exact(JobState::Published),
        to: JobState::Paused,
        permission: Some("JOB_PUBLISH"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
    Rule {
        name: "resume",
        from: Source::Exact(JobState::Paused),
        to: JobState::Published,
        permission: Some("JOB_PUBLISH"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
    Rule {
        name: "close",
        from: Source::Exact(JobState::Published),
        to: JobState::Closed,
        permission: Some("JOB_PUBLISH"),
        roles: None,
        org_scoped: true,
        self_org_from: None,
    },
];

pub static LIFECYCLE: Lifecycle<JobState> = Lifecycle {
    entity: "job",
    rules: RULES,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::Permissions;
    use crate::workflow::{Actor, OrgKind, Role, Subject};

    fn actor(role: Role, org_id: Option<i64>, perms: &[&str]) -> Actor {
        Actor {
            user_id: 1,
            role,
            org_id,
            org_kind: if role == Role::Vendor {
                OrgKind::Vendor
            } else {
                OrgKind::Solventek
            },
            permissions: Permissions(perms.iter().map(|s| s.to_string()).collect()),
        }
    }

    fn subject(state: JobState, org: i64) -> Subject<JobState> {
        Subject {
            state,
            owning_org: Some(org),
        }
    }

    #[test]
    fn happy_path_targets() {
        for (name, from, to) in [
            ("submit", JobState::Draft, JobState::Submitted),
            ("verify", JobState::Submitted, JobState::AdminVerified),
            ("enrich", JobState::AdminVerified, JobState::TaEnriched),
            ("final_verify", JobState::TaEnriched, JobState::AdminFinalVerified),
            ("publish", JobState::AdminFinalVerified, JobState::Published),
        ] {
            let rule = LIFECYCLE.rule(name).unwrap();
            assert!(rule.from.matches(from), "{name} should accept {from}");
            assert_eq!(rule.to, to, "{name} should land on {to}");
        }
    }

    #[test]
    fn verify_submitted_with_permission() {
        let hr = actor(Role::HrAdmin, Some(7), &["JOB_VERIFY"]);
        let job = subject(JobState::Submitted, 7);
        assert!(LIFECYCLE.can_apply(&hr, &job, "verify"));
    }

    #[test]
    fn verify_submitted_without_permission_denied_even_for_own_org() {
        // The self-service exception applies to DRAFT only.
        let hr = actor(Role::HrAdmin, Some(7), &[]);
        let job = subject(JobState::Submitted, 7);
        assert!(!LIFECYCLE.can_apply(&hr, &job, "verify"));
    }

    #[test]
    fn draft_verified_by_own_org_without_permission() {
        let vendor = actor(Role::Vendor, Some(7), &[]);
        let job = subject(JobState::Draft, 7);
        assert!(LIFECYCLE.can_apply(&vendor, &job, "verify"));
    }

    #[test]
    fn draft_of_other_org_needs_the_permission() {
        let vendor = actor(Role::Vendor, Some(8), &[]);
        let job = subject(JobState::Draft, 7);
        assert!(!LIFECYCLE.can_apply(&vendor, &job, "verify"));

        let admin = actor(Role::SuperAdmin, Some(1), &["JOB_VERIFY"]);
        assert!(LIFECYCLE.can_apply(&admin, &job, "verify"));
    }

    #[test]
    fn enrich_denied_across_orgs_despite_permission() {
        let ta = actor(Role::Ta, Some(2), &["JOB_ENRICH"]);
        let job = subject(JobState::AdminVerified, 9);
        assert!(!LIFECYCLE.can_apply(&ta, &job, "enrich"));
    }

    #[test]
    fn enrich_allowed_within_org() {
        let ta = actor(Role::Ta, Some(9), &["JOB_ENRICH"]);
        let job = subject(JobState::AdminVerified, 9);
        assert!(LIFECYCLE.can_apply(&ta, &job, "enrich"));
    }

    #[test]
    fn state_illegality_beats_permission_grant() {
        let admin = actor(
            Role::SuperAdmin,
            Some(9),
            &["JOB_SUBMIT", "JOB_VERIFY", "JOB_ENRICH", "JOB_APPROVE", "JOB_PUBLISH"],
        );
        let published = subject(JobState::Published, 9);
        for name in ["submit", "verify", "enrich", "final_verify", "publish"] {
            assert!(
                !LIFECYCLE.can_apply(&admin, &published, name),
                "{name} must be denied on PUBLISHED"
            );
        }
    }

    #[test]
    fn published_offers_exactly_pause_and_close() {
        let admin = actor(
            Role::SuperAdmin,
            Some(9),
            &["JOB_SUBMIT", "JOB_VERIFY", "JOB_ENRICH", "JOB_APPROVE", "JOB_PUBLISH"],
        );
        let published = subject(JobState::Published, 9);
        let names: Vec<&str> = LIFECYCLE
            .available(&admin, &published)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["pause", "close"]);
    }

    #[test]
    fn closed_is_terminal() {
        let admin = actor(
            Role::SuperAdmin,
            Some(9),
            &["JOB_SUBMIT", "JOB_VERIFY", "JOB_ENRICH", "JOB_APPROVE", "JOB_PUBLISH"],
        );
        let closed = subject(JobState::Closed, 9);
        assert!(LIFECYCLE.available(&admin, &closed).is_empty());
    }

    #[test]
    fn paused_resumes_to_published() {
        let admin = actor(Role::HrAdmin, Some(9), &["JOB_PUBLISH"]);
        let paused = subject(JobState::Paused, 9);
        let names: Vec<&str> = LIFECYCLE
            .available(&admin, &paused)
            .iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["resume"]);
        assert_eq!(LIFECYCLE.rule("resume").unwrap().to, JobState::Published);
    }

    #[test]
    fn unknown_transition_is_never_allowed() {
        let admin = actor(Role::SuperAdmin, Some(9), &["JOB_PUBLISH"]);
        let job = subject(JobState::Published, 9);
        assert!(!LIFECYCLE.can_apply(&admin, &job, "archive"));
    }

    #[test]
    fn state_tags_round_trip() {
        for s in [
            JobState::Draft,
            JobState::Submitted,
            JobState::AdminVerified,
            JobState::TaEnriched,
            JobState::AdminFinalVerified,
            JobState::Published,
            JobState::Paused,
            JobState::Closed,
        ] {
            assert_eq!(JobState::parse(s.as_str()), Some(s));
        }
        assert_eq!(JobState::parse("OPEN"), None);
    }
}
