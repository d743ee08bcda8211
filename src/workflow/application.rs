//! Candidate application lifecycle.
//!
//! Unlike jobs, applications do not follow a strict table: recruitment
//! pipelines have legitimate non-linear exceptions (re-opening a dropped
//! candidate, skipping straight to an offer), so any state is reachable
//! from any other by direct internal action. What is restricted is *who*
//! may move an application: the internal recruiting roles, or — for the
//! single withdraw case — the vendor organization that submitted it.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::guard::Subject;
use super::{Actor, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationState {
    Applied,
    Shortlisted,
    InterviewScheduled,
    InterviewPassed,
    InterviewFailed,
    Offered,
    OnboardingInProgress,
    Onboarded,
    ConvertedToFte,
    Rejected,
    Dropped,
}

impl ApplicationState {
    pub const ALL: [ApplicationState; 11] = [
        ApplicationState::Applied,
        ApplicationState::Shortlisted,
        ApplicationState::InterviewScheduled,
        ApplicationState::InterviewPassed,
        ApplicationState::InterviewFailed,
        ApplicationState::Offered,
        ApplicationState::OnboardingInProgress,
        ApplicationState::Onboarded,
        ApplicationState::ConvertedToFte,
        ApplicationState::Rejected,
        ApplicationState::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationState::Applied => "APPLIED",
            ApplicationState::Shortlisted => "SHORTLISTED",
            ApplicationState::InterviewScheduled => "INTERVIEW_SCHEDULED",
            ApplicationState::InterviewPassed => "INTERVIEW_PASSED",
            ApplicationState::InterviewFailed => "INTERVIEW_FAILED",
            ApplicationState::Offered => "OFFERED",
            ApplicationState::OnboardingInProgress => "ONBOARDING_IN_PROGRESS",
            ApplicationState::Onboarded => "ONBOARDED",
            ApplicationState::ConvertedToFte => "CONVERTED_TO_FTE",
            ApplicationState::Rejected => "REJECTED",
            ApplicationState::Dropped => "DROPPED",
        }
    }

    pub fn parse(s: &str) -> Option<ApplicationState> {
        Self::ALL.iter().copied().find(|state| state.as_str() == s)
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roles that may record an approve/reject decision with feedback.
const DECIDER_ROLES: &[Role] = &[Role::SuperAdmin, Role::HrAdmin, Role::Employee];

/// May `actor` move this application to `to`?
///
/// For applications the subject's `owning_org` is the submitting vendor
/// organization. A move to the current state is a no-op and is never
/// permitted.
pub fn can_update_status(
    actor: &Actor,
    subject: &Subject<ApplicationState>,
    to: ApplicationState,
) -> bool {
    if to == subject.state {
        return false;
    }
    match actor.role {
        Role::SuperAdmin | Role::HrAdmin | Role::Ta => true,
        // Withdraw: the submitting vendor may drop its own candidate.
        Role::Vendor => to == ApplicationState::Dropped && actor.owns(subject.owning_org),
        Role::Employee => false,
    }
}

/// Target states `actor` may move this application to right now.
pub fn available_statuses(
    actor: &Actor,
    subject: &Subject<ApplicationState>,
) -> Vec<ApplicationState> {
    ApplicationState::ALL
        .iter()
        .copied()
        .filter(|to| can_update_status(actor, subject, *to))
        .collect()
}

/// May `actor` record a stakeholder decision on an application?
pub fn can_decide(actor: &Actor) -> bool {
    DECIDER_ROLES.contains(&actor.role)
}

/// The status a decision lands on. The feedback text that must accompany
/// it is the caller's concern.
pub fn decision_target(approved: bool) -> ApplicationState {
    if approved {
        ApplicationState::Offered
    } else {
        ApplicationState::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::session::Permissions;
    use crate::workflow::OrgKind;

    fn actor(role: Role, org_id: Option<i64>) -> Actor {
        Actor {
            user_id: 1,
            role,
            org_id,
            org_kind: if role == Role::Vendor {
                OrgKind::Vendor
            } else {
                OrgKind::Solventek
            },
            permissions: Permissions::default(),
        }
    }

    fn subject(state: ApplicationState, vendor_org: Option<i64>) -> Subject<ApplicationState> {
        Subject {
            state,
            owning_org: vendor_org,
        }
    }

    #[test]
    fn internal_roles_may_move_anywhere_but_in_place() {
        for role in [Role::SuperAdmin, Role::HrAdmin, Role::Ta] {
            let a = actor(role, Some(1));
            let s = subject(ApplicationState::Applied, Some(4));
            assert!(can_update_status(&a, &s, ApplicationState::Shortlisted));
            assert!(can_update_status(&a, &s, ApplicationState::Offered));
            assert!(!can_update_status(&a, &s, ApplicationState::Applied));
        }
    }

    #[test]
    fn reopening_a_dropped_candidate_is_allowed_internally() {
        let hr = actor(Role::HrAdmin, Some(1));
        let s = subject(ApplicationState::Dropped, Some(4));
        assert!(can_update_status(&hr, &s, ApplicationState::Shortlisted));
    }

    #[test]
    fn vendor_may_only_withdraw_its_own_submission() {
        let vendor = actor(Role::Vendor, Some(4));
        let own = subject(ApplicationState::Shortlisted, Some(4));
        let other = subject(ApplicationState::Shortlisted, Some(5));

        assert!(can_update_status(&vendor, &own, ApplicationState::Dropped));
        assert!(!can_update_status(&vendor, &own, ApplicationState::Offered));
        assert!(!can_update_status(&vendor, &other, ApplicationState::Dropped));
    }

    #[test]
    fn employee_cannot_update_status() {
        let emp = actor(Role::Employee, Some(1));
        let s = subject(ApplicationState::Applied, Some(4));
        assert!(available_statuses(&emp, &s).is_empty());
    }

    #[test]
    fn available_statuses_excludes_current() {
        let hr = actor(Role::HrAdmin, Some(1));
        let s = subject(ApplicationState::InterviewScheduled, Some(4));
        let targets = available_statuses(&hr, &s);
        assert_eq!(targets.len(), ApplicationState::ALL.len() - 1);
        assert!(!targets.contains(&ApplicationState::InterviewScheduled));
    }

    #[test]
    fn decision_roles_and_targets() {
        assert!(can_decide(&actor(Role::Employee, Some(1))));
        assert!(can_decide(&actor(Role::HrAdmin, Some(1))));
        assert!(!can_decide(&actor(Role::Ta, Some(1))));
        assert!(!can_decide(&actor(Role::Vendor, Some(4))));

        assert_eq!(decision_target(true), ApplicationState::Offered);
        assert_eq!(decision_target(false), ApplicationState::Rejected);
    }

    #[test]
    fn state_tags_round_trip() {
        for s in ApplicationState::ALL {
            assert_eq!(ApplicationState::parse(s.as_str()), Some(s));
        }
        assert_eq!(ApplicationState::parse("HIRED"), None);
    }
}
