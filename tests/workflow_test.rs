//! Lifecycle guard tests across the three entity kinds.
//!
//! Everything here runs against the pure rule tables — no database, no
//! server. Handlers consult exactly these predicates before mutating.

use talentgate::auth::session::Permissions;
use talentgate::workflow::application::{
    ApplicationState, available_statuses, can_decide, can_update_status, decision_target,
};
use talentgate::workflow::job::{JobState, LIFECYCLE as JOB};
use talentgate::workflow::organization::{LIFECYCLE as ORG, OrgState};
use talentgate::workflow::{Actor, OrgKind, Role, Subject};

// --- Helpers ---

const ACME: i64 = 10;
const OTHER: i64 = 11;

fn actor(role: Role, org_id: i64, perms: &[&str]) -> Actor {
    Actor {
        user_id: 1,
        role,
        org_id: Some(org_id),
        org_kind: if role == Role::Vendor {
            OrgKind::Vendor
        } else {
            OrgKind::Solventek
        },
        permissions: Permissions(perms.iter().map(|s| s.to_string()).collect()),
    }
}

fn job(state: JobState, org: i64) -> Subject<JobState> {
    Subject {
        state,
        owning_org: Some(org),
    }
}

// --- Jobs ---

#[test]
fn hr_admin_verifies_submitted_job_of_any_org() {
    let hr = actor(Role::HrAdmin, ACME, &["JOB_VERIFY"]);
    let submitted = job(JobState::Submitted, ACME);

    assert!(JOB.can_apply(&hr, &submitted, "verify"));
    assert_eq!(JOB.rule("verify").unwrap().to, JobState::AdminVerified);

    // Verification is not org-scoped: a different org's admin also passes.
    let cross = job(JobState::Submitted, OTHER);
    assert!(JOB.can_apply(&hr, &cross, "verify"));
}

#[test]
fn cross_org_enrich_denied_despite_permission() {
    let ta = actor(Role::Ta, OTHER, &["JOB_ENRICH"]);
    let verified = job(JobState::AdminVerified, ACME);
    assert!(!JOB.can_apply(&ta, &verified, "enrich"));
}

#[test]
fn source_state_failure_wins_over_any_permission_grant() {
    let all = &["JOB_SUBMIT", "JOB_VERIFY", "JOB_ENRICH", "JOB_APPROVE", "JOB_PUBLISH"];
    let admin = actor(Role::SuperAdmin, ACME, all);

    // A draft accepts submit and verify, nothing further down the pipeline.
    let draft = job(JobState::Draft, ACME);
    for name in ["enrich", "final_verify", "publish", "pause", "resume", "close"] {
        assert!(!JOB.can_apply(&admin, &draft, name), "{name} must fail from DRAFT");
    }

    // A closed posting accepts nothing at all.
    let closed = job(JobState::Closed, ACME);
    assert!(JOB.available(&admin, &closed).is_empty());
}

#[test]
fn published_job_offers_only_pause_and_close() {
    let all = &["JOB_SUBMIT", "JOB_VERIFY", "JOB_ENRICH", "JOB_APPROVE", "JOB_PUBLISH"];
    let admin = actor(Role::SuperAdmin, ACME, all);
    let published = job(JobState::Published, ACME);

    let offered: Vec<&str> = JOB
        .available(&admin, &published)
        .iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(offered, vec!["pause", "close"]);
    assert_eq!(JOB.rule("pause").unwrap().to, JobState::Paused);
    assert_eq!(JOB.rule("close").unwrap().to, JobState::Closed);
}

#[test]
fn draft_self_verification_needs_no_permission() {
    let vendor = actor(Role::Vendor, ACME, &[]);
    assert!(JOB.can_apply(&vendor, &job(JobState::Draft, ACME), "verify"));
    // Self-service covers the organization's own drafts only.
    assert!(!JOB.can_apply(&vendor, &job(JobState::Draft, OTHER), "verify"));
    // And drafts only — a submitted job needs the real permission.
    assert!(!JOB.can_apply(&vendor, &job(JobState::Submitted, ACME), "verify"));
}

#[test]
fn no_backward_path_except_resume() {
    let hr = actor(Role::HrAdmin, ACME, &["JOB_PUBLISH"]);
    let paused = job(JobState::Paused, ACME);

    let offered: Vec<&str> = JOB.available(&hr, &paused).iter().map(|r| r.name).collect();
    assert_eq!(offered, vec!["resume"]);
    assert_eq!(JOB.rule("resume").unwrap().to, JobState::Published);
}

// --- Applications ---

#[test]
fn internal_roles_drive_the_pipeline_vendors_only_withdraw() {
    let subject = Subject {
        state: ApplicationState::Shortlisted,
        owning_org: Some(ACME),
    };

    let ta = actor(Role::Ta, OTHER, &[]);
    assert!(can_update_status(&ta, &subject, ApplicationState::InterviewScheduled));
    assert!(can_update_status(&ta, &subject, ApplicationState::Rejected));

    let vendor = actor(Role::Vendor, ACME, &[]);
    assert_eq!(
        available_statuses(&vendor, &subject),
        vec![ApplicationState::Dropped]
    );

    let stranger = actor(Role::Vendor, OTHER, &[]);
    assert!(available_statuses(&stranger, &subject).is_empty());
}

#[test]
fn decision_is_for_stakeholders_and_lands_on_offered_or_rejected() {
    assert!(can_decide(&actor(Role::Employee, ACME, &[])));
    assert!(can_decide(&actor(Role::SuperAdmin, ACME, &[])));
    assert!(!can_decide(&actor(Role::Vendor, ACME, &[])));

    assert_eq!(decision_target(true), ApplicationState::Offered);
    assert_eq!(decision_target(false), ApplicationState::Rejected);
}

// --- Organizations ---

fn org(state: OrgState) -> Subject<OrgState> {
    Subject {
        state,
        owning_org: Some(ACME),
    }
}

#[test]
fn pending_vendor_is_resolved_by_admins() {
    let hr = actor(Role::HrAdmin, 1, &[]);
    let pending = org(OrgState::PendingVerification);

    let offered: Vec<&str> = ORG.available(&hr, &pending).iter().map(|r| r.name).collect();
    assert_eq!(offered, vec!["approve", "reject"]);

    let ta = actor(Role::Ta, 1, &[]);
    assert!(ORG.available(&ta, &pending).is_empty());
}

#[test]
fn rejected_org_never_returns_to_approved() {
    let owner = actor(Role::SuperAdmin, 1, &[]);
    let rejected = org(OrgState::Rejected);

    assert!(ORG.available(&owner, &rejected).is_empty());
    assert!(!ORG.can_apply(&owner, &rejected, "approve"));
    assert!(!ORG.can_apply(&owner, &rejected, "activate"));
}

#[test]
fn activation_toggles_are_owner_only() {
    let owner = actor(Role::SuperAdmin, 1, &[]);
    let hr = actor(Role::HrAdmin, 1, &[]);

    assert!(ORG.can_apply(&owner, &org(OrgState::Approved), "activate"));
    assert!(ORG.can_apply(&owner, &org(OrgState::Active), "deactivate"));
    assert!(ORG.can_apply(&owner, &org(OrgState::Inactive), "activate"));
    assert!(!ORG.can_apply(&hr, &org(OrgState::Approved), "activate"));
}
