//! Declarative transition rules and their evaluation.
//!
//! A [`Rule`] composes three independent checks, all of which must pass:
//!
//! 1. state — the entity's current state matches the rule's source;
//! 2. authorization — the actor's role is in the rule's role set (when
//!    restricted) and the actor holds the rule's permission code (when
//!    one is attached);
//! 3. organization affinity — for org-scoped rules, the actor's
//!    organization owns the entity.
//!
//! The one documented exception: a rule may name a `self_org_from` state
//! from which the owning organization passes the permission check without
//! holding the code. This is an OR with the permission lookup, not an
//! AND — it models self-service review of an organization's own drafts.
//!
//! Evaluation is total: it never panics, never errors, and an unknown
//! transition name simply evaluates to "not allowed". A denial here is
//! advisory — handlers still apply the state-checked update that is the
//! final authority.

use super::{Actor, Role};

/// The entity fields a rule inspects: current state and owning
/// organization. `owning_org` is `None` for internal entities.
#[derive(Debug, Clone, Copy)]
pub struct Subject<S> {
    pub state: S,
    pub owning_org: Option<i64>,
}

/// Source-state requirement of a rule.
#[derive(Debug, Clone, Copy)]
pub enum Source<S: 'static> {
    Exact(S),
    OneOf(&'static [S]),
    Any,
}

impl<S: Copy + PartialEq> Source<S> {
    pub fn matches(&self, state: S) -> bool {
        match self {
            Source::Exact(s) => *s == state,
            Source::OneOf(set) => set.contains(&state),
            Source::Any => true,
        }
    }
}

/// A single named transition in a lifecycle table.
#[derive(Debug, Clone, Copy)]
pub struct Rule<S: 'static> {
    pub name: &'static str,
    pub from: Source<S>,
    pub to: S,
    /// Permission code the actor must hold, if any.
    pub permission: Option<&'static str>,
    /// Roles allowed to apply this transition, if restricted.
    pub roles: Option<&'static [Role]>,
    /// Whether the actor's organization must own the entity.
    pub org_scoped: bool,
    /// Source state from which the owning organization may act without
    /// holding `permission`.
    pub self_org_from: Option<S>,
}

impl<S: Copy + PartialEq> Rule<S> {
    fn state_ok(&self, subject: &Subject<S>) -> bool {
        self.from.matches(subject.state)
    }

    fn authorized(&self, actor: &Actor, subject: &Subject<S>) -> bool {
        if let Some(roles) = self.roles {
            if !roles.contains(&actor.role) {
                return false;
            }
        }
        match self.permission {
            None => true,
            Some(code) => {
                actor.permissions.has(code)
                    || self
                        .self_org_from
                        .is_some_and(|from| subject.state == from && actor.owns(subject.owning_org))
            }
        }
    }

    fn org_ok(&self, actor: &Actor, subject: &Subject<S>) -> bool {
        !self.org_scoped || actor.owns(subject.owning_org)
    }

    /// True when all three checks pass for this actor and entity.
    pub fn allows(&self, actor: &Actor, subject: &Subject<S>) -> bool {
        self.state_ok(subject) && self.authorized(actor, subject) && self.org_ok(actor, subject)
    }
}

/// A lifecycle: the full transition table for one entity kind.
#[derive(Debug)]
pub struct Lifecycle<S: 'static> {
    pub entity: &'static str,
    pub rules: &'static [Rule<S>],
}

impl<S: Copy + PartialEq> Lifecycle<S> {
    /// Look up a rule by transition name.
    pub fn rule(&self, name: &str) -> Option<&'static Rule<S>> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Total predicate: may `actor` apply the named transition to this
    /// entity right now? Unknown names are simply not allowed.
    pub fn can_apply(&self, actor: &Actor, subject: &Subject<S>, name: &str) -> bool {
        self.rule(name).is_some_and(|r| r.allows(actor, subject))
    }

    /// All transitions whose guard currently passes, in table order.
    /// List views render exactly this — the rule lives here, nowhere else.
    pub fn available(&self, actor: &Actor, subject: &Subject<S>) -> Vec<&'static Rule<S>> {
        self.rules.iter().filter(|r| r.allows(actor, subject)).collect()
    }
}
