//! Eligible-actor computation.
//!
//! Every mutating operation is gated by a per-instance set of users computed
//! fresh against current state, not by a static role check. An empty set
//! doubles as "this action is not valid for the entity right now", which is
//! also what drives [`Action`] exposure to presentation layers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::identity::{User, UserId};
use crate::profiles::Course;

/// Read-only lookups the predicates need beyond the entity itself.
pub trait Directory {
    fn user(&self, id: UserId) -> Option<User>;
    fn superusers(&self) -> Vec<UserId>;
    fn coordinators(&self) -> Vec<UserId>;
    /// User currently holding the singleton HOD flag, if any.
    fn hod_holder(&self) -> Option<UserId>;
    /// User currently holding the singleton TPC-head flag, if any.
    fn tpc_head_holder(&self) -> Option<UserId>;
    /// Class representatives enrolled in the given course.
    fn course_crs(&self, course: Course) -> Vec<UserId>;
    fn primary_email_verified(&self, user: UserId) -> bool;
}

/// Deduplicated set of users allowed to perform one action on one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibleSet(BTreeSet<UserId>);

impl EligibleSet {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn only(user: UserId) -> Self {
        let mut set = Self::default();
        set.insert(user);
        set
    }

    pub fn insert(&mut self, user: UserId) {
        self.0.insert(user);
    }

    pub fn extend(&mut self, users: impl IntoIterator<Item = UserId>) {
        self.0.extend(users);
    }

    pub fn remove(&mut self, user: UserId) {
        self.0.remove(&user);
    }

    pub fn allows(&self, actor: UserId) -> bool {
        self.0.contains(&actor)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<UserId> for EligibleSet {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The canonical ownership pattern: a superuser owner stands alone, any other
/// owner shares the action with all superusers.
pub fn owner_or_admins(owner: Option<UserId>, dir: &dyn Directory) -> EligibleSet {
    match owner.and_then(|id| dir.user(id)) {
        Some(user) if user.is_superuser => EligibleSet::only(user.id),
        Some(user) => {
            let mut set: EligibleSet = dir.superusers().into_iter().collect();
            set.insert(user.id);
            set
        }
        None => dir.superusers().into_iter().collect(),
    }
}

/// Superusers plus coordinators, the moderation actor set.
pub fn moderators(dir: &dyn Directory) -> EligibleSet {
    let mut set: EligibleSet = dir.superusers().into_iter().collect();
    set.extend(dir.coordinators());
    set
}

/// Lifecycle transitions exposed through `eligible_actions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Edit,
    Delete,
    Approve,
    Reject,
    MakeSuperuser,
    MakeCoordinator,
    MakeCr,
    MakeHod,
    MakeTpcHead,
    SetPrimary,
    RequestVerification,
    VerifyEmail,
    AddSkill,
    RemoveSkill,
    Apply,
    SelectApplication,
    RejectApplication,
    ShortlistApplication,
    ResetApplication,
    AddUpdate,
}

impl Action {
    pub const fn label(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::MakeSuperuser => "make_superuser",
            Action::MakeCoordinator => "make_coordinator",
            Action::MakeCr => "make_cr",
            Action::MakeHod => "make_hod",
            Action::MakeTpcHead => "make_tpc_head",
            Action::SetPrimary => "set_primary",
            Action::RequestVerification => "request_verification",
            Action::VerifyEmail => "verify_email",
            Action::AddSkill => "add_skill",
            Action::RemoveSkill => "remove_skill",
            Action::Apply => "apply",
            Action::SelectApplication => "select_application",
            Action::RejectApplication => "reject_application",
            Action::ShortlistApplication => "shortlist_application",
            Action::ResetApplication => "reset_application",
            Action::AddUpdate => "add_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;

    struct StubDirectory {
        users: Vec<User>,
    }

    impl Directory for StubDirectory {
        fn user(&self, id: UserId) -> Option<User> {
            self.users.iter().find(|user| user.id == id).cloned()
        }

        fn superusers(&self) -> Vec<UserId> {
            self.users
                .iter()
                .filter(|user| user.is_superuser)
                .map(|user| user.id)
                .collect()
        }

        fn coordinators(&self) -> Vec<UserId> {
            self.users
                .iter()
                .filter(|user| user.is_coordinator)
                .map(|user| user.id)
                .collect()
        }

        fn hod_holder(&self) -> Option<UserId> {
            None
        }

        fn tpc_head_holder(&self) -> Option<UserId> {
            None
        }

        fn course_crs(&self, _course: Course) -> Vec<UserId> {
            Vec::new()
        }

        fn primary_email_verified(&self, _user: UserId) -> bool {
            true
        }
    }

    fn user(id: u64, role: Role, superuser: bool) -> User {
        let mut user = User::new(UserId(id), "A".into(), "B".into(), role);
        user.is_superuser = superuser;
        user
    }

    #[test]
    fn superuser_owner_stands_alone() {
        let dir = StubDirectory {
            users: vec![
                user(1, Role::Staff, true),
                user(2, Role::Staff, true),
                user(3, Role::Student, false),
            ],
        };
        let set = owner_or_admins(Some(UserId(1)), &dir);
        assert_eq!(set.len(), 1);
        assert!(set.allows(UserId(1)));
        assert!(!set.allows(UserId(2)));
    }

    #[test]
    fn plain_owner_shares_with_all_superusers() {
        let dir = StubDirectory {
            users: vec![
                user(1, Role::Staff, true),
                user(2, Role::Staff, true),
                user(3, Role::Student, false),
            ],
        };
        let set = owner_or_admins(Some(UserId(3)), &dir);
        assert_eq!(set.len(), 3);
        assert!(set.allows(UserId(3)));
        assert!(set.allows(UserId(1)));
    }

    #[test]
    fn orphaned_entity_falls_back_to_superusers() {
        let dir = StubDirectory {
            users: vec![user(1, Role::Staff, true), user(3, Role::Student, false)],
        };
        let set = owner_or_admins(None, &dir);
        assert!(set.allows(UserId(1)));
        assert!(!set.allows(UserId(3)));
    }
}
