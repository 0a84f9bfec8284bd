use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::{moderators, owner_or_admins, Directory, EligibleSet};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EmailId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PhoneId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AddressId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct LinkId(pub u64);

/// Portal population segments. Every account carries exactly one role for its
/// whole lifetime; the role decides which profile record accompanies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Staff,
    Recruiter,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Staff => "staff",
            Role::Recruiter => "recruiter",
        }
    }
}

/// Core account record shared by all roles.
///
/// `full_name`, `short_name` and `is_doctor` are derived and refreshed on
/// every save; callers never write them directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: Role,
    pub is_approved: bool,
    pub is_superuser: bool,
    pub is_coordinator: bool,
    pub is_doctor: bool,
    pub full_name: String,
    pub short_name: String,
    pub primary_email: Option<EmailId>,
    pub primary_phone: Option<PhoneId>,
    pub primary_address: Option<AddressId>,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId, first_name: String, last_name: String, role: Role) -> Self {
        let mut user = Self {
            id,
            first_name,
            last_name,
            bio: String::new(),
            role,
            is_approved: false,
            is_superuser: false,
            is_coordinator: false,
            is_doctor: false,
            full_name: String::new(),
            short_name: String::new(),
            primary_email: None,
            primary_phone: None,
            primary_address: None,
            date_joined: Utc::now(),
        };
        user.refresh_derived(false);
        user
    }

    /// Recompute the display names from the stored name parts. Doctoral staff
    /// get the honorific folded into both forms.
    pub fn refresh_derived(&mut self, is_doctor: bool) {
        self.is_doctor = is_doctor;
        if is_doctor {
            self.full_name = format!("Dr. {} {}", self.first_name, self.last_name);
            self.short_name = format!("Dr. {}", self.last_name);
        } else {
            self.full_name = format!("{} {}", self.first_name, self.last_name);
            self.short_name = self.first_name.clone();
        }
    }

    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(Some(self.id), dir)
    }

    /// Profile visibility: the owner plus the moderation set.
    pub fn view_users(&self, dir: &dyn Directory) -> EligibleSet {
        let mut set = moderators(dir);
        set.insert(self.id);
        set
    }

    /// Approval requires a verified primary email and is a one-way gate.
    pub fn approve_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.is_approved || !dir.primary_email_verified(self.id) {
            return EligibleSet::none();
        }
        moderators(dir)
    }

    /// Rejection removes the account and only applies before approval.
    pub fn reject_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.is_approved {
            return EligibleSet::none();
        }
        moderators(dir)
    }

    pub fn make_superuser_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.is_superuser {
            return EligibleSet::none();
        }
        dir.superusers().into_iter().collect()
    }

    /// Coordinator standing is a staff-only grant controlled by superusers and
    /// the current HOD and TPC head.
    pub fn make_coordinator_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.role != Role::Staff || !self.is_approved {
            return EligibleSet::none();
        }
        let mut set: EligibleSet = dir.superusers().into_iter().collect();
        set.extend(dir.hod_holder());
        set.extend(dir.tpc_head_holder());
        set
    }

    pub fn set_primary_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(Some(self.id), dir)
    }
}

/// Lifecycle of an email address: a fresh record is unverified, a requested
/// code stays valid until its deadline, and a matched code is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationState {
    Unverified,
    CodeSent {
        code: String,
        expires_at: DateTime<Utc>,
    },
    Verified,
}

impl VerificationState {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationState::Verified)
    }

    /// Whether `candidate` matches a still-live code.
    pub fn accepts(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        match self {
            VerificationState::CodeSent { code, expires_at } => {
                code == candidate && now <= *expires_at
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: EmailId,
    pub user: UserId,
    pub address: String,
    pub verification: VerificationState,
}

impl Email {
    /// The primary email can never be removed; demote it first.
    pub fn delete_users(&self, owner: &User, dir: &dyn Directory) -> EligibleSet {
        if owner.primary_email == Some(self.id) {
            return EligibleSet::none();
        }
        owner_or_admins(Some(self.user), dir)
    }

    /// Verification is personal: only the address owner can request or
    /// confirm a code, and a verified address never goes back.
    pub fn request_verification_users(&self) -> EligibleSet {
        if self.verification.is_verified() {
            return EligibleSet::none();
        }
        EligibleSet::only(self.user)
    }

    pub fn verify_users(&self) -> EligibleSet {
        match self.verification {
            VerificationState::CodeSent { .. } => EligibleSet::only(self.user),
            _ => EligibleSet::none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub id: PhoneId,
    pub user: UserId,
    pub country_code: u16,
    pub number: String,
}

impl Phone {
    pub fn delete_users(&self, owner: &User, dir: &dyn Directory) -> EligibleSet {
        if owner.primary_phone == Some(self.id) {
            return EligibleSet::none();
        }
        owner_or_admins(Some(self.user), dir)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user: UserId,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: u32,
}

impl Address {
    pub fn delete_users(&self, owner: &User, dir: &dyn Directory) -> EligibleSet {
        if owner.primary_address == Some(self.id) {
            return EligibleSet::none();
        }
        owner_or_admins(Some(self.user), dir)
    }
}

/// Resume links (GitHub, LinkedIn, portfolio pages). No primary slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub user: UserId,
    pub title: String,
    pub url: String,
}

impl Link {
    pub fn delete_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(Some(self.user), dir)
    }
}
