use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::authz::Action;
use crate::catalog::{Language, LanguageId, Skill, SkillId};
use crate::config::VerificationConfig;
use crate::dispatch::{authorize, resolve, Validator};
use crate::error::PortalError;
use crate::mailer::VerificationMailer;

use super::domain::{
    Address, AddressId, Email, EmailId, Link, LinkId, Phone, PhoneId, Role, User, UserId,
    VerificationState,
};
use super::repository::IdentityStore;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: u32,
}

/// Account and contact-book operations.
///
/// Every mutation follows the same pipeline: resolve the target, compute the
/// eligible set fresh, authorize the actor, validate the payload, then write.
pub struct IdentityService<S, M> {
    store: Arc<S>,
    mailer: Arc<M>,
    code_ttl: Duration,
}

impl<S, M> IdentityService<S, M>
where
    S: IdentityStore + 'static,
    M: VerificationMailer + 'static,
{
    pub fn new(store: Arc<S>, mailer: Arc<M>, config: &VerificationConfig) -> Self {
        Self {
            store,
            mailer,
            code_ttl: Duration::minutes(config.ttl_minutes),
        }
    }

    /// Self-registration. Accounts start unapproved and invisible to the
    /// recruitment surfaces until a moderator approves them.
    pub fn register(&self, payload: RegisterUser) -> Result<User, PortalError> {
        let mut validator = Validator::new();
        validator.require_non_empty(&payload.first_name, "first_name");
        validator.require_non_empty(&payload.last_name, "last_name");
        validator.finish()?;

        let user = self.store.create_user(
            payload.first_name.trim().to_string(),
            payload.last_name.trim().to_string(),
            payload.role,
        );
        info!(user = %user.id, role = payload.role.label(), "registered account");
        Ok(user)
    }

    pub fn get_user(&self, actor: UserId, id: UserId) -> Result<User, PortalError> {
        let user = resolve(self.store.user(id), "user", id.0)?;
        authorize(&user.view_users(self.store.as_ref()), actor, Action::View)?;
        Ok(user)
    }

    /// Directory listing: moderators see every account, everyone else only
    /// the approved ones.
    pub fn list_users(&self, actor: UserId) -> Vec<User> {
        let moderating = crate::authz::moderators(self.store.as_ref()).allows(actor);
        self.store
            .users()
            .into_iter()
            .filter(|user| moderating || user.is_approved || user.id == actor)
            .collect()
    }

    pub fn update_user(
        &self,
        actor: UserId,
        id: UserId,
        payload: UpdateUser,
    ) -> Result<User, PortalError> {
        let mut user = resolve(self.store.user(id), "user", id.0)?;
        authorize(&user.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require_non_empty(&payload.first_name, "first_name");
        validator.require_non_empty(&payload.last_name, "last_name");
        validator.finish()?;

        user.first_name = payload.first_name.trim().to_string();
        user.last_name = payload.last_name.trim().to_string();
        user.bio = payload.bio;
        self.store.save_user(user)
    }

    pub fn approve(&self, actor: UserId, id: UserId) -> Result<User, PortalError> {
        let mut user = resolve(self.store.user(id), "user", id.0)?;
        authorize(&user.approve_users(self.store.as_ref()), actor, Action::Approve)?;
        user.is_approved = true;
        let user = self.store.save_user(user)?;
        info!(user = %user.id, by = %actor, "approved account");
        Ok(user)
    }

    /// Rejection deletes the unapproved account outright.
    pub fn reject(&self, actor: UserId, id: UserId) -> Result<(), PortalError> {
        let user = resolve(self.store.user(id), "user", id.0)?;
        authorize(&user.reject_users(self.store.as_ref()), actor, Action::Reject)?;
        self.store.delete_user(id)?;
        info!(user = %id, by = %actor, "rejected and removed account");
        Ok(())
    }

    pub fn make_superuser(&self, actor: UserId, id: UserId) -> Result<User, PortalError> {
        let mut user = resolve(self.store.user(id), "user", id.0)?;
        authorize(
            &user.make_superuser_users(self.store.as_ref()),
            actor,
            Action::MakeSuperuser,
        )?;
        user.is_superuser = true;
        self.store.save_user(user)
    }

    /// Toggle coordinator standing on an approved staff account.
    pub fn make_coordinator(&self, actor: UserId, id: UserId) -> Result<User, PortalError> {
        let mut user = resolve(self.store.user(id), "user", id.0)?;
        authorize(
            &user.make_coordinator_users(self.store.as_ref()),
            actor,
            Action::MakeCoordinator,
        )?;
        user.is_coordinator = !user.is_coordinator;
        self.store.save_user(user)
    }

    /// Dynamic menu support: which lifecycle transitions this actor can
    /// currently perform on this account.
    pub fn user_actions(&self, actor: UserId, id: UserId) -> Result<BTreeSet<Action>, PortalError> {
        let user = resolve(self.store.user(id), "user", id.0)?;
        let dir = self.store.as_ref();
        let mut actions = BTreeSet::new();
        for (action, set) in [
            (Action::View, user.view_users(dir)),
            (Action::Edit, user.edit_users(dir)),
            (Action::Approve, user.approve_users(dir)),
            (Action::Reject, user.reject_users(dir)),
            (Action::MakeSuperuser, user.make_superuser_users(dir)),
            (Action::MakeCoordinator, user.make_coordinator_users(dir)),
        ] {
            if set.allows(actor) {
                actions.insert(action);
            }
        }
        Ok(actions)
    }

    pub fn add_email(
        &self,
        actor: UserId,
        user: UserId,
        address: String,
    ) -> Result<Email, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let address = address.trim().to_string();
        let mut validator = Validator::new();
        validator.require_non_empty(&address, "address");
        validator.require(
            address.contains('@') && !address.starts_with('@') && !address.ends_with('@'),
            "address",
            "must be a valid email address",
        );
        validator.finish()?;

        self.store.add_email(user, address)
    }

    pub fn delete_email(&self, actor: UserId, id: EmailId) -> Result<(), PortalError> {
        let email = resolve(self.store.email(id), "email", id.0)?;
        let owner = resolve(self.store.user(email.user), "user", email.user.0)?;
        authorize(
            &email.delete_users(&owner, self.store.as_ref()),
            actor,
            Action::Delete,
        )?;
        self.store.delete_email(id)
    }

    pub fn set_primary_email(
        &self,
        actor: UserId,
        user: UserId,
        id: EmailId,
    ) -> Result<(), PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(
            &owner.set_primary_users(self.store.as_ref()),
            actor,
            Action::SetPrimary,
        )?;
        resolve(self.store.email(id), "email", id.0)?;
        self.store.set_primary_email(user, id)
    }

    /// Issue a fresh six-digit code and mail it. Re-requesting replaces any
    /// pending code.
    pub fn request_verification(
        &self,
        actor: UserId,
        id: EmailId,
        now: DateTime<Utc>,
    ) -> Result<Email, PortalError> {
        let mut email = resolve(self.store.email(id), "email", id.0)?;
        authorize(
            &email.request_verification_users(),
            actor,
            Action::RequestVerification,
        )?;

        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        email.verification = VerificationState::CodeSent {
            code: code.clone(),
            expires_at: now + self.code_ttl,
        };
        self.mailer.send_code(&email.address, &code)?;
        self.store.save_email(email.clone())?;
        info!(email = %email.address, "sent verification code");
        Ok(email)
    }

    pub fn verify_email(
        &self,
        actor: UserId,
        id: EmailId,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Email, PortalError> {
        let mut email = resolve(self.store.email(id), "email", id.0)?;
        authorize(&email.verify_users(), actor, Action::VerifyEmail)?;

        if !email.verification.accepts(code, now) {
            return Err(PortalError::conflict("verification code invalid or expired"));
        }
        email.verification = VerificationState::Verified;
        self.store.save_email(email.clone())?;
        info!(email = %email.address, "verified address");
        Ok(email)
    }

    pub fn emails_of(&self, actor: UserId, user: UserId) -> Result<Vec<Email>, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.view_users(self.store.as_ref()), actor, Action::View)?;
        Ok(self.store.emails_of(user))
    }

    pub fn add_phone(
        &self,
        actor: UserId,
        user: UserId,
        country_code: u16,
        number: String,
    ) -> Result<Phone, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let number = number.trim().to_string();
        let mut validator = Validator::new();
        validator.require_non_empty(&number, "number");
        validator.require(
            number.chars().all(|c| c.is_ascii_digit()),
            "number",
            "must contain only digits",
        );
        validator.require(country_code > 0, "country_code", "must be positive");
        validator.finish()?;

        self.store.add_phone(user, country_code, number)
    }

    pub fn delete_phone(&self, actor: UserId, id: PhoneId) -> Result<(), PortalError> {
        let phone = resolve(self.store.phone(id), "phone", id.0)?;
        let owner = resolve(self.store.user(phone.user), "user", phone.user.0)?;
        authorize(
            &phone.delete_users(&owner, self.store.as_ref()),
            actor,
            Action::Delete,
        )?;
        self.store.delete_phone(id)
    }

    pub fn set_primary_phone(
        &self,
        actor: UserId,
        user: UserId,
        id: PhoneId,
    ) -> Result<(), PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(
            &owner.set_primary_users(self.store.as_ref()),
            actor,
            Action::SetPrimary,
        )?;
        resolve(self.store.phone(id), "phone", id.0)?;
        self.store.set_primary_phone(user, id)
    }

    pub fn add_address(
        &self,
        actor: UserId,
        user: UserId,
        payload: NewAddress,
    ) -> Result<Address, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require_non_empty(&payload.address, "address");
        validator.require_non_empty(&payload.city, "city");
        validator.require_non_empty(&payload.country, "country");
        validator.finish()?;

        self.store.add_address(Address {
            id: AddressId(0),
            user,
            address: payload.address,
            city: payload.city,
            state: payload.state,
            country: payload.country,
            pincode: payload.pincode,
        })
    }

    pub fn delete_address(&self, actor: UserId, id: AddressId) -> Result<(), PortalError> {
        let address = resolve(self.store.address(id), "address", id.0)?;
        let owner = resolve(self.store.user(address.user), "user", address.user.0)?;
        authorize(
            &address.delete_users(&owner, self.store.as_ref()),
            actor,
            Action::Delete,
        )?;
        self.store.delete_address(id)
    }

    pub fn set_primary_address(
        &self,
        actor: UserId,
        user: UserId,
        id: AddressId,
    ) -> Result<(), PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(
            &owner.set_primary_users(self.store.as_ref()),
            actor,
            Action::SetPrimary,
        )?;
        resolve(self.store.address(id), "address", id.0)?;
        self.store.set_primary_address(user, id)
    }

    pub fn add_link(
        &self,
        actor: UserId,
        user: UserId,
        title: String,
        url: String,
    ) -> Result<Link, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require_non_empty(&title, "title");
        validator.require(
            url.starts_with("http://") || url.starts_with("https://"),
            "url",
            "must be an absolute http(s) url",
        );
        validator.finish()?;

        self.store.add_link(user, title, url)
    }

    pub fn delete_link(&self, actor: UserId, id: LinkId) -> Result<(), PortalError> {
        let link = resolve(self.store.link(id), "link", id.0)?;
        authorize(
            &link.delete_users(self.store.as_ref()),
            actor,
            Action::Delete,
        )?;
        self.store.delete_link(id)
    }

    pub fn add_skill(
        &self,
        actor: UserId,
        user: UserId,
        name: &str,
    ) -> Result<Skill, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::AddSkill)?;

        let mut validator = Validator::new();
        validator.require_non_empty(name, "name");
        validator.finish()?;

        self.store.add_user_skill(user, name)
    }

    pub fn remove_skill(
        &self,
        actor: UserId,
        user: UserId,
        skill: SkillId,
    ) -> Result<(), PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(
            &owner.edit_users(self.store.as_ref()),
            actor,
            Action::RemoveSkill,
        )?;
        self.store.remove_user_skill(user, skill)
    }

    pub fn skills_of(&self, user: UserId) -> Result<Vec<Skill>, PortalError> {
        resolve(self.store.user(user), "user", user.0)?;
        Ok(self.store.user_skills(user))
    }

    pub fn add_language(
        &self,
        actor: UserId,
        user: UserId,
        name: &str,
    ) -> Result<Language, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::AddSkill)?;

        let mut validator = Validator::new();
        validator.require_non_empty(name, "name");
        validator.finish()?;

        self.store.add_user_language(user, name)
    }

    pub fn remove_language(
        &self,
        actor: UserId,
        user: UserId,
        language: LanguageId,
    ) -> Result<(), PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(
            &owner.edit_users(self.store.as_ref()),
            actor,
            Action::RemoveSkill,
        )?;
        self.store.remove_user_language(user, language)
    }

    pub fn languages_of(&self, user: UserId) -> Result<Vec<Language>, PortalError> {
        resolve(self.store.user(user), "user", user.0)?;
        Ok(self.store.user_languages(user))
    }
}
