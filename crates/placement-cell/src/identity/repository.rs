use crate::authz::Directory;
use crate::catalog::{Language, LanguageId, Skill, SkillId};
use crate::error::PortalError;

use super::domain::{
    Address, AddressId, Email, EmailId, Link, LinkId, Phone, PhoneId, Role, User, UserId,
};

/// Persistence seam for accounts, contact records, and resume catalogs.
///
/// The first contact of each kind saved for a user becomes that user's
/// primary automatically; `set_primary_*` re-points the slot and fails with a
/// conflict when the record belongs to someone else.
pub trait IdentityStore: Directory + Send + Sync {
    fn create_user(&self, first_name: String, last_name: String, role: Role) -> User;
    fn users(&self) -> Vec<User>;
    /// Persist the record and refresh its derived fields against current
    /// profile state. Returns the refreshed row.
    fn save_user(&self, user: User) -> Result<User, PortalError>;
    /// Remove the account together with its contacts, profile, and catalog
    /// attachments. Applications it authored are detached, not deleted.
    fn delete_user(&self, id: UserId) -> Result<(), PortalError>;

    fn add_email(&self, user: UserId, address: String) -> Result<Email, PortalError>;
    fn email(&self, id: EmailId) -> Option<Email>;
    fn save_email(&self, email: Email) -> Result<(), PortalError>;
    fn delete_email(&self, id: EmailId) -> Result<(), PortalError>;
    fn emails_of(&self, user: UserId) -> Vec<Email>;
    fn set_primary_email(&self, user: UserId, email: EmailId) -> Result<(), PortalError>;

    fn add_phone(&self, user: UserId, country_code: u16, number: String)
        -> Result<Phone, PortalError>;
    fn phone(&self, id: PhoneId) -> Option<Phone>;
    fn delete_phone(&self, id: PhoneId) -> Result<(), PortalError>;
    fn phones_of(&self, user: UserId) -> Vec<Phone>;
    fn set_primary_phone(&self, user: UserId, phone: PhoneId) -> Result<(), PortalError>;

    fn add_address(&self, address: Address) -> Result<Address, PortalError>;
    fn address(&self, id: AddressId) -> Option<Address>;
    fn delete_address(&self, id: AddressId) -> Result<(), PortalError>;
    fn addresses_of(&self, user: UserId) -> Vec<Address>;
    fn set_primary_address(&self, user: UserId, address: AddressId) -> Result<(), PortalError>;

    fn add_link(&self, user: UserId, title: String, url: String) -> Result<Link, PortalError>;
    fn link(&self, id: LinkId) -> Option<Link>;
    fn delete_link(&self, id: LinkId) -> Result<(), PortalError>;
    fn links_of(&self, user: UserId) -> Vec<Link>;

    /// Attach a catalog skill by name, creating the entry when the
    /// case-insensitive name is new.
    fn add_user_skill(&self, user: UserId, name: &str) -> Result<Skill, PortalError>;
    fn remove_user_skill(&self, user: UserId, skill: SkillId) -> Result<(), PortalError>;
    fn user_skills(&self, user: UserId) -> Vec<Skill>;
    fn add_user_language(&self, user: UserId, name: &str) -> Result<Language, PortalError>;
    fn remove_user_language(&self, user: UserId, language: LanguageId)
        -> Result<(), PortalError>;
    fn user_languages(&self, user: UserId) -> Vec<Language>;
}
