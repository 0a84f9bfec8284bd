//! Accounts, contact books, and email verification.
//!
//! Every portal participant is a [`User`] with one fixed [`Role`]. Contact
//! records (emails, phones, addresses, links) hang off the account, with an
//! exactly-one-primary rule per kind enforced by the store. Email addresses
//! carry a verification lifecycle that gates account approval.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Address, AddressId, Email, EmailId, Link, LinkId, Phone, PhoneId, Role, User, UserId,
    VerificationState,
};
pub use repository::IdentityStore;
pub use router::identity_router;
pub use service::{IdentityService, NewAddress, RegisterUser, UpdateUser};
