//! Core library of the training and placement cell portal.
//!
//! The portal is organised as five domain modules, each with its own
//! domain types, store trait, generic service, and axum router:
//!
//! - [`identity`]: accounts, roles, contact books, email verification
//! - [`profiles`]: student, staff, and recruiter profiles and chair roles
//! - [`academics`]: report cards, templates, and derived academic standing
//! - [`recruitment`]: posts, applications, and the selection workflow
//! - [`board`]: announcements, quotes, and the public contact form
//!
//! Services are generic over store traits so HTTP handlers and tests share
//! the same code paths. [`store::MemoryStore`] implements every trait behind
//! a single mutex.

pub mod academics;
pub mod authz;
pub mod board;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod mailer;
pub mod profiles;
pub mod recruitment;
pub mod settings;
pub mod store;
pub mod telemetry;

pub use authz::{Action, Directory, EligibleSet};
pub use error::PortalError;
pub use store::MemoryStore;
