//! The recruitment workflow: posts, applications, and the reviewer's
//! applicant table.
//!
//! Post activity is derived from the deadline alone. Application statuses
//! form a small state machine: pending fans out to its three outcomes and
//! every outcome can only be walked back to pending, never sideways.

pub mod domain;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ApplicationId, ApplicationStatus, JobType, OutcomeInstructions, PostId,
    RecruitmentApplication, RecruitmentPost, SalaryType, StartDate, WorkplaceType,
};
pub use ranking::{skill_overlap, ApplicantFilter, ApplicantSort, ApplicantSummary};
pub use repository::RecruitmentStore;
pub use router::recruitment_router;
pub use service::{
    ApplicationOutcome, DashboardSummary, NewApplication, PostPayload, RecruitmentService,
};
