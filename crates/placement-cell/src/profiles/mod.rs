//! Role profiles: academic records for students, departmental records for
//! staff, and company records for recruiters.
//!
//! Student year, semester and roll numbers are derived from the academic
//! calendar on every read. The HOD and TPC-head chairs are singleton flags
//! moved atomically between staff profiles.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Course, Qualification, RecruiterProfile, StaffDesignation, StaffProfile, StudentProfile,
};
pub use repository::ProfileStore;
pub use router::profile_router;
pub use service::{
    NewRecruiterProfile, NewStaffProfile, NewStudentProfile, ProfileService, StudentView,
    UpdateStudentProfile,
};
