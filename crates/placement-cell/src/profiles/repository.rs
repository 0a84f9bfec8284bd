use crate::authz::Directory;
use crate::error::PortalError;
use crate::identity::UserId;

use super::domain::{RecruiterProfile, StaffProfile, StudentProfile};

/// Persistence seam for role profiles and the singleton chairs.
pub trait ProfileStore: Directory + Send + Sync {
    /// Insert the profile; fails with a conflict when the user already has
    /// one or the registration number is taken.
    fn create_student_profile(
        &self,
        profile: StudentProfile,
    ) -> Result<StudentProfile, PortalError>;
    fn student(&self, user: UserId) -> Option<StudentProfile>;
    fn save_student(&self, profile: StudentProfile) -> Result<(), PortalError>;
    fn students(&self) -> Vec<StudentProfile>;
    /// Toggle CR standing. Granting it also approves the account, since a
    /// moderator vouched for the student.
    fn set_cr(&self, user: UserId, value: bool) -> Result<StudentProfile, PortalError>;

    fn create_staff_profile(&self, profile: StaffProfile) -> Result<StaffProfile, PortalError>;
    fn staff(&self, user: UserId) -> Option<StaffProfile>;
    /// Persisting a staff profile refreshes the owner's derived display
    /// names, since the doctoral flag lives here.
    fn save_staff(&self, profile: StaffProfile) -> Result<(), PortalError>;
    /// Atomically clear every HOD flag and set it on this profile. The new
    /// holder's account gains coordinator standing in the same step.
    fn set_hod(&self, user: UserId) -> Result<StaffProfile, PortalError>;
    fn set_tpc_head(&self, user: UserId) -> Result<StaffProfile, PortalError>;

    fn create_recruiter_profile(
        &self,
        profile: RecruiterProfile,
    ) -> Result<RecruiterProfile, PortalError>;
    fn recruiter(&self, user: UserId) -> Option<RecruiterProfile>;
    fn save_recruiter(&self, profile: RecruiterProfile) -> Result<(), PortalError>;
}
