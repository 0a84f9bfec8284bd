use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::academics::AcademicCalendar;
use crate::authz::Action;
use crate::dispatch::{authorize, resolve, Validator};
use crate::error::PortalError;
use crate::identity::{Role, UserId};
use crate::settings::SettingsStore;

use super::domain::{
    Course, Qualification, RecruiterProfile, StaffDesignation, StaffProfile, StudentProfile,
};
use super::repository::ProfileStore;

#[derive(Debug, Clone, Deserialize)]
pub struct NewStudentProfile {
    pub registration_number: u64,
    pub course: Course,
    pub id_number: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStudentProfile {
    pub course: Course,
    pub id_number: u16,
    pub dropped_out: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStaffProfile {
    pub qualification: Qualification,
    pub designation: StaffDesignation,
    #[serde(default)]
    pub id_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecruiterProfile {
    pub company_name: String,
    pub designation: String,
}

/// Student profile plus its calendar-derived fields, recomputed per request.
#[derive(Debug, Clone, Serialize)]
pub struct StudentView {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub year: u32,
    pub semester: u32,
    pub roll_number: String,
    pub id_card: String,
}

impl StudentView {
    pub fn derive(profile: StudentProfile, calendar: &AcademicCalendar) -> Self {
        let year = profile.year(calendar);
        let semester = profile.semester(calendar);
        let roll_number = profile.roll_number(calendar);
        let id_card = profile.id_card();
        Self {
            profile,
            year,
            semester,
            roll_number,
            id_card,
        }
    }
}

/// Role-profile lifecycle plus the singleton departmental chairs.
pub struct ProfileService<S> {
    store: Arc<S>,
    settings: Arc<dyn SettingsStore>,
}

impl<S> ProfileService<S>
where
    S: ProfileStore + 'static,
{
    pub fn new(store: Arc<S>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { store, settings }
    }

    fn calendar(&self, today: NaiveDate) -> AcademicCalendar {
        AcademicCalendar::current(self.settings.as_ref(), today)
    }

    pub fn create_student(
        &self,
        actor: UserId,
        user: UserId,
        payload: NewStudentProfile,
    ) -> Result<StudentProfile, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(
            owner.role == Role::Student,
            "user",
            "profile requires a student account",
        );
        validator.require(
            (10_000_000_000..=99_999_999_999).contains(&payload.registration_number),
            "registration_number",
            "must be an eleven digit number",
        );
        validator.require(payload.id_number > 0, "id_number", "must be positive");
        validator.finish()?;

        let profile = self.store.create_student_profile(StudentProfile::new(
            user,
            payload.registration_number,
            payload.course,
            payload.id_number,
        ))?;
        info!(user = %user, registration = profile.registration_number, "created student profile");
        Ok(profile)
    }

    pub fn student_view(
        &self,
        actor: UserId,
        user: UserId,
        today: NaiveDate,
    ) -> Result<StudentView, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        let profile = resolve(self.store.student(user), "student profile", user.0)?;
        authorize(&owner.view_users(self.store.as_ref()), actor, Action::View)?;
        Ok(StudentView::derive(profile, &self.calendar(today)))
    }

    /// Roster of approved students with derived fields.
    pub fn list_students(&self, today: NaiveDate) -> Vec<StudentView> {
        let calendar = self.calendar(today);
        self.store
            .students()
            .into_iter()
            .filter(|profile| {
                self.store
                    .user(profile.user)
                    .map(|user| user.is_approved)
                    .unwrap_or(false)
            })
            .map(|profile| StudentView::derive(profile, &calendar))
            .collect()
    }

    pub fn update_student(
        &self,
        actor: UserId,
        user: UserId,
        payload: UpdateStudentProfile,
    ) -> Result<StudentProfile, PortalError> {
        let mut profile = resolve(self.store.student(user), "student profile", user.0)?;
        authorize(&profile.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(payload.id_number > 0, "id_number", "must be positive");
        validator.finish()?;

        profile.course = payload.course;
        profile.id_number = payload.id_number;
        profile.dropped_out = payload.dropped_out;
        self.store.save_student(profile.clone())?;
        Ok(profile)
    }

    /// Toggle CR standing. Granting it approves the account in the same
    /// step.
    pub fn make_cr(&self, actor: UserId, user: UserId) -> Result<StudentProfile, PortalError> {
        let profile = resolve(self.store.student(user), "student profile", user.0)?;
        authorize(&profile.make_cr_users(self.store.as_ref()), actor, Action::MakeCr)?;
        let profile = self.store.set_cr(user, !profile.is_cr)?;
        info!(user = %user, cr = profile.is_cr, by = %actor, "changed CR standing");
        Ok(profile)
    }

    pub fn create_staff(
        &self,
        actor: UserId,
        user: UserId,
        payload: NewStaffProfile,
    ) -> Result<StaffProfile, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(
            owner.role == Role::Staff,
            "user",
            "profile requires a staff account",
        );
        validator.finish()?;

        let mut profile = StaffProfile::new(user, payload.qualification, payload.designation);
        profile.id_number = payload.id_number;
        self.store.create_staff_profile(profile)
    }

    pub fn get_staff(&self, actor: UserId, user: UserId) -> Result<StaffProfile, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        let profile = resolve(self.store.staff(user), "staff profile", user.0)?;
        authorize(&owner.view_users(self.store.as_ref()), actor, Action::View)?;
        Ok(profile)
    }

    pub fn update_staff(
        &self,
        actor: UserId,
        user: UserId,
        payload: NewStaffProfile,
    ) -> Result<StaffProfile, PortalError> {
        let mut profile = resolve(self.store.staff(user), "staff profile", user.0)?;
        authorize(&profile.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        profile.qualification = payload.qualification;
        profile.designation = payload.designation;
        profile.id_number = payload.id_number;
        self.store.save_staff(profile.clone())?;
        Ok(profile)
    }

    /// Move the HOD chair to this staff member, unseating any previous
    /// holder in the same step.
    pub fn make_hod(&self, actor: UserId, user: UserId) -> Result<StaffProfile, PortalError> {
        let profile = resolve(self.store.staff(user), "staff profile", user.0)?;
        authorize(&profile.make_hod_users(self.store.as_ref()), actor, Action::MakeHod)?;
        let profile = self.store.set_hod(user)?;
        info!(user = %user, by = %actor, "assigned HOD chair");
        Ok(profile)
    }

    pub fn make_tpc_head(&self, actor: UserId, user: UserId) -> Result<StaffProfile, PortalError> {
        let profile = resolve(self.store.staff(user), "staff profile", user.0)?;
        authorize(
            &profile.make_tpc_head_users(self.store.as_ref()),
            actor,
            Action::MakeTpcHead,
        )?;
        let profile = self.store.set_tpc_head(user)?;
        info!(user = %user, by = %actor, "assigned TPC-head chair");
        Ok(profile)
    }

    pub fn create_recruiter(
        &self,
        actor: UserId,
        user: UserId,
        payload: NewRecruiterProfile,
    ) -> Result<RecruiterProfile, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        authorize(&owner.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(
            owner.role == Role::Recruiter,
            "user",
            "profile requires a recruiter account",
        );
        validator.require_non_empty(&payload.company_name, "company_name");
        validator.finish()?;

        self.store.create_recruiter_profile(RecruiterProfile {
            user,
            company_name: payload.company_name,
            designation: payload.designation,
        })
    }

    pub fn get_recruiter(
        &self,
        actor: UserId,
        user: UserId,
    ) -> Result<RecruiterProfile, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        let profile = resolve(self.store.recruiter(user), "recruiter profile", user.0)?;
        authorize(&owner.view_users(self.store.as_ref()), actor, Action::View)?;
        Ok(profile)
    }

    pub fn update_recruiter(
        &self,
        actor: UserId,
        user: UserId,
        payload: NewRecruiterProfile,
    ) -> Result<RecruiterProfile, PortalError> {
        let mut profile = resolve(self.store.recruiter(user), "recruiter profile", user.0)?;
        authorize(&profile.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require_non_empty(&payload.company_name, "company_name");
        validator.finish()?;

        profile.company_name = payload.company_name;
        profile.designation = payload.designation;
        self.store.save_recruiter(profile.clone())?;
        Ok(profile)
    }
}
