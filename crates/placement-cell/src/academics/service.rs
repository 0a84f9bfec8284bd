use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::authz::{moderators, Action};
use crate::dispatch::{authorize, resolve, Validator};
use crate::error::PortalError;
use crate::identity::UserId;
use crate::profiles::{Course, StudentProfile};
use crate::settings::SettingsStore;

use super::calendar::AcademicCalendar;
use super::report_card::{SemesterReportCard, SemesterReportCardTemplate, Subject};
use super::repository::AcademicsStore;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReportCard {
    pub year_of_exam: i32,
    pub subjects: Vec<Subject>,
    pub is_complete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ManualCgpa {
    pub cgpa: f64,
    pub backlog_count: u32,
    pub passed_semesters: u32,
}

/// Report-card and template operations, plus the aggregate recomputation
/// they drive.
pub struct AcademicsService<S> {
    store: Arc<S>,
    settings: Arc<dyn SettingsStore>,
}

impl<S> AcademicsService<S>
where
    S: AcademicsStore + 'static,
{
    pub fn new(store: Arc<S>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { store, settings }
    }

    fn calendar(&self, today: NaiveDate) -> AcademicCalendar {
        AcademicCalendar::current(self.settings.as_ref(), today)
    }

    /// Card editing is open to the student and the moderation set.
    fn card_editors(&self, owner: UserId) -> crate::authz::EligibleSet {
        let mut set = moderators(self.store.as_ref());
        set.insert(owner);
        set
    }

    /// Grades for every semester up to the current one, synthesizing missing
    /// cards from the template bank on first sight.
    pub fn report_cards(
        &self,
        actor: UserId,
        user: UserId,
        today: NaiveDate,
    ) -> Result<Vec<SemesterReportCard>, PortalError> {
        let owner = resolve(self.store.user(user), "user", user.0)?;
        let profile = resolve(self.store.student(user), "student profile", user.0)?;
        authorize(&owner.view_users(self.store.as_ref()), actor, Action::View)?;

        let calendar = self.calendar(today);
        let semester = profile.semester(&calendar);
        self.store.sync_report_cards(user, semester, &calendar)
    }

    pub fn update_report_card(
        &self,
        actor: UserId,
        user: UserId,
        semester: u32,
        payload: UpdateReportCard,
        today: NaiveDate,
    ) -> Result<StudentProfile, PortalError> {
        let profile = resolve(self.store.student(user), "student profile", user.0)?;
        authorize(&self.card_editors(user), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(
            (1..=profile.course.semesters()).contains(&semester),
            "semester",
            format!("must be between 1 and {}", profile.course.semesters()),
        );
        for subject in &payload.subjects {
            validator.require_non_empty(&subject.name, "subjects.name");
            validator.require_non_empty(&subject.letter_grade, "subjects.letter_grade");
            validator.require(subject.credit > 0.0, "subjects.credit", "must be positive");
            validator.require(
                (0.0..=10.0).contains(&subject.grade_point),
                "subjects.grade_point",
                "must be between 0 and 10",
            );
            validator.require(
                (0.0..=10.0).contains(&subject.passing_grade_point),
                "subjects.passing_grade_point",
                "must be between 0 and 10",
            );
        }
        validator.finish()?;

        let mut card = SemesterReportCard::empty(semester, payload.year_of_exam);
        card.subjects = payload.subjects;
        card.is_complete = payload.is_complete;
        card.recompute();

        let calendar = self.calendar(today);
        let profile = self.store.save_report_card(user, card, &calendar)?;
        info!(
            user = %user,
            semester,
            backlogs = profile.backlog_count,
            cgpa = profile.cgpa,
            "saved report card"
        );
        Ok(profile)
    }

    /// Escape hatch for transfer students: operator-entered aggregates
    /// replace the card-derived ones, and the cards are dropped.
    pub fn set_manual_cgpa(
        &self,
        actor: UserId,
        user: UserId,
        payload: ManualCgpa,
    ) -> Result<StudentProfile, PortalError> {
        resolve(self.store.student(user), "student profile", user.0)?;
        authorize(&moderators(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(
            (0.0..=10.0).contains(&payload.cgpa),
            "cgpa",
            "must be between 0 and 10",
        );
        validator.finish()?;

        let profile = self.store.set_manual_cgpa(
            user,
            payload.cgpa,
            payload.backlog_count,
            payload.passed_semesters,
        )?;
        info!(user = %user, by = %actor, "switched profile to manual figures");
        Ok(profile)
    }

    pub fn templates(&self) -> Vec<SemesterReportCardTemplate> {
        self.store.templates()
    }

    pub fn upsert_template(
        &self,
        actor: UserId,
        template: SemesterReportCardTemplate,
    ) -> Result<SemesterReportCardTemplate, PortalError> {
        authorize(&template.edit_users(self.store.as_ref()), actor, Action::Edit)?;

        let mut validator = Validator::new();
        validator.require(
            (1..=template.course.semesters()).contains(&template.semester),
            "semester",
            format!("must be between 1 and {}", template.course.semesters()),
        );
        for subject in &template.subjects {
            validator.require_non_empty(&subject.name, "subjects.name");
            validator.require(subject.credit > 0.0, "subjects.credit", "must be positive");
        }
        validator.finish()?;

        self.store.save_template(template)
    }

    pub fn delete_template(
        &self,
        actor: UserId,
        course: Course,
        semester: u32,
    ) -> Result<(), PortalError> {
        resolve(
            self.store.template(course, semester),
            "report card template",
            u64::from(semester),
        )?;
        authorize(&moderators(self.store.as_ref()), actor, Action::Delete)?;
        self.store.delete_template(course, semester)
    }
}
