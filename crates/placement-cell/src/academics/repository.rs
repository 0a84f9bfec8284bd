use crate::authz::Directory;
use crate::error::PortalError;
use crate::identity::UserId;
use crate::profiles::{Course, StudentProfile};

use super::calendar::AcademicCalendar;
use super::report_card::{SemesterReportCard, SemesterReportCardTemplate};

/// Persistence seam for report cards, templates, and profile aggregates.
///
/// Card writes and the profile recomputation they trigger happen under one
/// lock so no reader ever observes grades and aggregates out of step.
pub trait AcademicsStore: Directory + Send + Sync {
    fn student(&self, user: UserId) -> Option<StudentProfile>;
    fn report_cards(&self, user: UserId) -> Vec<SemesterReportCard>;

    /// Ensure cards exist for semesters 1 through `semester`, synthesizing
    /// missing slots from templates. Returns the full list.
    fn sync_report_cards(
        &self,
        user: UserId,
        semester: u32,
        calendar: &AcademicCalendar,
    ) -> Result<Vec<SemesterReportCard>, PortalError>;

    /// Persist one card and recompute the profile aggregates in the same
    /// step. Returns the refreshed profile.
    fn save_report_card(
        &self,
        user: UserId,
        card: SemesterReportCard,
        calendar: &AcademicCalendar,
    ) -> Result<StudentProfile, PortalError>;

    /// Switch the profile to operator-entered figures, deleting its report
    /// cards.
    fn set_manual_cgpa(
        &self,
        user: UserId,
        cgpa: f64,
        backlog_count: u32,
        passed_semesters: u32,
    ) -> Result<StudentProfile, PortalError>;

    fn template(&self, course: Course, semester: u32) -> Option<SemesterReportCardTemplate>;
    fn templates(&self) -> Vec<SemesterReportCardTemplate>;
    fn save_template(
        &self,
        template: SemesterReportCardTemplate,
    ) -> Result<SemesterReportCardTemplate, PortalError>;
    fn delete_template(&self, course: Course, semester: u32) -> Result<(), PortalError>;
}
