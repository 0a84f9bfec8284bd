use serde::{Deserialize, Serialize};

use crate::academics::{AcademicCalendar, AcademicHalf};
use crate::authz::{moderators, owner_or_admins, Directory, EligibleSet};
use crate::identity::UserId;

/// Programmes offered by the department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Course {
    BTech,
    MTech,
    Phd,
}

impl Course {
    /// Programme length in years.
    pub const fn duration(self) -> u32 {
        match self {
            Course::BTech => 4,
            Course::MTech => 2,
            Course::Phd => 6,
        }
    }

    pub const fn semesters(self) -> u32 {
        self.duration() * 2
    }

    /// Short code embedded in identity-card numbers.
    pub const fn code(self) -> &'static str {
        match self {
            Course::BTech => "BTC",
            Course::MTech => "MTC",
            Course::Phd => "PHD",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Course::BTech => "B.Tech",
            Course::MTech => "M.Tech",
            Course::Phd => "Ph.D",
        }
    }
}

/// Academic record attached to a student account.
///
/// `registration_year` is frozen out of the registration number at creation.
/// `cgpa`, `backlog_count`, `passed_semesters` and `pass_out_year` are
/// recomputed from report cards unless `manually_specify_cgpa` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub user: UserId,
    pub registration_number: u64,
    pub registration_year: i32,
    pub course: Course,
    pub id_number: u16,
    pub is_cr: bool,
    pub dropped_out: bool,
    pub manually_specify_cgpa: bool,
    pub cgpa: f64,
    pub backlog_count: u32,
    pub passed_semesters: u32,
    pub pass_out_year: Option<i32>,
}

impl StudentProfile {
    pub fn new(user: UserId, registration_number: u64, course: Course, id_number: u16) -> Self {
        Self {
            user,
            registration_number,
            registration_year: (registration_number / 10_000_000) as i32,
            course,
            id_number,
            is_cr: false,
            dropped_out: false,
            manually_specify_cgpa: false,
            cgpa: 0.0,
            backlog_count: 0,
            passed_semesters: 0,
            pass_out_year: None,
        }
    }

    pub fn passed_out(&self) -> bool {
        self.passed_semesters >= self.course.semesters()
    }

    pub fn is_current(&self) -> bool {
        !self.passed_out() && !self.dropped_out
    }

    /// Programme year for the given period, clamped to the course bounds. A
    /// finished student stays pinned at the final year.
    pub fn year(&self, calendar: &AcademicCalendar) -> u32 {
        if self.passed_out() {
            return self.course.duration();
        }
        let elapsed = calendar.year - self.registration_year;
        (elapsed.max(1) as u32).min(self.course.duration())
    }

    /// Running semester, derived from the year and the session half.
    pub fn semester(&self, calendar: &AcademicCalendar) -> u32 {
        let year = self.year(calendar);
        match calendar.half {
            AcademicHalf::Odd => year * 2 - 1,
            AcademicHalf::Even => year * 2,
        }
    }

    /// Roll string shown on class lists: semester, session year, batch year.
    pub fn roll_number(&self, calendar: &AcademicCalendar) -> String {
        format!(
            "{}{:02}{:02}",
            self.semester(calendar),
            calendar.year.rem_euclid(100),
            self.registration_year.rem_euclid(100)
        )
    }

    /// Identity-card number: batch year, department, course code, serial.
    pub fn id_card(&self) -> String {
        format!(
            "{:02}CSE{}{:03}",
            self.registration_year.rem_euclid(100),
            self.course.code(),
            self.id_number
        )
    }

    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(Some(self.user), dir)
    }

    /// CR standing only applies to students still on the rolls.
    pub fn make_cr_users(&self, dir: &dyn Directory) -> EligibleSet {
        if !self.is_current() {
            return EligibleSet::none();
        }
        moderators(dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    Phd,
    MPhil,
    MTech,
    MSc,
    Mca,
    Mba,
    BTech,
    BSc,
    Bca,
    Other,
}

impl Qualification {
    /// Doctoral staff pick up the honorific in their display names.
    pub const fn is_doctoral(self) -> bool {
        matches!(self, Qualification::Phd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffDesignation {
    Professor,
    AssociateProfessor,
    AssistantProfessor,
    Lecturer,
    GuestFaculty,
    TechnicalStaff,
    NonTeachingStaff,
    Other,
}

/// Departmental record for staff accounts. `is_hod` and `is_tpc_head` are
/// singleton flags across the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub user: UserId,
    pub id_number: Option<String>,
    pub qualification: Qualification,
    pub designation: StaffDesignation,
    pub is_hod: bool,
    pub is_tpc_head: bool,
}

impl StaffProfile {
    pub fn new(user: UserId, qualification: Qualification, designation: StaffDesignation) -> Self {
        Self {
            user,
            id_number: None,
            qualification,
            designation,
            is_hod: false,
            is_tpc_head: false,
        }
    }

    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(Some(self.user), dir)
    }

    /// The HOD chair can be taken over by a superuser or the sitting HOD.
    pub fn make_hod_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.is_hod {
            return EligibleSet::none();
        }
        let mut set: EligibleSet = dir.superusers().into_iter().collect();
        set.extend(dir.hod_holder());
        set
    }

    /// The TPC-head chair additionally answers to the sitting TPC head.
    pub fn make_tpc_head_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.is_tpc_head {
            return EligibleSet::none();
        }
        let mut set: EligibleSet = dir.superusers().into_iter().collect();
        set.extend(dir.hod_holder());
        set.extend(dir.tpc_head_holder());
        set
    }
}

/// Company-side record for recruiter accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruiterProfile {
    pub user: UserId,
    pub company_name: String,
    pub designation: String,
}

impl RecruiterProfile {
    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        owner_or_admins(Some(self.user), dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(registration_number: u64, course: Course) -> StudentProfile {
        StudentProfile::new(UserId(1), registration_number, course, 1)
    }

    #[test]
    fn registration_year_comes_from_the_leading_digits() {
        let student = profile(20210001001, Course::BTech);
        assert_eq!(student.registration_year, 2021);
    }

    #[test]
    fn year_and_semester_track_the_calendar() {
        let student = profile(20210001001, Course::BTech);
        let odd = AcademicCalendar::new(2024, AcademicHalf::Odd);
        let even = AcademicCalendar::new(2024, AcademicHalf::Even);
        assert_eq!(student.year(&odd), 3);
        assert_eq!(student.semester(&odd), 5);
        assert_eq!(student.semester(&even), 6);
    }

    #[test]
    fn year_clamps_to_course_bounds() {
        let fresh = profile(20240001001, Course::BTech);
        let calendar = AcademicCalendar::new(2024, AcademicHalf::Odd);
        assert_eq!(fresh.year(&calendar), 1);

        let overdue = profile(20150001001, Course::BTech);
        assert_eq!(overdue.year(&calendar), 4);
    }

    #[test]
    fn finished_students_pin_to_final_year() {
        let mut student = profile(20190001001, Course::MTech);
        student.passed_semesters = 4;
        let calendar = AcademicCalendar::new(2024, AcademicHalf::Odd);
        assert!(student.passed_out());
        assert!(!student.is_current());
        assert_eq!(student.year(&calendar), 2);
    }

    #[test]
    fn id_card_embeds_batch_course_and_serial() {
        let mut student = profile(20210001001, Course::BTech);
        student.id_number = 42;
        assert_eq!(student.id_card(), "21CSEBTC042");
    }
}
