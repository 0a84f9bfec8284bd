use serde::{Deserialize, Serialize};

use crate::authz::{moderators, Directory, EligibleSet};
use crate::profiles::Course;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Letter grade recorded for a subject that has not been graded yet.
pub const UNGRADED: &str = "NA";

/// One row of a semester report card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub code: String,
    pub credit: f64,
    pub letter_grade: String,
    /// Grade point credited towards the SGPA when the subject is failed.
    pub passing_grade_point: f64,
    pub grade_point: f64,
}

impl Subject {
    pub fn is_backlog(&self) -> bool {
        self.letter_grade == "F"
    }

    /// Points actually counted in the SGPA: failed subjects contribute their
    /// passing grade point instead of the scored one.
    pub fn effective_grade_point(&self) -> f64 {
        if self.is_backlog() {
            self.passing_grade_point
        } else {
            self.grade_point
        }
    }
}

/// Grades for one semester. The aggregate fields are derived and refreshed
/// through [`SemesterReportCard::recompute`] before every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterReportCard {
    pub semester: u32,
    pub year_of_exam: i32,
    pub subjects: Vec<Subject>,
    /// Set when every grade has been entered; only complete cards count
    /// towards the CGPA.
    pub is_complete: bool,
    pub backlogs: u32,
    pub passed: bool,
    pub total_credits: f64,
    pub earned_credits: f64,
    pub sgpa: f64,
}

impl SemesterReportCard {
    pub fn empty(semester: u32, year_of_exam: i32) -> Self {
        Self {
            semester,
            year_of_exam,
            subjects: Vec::new(),
            is_complete: false,
            backlogs: 0,
            passed: false,
            total_credits: 0.0,
            earned_credits: 0.0,
            sgpa: 0.0,
        }
    }

    /// Refresh every derived field from the subject rows.
    pub fn recompute(&mut self) {
        self.backlogs = self.subjects.iter().filter(|s| s.is_backlog()).count() as u32;
        self.passed = self.is_complete && self.backlogs == 0;
        self.total_credits = round2(self.subjects.iter().map(|s| s.credit).sum());
        let weighted: f64 = self
            .subjects
            .iter()
            .map(|s| s.credit * s.effective_grade_point())
            .sum();
        self.earned_credits = round2(weighted / 10.0);
        self.sgpa = if self.total_credits > 0.0 {
            round2(weighted / self.total_credits)
        } else {
            0.0
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSubject {
    pub name: String,
    pub code: String,
    pub credit: f64,
    pub passing_grade_point: f64,
}

/// Department-issued subject list for one (course, semester) slot. Student
/// cards are synthesized from it lazily the first time grades are viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterReportCardTemplate {
    pub course: Course,
    pub semester: u32,
    pub subjects: Vec<TemplateSubject>,
}

impl SemesterReportCardTemplate {
    /// Build an ungraded card for this slot.
    pub fn instantiate(&self, year_of_exam: i32) -> SemesterReportCard {
        let mut card = SemesterReportCard::empty(self.semester, year_of_exam);
        card.subjects = self
            .subjects
            .iter()
            .map(|subject| Subject {
                name: subject.name.clone(),
                code: subject.code.clone(),
                credit: subject.credit,
                letter_grade: UNGRADED.to_string(),
                passing_grade_point: subject.passing_grade_point,
                grade_point: 0.0,
            })
            .collect();
        card.recompute();
        card
    }

    /// Templates are maintained by the moderation set and the course's own
    /// class representatives.
    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        let mut set = moderators(dir);
        set.extend(dir.course_crs(self.course));
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(credit: f64, grade: &str, passing: f64, points: f64) -> Subject {
        Subject {
            name: "Subject".into(),
            code: "CS000".into(),
            credit,
            letter_grade: grade.into(),
            passing_grade_point: passing,
            grade_point: points,
        }
    }

    #[test]
    fn failed_subjects_count_their_passing_grade_point() {
        let mut card = SemesterReportCard::empty(1, 2024);
        card.subjects = vec![
            subject(4.0, "A", 0.0, 8.0),
            subject(3.0, "B", 0.0, 6.0),
            subject(3.0, "F", 4.0, 0.0),
        ];
        card.is_complete = true;
        card.recompute();

        assert_eq!(card.backlogs, 1);
        assert!(!card.passed);
        assert_eq!(card.total_credits, 10.0);
        assert_eq!(card.sgpa, 6.2);
    }

    #[test]
    fn clean_complete_card_passes() {
        let mut card = SemesterReportCard::empty(2, 2024);
        card.subjects = vec![subject(4.0, "A", 0.0, 9.0), subject(4.0, "B", 0.0, 7.0)];
        card.is_complete = true;
        card.recompute();

        assert!(card.passed);
        assert_eq!(card.backlogs, 0);
        assert_eq!(card.sgpa, 8.0);
    }

    #[test]
    fn empty_card_has_zero_sgpa() {
        let mut card = SemesterReportCard::empty(1, 2024);
        card.recompute();
        assert_eq!(card.sgpa, 0.0);
        assert!(!card.passed);
    }

    #[test]
    fn template_instantiates_ungraded_rows() {
        let template = SemesterReportCardTemplate {
            course: Course::BTech,
            semester: 3,
            subjects: vec![TemplateSubject {
                name: "Algorithms".into(),
                code: "CS301".into(),
                credit: 4.0,
                passing_grade_point: 4.0,
            }],
        };
        let card = template.instantiate(2024);
        assert_eq!(card.semester, 3);
        assert_eq!(card.subjects.len(), 1);
        assert_eq!(card.subjects[0].letter_grade, UNGRADED);
        assert!(!card.is_complete);
        assert_eq!(card.backlogs, 0);
    }
}
