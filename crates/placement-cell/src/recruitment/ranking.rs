//! Applicant comparison against a post's skill requirements.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;
use crate::profiles::Course;

use super::domain::{ApplicationStatus, RecruitmentApplication};

/// How an applicant's declared skills line up with a post's requirements:
/// the overlap and the surplus.
pub fn skill_overlap(
    applicant: &BTreeSet<SkillId>,
    required: &BTreeSet<SkillId>,
) -> (usize, usize) {
    let matches = applicant.intersection(required).count();
    (matches, applicant.len() - matches)
}

/// One row of the reviewer's applicant table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantSummary {
    #[serde(flatten)]
    pub application: RecruitmentApplication,
    pub name: String,
    pub course: Option<Course>,
    pub cgpa: f64,
    pub backlog_count: u32,
    pub skill_matches: usize,
    pub other_skills_count: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantFilter {
    pub status: Option<ApplicationStatus>,
    pub course: Option<Course>,
    pub min_cgpa: Option<f64>,
    pub max_backlogs: Option<u32>,
}

impl ApplicantFilter {
    pub fn matches(&self, row: &ApplicantSummary) -> bool {
        if let Some(status) = self.status {
            if row.application.status != status {
                return false;
            }
        }
        if let Some(course) = self.course {
            if row.course != Some(course) {
                return false;
            }
        }
        if let Some(min) = self.min_cgpa {
            if row.cgpa < min {
                return false;
            }
        }
        if let Some(max) = self.max_backlogs {
            if row.backlog_count > max {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantSort {
    #[default]
    AppliedOn,
    Name,
    Cgpa,
    Backlogs,
    SkillMatches,
    OtherSkills,
}

/// Stable sort, so rows that tie keep their application order.
pub fn sort_applicants(rows: &mut [ApplicantSummary], sort: ApplicantSort, descending: bool) {
    rows.sort_by(|a, b| {
        let ordering = match sort {
            ApplicantSort::AppliedOn => a.application.applied_on.cmp(&b.application.applied_on),
            ApplicantSort::Name => a.name.cmp(&b.name),
            ApplicantSort::Cgpa => a.cgpa.partial_cmp(&b.cgpa).unwrap_or(Ordering::Equal),
            ApplicantSort::Backlogs => a.backlog_count.cmp(&b.backlog_count),
            ApplicantSort::SkillMatches => a.skill_matches.cmp(&b.skill_matches),
            ApplicantSort::OtherSkills => a.other_skills_count.cmp(&b.other_skills_count),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_counts_matches_and_surplus() {
        let applicant: BTreeSet<SkillId> = [SkillId(1), SkillId(2), SkillId(3)].into();
        let required: BTreeSet<SkillId> = [SkillId(1), SkillId(9)].into();
        assert_eq!(skill_overlap(&applicant, &required), (1, 2));
    }

    #[test]
    fn disjoint_sets_match_nothing() {
        let applicant: BTreeSet<SkillId> = [SkillId(4)].into();
        let required: BTreeSet<SkillId> = [SkillId(5)].into();
        assert_eq!(skill_overlap(&applicant, &required), (0, 1));
    }

    #[test]
    fn empty_requirements_leave_everything_surplus() {
        let applicant: BTreeSet<SkillId> = [SkillId(1), SkillId(2)].into();
        assert_eq!(skill_overlap(&applicant, &BTreeSet::new()), (0, 2));
    }
}
