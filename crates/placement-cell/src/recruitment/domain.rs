use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::authz::{moderators, owner_or_admins, Directory, EligibleSet};
use crate::catalog::SkillId;
use crate::identity::{Role, User, UserId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct PostId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ApplicationId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Internship,
    Contract,
    Temporary,
    Volunteer,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkplaceType {
    OnSite,
    Remote,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryType {
    Specified,
    SpecifiedAndBonus,
    PerformanceBased,
    Negotiable,
}

/// Joining date advertised on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartDate {
    Immediately,
    On { date: NaiveDate },
}

/// Messages shown to an applicant depending on where their application
/// stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutcomeInstructions {
    pub pending: String,
    pub selected: String,
    pub rejected: String,
    pub shortlisted: String,
}

/// A job or internship opening. Activity is never stored: a post is active
/// exactly while its deadline has not passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentPost {
    pub id: PostId,
    /// Posting account. Detached when the recruiter leaves the portal.
    pub owner: Option<UserId>,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub job_type: JobType,
    pub workplace_type: WorkplaceType,
    pub salary_type: SalaryType,
    pub salary_currency: String,
    pub salary: u64,
    pub application_fee: u64,
    pub experience_years: u32,
    pub start_date: StartDate,
    pub description: String,
    pub requirements: String,
    pub required_documents: Vec<String>,
    pub questionnaire: Vec<String>,
    pub apply_by: NaiveDate,
    pub posted_on: DateTime<Utc>,
    pub edited_on: DateTime<Utc>,
    pub skills: BTreeSet<SkillId>,
    pub instructions: OutcomeInstructions,
}

impl RecruitmentPost {
    pub fn is_active(&self, today: NaiveDate) -> bool {
        today <= self.apply_by
    }

    /// A superuser owner manages the post alone; any other owner shares it
    /// with the moderation set.
    pub fn edit_users(&self, dir: &dyn Directory) -> EligibleSet {
        match self.owner.and_then(|id| dir.user(id)) {
            Some(user) if user.is_superuser => EligibleSet::only(user.id),
            Some(user) => {
                let mut set = moderators(dir);
                set.insert(user.id);
                set
            }
            None => moderators(dir),
        }
    }

    pub fn delete_users(&self, dir: &dyn Directory) -> EligibleSet {
        self.edit_users(dir)
    }

    /// Who can push a board update about this post.
    pub fn add_update_users(&self, dir: &dyn Directory) -> EligibleSet {
        self.edit_users(dir)
    }

    /// Application gate: open posts accept approved students only.
    pub fn accepts_application_from(&self, user: &User, today: NaiveDate) -> bool {
        self.is_active(today) && user.role == Role::Student && user.is_approved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Selected,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Pending fans out to the three outcomes; every outcome can only be
    /// walked back to pending.
    pub const fn can_transition(self, to: ApplicationStatus) -> bool {
        match self {
            ApplicationStatus::Pending => !matches!(to, ApplicationStatus::Pending),
            _ => matches!(to, ApplicationStatus::Pending),
        }
    }
}

/// One student's application to one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitmentApplication {
    pub id: ApplicationId,
    pub post: PostId,
    /// Applicant account. Detached rather than dropped when the account goes
    /// away, so selection records survive.
    pub user: Option<UserId>,
    pub cover_letter: String,
    pub answers: Vec<String>,
    pub applied_on: DateTime<Utc>,
    pub status: ApplicationStatus,
}

impl RecruitmentApplication {
    fn outcome_users(
        &self,
        post: &RecruitmentPost,
        to: ApplicationStatus,
        dir: &dyn Directory,
    ) -> EligibleSet {
        if !self.status.can_transition(to) {
            return EligibleSet::none();
        }
        let mut set = post.edit_users(dir);
        if let Some(applicant) = self.user {
            set.remove(applicant);
        }
        set
    }

    pub fn select_users(&self, post: &RecruitmentPost, dir: &dyn Directory) -> EligibleSet {
        self.outcome_users(post, ApplicationStatus::Selected, dir)
    }

    pub fn reject_users(&self, post: &RecruitmentPost, dir: &dyn Directory) -> EligibleSet {
        self.outcome_users(post, ApplicationStatus::Rejected, dir)
    }

    pub fn shortlist_users(&self, post: &RecruitmentPost, dir: &dyn Directory) -> EligibleSet {
        self.outcome_users(post, ApplicationStatus::Shortlisted, dir)
    }

    /// Walking an outcome back to pending. Never the applicant, even when
    /// they moderate the post.
    pub fn reset_users(&self, post: &RecruitmentPost, dir: &dyn Directory) -> EligibleSet {
        self.outcome_users(post, ApplicationStatus::Pending, dir)
    }

    /// Withdrawal is only possible while the application is pending.
    pub fn delete_users(&self, dir: &dyn Directory) -> EligibleSet {
        if self.status != ApplicationStatus::Pending {
            return EligibleSet::none();
        }
        owner_or_admins(self.user, dir)
    }

    /// Instruction text the applicant should currently see.
    pub fn instructions<'a>(&self, post: &'a RecruitmentPost) -> &'a str {
        match self.status {
            ApplicationStatus::Pending => &post.instructions.pending,
            ApplicationStatus::Shortlisted => &post.instructions.shortlisted,
            ApplicationStatus::Selected => &post.instructions.selected,
            ApplicationStatus::Rejected => &post.instructions.rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_fans_out_and_outcomes_only_reset() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition(Selected));
        assert!(Pending.can_transition(Rejected));
        assert!(Pending.can_transition(Shortlisted));
        assert!(!Pending.can_transition(Pending));

        for outcome in [Selected, Rejected, Shortlisted] {
            assert!(outcome.can_transition(Pending));
        }
        assert!(!Selected.can_transition(Rejected));
        assert!(!Rejected.can_transition(Shortlisted));
        assert!(!Shortlisted.can_transition(Selected));
    }

    #[test]
    fn engagement_enums_cover_the_advertised_choices() {
        let job: JobType = serde_json::from_str("\"volunteer\"").unwrap();
        assert_eq!(job, JobType::Volunteer);
        let job: JobType = serde_json::from_str("\"temporary\"").unwrap();
        assert_eq!(job, JobType::Temporary);
        let job: JobType = serde_json::from_str("\"other\"").unwrap();
        assert_eq!(job, JobType::Other);

        let salary: SalaryType = serde_json::from_str("\"negotiable\"").unwrap();
        assert_eq!(salary, SalaryType::Negotiable);
        let salary: SalaryType = serde_json::from_str("\"specified_and_bonus\"").unwrap();
        assert_eq!(salary, SalaryType::SpecifiedAndBonus);
        let salary: SalaryType = serde_json::from_str("\"performance_based\"").unwrap();
        assert_eq!(salary, SalaryType::PerformanceBased);
    }

    #[test]
    fn activity_tracks_the_deadline() {
        let apply_by = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let post = RecruitmentPost {
            id: PostId(1),
            owner: None,
            title: "Backend Engineer".into(),
            company: "Acme".into(),
            location: None,
            job_type: JobType::FullTime,
            workplace_type: WorkplaceType::OnSite,
            salary_type: SalaryType::Specified,
            salary_currency: "INR".into(),
            salary: 1_200_000,
            application_fee: 0,
            experience_years: 0,
            start_date: StartDate::Immediately,
            description: String::new(),
            requirements: String::new(),
            required_documents: Vec::new(),
            questionnaire: Vec::new(),
            apply_by,
            posted_on: Utc::now(),
            edited_on: Utc::now(),
            skills: BTreeSet::new(),
            instructions: OutcomeInstructions::default(),
        };
        assert!(post.is_active(apply_by));
        assert!(!post.is_active(apply_by.succ_opt().unwrap()));
    }
}
