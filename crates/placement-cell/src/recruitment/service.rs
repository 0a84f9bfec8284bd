use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::authz::{moderators, Action};
use crate::dispatch::{authorize, resolve, Validator};
use crate::error::PortalError;
use crate::identity::{Role, UserId};

use super::domain::{
    ApplicationId, ApplicationStatus, JobType, OutcomeInstructions, PostId,
    RecruitmentApplication, RecruitmentPost, SalaryType, StartDate, WorkplaceType,
};
use super::ranking::{
    skill_overlap, sort_applicants, ApplicantFilter, ApplicantSort, ApplicantSummary,
};
use super::repository::RecruitmentStore;

#[derive(Debug, Clone, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub job_type: JobType,
    pub workplace_type: WorkplaceType,
    pub salary_type: SalaryType,
    pub salary_currency: String,
    pub salary: u64,
    #[serde(default)]
    pub application_fee: u64,
    #[serde(default)]
    pub experience_years: u32,
    pub start_date: StartDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub questionnaire: Vec<String>,
    pub apply_by: NaiveDate,
    #[serde(default)]
    pub instructions: OutcomeInstructions,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewApplication {
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub answers: Vec<String>,
}

/// An application paired with the instruction text its applicant should see.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationOutcome {
    #[serde(flatten)]
    pub application: RecruitmentApplication,
    pub post_title: String,
    pub company: String,
    pub instructions: String,
}

/// Workload counters for the cell's landing dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_posts: usize,
    pub active_posts: usize,
    pub expired_posts: usize,
    pub total_applications: usize,
    pub pending: usize,
    pub shortlisted: usize,
    pub selected: usize,
    pub rejected: usize,
}

/// Posting, applying, and reviewing.
pub struct RecruitmentService<S> {
    store: Arc<S>,
}

impl<S> RecruitmentService<S>
where
    S: RecruitmentStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    fn validate_post(payload: &PostPayload, today: NaiveDate) -> Result<(), PortalError> {
        let mut validator = Validator::new();
        validator.require_non_empty(&payload.title, "title");
        validator.require_non_empty(&payload.company, "company");
        validator.require(
            payload.salary_currency.len() == 3
                && payload
                    .salary_currency
                    .chars()
                    .all(|c| c.is_ascii_uppercase()),
            "salary_currency",
            "must be a three letter currency code",
        );
        validator.require(
            payload.apply_by >= today,
            "apply_by",
            "deadline must not be in the past",
        );
        validator.finish()
    }

    fn apply_payload(post: &mut RecruitmentPost, payload: PostPayload) {
        post.title = payload.title;
        post.company = payload.company;
        post.location = payload.location;
        post.job_type = payload.job_type;
        post.workplace_type = payload.workplace_type;
        post.salary_type = payload.salary_type;
        post.salary_currency = payload.salary_currency;
        post.salary = payload.salary;
        post.application_fee = payload.application_fee;
        post.experience_years = payload.experience_years;
        post.start_date = payload.start_date;
        post.description = payload.description;
        post.requirements = payload.requirements;
        post.required_documents = payload.required_documents;
        post.questionnaire = payload.questionnaire;
        post.apply_by = payload.apply_by;
        post.instructions = payload.instructions;
        post.edited_on = Utc::now();
    }

    /// Approved recruiters and the moderation set can open posts.
    pub fn create_post(
        &self,
        actor: UserId,
        payload: PostPayload,
        today: NaiveDate,
    ) -> Result<RecruitmentPost, PortalError> {
        let user = resolve(self.store.user(actor), "user", actor.0)?;
        let allowed = user.is_approved
            && (user.role == Role::Recruiter || moderators(self.store.as_ref()).allows(actor));
        if !allowed {
            return Err(PortalError::PermissionDenied {
                actor,
                action: Action::Edit,
            });
        }
        Self::validate_post(&payload, today)?;

        let now = Utc::now();
        let mut post = RecruitmentPost {
            id: PostId(0),
            owner: Some(actor),
            title: String::new(),
            company: String::new(),
            location: None,
            job_type: payload.job_type,
            workplace_type: payload.workplace_type,
            salary_type: payload.salary_type,
            salary_currency: String::new(),
            salary: 0,
            application_fee: 0,
            experience_years: 0,
            start_date: payload.start_date,
            description: String::new(),
            requirements: String::new(),
            required_documents: Vec::new(),
            questionnaire: Vec::new(),
            apply_by: payload.apply_by,
            posted_on: now,
            edited_on: now,
            skills: BTreeSet::new(),
            instructions: OutcomeInstructions::default(),
        };
        Self::apply_payload(&mut post, payload);
        post.posted_on = now;

        let post = self.store.insert_post(post);
        info!(post = post.id.0, owner = %actor, title = %post.title, "opened recruitment post");
        Ok(post)
    }

    pub fn post(&self, id: PostId) -> Result<RecruitmentPost, PortalError> {
        resolve(self.store.post(id), "recruitment post", id.0)
    }

    /// All posts, optionally narrowed to active or expired ones.
    pub fn list_posts(&self, active: Option<bool>, today: NaiveDate) -> Vec<RecruitmentPost> {
        self.store
            .posts()
            .into_iter()
            .filter(|post| active.map_or(true, |want| post.is_active(today) == want))
            .collect()
    }

    pub fn update_post(
        &self,
        actor: UserId,
        id: PostId,
        payload: PostPayload,
        today: NaiveDate,
    ) -> Result<RecruitmentPost, PortalError> {
        let mut post = resolve(self.store.post(id), "recruitment post", id.0)?;
        authorize(&post.edit_users(self.store.as_ref()), actor, Action::Edit)?;
        Self::validate_post(&payload, today)?;

        Self::apply_payload(&mut post, payload);
        self.store.save_post(post.clone())?;
        Ok(post)
    }

    pub fn delete_post(&self, actor: UserId, id: PostId) -> Result<(), PortalError> {
        let post = resolve(self.store.post(id), "recruitment post", id.0)?;
        authorize(&post.delete_users(self.store.as_ref()), actor, Action::Delete)?;
        self.store.delete_post(id)?;
        info!(post = id.0, by = %actor, "deleted recruitment post");
        Ok(())
    }

    pub fn add_post_skill(
        &self,
        actor: UserId,
        id: PostId,
        name: &str,
    ) -> Result<crate::catalog::Skill, PortalError> {
        let post = resolve(self.store.post(id), "recruitment post", id.0)?;
        authorize(&post.edit_users(self.store.as_ref()), actor, Action::AddSkill)?;

        let mut validator = Validator::new();
        validator.require_non_empty(name, "name");
        validator.finish()?;

        self.store.add_post_skill(id, name)
    }

    pub fn remove_post_skill(
        &self,
        actor: UserId,
        id: PostId,
        skill: crate::catalog::SkillId,
    ) -> Result<(), PortalError> {
        let post = resolve(self.store.post(id), "recruitment post", id.0)?;
        authorize(&post.edit_users(self.store.as_ref()), actor, Action::RemoveSkill)?;
        self.store.remove_post_skill(id, skill)
    }

    /// Submit an application. Expired posts and non-student or unapproved
    /// accounts are turned away at the gate.
    pub fn apply(
        &self,
        actor: UserId,
        post_id: PostId,
        payload: NewApplication,
        today: NaiveDate,
    ) -> Result<ApplicationOutcome, PortalError> {
        let post = resolve(self.store.post(post_id), "recruitment post", post_id.0)?;
        let user = resolve(self.store.user(actor), "user", actor.0)?;
        if !post.accepts_application_from(&user, today) {
            return Err(PortalError::PermissionDenied {
                actor,
                action: Action::Apply,
            });
        }

        let mut validator = Validator::new();
        validator.require(
            payload.answers.len() == post.questionnaire.len(),
            "answers",
            format!("post expects {} answers", post.questionnaire.len()),
        );
        validator.finish()?;

        let application = self.store.insert_application(RecruitmentApplication {
            id: ApplicationId(0),
            post: post_id,
            user: Some(actor),
            cover_letter: payload.cover_letter,
            answers: payload.answers,
            applied_on: Utc::now(),
            status: ApplicationStatus::Pending,
        })?;
        info!(application = application.id.0, post = post_id.0, user = %actor, "received application");
        Ok(self.outcome(application, &post))
    }

    fn outcome(
        &self,
        application: RecruitmentApplication,
        post: &RecruitmentPost,
    ) -> ApplicationOutcome {
        let instructions = application.instructions(post).to_string();
        ApplicationOutcome {
            application,
            post_title: post.title.clone(),
            company: post.company.clone(),
            instructions,
        }
    }

    /// Everything the actor has applied to, newest first.
    pub fn my_applications(&self, actor: UserId) -> Vec<ApplicationOutcome> {
        let mut outcomes: Vec<ApplicationOutcome> = self
            .store
            .user_applications(actor)
            .into_iter()
            .filter_map(|application| {
                let post = self.store.post(application.post)?;
                Some(self.outcome(application, &post))
            })
            .collect();
        outcomes.sort_by(|a, b| b.application.applied_on.cmp(&a.application.applied_on));
        outcomes
    }

    /// Reviewer table for one post: filtered, ranked, permission-gated.
    pub fn applicants(
        &self,
        actor: UserId,
        post_id: PostId,
        filter: &ApplicantFilter,
        sort: ApplicantSort,
        descending: bool,
    ) -> Result<Vec<ApplicantSummary>, PortalError> {
        let post = resolve(self.store.post(post_id), "recruitment post", post_id.0)?;
        authorize(&post.edit_users(self.store.as_ref()), actor, Action::View)?;

        let mut rows: Vec<ApplicantSummary> = self
            .store
            .post_applications(post_id)
            .into_iter()
            .map(|application| {
                let applicant = application.user;
                let name = applicant
                    .and_then(|id| self.store.user(id))
                    .map(|user| user.full_name)
                    .unwrap_or_else(|| "(account removed)".to_string());
                let profile = applicant.and_then(|id| self.store.student(id));
                let skills = applicant
                    .map(|id| self.store.user_skill_ids(id))
                    .unwrap_or_default();
                let (skill_matches, other_skills_count) = skill_overlap(&skills, &post.skills);
                ApplicantSummary {
                    application,
                    name,
                    course: profile.as_ref().map(|p| p.course),
                    cgpa: profile.as_ref().map(|p| p.cgpa).unwrap_or(0.0),
                    backlog_count: profile.as_ref().map(|p| p.backlog_count).unwrap_or(0),
                    skill_matches,
                    other_skills_count,
                }
            })
            .filter(|row| filter.matches(row))
            .collect();
        sort_applicants(&mut rows, sort, descending);
        Ok(rows)
    }

    fn transition(
        &self,
        actor: UserId,
        id: ApplicationId,
        to: ApplicationStatus,
        action: Action,
    ) -> Result<ApplicationOutcome, PortalError> {
        let mut application = resolve(self.store.application(id), "application", id.0)?;
        let post = resolve(
            self.store.post(application.post),
            "recruitment post",
            application.post.0,
        )?;
        let eligible = match to {
            ApplicationStatus::Pending => application.reset_users(&post, self.store.as_ref()),
            ApplicationStatus::Selected => application.select_users(&post, self.store.as_ref()),
            ApplicationStatus::Rejected => application.reject_users(&post, self.store.as_ref()),
            ApplicationStatus::Shortlisted => {
                application.shortlist_users(&post, self.store.as_ref())
            }
        };
        authorize(&eligible, actor, action)?;

        application.status = to;
        self.store.save_application(application.clone())?;
        info!(
            application = id.0,
            status = to.label(),
            by = %actor,
            "moved application"
        );
        Ok(self.outcome(application, &post))
    }

    pub fn select(&self, actor: UserId, id: ApplicationId) -> Result<ApplicationOutcome, PortalError> {
        self.transition(actor, id, ApplicationStatus::Selected, Action::SelectApplication)
    }

    pub fn reject(&self, actor: UserId, id: ApplicationId) -> Result<ApplicationOutcome, PortalError> {
        self.transition(actor, id, ApplicationStatus::Rejected, Action::RejectApplication)
    }

    pub fn shortlist(
        &self,
        actor: UserId,
        id: ApplicationId,
    ) -> Result<ApplicationOutcome, PortalError> {
        self.transition(
            actor,
            id,
            ApplicationStatus::Shortlisted,
            Action::ShortlistApplication,
        )
    }

    pub fn reset(&self, actor: UserId, id: ApplicationId) -> Result<ApplicationOutcome, PortalError> {
        self.transition(actor, id, ApplicationStatus::Pending, Action::ResetApplication)
    }

    /// Withdraw a pending application.
    pub fn withdraw(&self, actor: UserId, id: ApplicationId) -> Result<(), PortalError> {
        let application = resolve(self.store.application(id), "application", id.0)?;
        authorize(
            &application.delete_users(self.store.as_ref()),
            actor,
            Action::Delete,
        )?;
        self.store.delete_application(id)
    }

    /// Transitions the actor can currently perform on this application.
    pub fn application_actions(
        &self,
        actor: UserId,
        id: ApplicationId,
    ) -> Result<BTreeSet<Action>, PortalError> {
        let application = resolve(self.store.application(id), "application", id.0)?;
        let post = resolve(
            self.store.post(application.post),
            "recruitment post",
            application.post.0,
        )?;
        let dir = self.store.as_ref();
        let mut actions = BTreeSet::new();
        for (action, set) in [
            (Action::SelectApplication, application.select_users(&post, dir)),
            (Action::RejectApplication, application.reject_users(&post, dir)),
            (
                Action::ShortlistApplication,
                application.shortlist_users(&post, dir),
            ),
            (Action::ResetApplication, application.reset_users(&post, dir)),
            (Action::Delete, application.delete_users(dir)),
        ] {
            if set.allows(actor) {
                actions.insert(action);
            }
        }
        Ok(actions)
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        let posts = self.store.posts();
        let active_posts = posts.iter().filter(|post| post.is_active(today)).count();
        let applications: Vec<RecruitmentApplication> = posts
            .iter()
            .flat_map(|post| self.store.post_applications(post.id))
            .collect();
        let count = |status: ApplicationStatus| {
            applications
                .iter()
                .filter(|application| application.status == status)
                .count()
        };
        DashboardSummary {
            total_posts: posts.len(),
            active_posts,
            expired_posts: posts.len() - active_posts,
            total_applications: applications.len(),
            pending: count(ApplicationStatus::Pending),
            shortlisted: count(ApplicationStatus::Shortlisted),
            selected: count(ApplicationStatus::Selected),
            rejected: count(ApplicationStatus::Rejected),
        }
    }
}
