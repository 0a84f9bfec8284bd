use std::collections::BTreeSet;

use crate::authz::Directory;
use crate::catalog::{Skill, SkillId};
use crate::error::PortalError;
use crate::identity::UserId;
use crate::profiles::StudentProfile;

use super::domain::{ApplicationId, PostId, RecruitmentApplication, RecruitmentPost};

/// Persistence seam for posts and applications.
pub trait RecruitmentStore: Directory + Send + Sync {
    fn insert_post(&self, post: RecruitmentPost) -> RecruitmentPost;
    fn post(&self, id: PostId) -> Option<RecruitmentPost>;
    fn save_post(&self, post: RecruitmentPost) -> Result<(), PortalError>;
    /// Fails with a conflict while applications still reference the post.
    fn delete_post(&self, id: PostId) -> Result<(), PortalError>;
    fn posts(&self) -> Vec<RecruitmentPost>;
    fn add_post_skill(&self, post: PostId, name: &str) -> Result<Skill, PortalError>;
    fn remove_post_skill(&self, post: PostId, skill: SkillId) -> Result<(), PortalError>;
    fn skill(&self, id: SkillId) -> Option<Skill>;

    /// Fails with a conflict when the applicant already applied to the post.
    fn insert_application(
        &self,
        application: RecruitmentApplication,
    ) -> Result<RecruitmentApplication, PortalError>;
    fn application(&self, id: ApplicationId) -> Option<RecruitmentApplication>;
    fn save_application(&self, application: RecruitmentApplication) -> Result<(), PortalError>;
    fn delete_application(&self, id: ApplicationId) -> Result<(), PortalError>;
    fn post_applications(&self, post: PostId) -> Vec<RecruitmentApplication>;
    fn user_applications(&self, user: UserId) -> Vec<RecruitmentApplication>;

    /// Skill ids the user declared on their resume.
    fn user_skill_ids(&self, user: UserId) -> BTreeSet<SkillId>;
    fn student(&self, user: UserId) -> Option<StudentProfile>;
}
