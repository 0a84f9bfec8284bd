use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::catalog::SkillId;
use crate::error::PortalError;
use crate::identity::UserId;
use crate::profiles::Course;

use super::domain::{ApplicationId, ApplicationStatus, PostId};
use super::ranking::{ApplicantFilter, ApplicantSort};
use super::repository::RecruitmentStore;
use super::service::{NewApplication, PostPayload, RecruitmentService};

#[derive(Debug, Deserialize)]
struct ActorQuery {
    actor: u64,
}

#[derive(Debug, Deserialize)]
struct Actor {
    actor: u64,
}

#[derive(Debug, Deserialize)]
struct ActorBody<T> {
    actor: u64,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
struct PostListQuery {
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ApplicantQuery {
    actor: u64,
    #[serde(default)]
    sort: ApplicantSort,
    #[serde(default)]
    descending: bool,
    status: Option<ApplicationStatus>,
    course: Option<Course>,
    min_cgpa: Option<f64>,
    max_backlogs: Option<u32>,
}

impl ApplicantQuery {
    fn filter(&self) -> ApplicantFilter {
        ApplicantFilter {
            status: self.status,
            course: self.course,
            min_cgpa: self.min_cgpa,
            max_backlogs: self.max_backlogs,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

pub fn recruitment_router<S>(service: Arc<RecruitmentService<S>>) -> Router
where
    S: RecruitmentStore + 'static,
{
    Router::new()
        .route("/api/v1/posts", post(create_post::<S>).get(list_posts::<S>))
        .route(
            "/api/v1/posts/:id",
            get(get_post::<S>).put(update_post::<S>).delete(delete_post::<S>),
        )
        .route("/api/v1/posts/:id/skills", post(add_post_skill::<S>))
        .route(
            "/api/v1/posts/:id/skills/:skill",
            delete(remove_post_skill::<S>),
        )
        .route("/api/v1/posts/:id/apply", post(apply::<S>))
        .route("/api/v1/posts/:id/applicants", get(applicants::<S>))
        .route("/api/v1/applications", get(my_applications::<S>))
        .route("/api/v1/applications/:id", delete(withdraw::<S>))
        .route("/api/v1/applications/:id/actions", get(application_actions::<S>))
        .route("/api/v1/applications/:id/select", post(select::<S>))
        .route("/api/v1/applications/:id/reject", post(reject::<S>))
        .route("/api/v1/applications/:id/shortlist", post(shortlist::<S>))
        .route("/api/v1/applications/:id/reset", post(reset::<S>))
        .route("/api/v1/dashboard", get(dashboard::<S>))
        .with_state(service)
}

type Svc<S> = State<Arc<RecruitmentService<S>>>;

async fn create_post<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Json(body): Json<ActorBody<PostPayload>>,
) -> Result<Response, PortalError> {
    let post = service.create_post(UserId(body.actor), body.payload, Utc::now().date_naive())?;
    Ok((StatusCode::CREATED, Json(post)).into_response())
}

async fn list_posts<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Query(query): Query<PostListQuery>,
) -> Response {
    Json(service.list_posts(query.active, Utc::now().date_naive())).into_response()
}

async fn get_post<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
) -> Result<Response, PortalError> {
    Ok(Json(service.post(PostId(id))?).into_response())
}

async fn update_post<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<PostPayload>>,
) -> Result<Response, PortalError> {
    let post = service.update_post(
        UserId(body.actor),
        PostId(id),
        body.payload,
        Utc::now().date_naive(),
    )?;
    Ok(Json(post).into_response())
}

async fn delete_post<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_post(UserId(query.actor), PostId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn add_post_skill<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NamedEntry>>,
) -> Result<Response, PortalError> {
    let skill = service.add_post_skill(UserId(body.actor), PostId(id), &body.payload.name)?;
    Ok((StatusCode::CREATED, Json(skill)).into_response())
}

async fn remove_post_skill<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path((id, skill)): Path<(u64, u64)>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.remove_post_skill(UserId(query.actor), PostId(id), SkillId(skill))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn apply<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NewApplication>>,
) -> Result<Response, PortalError> {
    let outcome = service.apply(
        UserId(body.actor),
        PostId(id),
        body.payload,
        Utc::now().date_naive(),
    )?;
    Ok((StatusCode::CREATED, Json(outcome)).into_response())
}

async fn applicants<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Query(query): Query<ApplicantQuery>,
) -> Result<Response, PortalError> {
    let rows = service.applicants(
        UserId(query.actor),
        PostId(id),
        &query.filter(),
        query.sort,
        query.descending,
    )?;
    Ok(Json(rows).into_response())
}

async fn my_applications<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Query(query): Query<ActorQuery>,
) -> Response {
    Json(service.my_applications(UserId(query.actor))).into_response()
}

async fn withdraw<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.withdraw(UserId(query.actor), ApplicationId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn application_actions<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let actions = service.application_actions(UserId(query.actor), ApplicationId(id))?;
    Ok(Json(actions).into_response())
}

async fn select<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    Ok(Json(service.select(UserId(body.actor), ApplicationId(id))?).into_response())
}

async fn reject<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    Ok(Json(service.reject(UserId(body.actor), ApplicationId(id))?).into_response())
}

async fn shortlist<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    Ok(Json(service.shortlist(UserId(body.actor), ApplicationId(id))?).into_response())
}

async fn reset<S: RecruitmentStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    Ok(Json(service.reset(UserId(body.actor), ApplicationId(id))?).into_response())
}

async fn dashboard<S: RecruitmentStore + 'static>(State(service): Svc<S>) -> Response {
    Json(service.dashboard(Utc::now().date_naive())).into_response()
}
