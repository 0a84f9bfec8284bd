use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::PortalError;
use crate::identity::UserId;

use super::repository::ProfileStore;
use super::service::{
    NewRecruiterProfile, NewStaffProfile, NewStudentProfile, ProfileService, UpdateStudentProfile,
};

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

pub fn profile_router<S>(service: Arc<ProfileService<S>>) -> Router
where
    S: ProfileStore + 'static,
{
    Router::new()
        .route("/api/v1/students", get(list_students::<S>))
        .route(
            "/api/v1/students/:user",
            post(create_student::<S>)
                .get(get_student::<S>)
                .put(update_student::<S>),
        )
        .route("/api/v1/students/:user/make-cr", post(make_cr::<S>))
        .route(
            "/api/v1/staff/:user",
            post(create_staff::<S>).get(get_staff::<S>),
        )
        .route("/api/v1/staff/:user", put(update_staff::<S>))
        .route("/api/v1/staff/:user/make-hod", post(make_hod::<S>))
        .route("/api/v1/staff/:user/make-tpc-head", post(make_tpc_head::<S>))
        .route(
            "/api/v1/recruiters/:user",
            post(create_recruiter::<S>).get(get_recruiter::<S>),
        )
        .route("/api/v1/recruiters/:user", put(update_recruiter::<S>))
        .with_state(service)
}

type Svc<S> = State<Arc<ProfileService<S>>>;

async fn list_students<S: ProfileStore + 'static>(State(service): Svc<S>) -> Response {
    Json(service.list_students(Utc::now().date_naive())).into_response()
}

async fn create_student<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<NewStudentProfile>>,
) -> Result<Response, PortalError> {
    let profile = service.create_student(UserId(body.actor), UserId(user), body.payload)?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

async fn get_student<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let view = service.student_view(UserId(query.actor), UserId(user), Utc::now().date_naive())?;
    Ok(Json(view).into_response())
}

async fn update_student<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<UpdateStudentProfile>>,
) -> Result<Response, PortalError> {
    let profile = service.update_student(UserId(body.actor), UserId(user), body.payload)?;
    Ok(Json(profile).into_response())
}

async fn make_cr<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let profile = service.make_cr(UserId(body.actor), UserId(user))?;
    Ok(Json(profile).into_response())
}

async fn create_staff<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<NewStaffProfile>>,
) -> Result<Response, PortalError> {
    let profile = service.create_staff(UserId(body.actor), UserId(user), body.payload)?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

async fn get_staff<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let profile = service.get_staff(UserId(query.actor), UserId(user))?;
    Ok(Json(profile).into_response())
}

async fn update_staff<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<NewStaffProfile>>,
) -> Result<Response, PortalError> {
    let profile = service.update_staff(UserId(body.actor), UserId(user), body.payload)?;
    Ok(Json(profile).into_response())
}

async fn make_hod<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let profile = service.make_hod(UserId(body.actor), UserId(user))?;
    Ok(Json(profile).into_response())
}

async fn make_tpc_head<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let profile = service.make_tpc_head(UserId(body.actor), UserId(user))?;
    Ok(Json(profile).into_response())
}

async fn create_recruiter<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<NewRecruiterProfile>>,
) -> Result<Response, PortalError> {
    let profile = service.create_recruiter(UserId(body.actor), UserId(user), body.payload)?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

async fn get_recruiter<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let profile = service.get_recruiter(UserId(query.actor), UserId(user))?;
    Ok(Json(profile).into_response())
}

async fn update_recruiter<S: ProfileStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<NewRecruiterProfile>>,
) -> Result<Response, PortalError> {
    let profile = service.update_recruiter(UserId(body.actor), UserId(user), body.payload)?;
    Ok(Json(profile).into_response())
}
