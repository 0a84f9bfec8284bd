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
use crate::profiles::Course;

use super::report_card::SemesterReportCardTemplate;
use super::repository::AcademicsStore;
use super::service::{AcademicsService, ManualCgpa, UpdateReportCard};

#[derive(Debug, Deserialize)]
struct ActorQuery {
    actor: u64,
}

#[derive(Debug, Deserialize)]
struct ActorBody<T> {
    actor: u64,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
struct TemplateSlot {
    actor: u64,
    course: Course,
    semester: u32,
}

pub fn academics_router<S>(service: Arc<AcademicsService<S>>) -> Router
where
    S: AcademicsStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/students/:user/report-cards",
            get(report_cards::<S>),
        )
        .route(
            "/api/v1/students/:user/report-cards/:semester",
            put(update_report_card::<S>),
        )
        .route("/api/v1/students/:user/manual-cgpa", post(set_manual_cgpa::<S>))
        .route(
            "/api/v1/report-card-templates",
            get(list_templates::<S>)
                .put(upsert_template::<S>)
                .delete(delete_template::<S>),
        )
        .with_state(service)
}

type Svc<S> = State<Arc<AcademicsService<S>>>;

async fn report_cards<S: AcademicsStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let cards = service.report_cards(UserId(query.actor), UserId(user), Utc::now().date_naive())?;
    Ok(Json(cards).into_response())
}

async fn update_report_card<S: AcademicsStore + 'static>(
    State(service): Svc<S>,
    Path((user, semester)): Path<(u64, u32)>,
    Json(body): Json<ActorBody<UpdateReportCard>>,
) -> Result<Response, PortalError> {
    let profile = service.update_report_card(
        UserId(body.actor),
        UserId(user),
        semester,
        body.payload,
        Utc::now().date_naive(),
    )?;
    Ok(Json(profile).into_response())
}

async fn set_manual_cgpa<S: AcademicsStore + 'static>(
    State(service): Svc<S>,
    Path(user): Path<u64>,
    Json(body): Json<ActorBody<ManualCgpa>>,
) -> Result<Response, PortalError> {
    let profile = service.set_manual_cgpa(UserId(body.actor), UserId(user), body.payload)?;
    Ok(Json(profile).into_response())
}

async fn list_templates<S: AcademicsStore + 'static>(State(service): Svc<S>) -> Response {
    Json(service.templates()).into_response()
}

async fn upsert_template<S: AcademicsStore + 'static>(
    State(service): Svc<S>,
    Json(body): Json<ActorBody<SemesterReportCardTemplate>>,
) -> Result<Response, PortalError> {
    let template = service.upsert_template(UserId(body.actor), body.payload)?;
    Ok(Json(template).into_response())
}

async fn delete_template<S: AcademicsStore + 'static>(
    State(service): Svc<S>,
    Query(slot): Query<TemplateSlot>,
) -> Result<Response, PortalError> {
    service.delete_template(UserId(slot.actor), slot.course, slot.semester)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
