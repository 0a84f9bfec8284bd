use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::error::PortalError;
use crate::identity::UserId;
use crate::recruitment::PostId;

use super::domain::{AnnouncementId, QuoteId};
use super::repository::BoardStore;
use super::service::{AnnouncementPayload, BoardService, ContactPayload, NewQuote};

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

pub fn board_router<S>(service: Arc<BoardService<S>>) -> Router
where
    S: BoardStore + 'static,
{
    Router::new()
        .route("/api/v1/landing", get(landing::<S>))
        .route(
            "/api/v1/announcements",
            get(announcements::<S>).post(create_notice::<S>),
        )
        .route(
            "/api/v1/announcements/:id",
            put(update_announcement::<S>).delete(delete_announcement::<S>),
        )
        .route("/api/v1/posts/:id/updates", post(create_post_update::<S>))
        .route("/api/v1/quotes", get(quotes::<S>).post(add_quote::<S>))
        .route("/api/v1/quotes/:id", delete(delete_quote::<S>))
        .route(
            "/api/v1/contact",
            post(submit_contact::<S>).get(messages::<S>),
        )
        .with_state(service)
}

type Svc<S> = State<Arc<BoardService<S>>>;

async fn landing<S: BoardStore + 'static>(State(service): Svc<S>) -> Response {
    Json(service.landing()).into_response()
}

async fn announcements<S: BoardStore + 'static>(State(service): Svc<S>) -> Response {
    Json(service.announcements()).into_response()
}

async fn create_notice<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Json(body): Json<ActorBody<AnnouncementPayload>>,
) -> Result<Response, PortalError> {
    let announcement = service.create_notice(UserId(body.actor), body.payload)?;
    Ok((StatusCode::CREATED, Json(announcement)).into_response())
}

async fn create_post_update<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<AnnouncementPayload>>,
) -> Result<Response, PortalError> {
    let announcement =
        service.create_post_update(UserId(body.actor), PostId(id), body.payload)?;
    Ok((StatusCode::CREATED, Json(announcement)).into_response())
}

async fn update_announcement<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<AnnouncementPayload>>,
) -> Result<Response, PortalError> {
    let announcement =
        service.update_announcement(UserId(body.actor), AnnouncementId(id), body.payload)?;
    Ok(Json(announcement).into_response())
}

async fn delete_announcement<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_announcement(UserId(query.actor), AnnouncementId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn quotes<S: BoardStore + 'static>(State(service): Svc<S>) -> Response {
    Json(service.quotes()).into_response()
}

async fn add_quote<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Json(body): Json<ActorBody<NewQuote>>,
) -> Result<Response, PortalError> {
    let quote = service.add_quote(UserId(body.actor), body.payload)?;
    Ok((StatusCode::CREATED, Json(quote)).into_response())
}

async fn delete_quote<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_quote(UserId(query.actor), QuoteId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn submit_contact<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Json(payload): Json<ContactPayload>,
) -> Result<Response, PortalError> {
    let message = service.submit_contact(payload)?;
    Ok((StatusCode::CREATED, Json(message)).into_response())
}

async fn messages<S: BoardStore + 'static>(
    State(service): Svc<S>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    Ok(Json(service.messages(UserId(query.actor))?).into_response())
}
