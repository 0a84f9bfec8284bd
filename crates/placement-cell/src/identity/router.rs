use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::PortalError;
use crate::mailer::VerificationMailer;

use super::domain::{AddressId, EmailId, LinkId, PhoneId, UserId};
use super::repository::IdentityStore;
use super::service::{IdentityService, NewAddress, RegisterUser, UpdateUser};

#[derive(Debug, Deserialize)]
pub(crate) struct ActorQuery {
    pub actor: u64,
}

#[derive(Debug, Deserialize)]
struct ActorBody<T> {
    actor: u64,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
struct Actor {
    actor: u64,
}

#[derive(Debug, Deserialize)]
struct NewEmail {
    address: String,
}

#[derive(Debug, Deserialize)]
struct NewPhone {
    country_code: u16,
    number: String,
}

#[derive(Debug, Deserialize)]
struct NewLink {
    title: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct VerifyCode {
    code: String,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PrimarySlot {
    id: u64,
}

/// HTTP surface for accounts, contact books, and resume catalogs.
pub fn identity_router<S, M>(service: Arc<IdentityService<S, M>>) -> Router
where
    S: IdentityStore + 'static,
    M: VerificationMailer + 'static,
{
    Router::new()
        .route("/api/v1/users", post(register::<S, M>).get(list_users::<S, M>))
        .route("/api/v1/users/:id", get(get_user::<S, M>))
        .route("/api/v1/users/:id", put(update_user::<S, M>))
        .route("/api/v1/users/:id/actions", get(user_actions::<S, M>))
        .route("/api/v1/users/:id/approve", post(approve::<S, M>))
        .route("/api/v1/users/:id/reject", post(reject::<S, M>))
        .route("/api/v1/users/:id/make-superuser", post(make_superuser::<S, M>))
        .route(
            "/api/v1/users/:id/make-coordinator",
            post(make_coordinator::<S, M>),
        )
        .route(
            "/api/v1/users/:id/emails",
            post(add_email::<S, M>).get(list_emails::<S, M>),
        )
        .route("/api/v1/users/:id/primary-email", post(set_primary_email::<S, M>))
        .route("/api/v1/users/:id/primary-phone", post(set_primary_phone::<S, M>))
        .route(
            "/api/v1/users/:id/primary-address",
            post(set_primary_address::<S, M>),
        )
        .route("/api/v1/users/:id/phones", post(add_phone::<S, M>))
        .route("/api/v1/users/:id/addresses", post(add_address::<S, M>))
        .route("/api/v1/users/:id/links", post(add_link::<S, M>))
        .route(
            "/api/v1/users/:id/skills",
            post(add_skill::<S, M>).get(list_skills::<S, M>),
        )
        .route("/api/v1/users/:id/skills/:skill", delete(remove_skill::<S, M>))
        .route(
            "/api/v1/users/:id/languages",
            post(add_language::<S, M>).get(list_languages::<S, M>),
        )
        .route(
            "/api/v1/users/:id/languages/:language",
            delete(remove_language::<S, M>),
        )
        .route("/api/v1/emails/:id", delete(delete_email::<S, M>))
        .route(
            "/api/v1/emails/:id/request-verification",
            post(request_verification::<S, M>),
        )
        .route("/api/v1/emails/:id/verify", post(verify_email::<S, M>))
        .route("/api/v1/phones/:id", delete(delete_phone::<S, M>))
        .route("/api/v1/addresses/:id", delete(delete_address::<S, M>))
        .route("/api/v1/links/:id", delete(delete_link::<S, M>))
        .with_state(service)
}

type Svc<S, M> = State<Arc<IdentityService<S, M>>>;

async fn register<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Json(payload): Json<RegisterUser>,
) -> Result<Response, PortalError> {
    let user = service.register(payload)?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn list_users<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Query(query): Query<ActorQuery>,
) -> Response {
    Json(service.list_users(UserId(query.actor))).into_response()
}

async fn get_user<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let user = service.get_user(UserId(query.actor), UserId(id))?;
    Ok(Json(user).into_response())
}

async fn update_user<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<UpdateUser>>,
) -> Result<Response, PortalError> {
    let user = service.update_user(UserId(body.actor), UserId(id), body.payload)?;
    Ok(Json(user).into_response())
}

async fn user_actions<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let actions = service.user_actions(UserId(query.actor), UserId(id))?;
    Ok(Json(actions).into_response())
}

async fn approve<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let user = service.approve(UserId(body.actor), UserId(id))?;
    Ok(Json(user).into_response())
}

async fn reject<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    service.reject(UserId(body.actor), UserId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn make_superuser<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let user = service.make_superuser(UserId(body.actor), UserId(id))?;
    Ok(Json(user).into_response())
}

async fn make_coordinator<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let user = service.make_coordinator(UserId(body.actor), UserId(id))?;
    Ok(Json(user).into_response())
}

async fn add_email<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NewEmail>>,
) -> Result<Response, PortalError> {
    let email = service.add_email(UserId(body.actor), UserId(id), body.payload.address)?;
    Ok((StatusCode::CREATED, Json(email)).into_response())
}

async fn list_emails<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    let emails = service.emails_of(UserId(query.actor), UserId(id))?;
    Ok(Json(emails).into_response())
}

async fn delete_email<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_email(UserId(query.actor), EmailId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn set_primary_email<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<PrimarySlot>>,
) -> Result<Response, PortalError> {
    service.set_primary_email(UserId(body.actor), UserId(id), EmailId(body.payload.id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn request_verification<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<Actor>,
) -> Result<Response, PortalError> {
    let email = service.request_verification(UserId(body.actor), EmailId(id), Utc::now())?;
    Ok((StatusCode::ACCEPTED, Json(email)).into_response())
}

async fn verify_email<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<VerifyCode>>,
) -> Result<Response, PortalError> {
    let email = service.verify_email(
        UserId(body.actor),
        EmailId(id),
        &body.payload.code,
        Utc::now(),
    )?;
    Ok(Json(email).into_response())
}

async fn add_phone<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NewPhone>>,
) -> Result<Response, PortalError> {
    let phone = service.add_phone(
        UserId(body.actor),
        UserId(id),
        body.payload.country_code,
        body.payload.number,
    )?;
    Ok((StatusCode::CREATED, Json(phone)).into_response())
}

async fn delete_phone<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_phone(UserId(query.actor), PhoneId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn set_primary_phone<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<PrimarySlot>>,
) -> Result<Response, PortalError> {
    service.set_primary_phone(UserId(body.actor), UserId(id), PhoneId(body.payload.id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn add_address<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NewAddress>>,
) -> Result<Response, PortalError> {
    let address = service.add_address(UserId(body.actor), UserId(id), body.payload)?;
    Ok((StatusCode::CREATED, Json(address)).into_response())
}

async fn delete_address<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_address(UserId(query.actor), AddressId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn set_primary_address<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<PrimarySlot>>,
) -> Result<Response, PortalError> {
    service.set_primary_address(UserId(body.actor), UserId(id), AddressId(body.payload.id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn add_link<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NewLink>>,
) -> Result<Response, PortalError> {
    let link = service.add_link(
        UserId(body.actor),
        UserId(id),
        body.payload.title,
        body.payload.url,
    )?;
    Ok((StatusCode::CREATED, Json(link)).into_response())
}

async fn delete_link<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.delete_link(UserId(query.actor), LinkId(id))?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn add_skill<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NamedEntry>>,
) -> Result<Response, PortalError> {
    let skill = service.add_skill(UserId(body.actor), UserId(id), &body.payload.name)?;
    Ok((StatusCode::CREATED, Json(skill)).into_response())
}

async fn list_skills<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
) -> Result<Response, PortalError> {
    Ok(Json(service.skills_of(UserId(id))?).into_response())
}

async fn remove_skill<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path((id, skill)): Path<(u64, u64)>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.remove_skill(
        UserId(query.actor),
        UserId(id),
        crate::catalog::SkillId(skill),
    )?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn add_language<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
    Json(body): Json<ActorBody<NamedEntry>>,
) -> Result<Response, PortalError> {
    let language = service.add_language(UserId(body.actor), UserId(id), &body.payload.name)?;
    Ok((StatusCode::CREATED, Json(language)).into_response())
}

async fn list_languages<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path(id): Path<u64>,
) -> Result<Response, PortalError> {
    Ok(Json(service.languages_of(UserId(id))?).into_response())
}

async fn remove_language<S: IdentityStore + 'static, M: VerificationMailer + 'static>(
    State(service): Svc<S, M>,
    Path((id, language)): Path<(u64, u64)>,
    Query(query): Query<ActorQuery>,
) -> Result<Response, PortalError> {
    service.remove_language(
        UserId(query.actor),
        UserId(id),
        crate::catalog::LanguageId(language),
    )?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
