use crate::authz::Action;
use crate::config::ConfigError;
use crate::identity::UserId;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::fmt;

/// A single invalid field, reported alongside its siblings rather than
/// short-circuiting on the first failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Collected field-level failures for one submitted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid payload:")?;
        for error in &self.fields {
            write!(f, " {}: {};", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Domain error taxonomy shared by every portal operation.
///
/// Not-found is always reported before permission; permission failures are
/// hard stops and never silently no-op.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("{entity} {id} does not exist")]
    NotFound { entity: &'static str, id: u64 },
    #[error("user {actor} is not allowed to {}", action.label())]
    PermissionDenied { actor: UserId, action: Action },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Mail(#[from] crate::mailer::MailError),
}

impl PortalError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = match &self {
            PortalError::NotFound { .. } => StatusCode::NOT_FOUND,
            PortalError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            PortalError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PortalError::Conflict(_) => StatusCode::CONFLICT,
            PortalError::Mail(_) => StatusCode::BAD_GATEWAY,
        };

        let body = match &self {
            PortalError::Validation(error) => Json(json!({
                "error": self.to_string(),
                "fields": error.fields,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };

        (status, body).into_response()
    }
}

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Portal(PortalError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Portal(err) => write!(f, "portal error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Portal(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Portal(err) => err.into_response(),
            other => {
                let body = Json(json!({ "error": other.to_string() }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<PortalError> for AppError {
    fn from(value: PortalError) -> Self {
        Self::Portal(value)
    }
}
