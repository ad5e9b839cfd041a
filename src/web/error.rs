//! Translation of every failure into an HTTP status plus JSON body.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Map, Value, json};

use crate::auth::{AccessError, AuthError};
use crate::directory::{DirectoryError, Role, role_names};

pub const BASIC_REALM: &str = "Basic realm=\"rbac-directory\"";

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    InvalidRoles(Vec<String>),
    Conflict(String),
    NotFound(String),
    Unauthorized,
    Forbidden(Role),
    TooManyAttempts,
    /// Body could not be parsed.
    BadRequest(String),
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidRoles(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Validation(msg) => msg.clone(),
            ApiError::InvalidRoles(invalid) => format!("Invalid roles: [{}]", invalid.join(", ")),
            ApiError::Conflict(_) => "User already exists".to_string(),
            ApiError::NotFound(_) => "User not found".to_string(),
            ApiError::Unauthorized => "Authentication required".to_string(),
            ApiError::Forbidden(role) => format!("Access denied: requires role {role}"),
            ApiError::TooManyAttempts => "Too many failed authentication attempts".to_string(),
            ApiError::BadRequest(detail) => format!("Malformed request body: {detail}"),
            ApiError::Internal => "Internal server error".to_string(),
        }
    }
}

/// Helper to create a JSON error response with a message, timestamp and any
/// extra fields.
fn json_error(status: StatusCode, message: String, extra: Map<String, Value>) -> Response {
    let mut body = Map::new();
    body.insert("error".to_string(), Value::String(message));
    body.insert("timestamp".to_string(), json!(Utc::now()));
    body.extend(extra);
    (status, Json(Value::Object(body))).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut extra = Map::new();
        match &self {
            ApiError::InvalidRoles(_) => {
                let valid = role_names(&Role::ALL.into_iter().collect());
                extra.insert("valid_roles".to_string(), json!(valid));
            }
            ApiError::Conflict(username) | ApiError::NotFound(username) => {
                extra.insert("username".to_string(), json!(username));
            }
            _ => {}
        }

        let mut response = json_error(self.status(), self.message(), extra);
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static(BASIC_REALM));
        }
        response
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Validation(msg) => ApiError::Validation(msg),
            DirectoryError::InvalidRoles { invalid } => ApiError::InvalidRoles(invalid),
            DirectoryError::Conflict(username) => ApiError::Conflict(username),
            DirectoryError::NotFound(username) => ApiError::NotFound(username),
            DirectoryError::Password(e) => {
                tracing::error!("password hashing failed: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::Unauthorized,
            AuthError::Unavailable(detail) => {
                tracing::error!("authentication backend failure: {}", detail);
                ApiError::Internal
            }
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Forbidden { required } => ApiError::Forbidden(required),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        tracing::error!("blocking task failed: {}", err);
        ApiError::Internal
    }
}
