//! Defines the Axum API routes and handlers.

use axum::{
    Extension, Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    response::Response,
    routing::{delete, get, post, put},
};
use tower_http::catch_panic::CatchPanicLayer;
use chrono::Utc;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::auth::{Authenticator, Identity};
use crate::config::Config;
use crate::directory::{CredentialStore, Directory, DirectoryError, PasswordHasher, Role, role_names};
use crate::web::auth::{AuthBackend, DirectoryAuthBackend};
use crate::web::error::ApiError;
use crate::web::guard::{RoleGuard, require_role};
use crate::web::models::{
    CreateResourceResponse, CreateUserRequest, CreateUserResponse, DeleteUserResponse,
    PingResponse, PublicDataResponse, SystemInfoResponse, UpdateRolesRequest, UpdateRolesResponse,
};
use crate::web::rate_limiter::RateLimiter;

pub struct AppStateInner {
    pub directory: Directory,
    pub auth_backend: Box<dyn AuthBackend>,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}
pub type AppState = Arc<AppStateInner>;

/// Build the directory from `config`, seed it, and wire up authentication.
pub fn build_state(config: &Config) -> Result<AppState, DirectoryError> {
    let store = Arc::new(CredentialStore::new());
    let directory = Directory::new(store, PasswordHasher::new(config.security.bcrypt_cost));
    directory.seed(&config.seed_accounts())?;

    let authenticator = Authenticator::new(directory.clone())?;
    let rate_limiter = RateLimiter::new(
        config.security.max_failed_attempts,
        Duration::from_secs(config.security.failure_window_secs),
    );
    Ok(Arc::new(AppStateInner {
        directory,
        auth_backend: Box::new(DirectoryAuthBackend::new(authenticator)),
        rate_limiter,
        started_at: Instant::now(),
    }))
}

fn gated(router: Router<AppState>, state: &AppState, required: Role) -> Router<AppState> {
    router.route_layer(from_fn_with_state(
        RoleGuard::new(state.clone(), required),
        require_role,
    ))
}

/// Creates the Axum router with all the API endpoints.
pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/service/admin/ping", get(admin_ping))
        .route("/service/admin/system-info", get(system_info))
        .route("/auth/users", post(create_user))
        .route("/auth/users/{username}", delete(delete_user))
        .route("/auth/users/{username}/roles", put(update_user_roles));
    let read = Router::new()
        .route("/service/read/ping", get(read_ping))
        .route("/service/read/public-data", get(public_data));
    let write = Router::new()
        .route("/service/write/ping", get(write_ping))
        .route("/service/write/create", post(create_resource));

    let router = Router::new()
        .merge(gated(admin, &state, Role::Admin))
        .merge(gated(read, &state, Role::Read))
        .merge(gated(write, &state, Role::Write))
        .with_state(state);
    catch_panics(router)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {}", detail);
    ApiError::Internal.into_response()
}

/// Outermost layer: a panicking handler becomes a generic 500 instead of
/// tearing down the connection.
pub fn catch_panics(router: Router) -> Router {
    router.layer(CatchPanicLayer::custom(panic_response))
}

/// For tests: create a router around a prepared state.
pub fn app_with_state(state: AppState) -> Router {
    create_router(state)
}

fn ping(level: Role, message: &str, description: &str) -> Json<PingResponse> {
    Json(PingResponse {
        message: message.to_string(),
        timestamp: Utc::now(),
        access_level: level,
        description: description.to_string(),
    })
}

/// GET /service/admin/ping
async fn admin_ping(Extension(identity): Extension<Identity>) -> Json<PingResponse> {
    tracing::info!(username = %identity.username, "ADMIN ACCESS");
    ping(Role::Admin, "Admin access granted", "This endpoint requires ADMIN role")
}

/// GET /service/read/ping
async fn read_ping(Extension(identity): Extension<Identity>) -> Json<PingResponse> {
    tracing::info!(username = %identity.username, "READ ACCESS");
    ping(Role::Read, "Read access granted", "This endpoint requires READ role")
}

/// GET /service/write/ping
async fn write_ping(Extension(identity): Extension<Identity>) -> Json<PingResponse> {
    tracing::info!(username = %identity.username, "WRITE ACCESS");
    ping(Role::Write, "Write access granted", "This endpoint requires WRITE role")
}

/// GET /service/admin/system-info
async fn system_info(State(state): State<AppState>) -> Json<SystemInfoResponse> {
    Json(SystemInfoResponse {
        system_status: "operational".to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        accounts: state.directory.store().len(),
        timestamp: Utc::now(),
    })
}

/// GET /service/read/public-data
async fn public_data() -> Json<PublicDataResponse> {
    Json(PublicDataResponse {
        data: "This is public data accessible to all authenticated users".to_string(),
        sensitivity: "public".to_string(),
        timestamp: Utc::now(),
    })
}

/// POST /service/write/create -- echoes the submitted resource.
async fn create_resource(
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<CreateResourceResponse>, ApiError> {
    let Json(data) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let now = Utc::now();
    Ok(Json(CreateResourceResponse {
        message: "Resource created successfully".to_string(),
        created_data: data,
        resource_id: format!("res_{}", now.timestamp_millis()),
        timestamp: now,
    }))
}

/// POST /auth/users
async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<Identity>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let username = request.username.unwrap_or_default();
    let password = request.password.unwrap_or_default();
    let roles = request.roles.unwrap_or_default();

    // bcrypt is CPU bound; keep it off the async workers.
    let directory = state.directory.clone();
    let created = tokio::task::spawn_blocking(move || {
        directory.create_account(&username, &password, roles.as_slice())
    })
    .await??;

    tracing::info!(by = %admin.username, username = %created.username, "account created via API");
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "User created successfully".to_string(),
            roles: role_names(&created.roles),
            username: created.username,
            timestamp: Utc::now(),
        }),
    ))
}

/// DELETE /auth/users/{username}
async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<Identity>,
    Path(username): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    state.directory.delete_account(&username)?;
    tracing::info!(by = %admin.username, username = %username, "account deleted via API");
    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully".to_string(),
        username,
        timestamp: Utc::now(),
    }))
}

/// PUT /auth/users/{username}/roles
async fn update_user_roles(
    State(state): State<AppState>,
    Extension(admin): Extension<Identity>,
    Path(username): Path<String>,
    payload: Result<Json<UpdateRolesRequest>, JsonRejection>,
) -> Result<Json<UpdateRolesResponse>, ApiError> {
    // Unknown users are reported before body problems.
    if state.directory.get_account(&username).is_none() {
        return Err(ApiError::NotFound(username));
    }
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let roles = request.roles.unwrap_or_default();

    let updated = state.directory.update_roles(&username, roles.as_slice())?;
    tracing::info!(by = %admin.username, username = %username, "roles updated via API");
    Ok(Json(UpdateRolesResponse {
        message: "User roles updated successfully".to_string(),
        username: updated.username,
        new_roles: role_names(&updated.roles),
        timestamp: Utc::now(),
    }))
}
