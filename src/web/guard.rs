//! Per-route authentication and role check, composed at route registration.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use std::net::IpAddr;
use std::str::FromStr;

use crate::auth::{self, AuthError};
use crate::directory::Role;
use crate::web::api::AppState;
use crate::web::error::ApiError;

/// State for [`require_role`]: the app state plus the role the route needs.
#[derive(Clone)]
pub struct RoleGuard {
    pub state: AppState,
    pub required: Role,
}

impl RoleGuard {
    pub fn new(state: AppState, required: Role) -> Self {
        Self { state, required }
    }
}

/// Client address: connection info if served with it, else `X-Forwarded-For`,
/// else loopback.
pub fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').next())
                .and_then(|s| IpAddr::from_str(s.trim()).ok())
        })
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

/// Authenticate the request's Basic credentials and require `guard.required`.
/// On success the caller's [`auth::Identity`] is available to the handler as
/// an `Extension`.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let limiter = &guard.state.rate_limiter;

    let Some(credentials) = req.headers().typed_get::<Authorization<Basic>>() else {
        return ApiError::Unauthorized.into_response();
    };

    // The attempt is counted before verifying, so a parallel burst cannot
    // outrun the limit.
    if !limiter.check_and_increment(ip).await {
        tracing::warn!(%ip, "authentication throttled");
        return ApiError::TooManyAttempts.into_response();
    }

    let identity = match guard
        .state
        .auth_backend
        .authenticate(credentials.username(), credentials.password())
        .await
    {
        Ok(identity) => identity,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(%ip, username = credentials.username(), "rejected credentials");
            return ApiError::Unauthorized.into_response();
        }
        Err(e) => {
            limiter.release(ip).await;
            return ApiError::from(e).into_response();
        }
    };
    limiter.reset(ip).await;

    if let Err(e) = auth::require(&identity, guard.required) {
        tracing::warn!(
            username = %identity.username,
            required = %guard.required,
            path = %req.uri().path(),
            "access denied"
        );
        return ApiError::from(e).into_response();
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}
