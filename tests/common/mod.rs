//! Shared helpers for driving the router in integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum_extra::headers::{Authorization, HeaderMapExt};
use http_body_util::BodyExt; // for .collect().await
use rbac_directory::config::Config;
use rbac_directory::web::api::{AppState, build_state};

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.security.bcrypt_cost = 4;
    config
}

pub fn test_state() -> AppState {
    build_state(&test_config()).unwrap()
}

pub const ADMIN: (&str, &str) = ("system_admin", "system_admin_pass");
pub const READER: (&str, &str) = ("system_reader", "system_reader_pass");
pub const WRITER: (&str, &str) = ("system_writer", "system_writer_pass");

pub fn request(
    method: &str,
    uri: &str,
    creds: Option<(&str, &str)>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let mut req = builder.body(body).unwrap();
    if let Some((user, pass)) = creds {
        req.headers_mut().typed_insert(Authorization::basic(user, pass));
    }
    req
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
