//! Contains the data models for API requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::Role;

/// Body of the role-gated `.../ping` endpoints.
#[derive(Serialize, Debug)]
pub struct PingResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub access_level: Role,
    pub description: String,
}

/// Body of `GET /service/admin/system-info`.
#[derive(Serialize, Debug)]
pub struct SystemInfoResponse {
    pub system_status: String,
    /// Seconds since the app state was built.
    pub uptime_secs: u64,
    pub accounts: usize,
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /service/read/public-data`.
#[derive(Serialize, Debug)]
pub struct PublicDataResponse {
    pub data: String,
    pub sensitivity: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /service/write/create`.
#[derive(Serialize, Debug)]
pub struct CreateResourceResponse {
    pub message: String,
    pub created_data: serde_json::Value,
    pub resource_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Represents a user creation request. Fields are optional so that a missing
/// field is reported as a validation error rather than a parse failure.
#[derive(Deserialize, Debug, Default)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

#[derive(Serialize, Debug)]
pub struct CreateUserResponse {
    pub message: String,
    pub username: String,
    pub roles: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct DeleteUserResponse {
    pub message: String,
    pub username: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateRolesRequest {
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

#[derive(Serialize, Debug)]
pub struct UpdateRolesResponse {
    pub message: String,
    pub username: String,
    pub new_roles: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
