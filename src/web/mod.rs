//! The HTTP surface: Axum routes, the role guard and their supporting pieces.

pub mod api;
pub mod auth;
pub mod error;
pub mod guard;
pub mod models;
pub mod rate_limiter;
