//! Role-based access control over an in-memory user directory, served over
//! HTTP with per-request Basic credentials.

pub mod auth;
pub mod config;
pub mod directory;
pub mod web;
