//! The user directory: roles, credential storage, hashing and account CRUD.

pub mod password;
pub mod role;
pub mod service;
pub mod store;

pub use password::{PasswordError, PasswordHasher};
pub use role::{Role, parse_roles, role_names};
pub use service::{AccountSummary, Directory, DirectoryError, SeedAccount};
pub use store::{Account, CredentialStore};
