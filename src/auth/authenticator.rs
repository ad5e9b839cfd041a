//! Verifies username/password pairs against the directory.

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::directory::{Directory, PasswordError, Role};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user and wrong password are deliberately the same error.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The verification itself could not run.
    #[error("Authentication unavailable: {0}")]
    Unavailable(String),
}

/// The verified result of authentication. Holds no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl Identity {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone)]
pub struct Authenticator {
    directory: Directory,
    // Verified against when the user does not exist, so both failure paths
    // cost one bcrypt verification.
    dummy_hash: String,
}

impl Authenticator {
    pub fn new(directory: Directory) -> Result<Self, PasswordError> {
        let dummy_hash = directory.hasher().hash("rbac-directory-dummy-password")?;
        Ok(Self { directory, dummy_hash })
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let hasher = self.directory.hasher();
        let Some(account) = self.directory.store().get(username) else {
            let _ = hasher.verify(password, &self.dummy_hash);
            tracing::debug!(username, "authentication failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !hasher.verify(password, &account.password_hash) {
            tracing::debug!(username, "authentication failed");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity {
            username: account.username,
            roles: account.roles,
        })
    }
}
