//! Authentication backend trait and the directory-backed implementation
//! used by the guard middleware.

use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::{AuthError, Authenticator, Identity};

#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    /// Verify credentials and resolve the caller's identity.
    async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError>;
}

/// Runs bcrypt verification on the blocking pool.
pub struct DirectoryAuthBackend {
    authenticator: Arc<Authenticator>,
}

impl DirectoryAuthBackend {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }
}

#[async_trait]
impl AuthBackend for DirectoryAuthBackend {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let username = username.to_string();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || authenticator.authenticate(&username, &password))
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?
    }
}
