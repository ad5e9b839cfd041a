//! Allow/deny decisions for an authenticated identity.

use thiserror::Error;

use super::authenticator::Identity;
use crate::directory::Role;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Access denied: requires role {required}")]
    Forbidden { required: Role },
}

/// True iff `required` is one of the identity's roles. No hierarchy.
pub fn authorize(identity: &Identity, required: Role) -> bool {
    identity.has_role(required)
}

pub fn require(identity: &Identity, required: Role) -> Result<(), AccessError> {
    if authorize(identity, required) {
        Ok(())
    } else {
        Err(AccessError::Forbidden { required })
    }
}
