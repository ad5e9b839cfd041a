pub mod access;
pub mod authenticator;

pub use access::{AccessError, authorize, require};
pub use authenticator::{AuthError, Authenticator, Identity};
