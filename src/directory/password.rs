//! One-way password hashing backed by bcrypt.

use thiserror::Error;

/// Work factor bounds accepted by bcrypt.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Salted, adaptive hasher. Each call to [`PasswordHasher::hash`] draws a
/// fresh salt, so hashing the same input twice yields different digests.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: bcrypt::DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// `cost` is the bcrypt work factor; out-of-range values surface as a
    /// [`PasswordError`] from `hash`.
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        Ok(bcrypt::hash(plaintext, self.cost)?)
    }

    /// Malformed digests verify as `false`.
    pub fn verify(&self, plaintext: &str, digest: &str) -> bool {
        bcrypt::verify(plaintext, digest).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST)
    }

    #[test]
    fn test_hash_and_verify_success() {
        let hash = hasher().hash("my_secret_password").expect("Hashing should succeed");
        assert!(hasher().verify("my_secret_password", &hash));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hasher().hash("my_secret_password").unwrap();
        assert!(!hasher().verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hasher().hash("same").unwrap();
        let b = hasher().hash("same").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("same"));
    }

    #[test]
    fn test_verify_malformed_digest_is_false() {
        assert!(!hasher().verify("password", "invalid_hash"));
        assert!(!hasher().verify("password", ""));
    }

    #[test]
    fn test_invalid_cost_is_an_error() {
        assert!(PasswordHasher::new(MAX_COST + 1).hash("pw").is_err());
        assert!(PasswordHasher::new(MIN_COST - 1).hash("pw").is_err());
    }
}
