//! CRUD over accounts, with validation ahead of every mutation.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

use super::password::{PasswordError, PasswordHasher};
use super::role::{Role, parse_roles};
use super::store::{Account, CredentialStore};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid roles: {}", .invalid.join(", "))]
    InvalidRoles { invalid: Vec<String> },
    #[error("User already exists: {0}")]
    Conflict(String),
    #[error("User not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Public view of an account. Carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            roles: account.roles.clone(),
        }
    }
}

/// Credentials for an account created at startup.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub username: String,
    pub password: String,
    pub roles: Vec<String>,
}

impl SeedAccount {
    pub fn new(username: &str, password: &str, roles: &[&str]) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// The three demonstration accounts. Well-known credentials; never use
    /// these outside a demo.
    pub fn defaults() -> Vec<SeedAccount> {
        vec![
            SeedAccount::new("system_admin", "system_admin_pass", &["ADMIN", "READ", "WRITE"]),
            SeedAccount::new("system_reader", "system_reader_pass", &["READ"]),
            SeedAccount::new("system_writer", "system_writer_pass", &["WRITE"]),
        ]
    }
}

fn require_non_blank(value: &str, message: &str) -> Result<(), DirectoryError> {
    if value.trim().is_empty() {
        return Err(DirectoryError::Validation(message.to_string()));
    }
    Ok(())
}

// HTTP Basic splits user and password at the first ':', so such a name could
// never log in.
fn require_basic_safe_username(username: &str) -> Result<(), DirectoryError> {
    if username.contains(':') {
        return Err(DirectoryError::Validation(
            "Username must not contain ':'".to_string(),
        ));
    }
    Ok(())
}

/// Owns the account lifecycle. Cheap to clone; clones share the store.
#[derive(Debug, Clone)]
pub struct Directory {
    store: Arc<CredentialStore>,
    hasher: PasswordHasher,
}

impl Directory {
    pub fn new(store: Arc<CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn create_account<S: AsRef<str>>(
        &self,
        username: &str,
        password: &str,
        roles: &[S],
    ) -> Result<AccountSummary, DirectoryError> {
        require_non_blank(username, "Username is required")?;
        require_basic_safe_username(username)?;
        require_non_blank(password, "Password is required")?;
        if roles.is_empty() {
            return Err(DirectoryError::Validation(
                "At least one role is required".to_string(),
            ));
        }
        if self.store.exists(username) {
            return Err(DirectoryError::Conflict(username.to_string()));
        }
        let roles = parse_roles(roles)?;

        let account = Account {
            username: username.to_string(),
            password_hash: self.hasher.hash(password)?,
            roles,
        };
        let summary = AccountSummary::from(&account);

        // A concurrent create may have won the name while we were hashing.
        self.store
            .insert_new(account)
            .map_err(|lost| DirectoryError::Conflict(lost.username))?;

        tracing::info!(username = %summary.username, roles = ?summary.roles, "user created");
        Ok(summary)
    }

    pub fn delete_account(&self, username: &str) -> Result<(), DirectoryError> {
        if !self.store.remove(username) {
            return Err(DirectoryError::NotFound(username.to_string()));
        }
        tracing::info!(username, "user deleted");
        Ok(())
    }

    pub fn update_roles<S: AsRef<str>>(
        &self,
        username: &str,
        roles: &[S],
    ) -> Result<AccountSummary, DirectoryError> {
        if !self.store.exists(username) {
            return Err(DirectoryError::NotFound(username.to_string()));
        }
        let roles = parse_roles(roles)?;

        if !self.store.replace_roles(username, roles.clone()) {
            return Err(DirectoryError::NotFound(username.to_string()));
        }
        tracing::info!(username, roles = ?roles, "user roles updated");
        Ok(AccountSummary {
            username: username.to_string(),
            roles,
        })
    }

    pub fn get_account(&self, username: &str) -> Option<AccountSummary> {
        self.store.get(username).as_ref().map(AccountSummary::from)
    }

    pub fn list_accounts(&self) -> Vec<AccountSummary> {
        let mut accounts: Vec<AccountSummary> =
            self.store.list().iter().map(AccountSummary::from).collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        accounts
    }

    /// Create each seed account. Stops at the first failure.
    pub fn seed(&self, accounts: &[SeedAccount]) -> Result<(), DirectoryError> {
        for seed in accounts {
            self.create_account(&seed.username, &seed.password, seed.roles.as_slice())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::password::MIN_COST;

    fn directory() -> Directory {
        Directory::new(Arc::new(CredentialStore::new()), PasswordHasher::new(MIN_COST))
    }

    #[test]
    fn test_create_account_stores_hash_not_plaintext() {
        let dir = directory();
        let summary = dir.create_account("alice", "pw1", &["READ"]).unwrap();
        assert_eq!(summary.roles, [Role::Read].into_iter().collect());

        let stored = dir.store().get("alice").unwrap();
        assert_ne!(stored.password_hash, "pw1");
        assert!(dir.hasher().verify("pw1", &stored.password_hash));
    }

    #[test]
    fn test_create_account_validation_order() {
        let dir = directory();
        let err = dir.create_account("  ", "", &["NOPE"]).unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
        let err = dir.create_account("alice", " ", &["NOPE"]).unwrap_err();
        assert_eq!(err.to_string(), "Password is required");
        let none: [&str; 0] = [];
        let err = dir.create_account("alice", "pw", &none).unwrap_err();
        assert_eq!(err.to_string(), "At least one role is required");
        assert!(dir.store().is_empty());
    }

    #[test]
    fn test_create_account_rejects_colon_in_username() {
        let dir = directory();
        let err = dir.create_account("ali:ce", "pw1", &["READ"]).unwrap_err();
        assert!(matches!(err, DirectoryError::Validation(_)));
        assert_eq!(err.to_string(), "Username must not contain ':'");
        assert!(dir.store().is_empty());
    }

    #[test]
    fn test_create_account_rejects_unknown_role() {
        let dir = directory();
        let err = dir.create_account("alice", "pw", &["SUPERUSER"]).unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidRoles { .. }));
        assert!(dir.store().is_empty());
    }

    #[test]
    fn test_create_account_conflict_leaves_original() {
        let dir = directory();
        dir.create_account("alice", "pw1", &["READ"]).unwrap();
        let before = dir.store().get("alice").unwrap();

        let err = dir.create_account("alice", "pw2", &["ADMIN"]).unwrap_err();
        assert!(matches!(err, DirectoryError::Conflict(name) if name == "alice"));
        assert_eq!(dir.store().get("alice").unwrap(), before);
    }

    #[test]
    fn test_delete_account() {
        let dir = directory();
        dir.create_account("alice", "pw1", &["READ"]).unwrap();
        dir.delete_account("alice").unwrap();
        assert!(dir.get_account("alice").is_none());
        assert!(matches!(
            dir.delete_account("alice"),
            Err(DirectoryError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_roles_preserves_hash() {
        let dir = directory();
        dir.create_account("alice", "pw1", &["READ"]).unwrap();
        let hash = dir.store().get("alice").unwrap().password_hash;

        let updated = dir.update_roles("alice", &["WRITE", "ADMIN"]).unwrap();
        assert_eq!(updated.roles, [Role::Admin, Role::Write].into_iter().collect());
        assert_eq!(dir.store().get("alice").unwrap().password_hash, hash);
    }

    #[test]
    fn test_update_roles_errors_leave_state() {
        let dir = directory();
        assert!(matches!(
            dir.update_roles("ghost", &["READ"]),
            Err(DirectoryError::NotFound(_))
        ));

        dir.create_account("alice", "pw1", &["READ"]).unwrap();
        assert!(matches!(
            dir.update_roles("alice", &["READ", "ROOT"]),
            Err(DirectoryError::InvalidRoles { .. })
        ));
        let none: [&str; 0] = [];
        assert!(matches!(
            dir.update_roles("alice", &none),
            Err(DirectoryError::Validation(_))
        ));
        assert_eq!(
            dir.get_account("alice").unwrap().roles,
            [Role::Read].into_iter().collect()
        );
    }

    #[test]
    fn test_seed_defaults() {
        let dir = directory();
        dir.seed(&SeedAccount::defaults()).unwrap();
        let names: Vec<String> = dir.list_accounts().into_iter().map(|a| a.username).collect();
        assert_eq!(names, vec!["system_admin", "system_reader", "system_writer"]);
        assert_eq!(
            dir.get_account("system_admin").unwrap().roles,
            Role::ALL.into_iter().collect()
        );
    }
}
