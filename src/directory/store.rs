//! In-memory credential store: username -> (password hash, role set).

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::role::Role;

/// A stored directory record.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    /// bcrypt digest; the plaintext is never kept.
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// Thread-safe map of accounts keyed by username.
///
/// Every method takes the lock once, so each call is atomic with respect to
/// its key. Readers proceed concurrently.
#[derive(Debug, Default)]
pub struct CredentialStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Account>> {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Account>> {
        self.accounts.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, username: &str) -> Option<Account> {
        self.read().get(username).cloned()
    }

    pub fn exists(&self, username: &str) -> bool {
        self.read().contains_key(username)
    }

    /// Insert or fully replace the record for `account.username`.
    pub fn put(&self, account: Account) {
        self.write().insert(account.username.clone(), account);
    }

    /// Insert only if the username is free. Gives the account back on conflict.
    pub fn insert_new(&self, account: Account) -> Result<(), Account> {
        let mut accounts = self.write();
        if accounts.contains_key(&account.username) {
            return Err(account);
        }
        accounts.insert(account.username.clone(), account);
        Ok(())
    }

    /// Swap the role set of an existing account, keeping its hash.
    /// Returns false if the account does not exist.
    pub fn replace_roles(&self, username: &str, roles: BTreeSet<Role>) -> bool {
        match self.write().get_mut(username) {
            Some(account) => {
                account.roles = roles;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, username: &str) -> bool {
        self.write().remove(username).is_some()
    }

    pub fn list(&self) -> Vec<Account> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
