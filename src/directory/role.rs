//! The closed set of roles an account can hold.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::service::DirectoryError;

/// A permission tag. Roles are flat: holding `Admin` grants nothing beyond
/// the endpoints that explicitly require `Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Read,
    Write,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Read, Role::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Read => "READ",
            Role::Write => "WRITE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "READ" => Ok(Role::Read),
            "WRITE" => Ok(Role::Write),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Parse a list of role names into a role set.
///
/// Fails if the list is empty or if any name is outside [`Role::ALL`]; in the
/// latter case every offending name is reported, not just the first.
pub fn parse_roles<S: AsRef<str>>(names: &[S]) -> Result<BTreeSet<Role>, DirectoryError> {
    if names.is_empty() {
        return Err(DirectoryError::Validation(
            "At least one role is required".to_string(),
        ));
    }

    let mut roles = BTreeSet::new();
    let mut invalid = BTreeSet::new();
    for name in names {
        match name.as_ref().parse::<Role>() {
            Ok(role) => {
                roles.insert(role);
            }
            Err(UnknownRole(name)) => {
                invalid.insert(name);
            }
        }
    }

    if !invalid.is_empty() {
        return Err(DirectoryError::InvalidRoles {
            invalid: invalid.into_iter().collect(),
        });
    }
    Ok(roles)
}

/// Render a role set as its wire names, in stable order.
pub fn role_names(roles: &BTreeSet<Role>) -> Vec<String> {
    roles.iter().map(|r| r.as_str().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        let roles = parse_roles(&["READ", "ADMIN", "READ"]).unwrap();
        assert_eq!(roles.len(), 2);
        assert!(roles.contains(&Role::Admin));
        assert!(roles.contains(&Role::Read));
    }

    #[test]
    fn test_parse_rejects_unknown_roles() {
        let err = parse_roles(&["READ", "SUPERUSER", "root", "SUPERUSER"]).unwrap_err();
        match err {
            DirectoryError::InvalidRoles { invalid } => {
                assert_eq!(invalid, vec!["SUPERUSER".to_string(), "root".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_role_message() {
        let err = "ROOT".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role 'ROOT'");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("read".parse::<Role>().is_err());
        assert!(" READ".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_empty_list() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            parse_roles(&empty),
            Err(DirectoryError::Validation(_))
        ));
    }

    #[test]
    fn test_serde_uses_upper_case_names() {
        assert_eq!(serde_json::to_string(&Role::Write).unwrap(), "\"WRITE\"");
        let role: Role = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
