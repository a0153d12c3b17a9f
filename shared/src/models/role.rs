//! Role Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
///
/// Stored as lowercase text in `user_roles` and carried in JWT claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Artist,
    StudioHead,
    StudioAdmin,
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Artist => "artist",
            Role::StudioHead => "studiohead",
            Role::StudioAdmin => "studioadmin",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "artist" => Ok(Role::Artist),
            "studiohead" => Ok(Role::StudioHead),
            "studioadmin" => Ok(Role::StudioAdmin),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Parse role names from the database, skipping anything unknown
pub fn parse_roles<I, S>(names: I) -> Vec<Role>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut roles: Vec<Role> = names
        .into_iter()
        .filter_map(|n| n.as_ref().parse().ok())
        .collect();
    roles.sort();
    roles.dedup();
    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [
            Role::User,
            Role::Artist,
            Role::StudioHead,
            Role::StudioAdmin,
            Role::Admin,
        ] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_serde_matches_as_str() {
        assert_eq!(
            serde_json::to_string(&Role::StudioHead).unwrap(),
            "\"studiohead\""
        );
        let role: Role = serde_json::from_str("\"studioadmin\"").unwrap();
        assert_eq!(role, Role::StudioAdmin);
    }

    #[test]
    fn test_unknown_role() {
        assert_eq!(
            "superuser".parse::<Role>(),
            Err(UnknownRole("superuser".into()))
        );
    }

    #[test]
    fn test_parse_roles_dedups_and_skips_unknown() {
        let roles = parse_roles(["admin", "user", "bogus", "user"]);
        assert_eq!(roles, vec![Role::User, Role::Admin]);
    }
}
