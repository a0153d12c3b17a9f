//! Account Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Authenticated user's own profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub roles: Vec<Role>,
    pub artist_id: Option<i64>,
    pub studio_id: Option<i64>,
    pub created_at: i64,
}

/// Admin view of an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub roles: Vec<Role>,
    pub created_at: i64,
}

/// Postal details of a user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserInformation {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Login / token refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
    pub user_id: String,
    pub roles: Vec<Role>,
}

/// Current balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Balance {
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}
