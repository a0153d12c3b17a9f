//! Site-wide settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AppInfo {
    pub name: String,
    pub img: String,
    pub is_closed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppInfoUpdate {
    pub name: String,
    #[serde(default)]
    pub img: String,
}
