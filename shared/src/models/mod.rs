//! Data models
//!
//! Shared between groove-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Catalog IDs are snowflake `i64`, user IDs are uuid strings.

pub mod app;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod role;
pub mod shop;
pub mod user;

// Re-exports
pub use app::*;
pub use cart::*;
pub use catalog::*;
pub use order::*;
pub use role::*;
pub use shop::*;
pub use user::*;
