//! Authentication middleware for user sessions

pub mod rate_limit;
pub mod user_auth;

pub use rate_limit::RateLimiter;
pub use user_auth::UserIdentity;
