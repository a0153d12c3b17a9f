//! Shared types for Groove
//!
//! Error taxonomy, API models and small utilities used by the server
//! and by anything that talks to its API.

pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
