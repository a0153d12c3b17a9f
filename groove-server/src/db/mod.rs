//! Database access layer

pub mod app_settings;
pub mod artists;
pub mod audit;
pub mod carts;
pub mod catalog;
pub mod likes;
pub mod orders;
pub mod shop;
pub mod studios;
pub mod topups;
pub mod user_info;
pub mod users;
pub mod webhook_events;

#[cfg(test)]
pub mod fixtures;
