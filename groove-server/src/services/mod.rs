//! Business operations that span several tables or an external service

pub mod cart;
pub mod checkout;
pub mod permissions;
