//! API request handlers.

pub mod health;
pub mod refresh;
pub mod tables;
