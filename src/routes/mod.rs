pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod me;
pub mod payments;

pub use health::{health, ready};
