pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod observability;
pub mod routes;
pub mod server;

pub use config::Config;
pub use server::{AppState, build_lifecycle, create_app};
