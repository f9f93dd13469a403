//! Relay Storage Layer
//!
//! SQLite-based persistence for the app's durable state: the saved
//! authentication session and app settings. Single connection behind a
//! mutex; all schema changes go through versioned migrations.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
