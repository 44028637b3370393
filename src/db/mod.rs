//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and insert payloads
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: query layer used by the handlers

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbFile, DbStation, DbUser, NewFile, NewUser};
pub use schema::SQLITE_INIT;
pub use sqlite::{PortalStorage, SqlitePool};
