//! Database layer
//!
//! Supports SQLite (default, single-binary deployment) and MySQL. The
//! driver is selected from configuration; the rest of the application
//! works against the `DatabasePool` trait and repository traits without
//! knowing the backend.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
