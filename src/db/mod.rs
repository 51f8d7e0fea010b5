//! Diesel ORM runtime infrastructure
//!
//! Connection pooling, the destination schema, insertable models and the
//! PostgreSQL implementation of [`crate::sink::Sink`].

pub mod database;
pub mod models;
pub mod pg_sink;
pub mod schema;

// Re-export key types
pub use database::{Database, DatabaseConfig, Pool, PooledConnection};
pub use models::{NewCustomer, NewOrder, NewProduct, NewShipping};
pub use pg_sink::PgSink;
