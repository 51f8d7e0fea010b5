//! Database connection management
//!
//! This module provides Diesel-based PostgreSQL connectivity with connection pooling.

use crate::config::DatabaseSettings;
use crate::error::SinkError;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use std::time::Duration;
use tracing::info;

pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Database connection pool manager
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Create the pool and verify the server answers.
    ///
    /// An unreachable server fails here, before any source row is read.
    pub fn connect(settings: &DatabaseSettings) -> Result<Self, SinkError> {
        let db = Self::new_with_config(&settings.connection_string(), DatabaseConfig::from(settings))?;
        db.test_connection()?;
        info!(host = %settings.host, database = %settings.name, "Connected to database");
        Ok(db)
    }

    /// Create a new database with custom configuration
    pub fn new_with_config(database_url: &str, config: DatabaseConfig) -> Result<Self, SinkError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);

        let pool = r2d2::Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_idle))
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_secs)))
            .build(manager)?;

        Ok(Database { pool })
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> Result<PooledConnection, SinkError> {
        Ok(self.pool.get()?)
    }

    /// Test database connectivity
    pub fn test_connection(&self) -> Result<(), SinkError> {
        let mut conn = self.get_connection()?;
        diesel::sql_query("SELECT 1").execute(&mut conn)?;
        Ok(())
    }
}

/// Pool options
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub min_idle: u32,
    pub connection_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            max_connections: 2,          // one loader connection plus headroom
            min_idle: 1,
            connection_timeout_secs: 30, // Wait up to 30s for connection
            idle_timeout_secs: 600,      // Close idle connections after 10 min
        }
    }
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        DatabaseConfig {
            max_connections: settings.max_connections,
            min_idle: settings.max_connections.min(1),
            connection_timeout_secs: settings.connection_timeout_secs,
            ..Default::default()
        }
    }
}
