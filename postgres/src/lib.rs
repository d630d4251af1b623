//! `PostgreSQL` connectivity for the web API and the scheduled tasks worker.
//!
//! Both processes talk to the same database through the [`Database`] trait.
//! Production code uses [`PostgresDatabase`], a thin wrapper over a lazily
//! connecting `sqlx` pool; tests substitute a mock from `webapi-testing`.
//!
//! # Example
//!
//! ```no_run
//! use webapi_postgres::{Database, DatabaseConfig, PostgresDatabase};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig::new("postgres://localhost/product");
//! let database = PostgresDatabase::connect_lazy(&config)?;
//! database.execute_noop().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;

pub use config::DatabaseConfig;
pub use database::{Database, DatabaseError, PostgresDatabase};
