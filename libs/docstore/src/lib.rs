//! Document store library for the Health Harbor application
//!
//! This crate provides the collection-scoped document abstraction used by the
//! API service, together with two backends: an in-memory store for tests and
//! local development, and a PostgreSQL store keeping each document as JSONB.

pub mod database;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod timestamp;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use store::{
    Direction, Document, DocumentStore, Documents, Filter, Op, OrderBy, Query, from_document,
    to_document,
};

/// Example usage of the PostgreSQL backend
///
/// ```rust,no_run
/// use docstore::database::{DatabaseConfig, init_pool, health_check};
/// use docstore::{DocumentStore, PgDocumentStore, Query};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     assert!(health_check(&pool).await?);
///
///     let store = PgDocumentStore::new(pool);
///     store.ensure_schema().await?;
///     let users = store.query("users", &Query::new().limit(10)).await?;
///     println!("{} users", users.count());
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
