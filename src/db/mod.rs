//! PostgreSQL access: the pooled connection manager, the read-only query
//! executor and its syntactic guard, catalog introspection, and the row to
//! JSON type mappings.

pub mod executor;
pub mod pool;
pub mod readonly;
pub mod schema;
pub mod types;

pub use executor::QueryExecutor;
pub use pool::ConnectionManager;
pub use schema::SchemaInspector;
