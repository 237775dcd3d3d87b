//! SQLite adapter: translates queries into SQL and runs them through sqlx.

pub mod connection;
pub mod entity;
pub mod query;
pub mod repository;

pub use connection::{
    create_pool, create_pool_from_config, create_test_pool, verify_connection, ConnectionError, PoolConfig,
};
pub use entity::{SqlEntity, Value};
pub use query::{is_valid_ident, quote_ident};
pub use repository::{SqlKey, SqlRepository, MAX_BIND_PARAMS};
