//! Domain layer: the query model, the repository port and its errors.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{RepositoryError, RepositoryResult};
